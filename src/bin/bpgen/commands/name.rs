//! `bpgen name` command

use anyhow::{anyhow, Result};

use crate::cli::NameArgs;
use bpgen::ops::canonicalizer;
use bpgen::util::GlobalContext;
use bpgen::ModuleId;

pub fn execute(args: NameArgs) -> Result<()> {
    let ctx = GlobalContext::new(&args.project.overrides())?;
    let canon = canonicalizer(ctx.config(), ctx.project_name()?)?;

    let (group, name) = args.coordinate.split_once(':').ok_or_else(|| {
        anyhow!(
            "invalid coordinate `{}`\n\
             help: coordinates have the form `group:name`",
            args.coordinate
        )
    })?;
    // Names never depend on the version
    let name = name.split(':').next().unwrap_or(name);
    let id = ModuleId::new(group, name, "");

    let kind = if canon.is_platform_provided(&id) {
        "platform"
    } else {
        "vendored"
    };
    println!("{} ({})", canon.name_of(&id), kind);

    Ok(())
}
