//! `bpgen list` command

use anyhow::Result;

use crate::cli::ListArgs;
use bpgen::ops::{canonicalizer, flatten_graph, list_modules, ModuleStatus};
use bpgen::util::GlobalContext;

pub fn execute(args: ListArgs) -> Result<()> {
    let ctx = GlobalContext::new(&args.project.overrides())?;
    let project = &ctx.config().project;
    let canon = canonicalizer(ctx.config(), ctx.project_name()?)?;

    let flat = flatten_graph(&project.graph, &canon, project.target_sdk)?;

    for row in list_modules(&flat) {
        if args.vendored && row.status != ModuleStatus::Vendored {
            continue;
        }

        let marker = if row.first_level { "*" } else { " " };
        println!("{} {:<9} {}  ->  {}", marker, row.status, row.id, row.name);
    }

    Ok(())
}
