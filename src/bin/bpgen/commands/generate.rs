//! `bpgen generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use bpgen::ops::{canonicalizer, generate, GenerateOptions};
use bpgen::util::diagnostic::{emit, Diagnostic};
use bpgen::util::GlobalContext;

pub fn execute(args: GenerateArgs, color: bool) -> Result<()> {
    let ctx = GlobalContext::new(&args.project.overrides())?;
    let opts = GenerateOptions::from_context(&ctx)?;
    let canon = canonicalizer(ctx.config(), &opts.project_name)?;

    let summary = generate(&opts, &canon)?;

    tracing::info!(
        "Generated {} modules ({} declarations, {} artifacts); {} left to the platform",
        summary.report.modules,
        summary.report.declarations,
        summary.report.artifacts,
        summary.platform_provided
    );

    if summary.dependencies.is_empty() {
        let diag = Diagnostic::warning("no dependencies were spliced into the build file")
            .with_location(&opts.build_file)
            .with_context("every first-level dependency is excluded or the graph lists none")
            .with_suggestion("Check `first_level` in the resolved graph");
        emit(&diag, color);
    }

    Ok(())
}
