//! `bpgen explain` command

use anyhow::Result;

use crate::cli::ExplainArgs;
use bpgen::ops::{canonicalizer, explain, flatten_graph};
use bpgen::util::GlobalContext;

pub fn execute(args: ExplainArgs) -> Result<()> {
    let ctx = GlobalContext::new(&args.project.overrides())?;
    let project = &ctx.config().project;
    let canon = canonicalizer(ctx.config(), ctx.project_name()?)?;

    let flat = flatten_graph(&project.graph, &canon, project.target_sdk)?;
    let explanation = explain(&flat, &args.coordinate)?;
    let module = &explanation.module;

    println!("{} ({})", module.id(), explanation.status);
    println!("  name: {}", module.canonical_name());
    if let Some(artifact) = module.artifact() {
        println!("  artifact: {}", artifact.file.display());
    }

    // Chain from a first-level dependency down to the module
    for (depth, id) in explanation.chain.iter().enumerate() {
        let indent = "   ".repeat(depth);
        println!("  {}└─ {}", indent, id);
    }

    if !explanation.required_by.is_empty() {
        println!();
        println!("Required by:");
        for id in &explanation.required_by {
            println!("  ← {}", id);
        }
    }

    let deps = module.dependencies();
    if !deps.is_empty() {
        println!();
        println!("Direct dependencies:");
        for id in deps {
            println!("  → {}", id);
        }
    }

    Ok(())
}
