//! bpgen CLI - Soong build-module synthesis for Maven dependency graphs

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use bpgen::ops::PatchError;
use bpgen::util::diagnostic::emit;
use bpgen::GraphError;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("bpgen=debug")
    } else {
        EnvFilter::new("bpgen=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args, color),
        Commands::List(args) => commands::list::execute(args),
        Commands::Explain(args) => commands::explain::execute(args),
        Commands::Name(args) => commands::name::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, with source snippets or suggestions when the error
/// carries them.
fn report(error: &anyhow::Error, color: bool) {
    if let Some(patch) = error.downcast_ref::<PatchError>() {
        let handler = if color {
            miette::GraphicalReportHandler::new()
        } else {
            miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
        };
        let mut out = String::new();
        if handler.render_report(&mut out, patch).is_ok() {
            eprint!("{}", out);
            return;
        }
    }

    if let Some(graph) = error.downcast_ref::<GraphError>() {
        let mut diag = graph.to_diagnostic();
        let message = graph.to_string();
        for cause in error.chain().filter(|c| c.to_string() != message) {
            diag = diag.with_context(cause.to_string());
        }
        emit(&diag, color);
        return;
    }

    eprintln!("error: {:#}", error);
}
