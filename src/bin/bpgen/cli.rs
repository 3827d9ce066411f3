//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use bpgen::util::config::Overrides;

/// bpgen - Soong build-module synthesis for resolved Maven dependency graphs
#[derive(Parser)]
#[command(name = "bpgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Regenerate the vendored tree and patch the hand-maintained build file
    Generate(GenerateArgs),

    /// List every module in the dependency closure
    List(ListArgs),

    /// Explain why a module is in the dependency closure
    Explain(ExplainArgs),

    /// Print the Soong name a coordinate is referenced by
    Name(NameArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Settings that override `Bpgen.toml`.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project name used to prefix vendored modules
    #[arg(long, env = "BPGEN_PROJECT_NAME")]
    pub project_name: Option<String>,

    /// Target platform version
    #[arg(long)]
    pub target_sdk: Option<u32>,

    /// Resolved graph document (TOML or JSON)
    #[arg(long)]
    pub graph: Option<PathBuf>,

    /// Hand-maintained build file to patch
    #[arg(long)]
    pub build_file: Option<PathBuf>,

    /// Output directory for vendored modules
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl ProjectArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            project_name: self.project_name.clone(),
            target_sdk: self.target_sdk,
            graph: self.graph.clone(),
            build_file: self.build_file.clone(),
            output_dir: self.output_dir.clone(),
        }
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only show modules that get vendored
    #[arg(long)]
    pub vendored: bool,

    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Module coordinate (`group:name`)
    pub coordinate: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct NameArgs {
    /// Module coordinate (`group:name`)
    pub coordinate: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
