use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::SimulateCommands;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Compile, annotate and validate every source model.
    Build(BuildArgs),
    /// Check parametrisation files against a compiled model.
    CheckParams(CheckParamsArgs),
    /// Run an exposure scenario.
    Simulate {
        #[command(subcommand)]
        action: SimulateCommands,
    },
    /// Print the artifact family derived from a base path.
    Names(NamesArgs),
}

/// Arguments for `pbk build`.
#[derive(Clone, Debug, Args)]
pub struct BuildArgs {
    /// Directory holding the source models (defaults to `paths.model_dir`).
    #[arg(long)]
    pub model_dir: Option<PathBuf>,
}

/// Arguments for `pbk check-params`.
#[derive(Clone, Debug, Args)]
pub struct CheckParamsArgs {
    /// Compiled model document.
    #[arg(long)]
    pub model: PathBuf,
    /// Directory of parametrisation CSV files (defaults to `paths.parametrisation_dir`).
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

/// Arguments for `pbk names`.
#[derive(Clone, Debug, Args)]
pub struct NamesArgs {
    pub path: PathBuf,
}
