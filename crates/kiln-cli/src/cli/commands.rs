use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::Format;

/// Available kiln subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the library
    ///
    /// Runs one bundling pass per output format and writes bundles,
    /// declarations and source maps to the output directory.
    Build(BuildArgs),

    /// Validate and lint the configuration
    ///
    /// Checks that the configuration is well formed and that the entry module
    /// exists, then reports inconsistencies such as globals declared for
    /// dependencies that are not external.
    Check(CheckArgs),

    /// Print the resolved configuration as JSON
    Print(PrintArgs),
}

/// Options shared by every command that reads a configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root containing kiln.toml or package.json
    #[arg(short = 'C', long, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Configuration profile to apply over the base library table
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output directory, relative to the project root
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Output formats, replacing the configured list
    ///
    /// Examples:
    ///   kiln build --format es
    ///   kiln build --format es,umd
    #[arg(short = 'f', long, value_enum, value_delimiter = ',')]
    pub format: Vec<Format>,

    /// Minify every bundle
    #[arg(short = 'm', long)]
    pub minify: bool,

    /// Write a .map file next to every bundle
    #[arg(long)]
    pub sourcemap: bool,

    /// Skip declaration (.d.ts) generation even when configured
    #[arg(long)]
    pub no_dts: bool,
}

/// Arguments for the check command
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Fail when lint reports any warning
    #[arg(long)]
    pub deny_warnings: bool,
}

/// Arguments for the print command
#[derive(Args, Debug, Clone, Default)]
pub struct PrintArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}
