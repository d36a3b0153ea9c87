//! Command-line interface definition for kiln.
//!
//! - `kiln build` - bundle the library and write every artifact
//! - `kiln check` - validate and lint the configuration without building
//! - `kiln print` - show the resolved configuration as JSON

mod commands;
pub mod enums;
#[cfg(test)]
mod tests;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command, PrintArgs, ProjectArgs};
pub use enums::Format;

/// kiln - component library bundler
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Build Vue component libraries",
    long_about = "kiln bundles a Vue + Vuetify component library from a declarative\n\
                  configuration into ES, CommonJS, UMD or IIFE bundles, with the\n\
                  library's peer dependencies left external and optional .d.ts files."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
