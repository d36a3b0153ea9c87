use clap::ValueEnum;
use kiln_config::LibraryFormat;

/// Bundle format accepted by `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// ECMAScript module
    Es,
    /// CommonJS
    Cjs,
    /// Universal module definition
    Umd,
    /// Browser script assigning a global
    Iife,
}

impl From<Format> for LibraryFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Es => LibraryFormat::Es,
            Format::Cjs => LibraryFormat::Cjs,
            Format::Umd => LibraryFormat::Umd,
            Format::Iife => LibraryFormat::Iife,
        }
    }
}
