//! CLI commands and argument parsing

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Singer tap for the Aircall API
#[derive(Parser, Debug)]
#[command(name = "tap-aircall")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (JSON or YAML), repeatable; `ENV` reads TAP_AIRCALL_* variables
    #[arg(short, long, value_name = "PATH")]
    pub config: Vec<PathBuf>,

    /// State file (JSON)
    #[arg(short, long, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Catalog file selecting the streams to sync
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Deprecated alias of --catalog
    #[arg(long, value_name = "PATH", conflicts_with = "catalog")]
    pub properties: Option<PathBuf>,

    /// Print the catalog and exit
    #[arg(long, conflicts_with_all = ["test", "about"])]
    pub discover: bool,

    /// Connection test: sync one record per stream, or only print schemas
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "all")]
    pub test: Option<TestMode>,

    /// Print tap metadata and exit
    #[arg(long)]
    pub about: bool,

    /// Format of --about output
    #[arg(long, value_enum, default_value = "json")]
    pub format: AboutFormat,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// What `--test` does
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestMode {
    /// Sync one record per stream
    All,
    /// Print schemas only
    Schema,
}

/// Output format of `--about`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AboutFormat {
    Json,
    Markdown,
}

/// The operation the flags ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    About(AboutFormat),
    Discover,
    Test(TestMode),
    Sync,
}

impl Cli {
    /// Resolve the flags into a single operation
    pub fn mode(&self) -> Mode {
        if self.about {
            Mode::About(self.format)
        } else if self.discover {
            Mode::Discover
        } else if let Some(test) = self.test {
            Mode::Test(test)
        } else {
            Mode::Sync
        }
    }

    /// Catalog path from `--catalog` or the deprecated `--properties`
    pub fn catalog_path(&self) -> Option<&PathBuf> {
        self.catalog.as_ref().or(self.properties.as_ref())
    }
}
