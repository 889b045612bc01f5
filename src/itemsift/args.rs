use clap::{Parser, Subcommand};
use once_cell::sync::Lazy;
use std::path::PathBuf;

/// "0.3.2" for releases, "0.3.2@abc1234 2025-01-15 14:30" for dev builds
static VERSION_STRING: Lazy<String> = Lazy::new(|| {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    if IS_RELEASE == "true" || GIT_HASH.is_empty() {
        VERSION.to_string()
    } else {
        format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
    }
});

fn version() -> &'static str {
    VERSION_STRING.as_str()
}

#[derive(Parser, Debug)]
#[command(name = "itemsift", version = version())]
#[command(about = "Filter an item catalog with tag-aware search queries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Catalog JSON file (defaults to the `catalog` config key)
    #[arg(short, long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the catalog
    #[command(alias = "s")]
    Search {
        /// Query tokens: filter tags (e.g. unique, notcollectable, self) and plain terms
        #[arg(num_args = 0..)]
        query: Vec<String>,

        /// Keep only items where the named yes/no filter holds (repeatable)
        #[arg(long, value_name = "FILTER")]
        only: Vec<String>,

        /// Keep only items where the named yes/no filter does not hold (repeatable)
        #[arg(long, value_name = "FILTER")]
        exclude: Vec<String>,

        /// Restrict to a patch, by short name or table id; expansion headers
        /// (HW, SB, ...) add the whole expansion (repeatable)
        #[arg(short, long, value_name = "PATCH")]
        patch: Vec<String>,

        /// Restrict to items a race/sex can equip (e.g. "Female Viera", or self)
        #[arg(short, long, value_name = "LABEL")]
        race_sex: Option<String>,

        /// Show at most this many items
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List the filters, their state and the tags they accept
    #[command(alias = "f")]
    Filters,

    /// List the patch table
    Patches,

    /// Open an item on the configured data site
    #[command(alias = "o")]
    Open {
        /// Item id
        id: u32,
    },

    /// Get or set configuration
    Config {
        /// Configuration key (e.g., data-site)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
