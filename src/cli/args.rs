//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Shortest breeding paths through a catalog of parent+parent=child formulas
#[derive(Parser, Debug)]
#[command(name = "breedpath")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Catalog file (default: catalog_file from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Directory searched for a local .breedpath.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    /// Reject malformed catalog lines instead of skipping them
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find every shortest breeding path from START to GOAL
    Search {
        /// Entity to start breeding from
        start: String,
        /// Entity to breed
        goal: String,
        /// Longest path to consider (default: max_depth from config)
        #[arg(short, long)]
        max_depth: Option<usize>,
    },

    /// Append a formula PARENT1+PARENT2=CHILD to the catalog
    Add {
        /// First parent
        first_parent: String,
        /// Second parent
        second_parent: String,
        /// Resulting child
        child: String,
    },

    /// Parse the catalog and report skipped and duplicate lines
    Check,

    /// List entity names in first-appearance order
    Names,

    /// Show every recipe an entity takes part in as a parent
    Recipes {
        /// Entity name
        name: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
