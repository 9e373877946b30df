//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Corpus tree browser: filter, rank and select hierarchical corpora
#[derive(Parser, Debug)]
#[command(name = "corpview")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Directory holding a local .corpview.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the corpus tree
    Tree {
        /// Cached corpora JSON (default: configured corpora_file)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Rank and dim corpora against this query
        #[arg(short, long)]
        query: Option<String>,
        /// Expand every node
        #[arg(short = 'a', long)]
        expand_all: bool,
        /// Expand the node at PATH (Root/Child), repeatable
        #[arg(short, long = "expand", value_name = "PATH")]
        expand: Vec<String>,
        /// Show relevance scores
        #[arg(short = 'p', long)]
        priority: bool,
    },

    /// List every corpus ranked against a query
    Search {
        /// Cached corpora JSON
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Query words
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Only list corpora with a positive score
        #[arg(short, long)]
        matching: bool,
    },

    /// Apply selection changes and print the selected corpora
    Select {
        /// Cached corpora JSON
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Rank against this query before toggling
        #[arg(short, long)]
        query: Option<String>,
        /// Start from an empty selection
        #[arg(long)]
        none: bool,
        /// Toggle selection of the subtree at PATH, repeatable
        #[arg(short, long = "toggle", value_name = "PATH")]
        toggle: Vec<String>,
        /// Print a JSON search request for this search text instead of paths
        #[arg(short, long, value_name = "TEXT")]
        request: Option<String>,
    },

    /// Pick one corpus interactively and toggle its selection
    Pick {
        /// Cached corpora JSON
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Rank against this query before picking
        #[arg(short, long)]
        query: Option<String>,
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
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
}
