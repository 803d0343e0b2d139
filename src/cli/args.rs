//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Hierarchical item trees: flat/nested conversion and hook-driven structural editing
#[derive(Parser, Debug)]
#[command(name = "treedit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d, -dd, -ddd)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Deepest level items may be created at or moved to (roots are 0)
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a flat collection as a tree
    Show {
        /// Flat JSON collection
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print a flat collection as nested JSON
    Nest {
        /// Flat JSON collection
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print a nested JSON tree as a flat collection
    Flatten {
        /// Nested JSON tree
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Create an item and save the collection
    Add {
        /// Flat JSON collection
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Parent id (new root when omitted)
        #[arg(short, long)]
        parent: Option<String>,
        /// Name of the new item
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Delete an item (and its subtree) and save the collection
    Remove {
        /// Flat JSON collection
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item id
        id: String,
    },

    /// Move an item below another parent and save the collection
    Move {
        /// Flat JSON collection
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item id
        id: String,
        /// New parent id (root when omitted)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Change an item's name and save the collection
    Rename {
        /// Flat JSON collection
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Item id
        id: String,
        /// New name
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

    /// Print a config template, or write it to the global config path
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
