use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "taxon")]
#[command(about = "Inspect taxonomy definitions and classify instances against them")]
#[command(version)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Mode {
    Exclusive,
    Inclusive,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the taxonomy as a tree
    Tree {
        /// Definition file (TOML)
        file: PathBuf,
    },

    /// List direct children of an item (first tier when omitted)
    Children {
        /// Definition file (TOML)
        file: PathBuf,

        /// Item name
        item: Option<String>,
    },

    /// List every item below an item (all items when omitted)
    Descendants {
        /// Definition file (TOML)
        file: PathBuf,

        /// Item name
        item: Option<String>,
    },

    /// Apply the file's [[assignments]] and print the classifications
    Classify {
        /// Definition file (TOML)
        file: PathBuf,

        /// Classification mode
        #[arg(short, long, value_enum, default_value = "exclusive")]
        mode: Mode,

        /// Print the classifier snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the built taxonomy as JSON
    Export {
        /// Definition file (TOML)
        file: PathBuf,
    },
}
