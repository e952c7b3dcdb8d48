//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - validate: resolve toolboxes and report per-tool status
//! - list: enabled tools with generated names
//! - describe: ordered parameters of one tool
//! - metadata: write `.pyt.xml` documentation files
//! - dump: print a document in normalized form

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ytb - load, validate and document YAML-configured toolboxes
#[derive(Parser, Debug)]
#[command(name = "ytb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (defaults to `validate`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate one toolbox (registry file or directory) or every toolbox under a root
    Validate {
        /// Registry, toolbox directory, or root of toolboxes (defaults to the configured root)
        path: Option<PathBuf>,
    },

    /// List enabled tools with their generated names
    List {
        /// Registry, toolbox directory, or root of toolboxes
        path: Option<PathBuf>,
    },

    /// Show the ordered parameters of one tool
    Describe {
        /// Registry file or toolbox directory
        path: PathBuf,

        /// Tool name as listed in the registry
        tool: String,

        /// Print parameters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate ArcGIS Pro metadata XML files
    Metadata {
        /// Registry file or toolbox directory
        path: PathBuf,

        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Load a registry or tool document and print its normalized YAML
    Dump {
        /// Document to load
        file: PathBuf,
    },
}
