use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "idshield")]
#[command(about = "Sensitive data verification and redaction", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the items of a redaction file
    Show {
        /// Redaction file (.voa)
        voa: PathBuf,

        /// Also list unclassified nodes and archived items
        #[arg(long)]
        all: bool,
    },

    /// Apply a verification session to a redaction file
    Verify {
        /// Redaction file (.voa)
        voa: PathBuf,

        /// Source document name recorded with the session
        #[arg(long)]
        source: Option<String>,

        /// JSON file with added, deleted and modified items
        #[arg(long)]
        changes: PathBuf,

        /// Seconds spent verifying
        #[arg(long, default_value = "0")]
        elapsed: f64,
    },

    /// Write the redacted text of a document
    Render {
        /// Redaction file (.voa)
        voa: PathBuf,

        /// Original text of the document
        #[arg(long)]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Seed for reproducible padding
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List exemption categories and codes
    Exemptions {
        /// Directory of category files (default from config)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Only this category
        category: Option<String>,
    },

    /// Show the effective configuration
    Config {
        /// Print only the config file path
        #[arg(long)]
        path: bool,
    },
}
