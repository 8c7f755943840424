use std::path::PathBuf;

use clap::{Parser, Subcommand};

use addrmatch::constants::DEFAULT_MATCH_THRESHOLD;

#[derive(Debug, Parser)]
#[command(
    name = "addrmatch",
    about = "Match free-form addresses against a catalog with an ESIM pair model"
)]
pub struct Cli {
    /// Run the model on CPU even when a GPU backend is compiled in
    #[arg(long, global = true)]
    pub cpu: bool,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP matching service
    Serve,
    /// Match one address, or read addresses from stdin when none is given
    Match {
        /// Address to match
        query: Option<String>,
        /// Print the N best candidates instead of only the winner
        #[arg(long)]
        top: Option<usize>,
    },
    /// Build the word → id dictionary from a word list
    BuildDict {
        /// One word per line
        input: PathBuf,
        #[arg(long, default_value = "data/dict/word_dict.json")]
        output: PathBuf,
    },
    /// Write the unique second-column addresses of a pair file as a catalog
    ExtractCatalog {
        /// Tab-separated `addr1 addr2 label` file
        input: PathBuf,
        output: PathBuf,
    },
    /// Convert a labelled pair file into id files for evaluation
    TokenizeDataset {
        /// Tab-separated `addr1 addr2 label` file
        input: PathBuf,
        output_dir: PathBuf,
    },
    /// Score a tokenized pair dataset and report precision, recall and F1
    Evaluate {
        /// Directory holding the tokenized id files and labels
        dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
        threshold: f32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Probe a running server's /healthz and exit non-zero when it is down
    HealthCheck,
}
