//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Reader for marker-delimited PHOSYS documents
#[derive(Parser, Debug)]
#[command(name = "phosys")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (replaces the global config file)
    #[arg(long, global = true, value_hint = ValueHint::FilePath, env = "PHOSYS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Parser overrides shared by the document commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ParseArgs {
    /// Require the top-level block to have this name
    #[arg(long, value_name = "NAME")]
    pub root: Option<String>,

    /// Count same-named blocks when looking for end markers
    #[arg(long)]
    pub nested: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a document and print its tree
    Parse {
        /// Document file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Print the value at Container/.../leaf
    Get {
        /// Document file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Slash-separated path, e.g. Meta/id
        path: String,
        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Report structural problems
    Check {
        /// Document file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Fail on warnings too
        #[arg(long)]
        strict: bool,
        #[command(flatten)]
        parse: ParseArgs,
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
        /// Create global config (default: `.phosys.toml` in the current directory)
        #[arg(short, long)]
        global: bool,
        /// Print the template instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// Show config paths
    Path,
}
