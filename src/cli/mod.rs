//! CLI module for studynotes.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{content_preview, Output};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Study Notes Summarizer & Quiz Generator
///
/// Extracts the text of PDF study notes and asks a language model for a
/// bullet-point summary or a multiple-choice quiz.
#[derive(Parser, Debug)]
#[command(name = "studynotes")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract and print the text of one or more PDF files
    Extract {
        /// PDF files, in the order their text should be concatenated
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the text to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a concise bullet-point summary of PDF files
    Summary {
        /// PDF files to summarize
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Generate a 5-question multiple-choice quiz from PDF files
    Quiz {
        /// PDF files to build the quiz from
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Start the local web app (upload page plus JSON API)
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration and the API credential
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the default config file
    Init,

    /// Show configuration file path
    Path,
}

/// Log level for `verbose` repetitions of `-v`, or `configured` without any.
pub fn log_level(verbose: u8, configured: &str) -> &str {
    match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_files_in_order() {
        let cli = Cli::parse_from(["studynotes", "summary", "b.pdf", "a.pdf"]);
        match cli.command {
            Commands::Summary { files } => {
                assert_eq!(files, vec![PathBuf::from("b.pdf"), PathBuf::from("a.pdf")]);
            }
            other => panic!("Expected Summary, got {:?}", other),
        }
    }

    #[test]
    fn test_quiz_requires_files() {
        assert!(Cli::try_parse_from(["studynotes", "quiz"]).is_err());
    }

    #[test]
    fn test_log_level_falls_back_to_config() {
        assert_eq!(log_level(0, "error"), "error");
        assert_eq!(log_level(1, "error"), "info");
        assert_eq!(log_level(5, "error"), "trace");
    }

    #[test]
    fn test_global_verbose() {
        let cli = Cli::parse_from(["studynotes", "serve", "-vv", "--port", "9000"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000), .. }));
    }
}
