//! CLI module for Vidquiz.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Vidquiz - Video to transcript, summary and quiz
///
/// Extracts the audio track of a local video or a streaming-site URL, transcribes it,
/// summarizes the transcript and derives a multiple-choice question from the summary.
#[derive(Parser, Debug)]
#[command(name = "vidquiz")]
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
    /// Initialize Vidquiz and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Process a video into a transcript, summary and quiz
    Process {
        /// Local video file path or http(s) URL
        input: String,

        /// Summary style (concise, detailed)
        #[arg(short, long, default_value = "concise")]
        style: String,

        /// Write the report to a file ("-" for stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Report format (text, markdown, json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Answer the quiz question in the terminal
        #[arg(short, long)]
        interactive: bool,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

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

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "summarization.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process() {
        let cli = Cli::parse_from([
            "vidquiz", "-vv", "process", "talk.mp4", "--style", "detailed", "--format", "json", "-i",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Process {
                input,
                style,
                format,
                interactive,
                output,
            } => {
                assert_eq!(input, "talk.mp4");
                assert_eq!(style, "detailed");
                assert_eq!(format, "json");
                assert!(interactive);
                assert!(output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::parse_from(["vidquiz", "config", "set", "server.port", "8080"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Set { .. }
            }
        ));
    }
}
