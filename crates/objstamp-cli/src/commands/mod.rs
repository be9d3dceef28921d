//! CLI command implementations

pub mod resolve;
pub mod serve;

/// Output format for commands that print results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
