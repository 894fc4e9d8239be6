use clap::{Parser, Subcommand};

use crate::level::Severity;

#[derive(Debug, Parser)]
#[command(name = "evhook", about = "Write log records to the Windows Event Log")]
pub struct Args {
    /// Pass multiple times to increase the level of verbosity (overwritten by EVHOOK_LOG)
    #[arg(
        name = "verbose",
        long = "verbose",
        short = 'v',
        action = clap::ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    /// Default filter for the diagnostic logger.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register an event source
    Install(SourceArgs),

    /// Remove an event source registration
    Remove(SourceArgs),

    /// Write a single record through an event hook
    Write(WriteArgs),
}

#[derive(Debug, Parser)]
pub struct SourceArgs {
    /// The event source name
    #[arg(short, long, env = "EVHOOK_SOURCE")]
    pub source: String,
}

#[derive(Debug, Parser)]
pub struct WriteArgs {
    /// The event source name
    #[arg(short, long, env = "EVHOOK_SOURCE")]
    pub source: String,

    /// Severity of the record
    #[arg(short, long, default_value = "info")]
    pub level: Severity,

    /// Event id, passed through the `event_id` field
    #[arg(long)]
    pub event_id: Option<String>,

    /// Extra fields, as KEY=VALUE
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Leave the source registered after writing
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub keep_source: bool,

    /// Write to an in-memory event log and print the result instead
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub dry_run: bool,

    /// The message to write
    #[arg(name = "MESSAGE")]
    pub message: String,
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid field {:?}, expected KEY=VALUE", s)),
    }
}
