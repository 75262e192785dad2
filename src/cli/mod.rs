use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI inputs and exit
    #[arg(long)]
    pub list: bool,

    /// Settings file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Poll interval in milliseconds, overriding the settings file
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many polls
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Also log to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn validate_interval(interval_ms: u64) -> Result<u64, String> {
    if interval_ms == 0 {
        return Err("Error: --interval-ms must be at least 1".to_string());
    }
    Ok(interval_ms)
}
