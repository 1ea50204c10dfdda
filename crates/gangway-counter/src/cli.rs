use clap::Parser;

/// Gangway counter demo: a keypress tally mirrored over the host/view
/// message bridge.
#[derive(Parser, Debug)]
#[command(name = "gangway-counter", version, about)]
pub struct Args {
    /// Run the counter without a host bridge (unembedded page mode).
    #[arg(long)]
    pub detached: bool,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
