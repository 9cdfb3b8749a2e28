use clap::Parser;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SECONDS: u32 = 10;

/// Replay the island scene headlessly and log element transforms.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Scene seed for the ambient loop random streams
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Seconds of scene time to replay
    #[arg(long, default_value_t = DEFAULT_SECONDS)]
    pub seconds: u32,
}
