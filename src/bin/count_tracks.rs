//! count-tracks - replay recorded tracker output through the line counter

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use traffic_counter::{CounterConfig, CountingPipeline, ReplaySource};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Line and counter configuration (TOML).
    #[arg(long, env = "TRAFFIC_COUNTER_CONFIG")]
    config: PathBuf,
    /// Recorded tracks, one JSON object per frame.
    #[arg(long)]
    tracks: PathBuf,
    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = CounterConfig::load(&args.config)?;
    let file = File::open(&args.tracks)
        .with_context(|| format!("failed to open track log {}", args.tracks.display()))?;

    let mut pipeline = CountingPipeline::new(ReplaySource::new(BufReader::new(file)), &config);
    let report = pipeline.run()?;
    log::info!(
        "replayed {} frame(s), {} track(s) still in history",
        pipeline.history().frame(),
        pipeline.history().len()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
