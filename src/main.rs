//! Replay Events CLI
//!
//! Parses one or more decoder event streams. Each input runs on its own
//! blocking worker with its own engine.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use replay_events::{run_parse, ParseSummary, StorageConfig, VERSION};

/// Extract game events from decoded replay streams.
#[derive(Debug, Parser)]
#[command(name = "replay-events", version, about)]
struct Args {
    /// Decoder event streams (JSON lines); `-` reads stdin.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Write `<input>.jsonl` files here instead of stdout.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Match id to store rows under; overrides MATCH_ID.
    #[arg(long)]
    match_id: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the entries, logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = StorageConfig::from_env().with_match_id(args.match_id);
    info!(version = VERSION, inputs = args.inputs.len(), storage = config.enabled, "replay-events starting");

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let total = args.inputs.len();
    let mut workers = Vec::with_capacity(total);
    for input in args.inputs {
        let config = config.clone();
        let output_dir = args.output_dir.clone();
        let name = input.clone();
        let handle = tokio::task::spawn_blocking(move || parse_one(&input, output_dir.as_deref(), &config));
        workers.push((name, handle));
    }

    let mut failed = 0;
    for (input, handle) in workers {
        if let Err(e) = handle.await? {
            error!(input = %input, error = %e, "parse failed");
            failed += 1;
        }
    }
    if failed > 0 {
        anyhow::bail!("{} of {} replays failed", failed, total);
    }
    Ok(())
}

fn parse_one(input: &str, output_dir: Option<&Path>, config: &StorageConfig) -> anyhow::Result<ParseSummary> {
    let started = Instant::now();
    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(input).with_context(|| format!("opening {}", input))?;
        Box::new(BufReader::new(file))
    };

    let summary = match output_dir {
        Some(dir) => {
            let path = dir.join(output_name(input));
            let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            run_parse(reader, BufWriter::new(file), config)?
        }
        // the lock is held for the whole parse so streams never interleave
        None => run_parse(reader, BufWriter::new(io::stdout().lock()), config)?,
    };

    info!(
        input,
        events = summary.events,
        lines = summary.lines,
        skipped = summary.skipped,
        epoch = ?summary.epoch,
        elapsed_ms = started.elapsed().as_millis() as u64,
        digest = %summary.digest_hex(),
        "replay parsed"
    );
    Ok(summary)
}

fn output_name(input: &str) -> String {
    let stem = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| *s != "-")
        .unwrap_or("stdin");
    format!("{}.jsonl", stem)
}
