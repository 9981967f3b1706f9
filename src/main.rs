use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};

use lrcfetch::config::FetcherConfig;
use lrcfetch::data::FetchStats;
use lrcfetch::library::{fetch_library, RunOptions};
use lrcfetch::logging::initialize_logging;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Fetch synced lyrics from LRCLIB and store them as .lrc files next to your music",
    long_about = None
)]
struct Args {
    /// Root directory for music files
    #[clap(short = 'i', long = "input", value_name = "DIR")]
    music_dir: PathBuf,

    /// Enable debug logging
    #[clap(short = 'd', long)]
    debug: bool,

    /// JSON configuration file
    #[clap(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Lyrics lookup endpoint
    #[clap(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[clap(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Lookup attempts per file
    #[clap(long, value_name = "N")]
    retries: Option<usize>,

    /// Read tags only, do not fetch or write lyrics
    #[clap(long)]
    dry_run: bool,
}

fn load_config(args: &Args) -> FetcherConfig {
    let mut config = match &args.config {
        Some(path) => match FetcherConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => FetcherConfig::default(),
    };

    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(retries) = args.retries {
        config.max_attempts = retries;
    }
    config
}

fn main() {
    let args = Args::parse();
    let config = load_config(&args);

    if let Err(e) = initialize_logging(&config.logging, args.debug) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    // Set up a shared flag for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        warn!("Received Ctrl+C, stopping after the current file");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl+C handler: {}", e);
    }

    let options = RunOptions {
        dry_run: args.dry_run,
        running: Some(running),
    };

    match fetch_library(&config, &args.music_dir, &options) {
        Ok(stats) => {
            // Directories are not part of files_skipped
            info!("Finished music lyrics fetcher: {}", stats);
        }
        Err(e) => {
            error!("Failed to process music files: {}", e);
            info!("Finished music lyrics fetcher: {}", FetchStats::default());
            process::exit(1);
        }
    }
}
