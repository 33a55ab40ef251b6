use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use board_snap::clients::AnalysisClient;
use board_snap::clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
use board_snap::config::Config;
use board_snap::files::load_candidate;
use board_snap::render::ascii_board;
use board_snap::session::Session;
use snap_core::{Channel, IngestionRouter, MemoryPreviewStore, Phase, ViewState};

/// Read a chess position off a photo of a board
#[derive(Parser, Debug)]
#[command(name = "board-snap")]
#[command(version)]
struct Args {
    /// Images to analyse, one after another
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Analysis endpoint
    #[arg(long, env = "SNAP_API_URL")]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "SNAP_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Show the board from Black's side
    #[arg(long)]
    black: bool,

    /// Reject positions that are not legal game states
    #[arg(long)]
    strict: bool,

    /// Copy the last recognised position to the system clipboard
    #[arg(long)]
    copy: bool,

    /// Print the view state as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries results
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(url) = args.api_url {
        config.api_url = url;
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout = std::time::Duration::from_secs(secs);
    }
    if args.strict {
        config.strict_positions = true;
    }
    info!(endpoint = %config.api_url, timeout = ?config.timeout, "Config loaded");

    let client = AnalysisClient::new(&config).context("Failed to build analysis client")?;
    let router = IngestionRouter::new(config.upload_policy(), MemoryPreviewStore::new());
    let clipboard: Box<dyn ClipboardSink> = if args.copy {
        Box::new(SystemClipboard::new().context("Clipboard unavailable")?)
    } else {
        Box::new(MemoryClipboard::new())
    };

    let mut session = Session::new(client, router, clipboard)
        .with_position_policy(config.position_policy())
        .with_copy_window(config.copy_confirm);
    if args.black {
        session.toggle_orientation();
    }

    let mut failures = 0usize;
    for path in &args.images {
        let file = match load_candidate(path, Channel::Picker).await {
            Ok(file) => file,
            Err(e) => {
                error!(path = %path.display(), "Could not read image: {e}");
                failures += 1;
                continue;
            }
        };

        session.offer_files(vec![file], Channel::Picker);
        // Nothing draws the preview in a terminal; release it straight away.
        session.preview_rendered();
        session.settle().await;

        let view = session.view();
        if view.phase == Phase::Failed {
            failures += 1;
        }
        print_view(path, &view, args.json)?;
    }

    if args.copy {
        session.copy_position();
        if session.state().copy_confirmed {
            eprintln!("Position copied to clipboard.");
        }
    }

    session.shutdown();

    if failures > 0 {
        bail!("{failures} of {} images could not be analysed", args.images.len());
    }
    Ok(())
}

fn print_view(path: &Path, view: &ViewState, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    println!("{}", path.display());
    if let Some(message) = &view.error_message {
        println!("  Error: {message}");
        return Ok(());
    }

    if let Some(board) = &view.board {
        if let Some(diagram) = ascii_board(board) {
            println!("{diagram}");
        }
    }
    if let Some(position) = &view.position {
        println!("FEN:       {position}");
    }
    if let Some(links) = &view.links {
        println!("Lichess:   {}", links.editor);
        println!("Chess.com: {}", links.analysis);
    }
    if let Some(cropped) = &view.cropped_preview_url {
        println!("Cropped:   {cropped}");
    }
    Ok(())
}
