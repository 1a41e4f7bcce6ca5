mod catalog_watcher;
mod cli;
mod render;

use crate::catalog_watcher::watch_catalog;
use crate::cli::{Cli, Command};
use crate::render::{format_frame, AtReport, InspectReport};
use clap::Parser;
use stanzaline_core::time::clock_secs;
use stanzaline_core::{
    catalog_path, Catalog, CoreError, DurationExt, FileTranscriptSource, SimulatedClock,
    StanzalineConfig, SyncEngine, SyncEvent, Track, TrackId, TranscriptLoader, TranscriptSource,
    TranscriptSourceType,
};
use stanzaline_transcript_http::HttpTranscriptSource;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(StanzalineConfig::config_path);

    // Check config for logging.enabled before full config load
    init_tracing(check_file_logging_enabled(&config_path));

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Load config, creating the template on first run and continuing with defaults
fn load_config(path: &Path) -> Result<StanzalineConfig, CoreError> {
    match StanzalineConfig::load_or_create_at(path) {
        Err(CoreError::ConfigNotFound { path }) => {
            info!(
                "Created config template at {}, continuing with defaults",
                path.display()
            );
            Ok(StanzalineConfig::default())
        }
        other => other,
    }
}

async fn run(cli: Cli, config: StanzalineConfig) -> Result<(), CliError> {
    let transcripts_dir = cli
        .transcripts
        .unwrap_or_else(|| config.transcripts.dir());
    let catalog_file = catalog_path(&transcripts_dir);
    let loader = TranscriptLoader::new(create_sources(&config, &transcripts_dir));

    match cli.command {
        Command::List => list(&loader, &catalog_file).await,
        Command::Inspect { track, json } => {
            let track = load_track(&loader, &catalog_file, &track).await?;
            let report = InspectReport::new(&track);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.to_text());
            }
            Ok(())
        }
        Command::At {
            track,
            seconds,
            json,
        } => {
            let track = load_track(&loader, &catalog_file, &track).await?;
            let report = AtReport::new(&track, clock_secs(seconds).as_millis_u64());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.to_text());
            }
            Ok(())
        }
        Command::Play { track, from } => {
            play(&config, &loader, &transcripts_dir, &track, from).await
        }
    }
}

/// Create transcript sources in configured priority order
fn create_sources(
    config: &StanzalineConfig,
    transcripts_dir: &Path,
) -> Vec<Box<dyn TranscriptSource>> {
    let mut sources: Vec<Box<dyn TranscriptSource>> = Vec::new();

    for source_type in &config.transcripts.sources {
        match source_type {
            TranscriptSourceType::File => {
                sources.push(Box::new(FileTranscriptSource::new(transcripts_dir)));
            }
            TranscriptSourceType::Http => {
                let Some(base_url) = config.transcripts.remote_base_url() else {
                    warn!("HTTP source enabled without transcripts.remote_base_url, skipping");
                    continue;
                };
                match HttpTranscriptSource::new(base_url) {
                    Ok(source) => sources.push(Box::new(source)),
                    Err(e) => warn!("Failed to create HTTP transcript source: {}", e),
                }
            }
        }
    }

    sources
}

async fn load_track(
    loader: &TranscriptLoader,
    catalog_file: &Path,
    id: &str,
) -> Result<Track, CoreError> {
    let catalog = Catalog::load(catalog_file).await?;
    let entry = catalog
        .get(&TrackId::from(id))
        .ok_or_else(|| CoreError::UnknownTrack {
            track_id: id.to_string(),
        })?;
    loader.load_track(entry).await
}

async fn list(loader: &TranscriptLoader, catalog_file: &Path) -> Result<(), CliError> {
    let (catalog, registry) = loader.load_catalog_file(catalog_file).await?;

    if catalog.is_empty() {
        println!("No tracks in {}", catalog_file.display());
        return Ok(());
    }

    for entry in &catalog.tracks {
        match registry.get(&entry.id) {
            Some(track) => println!(
                "{:<24} {:<32} {:>6} bpm  {:>3} stanzas  {} timing",
                entry.id,
                entry.display_title(),
                entry.bpm,
                track.stanza_index.len(),
                track.timing_quality()
            ),
            None => println!(
                "{:<24} {:<32} {:>6} bpm  unavailable",
                entry.id,
                entry.display_title(),
                entry.bpm
            ),
        }
    }
    Ok(())
}

async fn play(
    config: &StanzalineConfig,
    loader: &TranscriptLoader,
    transcripts_dir: &Path,
    id: &str,
    from: f64,
) -> Result<(), CliError> {
    let catalog_file = catalog_path(transcripts_dir);
    let track = Arc::new(load_track(loader, &catalog_file, id).await?);

    if track.word_map.is_empty() {
        warn!("Track {} has no words to play", track.id);
        return Ok(());
    }

    let sync_engine = SyncEngine::with_seek_threshold(config.playback.seek_threshold());

    // Create shared cancellation token for graceful shutdown
    let cancel_token = CancellationToken::new();

    // Set up Ctrl+C handler to trigger graceful shutdown
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    // Subscribe before the first event is emitted
    let renderer = tokio::spawn(render_events(
        Arc::clone(&sync_engine),
        sync_engine.subscribe(),
        cancel_token.clone(),
    ));
    let event_log = tokio::spawn(log_sync_events(sync_engine.subscribe()));

    sync_engine.display_track(Arc::clone(&track)).await;

    let clock = Arc::new(SimulatedClock::new(
        Arc::clone(&sync_engine),
        track.id.clone(),
        std::time::Duration::from_millis(track.end_ms()),
        config.playback.tick_interval(),
        Some(cancel_token.clone()),
    ));
    clock.seek(clock_secs(from)).await;
    clock.play().await;
    let clock_task = Arc::clone(&clock).start();

    let (mut changed_rx, watcher) = spawn_reload_watcher(
        config.watch.enabled,
        transcripts_dir.to_path_buf(),
        cancel_token.clone(),
    );

    let mut poll = tokio::time::interval(config.playback.tick_interval());
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => break,
            Some(()) = changed_rx.recv() => {
                reload_track(loader, &catalog_file, &track.id, &sync_engine).await;
            }
            _ = poll.tick() => {
                if !clock.is_playing().await {
                    info!("Finished playing {}", track.id);
                    break;
                }
            }
        }
    }

    cancel_token.cancel();
    let _ = clock_task.await;
    let _ = renderer.await;
    event_log.abort();

    if let Some(watcher) = watcher {
        let _ = watcher.await;
    }

    Ok(())
}

/// Start hot reload for the transcripts directory.
///
/// Reloading is best effort: if the watcher cannot start, a warning is logged
/// and the returned channel closes while playback carries on.
fn spawn_reload_watcher(
    enabled: bool,
    dir: PathBuf,
    cancel_token: CancellationToken,
) -> (mpsc::Receiver<()>, Option<JoinHandle<()>>) {
    let (changed_tx, changed_rx) = mpsc::channel(4);
    if !enabled {
        return (changed_rx, None);
    }

    let watcher = tokio::spawn(async move {
        if let Err(e) = watch_catalog(dir.clone(), changed_tx, cancel_token).await {
            warn!("Hot reload disabled for {}: {}", dir.display(), e);
        }
    });
    (changed_rx, Some(watcher))
}

async fn reload_track(
    loader: &TranscriptLoader,
    catalog_file: &Path,
    id: &TrackId,
    sync_engine: &SyncEngine,
) {
    info!("Catalog changed, reloading {}", id);
    match load_track(loader, catalog_file, id.as_str()).await {
        Ok(track) => sync_engine.display_track(Arc::new(track)).await,
        Err(e) => {
            warn!("Keeping previous lyrics for {}: {}", id, e);
            sync_engine.emit_error(e.to_string());
        }
    }
}

/// Print the stanza holding the active word whenever it changes
async fn render_events(
    sync_engine: Arc<SyncEngine>,
    mut rx: broadcast::Receiver<SyncEvent>,
    cancel_token: CancellationToken,
) {
    let mut displayed: Option<Arc<Track>> = None;

    loop {
        let event = tokio::select! {
            () = cancel_token.cancelled() => break,
            event = rx.recv() => event,
        };

        match event {
            Ok(SyncEvent::TrackDisplayed { track }) => {
                println!(
                    "\n{} ({} bpm, {} timing)",
                    track.title,
                    track.bpm,
                    track.timing_quality()
                );
                displayed = Some(track);
            }
            Ok(SyncEvent::TrackCleared) => displayed = None,
            Ok(SyncEvent::ScrollToStanza { stanza }) => {
                println!("\n-- stanza {stanza} --");
            }
            Ok(SyncEvent::ActiveWordChanged { word: Some(word) }) => {
                let Some(track) = displayed.as_ref() else {
                    continue;
                };
                let current_ms = sync_engine.current_position().await.as_millis_u64();
                if let Some(frame) = format_frame(track, word, current_ms) {
                    print!("{frame}");
                }
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("Renderer skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn log_sync_events(mut rx: broadcast::Receiver<SyncEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match &event {
                SyncEvent::PlaybackStarted { track_id, position } => {
                    info!("Playback started: {} (at {:?})", track_id, position);
                }
                SyncEvent::PlaybackPaused { position } => {
                    info!("Playback paused at {:?}", position);
                }
                SyncEvent::PlaybackResumed { position } => {
                    info!("Playback resumed at {:?}", position);
                }
                SyncEvent::PlaybackStopped => {
                    info!("Playback stopped");
                }
                SyncEvent::TrackChanged { track_id, position } => {
                    info!("Track changed: {} (at {:?})", track_id, position);
                }
                SyncEvent::SeekOccurred { position } => {
                    info!("Seek to {:?}", position);
                }
                SyncEvent::TrackDisplayed { track } => {
                    info!(
                        "Displaying {} ({} stanzas, {} words)",
                        track.id,
                        track.stanza_index.len(),
                        track.word_map.len()
                    );
                }
                SyncEvent::TrackCleared => {
                    info!("Lyrics cleared");
                }
                SyncEvent::ActiveStanzaChanged { stanza } => {
                    debug!("Active stanza: {:?}", stanza);
                }
                SyncEvent::PositionSync { .. }
                | SyncEvent::ActiveWordChanged { .. }
                | SyncEvent::ScrollToStanza { .. } => {}
                SyncEvent::Error { message } => {
                    error!("Sync error: {}", message);
                }
            },
            Err(broadcast::error::RecvError::Closed) => {
                break;
            }
            Err(broadcast::error::RecvError::Lagged(_)) => {
                // Missed some events, continue
            }
        }
    }
}

/// Check if file logging is enabled by reading just the logging section
fn check_file_logging_enabled(config_path: &Path) -> bool {
    // Minimal structs to parse just the logging.enabled field
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let Ok(content) = std::fs::read_to_string(config_path) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with stderr output and optional file logging
fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest_retry=warn"));

    // Logs go to stderr so command output stays clean on stdout
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path: PathBuf = stanzaline_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
