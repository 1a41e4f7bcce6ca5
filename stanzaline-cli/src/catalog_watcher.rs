//! Catalog and transcript hot-reload.
//!
//! Watches the transcripts directory and forwards a notification whenever the
//! catalog or a transcript file changes, so the player can reload the track
//! it is showing.

use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc as tokio_mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Errors that can occur while watching the catalog
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Failed to initialize file watcher: {0}")]
    WatcherError(#[from] notify_debouncer_mini::notify::Error),
}

/// Debounce window for rapid successive saves
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Whether a changed path can affect loaded tracks
#[must_use]
pub fn is_relevant(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("toml"))
}

/// Watch `dir` until cancelled, sending one `()` per debounced batch of
/// relevant changes.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created or the directory cannot be watched.
pub async fn watch_catalog(
    dir: PathBuf,
    changed_tx: tokio_mpsc::Sender<()>,
    cancel_token: CancellationToken,
) -> Result<(), WatchError> {
    // Using Arc to share the sender with the watcher thread
    let (tx, mut rx) = tokio_mpsc::channel::<()>(16);
    let tx = Arc::new(tx);

    let tx_clone = Arc::clone(&tx);
    let mut debouncer = new_debouncer(DEBOUNCE, move |res: DebounceEventResult| match res {
        Ok(events) => {
            if events.iter().any(|event| is_relevant(&event.path)) {
                // blocking_send since we're in a sync callback
                let _ = tx_clone.blocking_send(());
            }
        }
        Err(e) => error!("Catalog watch error: {}", e),
    })?;

    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)?;

    info!("Watching {} for catalog changes", dir.display());

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!("Catalog watcher shutting down");
                break;
            }
            Some(()) = rx.recv() => {
                debug!("Catalog directory changed");
                if changed_tx.send(()).await.is_err() {
                    break;
                }
            }
        }
    }

    // Keep debouncer alive until we exit the loop
    drop(debouncer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(Path::new("/x/catalog.toml")));
        assert!(is_relevant(Path::new("/x/song.JSON")));
        assert!(!is_relevant(Path::new("/x/.song.json.swp")));
        assert!(!is_relevant(Path::new("/x/notes")));
    }

    #[tokio::test]
    async fn test_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = tokio_mpsc::channel(1);
        let token = CancellationToken::new();
        token.cancel();

        watch_catalog(dir.path().to_path_buf(), tx, token)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = tokio_mpsc::channel(1);
        let result = watch_catalog(dir.path().join("missing"), tx, CancellationToken::new()).await;
        assert!(result.is_err());
    }
}
