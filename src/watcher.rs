// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! File system watcher for the receipt inbox

use notify::event::CreateKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::Result;

/// Events emitted by the watcher
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// A new file appeared
    FileCreated(PathBuf),
    /// Watcher error
    Error(String),
    /// The notify backend dropped its channel; no further events will arrive
    Disconnected,
}

/// File system watcher
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    event_rx: Receiver<notify::Result<Event>>,
}

impl FileWatcher {
    /// Create a new file watcher
    pub fn new() -> Result<Self> {
        let (tx, rx) = channel();

        let config = Config::default()
            .with_poll_interval(Duration::from_secs(2));

        let watcher = RecommendedWatcher::new(tx, config)?;

        Ok(Self {
            watcher,
            event_rx: rx,
        })
    }

    /// Watch a directory (non-recursively), creating it if missing
    pub fn watch(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::create_dir_all(path)?;
            info!("Created watch directory: {:?}", path);
        }

        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        info!("Watching: {:?}", path);

        Ok(())
    }

    /// Get the next event (blocking with timeout)
    pub fn next_event(&self, timeout: Duration) -> Option<WatchEvent> {
        receive(&self.event_rx, timeout)
    }
}

fn receive(rx: &Receiver<notify::Result<Event>>, timeout: Duration) -> Option<WatchEvent> {
    match rx.recv_timeout(timeout) {
        Ok(Ok(event)) => convert_event(event),
        Ok(Err(e)) => Some(WatchEvent::Error(e.to_string())),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(WatchEvent::Disconnected),
    }
}

/// Keep file creations, drop everything else including new directories
pub fn convert_event(event: Event) -> Option<WatchEvent> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => None,
        EventKind::Create(_) => event.paths.first().map(|p| WatchEvent::FileCreated(p.clone())),
        _ => None,
    }
}

/// Check if a path names a PDF receipt worth processing
pub fn is_receipt(path: &Path) -> bool {
    let filename = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };

    // Skip hidden files and cloud-sync placeholders
    if filename.starts_with('.') || filename.starts_with("~$") {
        return false;
    }

    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Wait for file to be stable (not being written)
pub async fn wait_for_stable(path: &Path, max_wait: Duration) -> bool {
    let check_interval = Duration::from_millis(500);
    let start = std::time::Instant::now();

    let mut last_size = match std::fs::metadata(path) {
        Ok(m) => m.len(),
        Err(_) => return false,
    };

    loop {
        tokio::time::sleep(check_interval).await;

        if start.elapsed() > max_wait {
            warn!("File stability check timed out for {:?}", path);
            return true; // Proceed anyway
        }

        let current_size = match std::fs::metadata(path) {
            Ok(m) => m.len(),
            Err(_) => return false, // File was deleted
        };

        if current_size == last_size {
            return true;
        }

        last_size = current_size;
        debug!("File {:?} still being written, size: {}", path, current_size);
    }
}

/// Let a freshly created file settle before it is read
///
/// Sleeps the fixed delay, then waits for a stable size. Returns `false` if
/// the path disappeared or is not a regular file.
pub async fn settle(path: &Path, delay: Duration, max_wait: Duration) -> bool {
    if !delay.is_zero() {
        debug!("Waiting {:?} for {:?} to finish syncing", delay, path);
        tokio::time::sleep(delay).await;
    }

    match std::fs::metadata(path) {
        Ok(m) if m.is_file() => wait_for_stable(path, max_wait).await,
        Ok(_) => {
            debug!("Ignoring non-file path: {:?}", path);
            false
        }
        Err(_) => {
            debug!("File disappeared before processing: {:?}", path);
            false
        }
    }
}
