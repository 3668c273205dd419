//! notify-backed watch service.
//!
//! Each registered file is watched through its parent directory (non-recursive), so
//! editors that save by writing a temp file and renaming it over the original still
//! produce events. Raw events go through `notify-debouncer-full`, which holds them
//! until the path has been quiet for the debounce window, so the last change in a
//! burst always fires. Debounced events are matched against the registered files
//! and forwarded on a channel.

use super::{Invalidation, WatchError, WatchEvent, WatchService};
use notify::{EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{DebounceEventResult, Debouncer, RecommendedCache, new_debouncer};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

type Targets = Arc<Mutex<HashMap<PathBuf, Vec<Invalidation>>>>;

/// Watch service backed by the platform's recommended notify watcher.
pub struct NotifyWatchService {
    debouncer: Mutex<Debouncer<RecommendedWatcher, RecommendedCache>>,
    targets: Targets,
    watched_dirs: Mutex<HashSet<PathBuf>>,
    registrations: AtomicUsize,
}

impl NotifyWatchService {
    /// Create a new watch service.
    ///
    /// # Arguments
    ///
    /// * `debounce` - Quiet period after the last change to a path before it fires
    ///
    /// # Returns
    ///
    /// Tuple of (service, receiver for fired watches)
    pub fn new(debounce: Duration) -> Result<(Self, mpsc::Receiver<WatchEvent>), WatchError> {
        let (tx, rx) = mpsc::channel(100);
        let targets: Targets = Arc::default();
        let handler_targets = Arc::clone(&targets);

        let debouncer = new_debouncer(
            debounce.max(Duration::from_millis(1)),
            None,
            move |result: DebounceEventResult| {
                let events = match result {
                    Ok(events) => events,
                    Err(errors) => {
                        for err in errors {
                            tracing::warn!(error = %err, "file watcher error");
                        }
                        return;
                    }
                };

                // one watch event per (file, invalidation) per batch
                let mut fired: Vec<WatchEvent> = Vec::new();
                for event in &events {
                    if !matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        continue;
                    }

                    for path in &event.paths {
                        let Some(invalidations) = handler_targets.lock().get(path).cloned()
                        else {
                            continue;
                        };
                        for invalidation in invalidations {
                            let watch_event = WatchEvent {
                                path: path.clone(),
                                invalidation,
                            };
                            if !fired.contains(&watch_event) {
                                fired.push(watch_event);
                            }
                        }
                    }
                }

                for event in fired {
                    // receiver gone means the server is shutting down
                    if tx.blocking_send(event).is_err() {
                        return;
                    }
                }
            },
        )?;

        Ok((
            Self {
                debouncer: Mutex::new(debouncer),
                targets,
                watched_dirs: Mutex::new(HashSet::new()),
                registrations: AtomicUsize::new(0),
            },
            rx,
        ))
    }

    /// Total number of `watch` calls, including repeats for the same path.
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::Relaxed)
    }

    /// Number of distinct files being watched.
    pub fn watched_files(&self) -> usize {
        self.targets.lock().len()
    }
}

impl WatchService for NotifyWatchService {
    fn watch(&self, path: &Path, invalidation: Invalidation) -> Result<(), WatchError> {
        self.registrations.fetch_add(1, Ordering::Relaxed);

        let file = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| WatchError::NoParent(file.clone()))?;

        {
            let mut dirs = self.watched_dirs.lock();
            if !dirs.contains(&dir) {
                self.debouncer
                    .lock()
                    .watch(&dir, RecursiveMode::NonRecursive)?;
                dirs.insert(dir);
            }
        }

        let mut targets = self.targets.lock();
        let registered = targets.entry(file.clone()).or_default();
        if registered.contains(&invalidation) {
            tracing::trace!(path = %file.display(), ?invalidation, "watch already registered");
        } else {
            tracing::debug!(path = %file.display(), ?invalidation, "watching");
            registered.push(invalidation);
        }

        Ok(())
    }
}

impl std::fmt::Debug for NotifyWatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyWatchService")
            .field("watched_dirs", &self.watched_dirs.lock().len())
            .field("watched_files", &self.watched_files())
            .field("registrations", &self.registrations())
            .finish()
    }
}
