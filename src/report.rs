//! User-facing report stream: console, log file and webhook mirror.
//!
//! Every reported line goes to stdout, gets appended to the plaintext log
//! (when a writable location exists) and is mirrored to the log webhook
//! channel. Sink failures downgrade the stream, never the process.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::notify::Notifier;

/// File name used at fallback locations.
const FALLBACK_FILE: &str = "arbitrage_log.txt";

/// Report sink fan-out with a self-disabling file leg.
pub struct Reporter {
    file: Mutex<Option<PathBuf>>,
    notifier: Option<Arc<Notifier>>,
}

impl Reporter {
    /// Bootstrap a reporter against the configured log path, walking the
    /// fallback chain (home, desktop, temp dir, current dir) when the
    /// primary location is unwritable.
    pub fn new(primary: &str, notifier: Option<Arc<Notifier>>) -> Self {
        let path = bootstrap(Path::new(primary), &standard_fallbacks());
        if path.is_none() {
            warn!("All log file locations failed; file logging disabled");
        }
        Self {
            file: Mutex::new(path),
            notifier,
        }
    }

    /// Bootstrap against an explicit candidate chain (used by tests).
    pub fn with_candidates(
        primary: &Path,
        fallbacks: &[PathBuf],
        notifier: Option<Arc<Notifier>>,
    ) -> Self {
        Self {
            file: Mutex::new(bootstrap(primary, fallbacks)),
            notifier,
        }
    }

    /// Console-only reporter.
    pub fn console_only() -> Self {
        Self {
            file: Mutex::new(None),
            notifier: None,
        }
    }

    /// Path of the active log file, if file logging survived bootstrap.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.file.lock().unwrap().clone()
    }

    /// Report one line to every active sink.
    pub async fn line(&self, message: &str) {
        println!("{}", message);
        self.append(message);
        if let Some(notifier) = &self.notifier {
            notifier.notify_log(message).await;
        }
    }

    fn append(&self, message: &str) {
        let mut guard = self.file.lock().unwrap();
        let Some(path) = guard.as_ref() else {
            return;
        };

        let result = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .and_then(|mut f| {
                writeln!(f, "{}", message)?;
                f.flush()
            });

        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Log write failed; disabling file logging");
            *guard = None;
        }
    }
}

/// Probe-write the first writable candidate and return it.
fn bootstrap(primary: &Path, fallbacks: &[PathBuf]) -> Option<PathBuf> {
    match probe(primary) {
        Ok(()) => return Some(primary.to_path_buf()),
        Err(e) => {
            warn!(path = %primary.display(), error = %e, "Primary log location unwritable");
        }
    }

    for candidate in fallbacks {
        match probe(candidate) {
            Ok(()) => {
                warn!(path = %candidate.display(), "Using fallback log file");
                return Some(candidate.clone());
            }
            Err(e) => {
                warn!(path = %candidate.display(), error = %e, "Fallback log location failed");
            }
        }
    }

    None
}

/// Append a timestamped probe line, creating parent directories as needed.
fn probe(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    writeln!(
        file,
        "# Log file test - {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    file.sync_all()
}

/// Preference order: home, desktop, temp dir, current dir.
fn standard_fallbacks() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(FALLBACK_FILE));
    }
    if let Some(desktop) = dirs::desktop_dir() {
        candidates.push(desktop.join(FALLBACK_FILE));
    }
    candidates.push(std::env::temp_dir().join(FALLBACK_FILE));
    candidates.push(PathBuf::from("arbitrage_log_fallback.txt"));
    candidates
}
