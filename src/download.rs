//! Background page download: streams a URL to a file with percentage progress.
//!
//! One spawned thread per download. Events arrive on a channel the caller
//! polls: zero or more `Progress` values (monotonically non-decreasing), then
//! exactly one terminal `Completed` or `Failed`. Failures are delivered as
//! events, never swallowed into a log line. Cancellation is cooperative and
//! terminates with `Failed(DownloadError::Cancelled)`; partial files are
//! removed on any failed outcome.

use std::fmt;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::net;

const CHUNK_SIZE: usize = 8 * 1024;
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Network or file failure during a page download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// Request could not be built, sent, or read.
    Request(String),
    /// Server answered with a non-success status.
    HttpStatus(u16),
    /// Destination file could not be written.
    File { path: PathBuf, message: String },
    Cancelled,
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::Request(message) => write!(f, "download request failed: {}", message),
            DownloadError::HttpStatus(status) => write!(f, "download got HTTP {}", status),
            DownloadError::File { path, message } => {
                write!(f, "cannot write {}: {}", path.display(), message)
            }
            DownloadError::Cancelled => write!(f, "download cancelled"),
        }
    }
}

impl std::error::Error for DownloadError {}

/// Notification from a running download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Percentage written so far, 0..=100, never decreasing.
    Progress(u8),
    Completed { bytes_written: u64 },
    Failed(DownloadError),
}

/// Handle to a download running on a background thread.
///
/// Dropping the handle does not cancel the transfer; call [`DownloadTask::cancel`].
pub struct DownloadTask {
    events: mpsc::Receiver<DownloadEvent>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DownloadTask {
    /// Start streaming `url` to `dest`.
    pub fn spawn(url: &str, dest: &Path) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let url = url.to_string();
        let dest = dest.to_path_buf();

        let handle = thread::spawn(move || {
            let terminal = match run(&url, &dest, &flag, &tx) {
                Ok(bytes_written) => DownloadEvent::Completed { bytes_written },
                Err(error) => {
                    let _ = fs::remove_file(&dest);
                    DownloadEvent::Failed(error)
                }
            };
            let _ = tx.send(terminal);
        });

        Self {
            events: rx,
            cancel,
            handle: Some(handle),
        }
    }

    /// Request cancellation. The task notices at the next chunk boundary.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Non-blocking poll for the next event, for use from a UI loop.
    pub fn poll(&self) -> Option<DownloadEvent> {
        self.events.try_recv().ok()
    }

    /// Block until the terminal event, forwarding progress to `on_progress`.
    pub fn wait(mut self, mut on_progress: impl FnMut(u8)) -> Result<u64, DownloadError> {
        let mut outcome = Err(DownloadError::Request(
            "download thread exited without reporting".to_string(),
        ));
        while let Ok(event) = self.events.recv() {
            match event {
                DownloadEvent::Progress(pct) => on_progress(pct),
                DownloadEvent::Completed { bytes_written } => {
                    outcome = Ok(bytes_written);
                    break;
                }
                DownloadEvent::Failed(error) => {
                    outcome = Err(error);
                    break;
                }
            }
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        outcome
    }
}

fn run(
    url: &str,
    dest: &Path,
    cancel: &AtomicBool,
    events: &mpsc::Sender<DownloadEvent>,
) -> Result<u64, DownloadError> {
    let client = net::http_client(DOWNLOAD_TIMEOUT)
        .map_err(|e| DownloadError::Request(e.to_string()))?;
    let mut response = client
        .get(net::normalize_url(url))
        .send()
        .map_err(|e| DownloadError::Request(e.to_string()))?;

    if !response.status().is_success() {
        return Err(DownloadError::HttpStatus(response.status().as_u16()));
    }

    let total = response.content_length().filter(|&n| n > 0);
    let mut file = File::create(dest).map_err(|e| DownloadError::File {
        path: dest.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut buf = [0_u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    let mut last_pct: u8 = 0;

    loop {
        if cancel.load(Ordering::Relaxed) {
            return Err(DownloadError::Cancelled);
        }
        let n = response
            .read(&mut buf)
            .map_err(|e| DownloadError::Request(e.to_string()))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(|e| DownloadError::File {
            path: dest.to_path_buf(),
            message: e.to_string(),
        })?;
        written += n as u64;

        // With an unknown length the only percentage is the final 100.
        if let Some(total) = total {
            let pct = ((written.min(total) * 100) / total) as u8;
            if pct > last_pct {
                last_pct = pct;
                let _ = events.send(DownloadEvent::Progress(pct));
            }
        }
    }

    file.flush().map_err(|e| DownloadError::File {
        path: dest.to_path_buf(),
        message: e.to_string(),
    })?;
    if last_pct < 100 {
        let _ = events.send(DownloadEvent::Progress(100));
    }
    log::debug!("downloaded {} bytes from {}", written, url);
    Ok(written)
}
