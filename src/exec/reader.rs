// src/exec/reader.rs

//! Background readers that keep a child's pipes drained.
//!
//! A launched process writes output whether or not a step is currently
//! waiting on it, so each pipe gets its own Tokio task that reads until EOF.
//! Lines are decoded lossily; invalid UTF-8 never stops a reader.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, debug, info, warn};

use crate::types::Stream;

/// Spawn a reader that forwards every stdout line into a channel.
///
/// The channel is unbounded: the reader never waits for a consumer, so the
/// child never blocks on a full pipe. The channel closes at EOF.
pub fn spawn_stdout_reader<R>(
    name: String,
    stdout: R,
    log: &Dispatch,
) -> mpsc::UnboundedReceiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(
        async move {
            read_lines(&name, Stream::Stdout, stdout, |line| {
                // The receiver is gone once the process was stopped; keep
                // draining so the logs stay complete.
                let _ = tx.send(line);
            })
            .await;
        }
        .with_subscriber(log.clone()),
    );

    rx
}

/// Captured stderr of a launched process.
///
/// Every line is logged as it arrives and appended to a shared buffer that
/// is read when something goes wrong.
#[derive(Debug)]
pub struct OutputCapture {
    buffer: Arc<Mutex<String>>,
    handle: Option<JoinHandle<()>>,
}

impl OutputCapture {
    pub fn spawn<R>(name: String, stream: Stream, pipe: R, log: &Dispatch) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&buffer);

        let handle = tokio::spawn(
            async move {
                read_lines(&name, stream, pipe, |line| {
                    if let Ok(mut buf) = sink.lock() {
                        buf.push_str(&line);
                        buf.push('\n');
                    }
                })
                .await;
            }
            .with_subscriber(log.clone()),
        );

        Self {
            buffer,
            handle: Some(handle),
        }
    }

    /// Everything captured so far.
    pub fn snapshot(&self) -> String {
        self.buffer
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default()
    }

    /// Wait up to `grace` for the reader to hit EOF, then return the capture.
    pub async fn drain(&mut self, grace: Duration) -> String {
        if let Some(handle) = self.handle.as_mut() {
            if timeout(grace, handle).await.is_ok() {
                self.handle = None;
            }
        }
        self.snapshot()
    }
}

async fn read_lines<R, F>(name: &str, stream: Stream, pipe: R, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut reader = BufReader::new(pipe);
    let mut raw = Vec::new();

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&raw)
                    .trim_end_matches(['\n', '\r'])
                    .to_string();
                info!(process = %name, "{stream}: {line:?}");
                on_line(line);
            }
            Err(e) => {
                warn!(process = %name, %stream, error = %e, "error reading process output");
                break;
            }
        }
    }

    debug!(process = %name, %stream, "output reader ended");
}
