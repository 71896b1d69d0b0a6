//! Readiness detection for the server's startup output.
//!
//! Readiness is a heuristic: the first stdout line containing the configured
//! marker is taken to mean the server accepts connections. A server whose
//! wording changes is never reported ready.

pub mod health;

use crate::supervisor::output::OutputStream;

use std::sync::OnceLock;

use log::{debug, info, warn};
use regex::Regex;
use tokio::io::AsyncRead;
use tokio::spawn as TokioSpawn;
use tokio::sync::oneshot;

const ADVERTISED_URL_PATTERN: &str = r"https?://(?P<host>[^\s:/]+):(?P<port>\d+)";
const URL_CAPTURE_PORT: &str = "port";

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(ADVERTISED_URL_PATTERN).expect("valid regex pattern"))
}

/// Does this output chunk carry the readiness marker?
pub fn detect_readiness(chunk: &str, marker: &str) -> bool {
    chunk.contains(marker)
}

/// Port of the first `http(s)://host:port` URL in a line, if any.
pub fn advertised_port(line: &str) -> Option<u16> {
    get_url_regex()
        .captures(line)
        .and_then(|cap| cap.name(URL_CAPTURE_PORT))
        .and_then(|port| port.as_str().parse().ok())
}

/// Delivered once, when the marker is first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadySignal {
    pub line: String,
    /// Lines read up to and including the marker line.
    pub chunks_observed: usize,
    pub advertised_port: Option<u16>,
}

/// Watch a stdout stream for the readiness marker in a background task.
///
/// The returned receiver resolves with the first matching line. If the stream
/// ends (or fails) before any line matches, the sender is dropped and the
/// receiver resolves to an error. After the marker the task keeps draining and
/// mirroring output until the pipe closes.
pub fn spawn_readiness_watch<R>(
    mut output: OutputStream<R>,
    marker: impl Into<String>,
) -> oneshot::Receiver<ReadySignal>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let marker = marker.into();
    let (ready_tx, ready_rx) = oneshot::channel();

    TokioSpawn(async move {
        let mut ready_tx = Some(ready_tx);

        loop {
            match output.next_chunk().await {
                Ok(Some(chunk)) => {
                    if ready_tx.is_some()
                        && detect_readiness(&chunk, &marker)
                        && let Some(tx) = ready_tx.take()
                    {
                        info!("Readiness marker {marker:?} observed");
                        let signal = ReadySignal {
                            advertised_port: advertised_port(&chunk),
                            chunks_observed: output.observed(),
                            line: chunk,
                        };
                        if tx.send(signal).is_err() {
                            debug!("Readiness listener went away before the marker arrived");
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("{e}");
                    break;
                }
            }
        }

        if ready_tx.is_some() {
            warn!(
                "Output ended after {} line(s) without readiness marker {marker:?}",
                output.observed()
            );
        }
    });

    ready_rx
}
