//! Line-oriented observation of the server's output pipes.
//!
//! Every line read is mirrored to the log under [`SERVER_LOG_TARGET`] before it
//! is handed to the caller, so the diagnostic channel sees the full output even
//! when nobody inspects it.

use crate::SERVER_LOG_TARGET;
use crate::error::spawn::SpawnError;

use common::ErrorLocation;

use std::panic::Location;

use futures_util::{Stream, StreamExt, stream};
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::spawn as TokioSpawn;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

/// Unbounded, non-restartable sequence of output lines from one pipe.
pub struct OutputStream<R> {
    lines: Lines<BufReader<R>>,
    source: OutputSource,
    label: String,
    observed: usize,
}

impl<R> OutputStream<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R, source: OutputSource, label: impl Into<String>) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            source,
            label: label.into(),
            observed: 0,
        }
    }

    pub fn source(&self) -> OutputSource {
        self.source
    }

    /// Number of lines read so far.
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Read the next line, mirroring it to the log.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(line))` - A line arrived (without its trailing newline)
    /// * `Ok(None)` - The pipe closed
    /// * `Err(SpawnError::Output)` - Reading from the pipe failed
    pub async fn next_chunk(&mut self) -> Result<Option<String>, SpawnError> {
        match self.lines.next_line().await {
            Ok(Some(line)) => {
                self.observed += 1;
                mirror(self.source, &self.label, &line);
                Ok(Some(line))
            }
            Ok(None) => {
                debug!("{} {:?} closed", self.label, self.source);
                Ok(None)
            }
            Err(e) => Err(SpawnError::Output {
                message: format!("Failed to read {} {:?}: {e}", self.label, self.source),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Convert into a [`Stream`] of lines. A read error is logged and ends the stream.
    pub fn into_chunks(self) -> impl Stream<Item = String> {
        stream::unfold(self, |mut output| async move {
            match output.next_chunk().await {
                Ok(Some(line)) => Some((line, output)),
                Ok(None) => None,
                Err(e) => {
                    warn!("{e}");
                    None
                }
            }
        })
    }
}

/// Drain a stream in the background so the child never blocks on a full pipe.
///
/// The task resolves to the number of lines drained.
pub fn spawn_drain<R>(output: OutputStream<R>) -> JoinHandle<usize>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    TokioSpawn(async move { output.into_chunks().count().await })
}

fn mirror(source: OutputSource, label: &str, line: &str) {
    match source {
        OutputSource::Stdout => info!(target: SERVER_LOG_TARGET, "{label}: {line}"),
        OutputSource::Stderr => error!(target: SERVER_LOG_TARGET, "{label} Error: {line}"),
    }
}
