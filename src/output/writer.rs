//! Message sinks
//!
//! The engine hands every message to a [`MessageSink`]. The CLI writes
//! them to stdout as JSON lines; tests collect them in memory.

use super::messages::SingerMessage;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Mutex as StdMutex;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Destination for Singer messages.
///
/// Shared by every stream of a run, so implementations serialize writes
/// themselves.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Write one message
    async fn write(&self, message: SingerMessage) -> Result<()>;

    /// Flush buffered output
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Writes messages as newline-delimited JSON.
///
/// Output is buffered and flushed after every STATE message, so a
/// checkpoint never reaches the reader ahead of the records it covers.
pub struct JsonLinesSink<W> {
    writer: Mutex<BufWriter<W>>,
}

impl JsonLinesSink<tokio::io::Stdout> {
    /// Sink on the process's standard output
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    /// Create a sink over any async writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner().into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> MessageSink for JsonLinesSink<W> {
    async fn write(&self, message: SingerMessage) -> Result<()> {
        let mut line = message.to_line()?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::output(format!("Failed to write message: {e}")))?;
        if matches!(message, SingerMessage::State { .. }) {
            writer
                .flush()
                .await
                .map_err(|e| Error::output(format!("Failed to flush output: {e}")))?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .await
            .flush()
            .await
            .map_err(|e| Error::output(format!("Failed to flush output: {e}")))
    }
}

impl<W> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink").finish_non_exhaustive()
    }
}

/// Collects messages in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: StdMutex<Vec<SingerMessage>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message written so far
    pub fn messages(&self) -> Vec<SingerMessage> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Records written for one stream, in order
    pub fn records(&self, stream: &str) -> Vec<crate::types::Record> {
        self.messages()
            .into_iter()
            .filter_map(|message| match message {
                SingerMessage::Record {
                    stream: s, record, ..
                } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Payloads of the STATE messages written so far
    pub fn states(&self) -> Vec<serde_json::Value> {
        self.messages()
            .into_iter()
            .filter_map(|message| match message {
                SingerMessage::State { value } => Some(value),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn write(&self, message: SingerMessage) -> Result<()> {
        self.messages
            .lock()
            .map_err(|_| Error::output("message buffer poisoned"))?
            .push(message);
        Ok(())
    }
}
