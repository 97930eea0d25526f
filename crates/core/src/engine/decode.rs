//! Decoders for the encoder's two output streams.

use std::collections::VecDeque;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::splitter::TokenBuffer;
use super::types::{EngineEvent, ProgressSnapshot};

/// Decodes the `-progress` key=value stream.
#[derive(Debug, Default, Clone)]
pub struct ProgressDecoder {
    size: u64,
    time_sec: f64,
}

impl ProgressDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line; returns a snapshot when a reporting interval ends.
    ///
    /// Only `progress=continue` closes an interval. The final
    /// `progress=end` block is not reported.
    pub fn feed_line(&mut self, line: &str) -> Option<ProgressSnapshot> {
        let (key, value) = line.split_once('=')?;
        let (key, value) = (key.trim(), value.trim());

        match key {
            "total_size" => {
                if let Ok(size) = value.parse::<u64>() {
                    self.size = size;
                }
            }
            "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.time_sec = us / 1_000_000.0;
                }
            }
            "progress" if value == "continue" => {
                return Some(ProgressSnapshot {
                    time_sec: self.time_sec,
                    size: self.size,
                });
            }
            _ => {}
        }
        None
    }
}

/// Decodes one token of the human-readable stream into a log line.
///
/// Blank tokens (including the empty token between `\r` and `\n`) are dropped.
pub fn decode_log_token(token: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(token);
    if line.trim().is_empty() {
        None
    } else {
        Some(line.into_owned())
    }
}

/// Forwards events to an optional consumer, detaching it once it hangs up.
struct EventForwarder {
    tx: Option<mpsc::Sender<EngineEvent>>,
}

impl EventForwarder {
    async fn send(&mut self, event: EngineEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).await.is_err() {
                debug!("Event receiver dropped, continuing without events");
                self.tx = None;
            }
        }
    }
}

/// Reads the progress stream to the end, emitting snapshots as they complete.
pub async fn drain_progress<R>(reader: R, events: Option<mpsc::Sender<EngineEvent>>)
where
    R: AsyncRead + Unpin,
{
    let mut forwarder = EventForwarder { tx: events };
    let mut decoder = ProgressDecoder::new();
    let mut lines = BufReader::new(reader).split(b'\n');

    loop {
        match lines.next_segment().await {
            Ok(Some(raw)) => {
                let line = String::from_utf8_lossy(&raw);
                if let Some(snapshot) = decoder.feed_line(&line) {
                    forwarder.send(EngineEvent::Progress(snapshot)).await;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Progress stream read failed: {}", e);
                break;
            }
        }
    }
}

/// Reads the log stream to the end, emitting non-blank lines.
///
/// Returns up to `tail_len` of the most recent lines, oldest first.
pub async fn drain_log<R>(
    mut reader: R,
    events: Option<mpsc::Sender<EngineEvent>>,
    tail_len: usize,
) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut forwarder = EventForwarder { tx: events };
    let mut tokens = TokenBuffer::new();
    let mut tail = VecDeque::with_capacity(tail_len);
    let mut chunk = [0u8; 4096];

    loop {
        let read = match reader.read(&mut chunk).await {
            Ok(n) => n,
            Err(e) => {
                warn!("Log stream read failed: {}", e);
                0
            }
        };
        if read == 0 {
            tokens.finish();
        } else {
            tokens.push(&chunk[..read]);
        }

        while let Some(token) = tokens.next_token() {
            let Some(line) = decode_log_token(&token) else {
                continue;
            };
            debug!(target: "optimux::encoder", "{}", line);
            if tail_len > 0 {
                if tail.len() == tail_len {
                    tail.pop_front();
                }
                tail.push_back(line.clone());
            }
            forwarder.send(EngineEvent::Log { line }).await;
        }

        if read == 0 {
            break;
        }
    }

    tail.into()
}
