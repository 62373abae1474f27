//! Telemetry source abstraction.
//!
//! Provides a unified trait for reading telemetry records from different
//! sources: JSON Lines from stdin or a file, and pre-loaded records (replay,
//! tests, simulation).

use crate::types::TelemetryRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Events produced by a telemetry source.
#[derive(Debug)]
pub enum SourceEvent {
    /// A well-formed record was read.
    Record(TelemetryRecord),
    /// Source reached end of data.
    Eof,
}

/// Trait abstracting where telemetry records come from.
///
/// Implementations handle format parsing and pacing internally.
/// The processing loop calls [`next_record`](TelemetrySource::next_record)
/// in a `select!` with cancellation.
#[async_trait]
pub trait TelemetrySource: Send + 'static {
    /// Read the next record from the source.
    ///
    /// Returns `SourceEvent::Eof` when no more data is available.
    /// Returns `Err` on unrecoverable I/O errors.
    async fn next_record(&mut self) -> Result<SourceEvent>;

    /// Human-readable name for logging (e.g. "stdin", "file", "replay").
    fn source_name(&self) -> &str;
}

// ============================================================================
// Replay Source (pre-loaded records)
// ============================================================================

/// Replays pre-loaded records with optional inter-record delay.
pub struct ReplaySource {
    records: std::vec::IntoIter<TelemetryRecord>,
    delay_ms: u64,
    yielded_first: bool,
}

impl ReplaySource {
    pub fn new(records: Vec<TelemetryRecord>, delay_ms: u64) -> Self {
        Self {
            records: records.into_iter(),
            delay_ms,
            yielded_first: false,
        }
    }
}

#[async_trait]
impl TelemetrySource for ReplaySource {
    async fn next_record(&mut self) -> Result<SourceEvent> {
        // No delay before the first record
        if self.yielded_first && self.delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.delay_ms)).await;
        }
        match self.records.next() {
            Some(r) => {
                self.yielded_first = true;
                Ok(SourceEvent::Record(r))
            }
            None => Ok(SourceEvent::Eof),
        }
    }

    fn source_name(&self) -> &str {
        "replay"
    }
}

// ============================================================================
// JSON Lines Source (stdin or file)
// ============================================================================

/// Reads JSON telemetry records, one per line.
///
/// Used with the simulation harness:
/// `simulation --scenario cavitation | pump-sentinel run`
pub struct JsonLinesSource<R> {
    reader: R,
    line_buffer: String,
    name: String,
    line_no: u64,
    skipped: u64,
}

impl<R: AsyncBufRead + Unpin + Send + 'static> JsonLinesSource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            line_buffer: String::with_capacity(1024),
            name: name.into(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Lines skipped as malformed so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl JsonLinesSource<BufReader<tokio::io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), "stdin")
    }
}

impl JsonLinesSource<BufReader<tokio::fs::File>> {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("failed to open telemetry file {}", path.display()))?;
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send + 'static> TelemetrySource for JsonLinesSource<R> {
    async fn next_record(&mut self) -> Result<SourceEvent> {
        loop {
            self.line_buffer.clear();
            let bytes = self.reader.read_line(&mut self.line_buffer).await?;
            if bytes == 0 {
                return Ok(SourceEvent::Eof);
            }
            self.line_no += 1;
            let line = self.line_buffer.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match serde_json::from_str::<TelemetryRecord>(line) {
                Ok(record) if record.is_well_formed() => return Ok(SourceEvent::Record(record)),
                Ok(_) => {
                    self.skipped += 1;
                    tracing::warn!(source = %self.name, line = self.line_no, "Skipping record with invalid values");
                }
                Err(e) => {
                    // Skip malformed lines and keep reading
                    self.skipped += 1;
                    tracing::warn!(source = %self.name, line = self.line_no, error = %e, "Failed to parse telemetry record");
                }
            }
        }
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{"asset_id":"p1","features":{"vib_rms":2.5,"vib_crest":3.0,"current":45.0,"pressure":6.0,"temp":38.0},"model":{"healthy":0.9,"warning":0.08,"critical":0.02}}"#;

    #[tokio::test]
    async fn test_json_lines_skips_malformed() {
        let input = format!("{GOOD}\nnot json\n\n# comment\n{GOOD}\n");
        let mut source = JsonLinesSource::new(BufReader::new(std::io::Cursor::new(input.into_bytes())), "test");
        let mut records = 0;
        loop {
            match source.next_record().await.unwrap() {
                SourceEvent::Record(r) => {
                    assert_eq!(r.asset_id, "p1");
                    records += 1;
                }
                SourceEvent::Eof => break,
            }
        }
        assert_eq!(records, 2);
        assert_eq!(source.skipped(), 1);
    }

    #[tokio::test]
    async fn test_replay_source_yields_then_eof() {
        let record: TelemetryRecord = serde_json::from_str(GOOD).unwrap();
        let mut source = ReplaySource::new(vec![record], 0);
        assert!(matches!(source.next_record().await.unwrap(), SourceEvent::Record(_)));
        assert!(matches!(source.next_record().await.unwrap(), SourceEvent::Eof));
    }
}
