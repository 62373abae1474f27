//! Append-only JSON Lines verdict log

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::info;

use super::{SinkError, VerdictEvent, VerdictSink};

/// Writes one JSON object per verdict and flushes after each line so a crash
/// loses at most the line being written.
#[derive(Debug)]
pub struct JsonlVerdictLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlVerdictLog {
    /// Open (or create) the log for appending, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!(path = %path.display(), "Verdict log opened");
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VerdictSink for JsonlVerdictLog {
    fn publish(&self, event: &VerdictEvent) -> Result<(), SinkError> {
        let line = serde_json::to_string(event)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| SinkError::Unavailable("verdict log lock poisoned".to_string()))?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "jsonl-log"
    }
}
