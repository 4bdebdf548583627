#![forbid(unsafe_code)]

//! JSONL scenario traces with a stable digest.
//!
//! Every line carries `schema_version`, `seq`, `run_id`, the driver `frame`
//! and the event name, followed by the event's own fields. No wall-clock
//! time is recorded, so two runs of the same script produce byte-identical
//! traces and the same [`TraceLog::digest`].

use std::fs;
use std::io;
use std::path::Path;

use serde_json::{Map, Value, json};

use crate::recorder::SheetEvent;

/// Current trace schema.
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable naming a directory to write scenario traces into.
pub const TRACE_DIR_ENV: &str = "SHEET_TRACE_DIR";

/// In-memory JSONL trace.
#[derive(Debug, Clone)]
pub struct TraceLog {
    run_id: String,
    schema_version: u32,
    seq: u64,
    lines: Vec<String>,
}

impl TraceLog {
    /// Empty trace for run `run_id`.
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            schema_version: SCHEMA_VERSION,
            seq: 0,
            lines: Vec::new(),
        }
    }

    /// Override the schema version (builder pattern).
    #[must_use]
    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    /// Run identifier.
    #[inline]
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Emitted lines, in order.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of emitted lines.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing was emitted.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append one line. `fields` should be a JSON object; its keys follow
    /// the header keys, which it cannot override.
    pub fn emit(&mut self, frame: u64, event: &str, fields: Value) -> &str {
        let mut line = Map::new();
        line.insert("schema_version".into(), json!(self.schema_version));
        line.insert("seq".into(), json!(self.seq));
        line.insert("run_id".into(), json!(self.run_id));
        line.insert("frame".into(), json!(frame));
        line.insert("event".into(), json!(event));
        match fields {
            Value::Object(map) => {
                for (key, value) in map {
                    line.entry(key).or_insert(value);
                }
            }
            Value::Null => {}
            other => {
                line.insert("value".into(), other);
            }
        }
        self.seq += 1;
        self.lines.push(Value::Object(line).to_string());
        self.lines.last().map_or("", String::as_str)
    }

    /// Append one engine notification.
    pub fn record(&mut self, frame: u64, event: &SheetEvent) {
        self.emit(frame, event.name(), event.fields());
    }

    /// The whole trace, one JSON object per line.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// `blake3:<hex>` digest of [`TraceLog::to_jsonl`].
    #[must_use]
    pub fn digest(&self) -> String {
        let hash = blake3::hash(self.to_jsonl().as_bytes());
        format!("blake3:{}", hash.to_hex())
    }

    /// Write the trace to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_jsonl())
    }

    /// Write the trace as `<run_id>.jsonl` into `$SHEET_TRACE_DIR`, if set.
    ///
    /// Returns whether a file was written.
    pub fn write_to_env_dir(&self) -> io::Result<bool> {
        let Some(dir) = std::env::var_os(TRACE_DIR_ENV) else {
            return Ok(false);
        };
        let path = Path::new(&dir).join(format!("{}.jsonl", self.run_id));
        self.write_to(&path)?;
        tracing::info!(path = %path.display(), lines = self.len(), "scenario trace written");
        Ok(true)
    }
}
