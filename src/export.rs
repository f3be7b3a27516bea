use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::aggregate::TrafficReport;
use crate::classifier::ClassificationRecord;

pub const RECORDS_FILE: &str = "parsed_data.jsonl";

/// A classified input row as written to the records file.
///
/// Serializes as one flat object: the input columns, then `line` and
/// `traffic`, then the record fields. Later keys replace earlier ones of the
/// same name, so an input column called `url` yields to the record's.
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub line: usize,
    pub traffic: Option<f64>,
    pub columns: BTreeMap<String, String>,
    pub record: ClassificationRecord,
}

impl Serialize for ParsedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut merged: Map<String, Value> = self
            .columns
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        merged.insert("line".to_string(), Value::from(self.line));
        merged.insert("traffic".to_string(), self.traffic.map_or(Value::Null, Value::from));

        match serde_json::to_value(&self.record).map_err(S::Error::custom)? {
            Value::Object(fields) => merged.extend(fields),
            other => return Err(S::Error::custom(format!("record is not an object: {}", other))),
        }
        merged.serialize(serializer)
    }
}

/// Creates `dir` and its parents if needed.
pub fn create_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

/// Streams classified rows as JSON lines into `parsed_data.jsonl`.
pub struct RecordWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl RecordWriter {
    pub fn create(dir: &Path) -> Result<Self> {
        let path = dir.join(RECORDS_FILE);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn write_rows(&mut self, rows: &[ParsedRow]) -> Result<()> {
        for row in rows {
            serde_json::to_writer(&mut self.writer, row)?;
            self.writer.write_all(b"\n")?;
        }
        self.written += rows.len();
        Ok(())
    }

    /// Flushes the file and returns its path and the number of rows written.
    pub fn finish(mut self) -> Result<(PathBuf, usize)> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        debug!("Wrote {} rows to {}", self.written, self.path.display());
        Ok((self.path, self.written))
    }
}

/// Writes every analysis of `report` to `analysis_<name>.json` in `dir`.
pub fn write_report(dir: &Path, report: &TrafficReport) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(report.analyses.len());
    for analysis in &report.analyses {
        if analysis.rows.is_empty() {
            continue;
        }
        let path = dir.join(format!("analysis_{}.json", analysis.kind.name()));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &analysis.rows)?;
        writer.flush()?;
        info!("Wrote {} analysis to {}", analysis.kind.name(), path.display());
        written.push(path);
    }
    Ok(written)
}
