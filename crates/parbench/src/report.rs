//! Benchmark records and the sinks that persist them.
//!
//! The kernels never touch a sink; the demo programs hand a finished
//! [`BenchmarkRecord`] to whichever sink the user picked.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome of one sequential-vs-parallel run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub label: String,
    pub host: String,
    pub input_size: usize,
    pub workers: usize,
    pub sequential_seconds: f64,
    pub parallel_seconds: f64,
    /// Non-finite values are written as the strings `"inf"`, `"-inf"` or
    /// `"nan"`, since JSON numbers cannot hold them.
    #[serde(with = "non_finite")]
    pub speedup: f64,
}

mod non_finite {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            s.serialize_f64(*value)
        } else if value.is_nan() {
            s.serialize_str("nan")
        } else if value.is_sign_positive() {
            s.serialize_str("inf")
        } else {
            s.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(t) => match t.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("invalid speedup '{other}'"))),
            },
        }
    }
}

impl BenchmarkRecord {
    /// Pipe-delimited single-line rendering used by [`TextLog`].
    pub fn to_line(&self) -> String {
        format!(
            "Host: {} | Kernel: {} | Size: {} | Workers: {} | T.Seq: {:.4}s | T.Par: {:.4}s | Sp: {:.2}",
            self.host,
            self.label,
            self.input_size,
            self.workers,
            self.sequential_seconds,
            self.parallel_seconds,
            self.speedup,
        )
    }
}

/// Destination for finished benchmark records.
pub trait ReportSink {
    fn record(&mut self, record: &BenchmarkRecord) -> io::Result<()>;
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn record(&mut self, record: &BenchmarkRecord) -> io::Result<()> {
        (**self).record(record)
    }
}

/// Keeps records in memory.
impl ReportSink for Vec<BenchmarkRecord> {
    fn record(&mut self, record: &BenchmarkRecord) -> io::Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

fn append(path: &Path, line: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

/// Appends one pipe-delimited line per record to a text file.
#[derive(Clone, Debug)]
pub struct TextLog {
    path: PathBuf,
}

impl TextLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for TextLog {
    fn record(&mut self, record: &BenchmarkRecord) -> io::Result<()> {
        append(&self.path, &record.to_line())?;
        log::debug!("appended record to {}", self.path.display());
        Ok(())
    }
}

/// Appends one JSON object per line.
#[derive(Clone, Debug)]
pub struct JsonLines {
    path: PathBuf,
}

impl JsonLines {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonLines {
    fn record(&mut self, record: &BenchmarkRecord) -> io::Result<()> {
        let line = serde_json::to_string(record)?;
        append(&self.path, &line)?;
        log::debug!("appended record to {}", self.path.display());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected text|json)")),
        }
    }
}

/// File-backed sink for `format` writing to `path`.
pub fn file_sink(format: LogFormat, path: impl Into<PathBuf>) -> Box<dyn ReportSink> {
    match format {
        LogFormat::Text => Box::new(TextLog::new(path)),
        LogFormat::Json => Box::new(JsonLines::new(path)),
    }
}
