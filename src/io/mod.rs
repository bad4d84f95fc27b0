//! File import/export of the whole ledger.

pub mod export;
pub mod import;
mod path;

use std::path::Path;
use std::str::FromStr;

pub use export::*;
pub use import::*;
pub use path::*;

/// Serialization format for ledger files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    Json,
}

impl DataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Json => "json",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    pub fn exporter(&self) -> Box<dyn DataExporter> {
        match self {
            DataFormat::Csv => Box::new(CsvExporter),
            DataFormat::Json => Box::new(JsonExporter),
        }
    }

    pub fn importer(&self) -> Box<dyn DataImporter> {
        match self {
            DataFormat::Csv => Box::new(CsvImporter),
            DataFormat::Json => Box::new(JsonImporter),
        }
    }
}

impl FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(DataFormat::Csv),
            "json" => Ok(DataFormat::Json),
            other => Err(format!("unsupported format '{}' (expected csv or json)", other)),
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
