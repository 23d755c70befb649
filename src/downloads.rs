//! Downloads importer backing the CLI `import-downloads` command.
//!
//! Reads an external downloads report and writes the counts through the
//! resolved database context. The report shape is
//! `{ "<package id>": { "<version>": <count>, ... }, ... }`.

use crate::services::PackageContext;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One parsed report row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadCount {
    pub id: String,
    pub version: String,
    pub downloads: u64,
}

/// Source of the downloads report.
pub trait DownloadsSource {
    fn fetch(&self) -> Result<Vec<DownloadCount>>;
}

/// Report stored as a JSON file on disk.
pub struct JsonFileDownloadsSource {
    path: PathBuf,
}

impl JsonFileDownloadsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DownloadsSource for JsonFileDownloadsSource {
    fn fetch(&self) -> Result<Vec<DownloadCount>> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading downloads report {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&data)
            .with_context(|| format!("parsing downloads report {}", self.path.display()))?;
        parse_report(&value)
    }
}

fn parse_report(value: &Value) -> Result<Vec<DownloadCount>> {
    let report: BTreeMap<String, BTreeMap<String, u64>> = serde_json::from_value(value.clone())
        .context("downloads report must map package ids to version/count maps")?;
    let mut counts = Vec::new();
    for (id, versions) in report {
        for (version, downloads) in versions {
            counts.push(DownloadCount {
                id: id.clone(),
                version,
                downloads,
            });
        }
    }
    Ok(counts)
}

/// Applies a downloads report to the resolved context.
pub struct DownloadsImporter {
    source: Box<dyn DownloadsSource>,
    context: Arc<dyn PackageContext>,
}

impl DownloadsImporter {
    pub fn new(source: Box<dyn DownloadsSource>, context: Arc<dyn PackageContext>) -> Self {
        Self { source, context }
    }

    pub fn from_report_path(path: &Path, context: Arc<dyn PackageContext>) -> Self {
        Self::new(Box::new(JsonFileDownloadsSource::new(path)), context)
    }

    /// Import every row, returning how many were applied.
    pub fn import(&self) -> Result<usize> {
        let counts = self.source.fetch()?;
        for count in &counts {
            self.context
                .set_downloads(&count.id, &count.version, count.downloads)?;
        }
        Ok(counts.len())
    }
}
