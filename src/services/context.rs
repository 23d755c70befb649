//! Database context capability.
//!
//! The context is the generic database surface the bootstrap selects between:
//! embedding applications register their own implementation, the fallback
//! composer supplies [`NullContext`] when none was chosen, and the in-memory
//! context backs tests and single-process deployments. The concrete schema
//! and query engine stay outside this crate.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// One package row as the bootstrap-level services see it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub downloads: u64,
}

/// Generic database capability.
pub trait PackageContext: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bring the schema up to date before serving begins.
    fn run_migrations(&self) -> Result<()>;

    fn insert_package(&self, record: PackageRecord) -> Result<()>;

    /// Case-insensitive substring match over id and description, paged.
    fn find_packages(&self, query: &str, skip: usize, take: usize) -> Result<Vec<PackageRecord>>;

    fn set_downloads(&self, id: &str, version: &str, downloads: u64) -> Result<()>;
}

/// Stand-in context for deployments that never chose a database.
///
/// Every operation succeeds and holds nothing, which keeps optional
/// database consumers (statistics, database-backed search over an empty
/// feed) inert instead of failing.
pub struct NullContext;

impl PackageContext for NullContext {
    fn name(&self) -> &'static str {
        "null"
    }

    fn run_migrations(&self) -> Result<()> {
        Ok(())
    }

    fn insert_package(&self, _record: PackageRecord) -> Result<()> {
        Ok(())
    }

    fn find_packages(&self, _query: &str, _skip: usize, _take: usize) -> Result<Vec<PackageRecord>> {
        Ok(Vec::new())
    }

    fn set_downloads(&self, _id: &str, _version: &str, _downloads: u64) -> Result<()> {
        Ok(())
    }
}

/// Mutex-guarded in-memory table.
///
/// The registry hands out one shared instance; interior locking is this
/// instance's own concern, per the resolved-set concurrency contract.
#[derive(Default)]
pub struct MemoryContext {
    rows: Mutex<Vec<PackageRecord>>,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PackageRecord>> {
        // A poisoned lock only means another thread panicked mid-write;
        // the row data itself is still usable.
        self.rows.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl PackageContext for MemoryContext {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn run_migrations(&self) -> Result<()> {
        Ok(())
    }

    fn insert_package(&self, record: PackageRecord) -> Result<()> {
        let mut rows = self.lock();
        rows.retain(|row| !(row.id == record.id && row.version == record.version));
        rows.push(record);
        Ok(())
    }

    fn find_packages(&self, query: &str, skip: usize, take: usize) -> Result<Vec<PackageRecord>> {
        let needle = query.to_lowercase();
        let rows = self.lock();
        Ok(rows
            .iter()
            .filter(|row| {
                needle.is_empty()
                    || row.id.to_lowercase().contains(&needle)
                    || row
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    fn set_downloads(&self, id: &str, version: &str, downloads: u64) -> Result<()> {
        let mut rows = self.lock();
        for row in rows.iter_mut() {
            if row.id.eq_ignore_ascii_case(id) && row.version == version {
                row.downloads = downloads;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, version: &str, description: Option<&str>) -> PackageRecord {
        PackageRecord {
            id: id.to_string(),
            version: version.to_string(),
            description: description.map(str::to_string),
            downloads: 0,
        }
    }

    #[test]
    fn memory_context_upserts_by_id_and_version() {
        let context = MemoryContext::new();
        context.insert_package(record("demo", "1.0.0", None)).unwrap();
        context
            .insert_package(record("demo", "1.0.0", Some("replaced")))
            .unwrap();
        let rows = context.find_packages("demo", 0, 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description.as_deref(), Some("replaced"));
    }

    #[test]
    fn memory_context_search_is_case_insensitive_and_paged() {
        let context = MemoryContext::new();
        context
            .insert_package(record("Json.Powers", "1.0.0", None))
            .unwrap();
        context
            .insert_package(record("other", "2.0.0", Some("json helpers")))
            .unwrap();
        context.insert_package(record("plain", "3.0.0", None)).unwrap();

        let hits = context.find_packages("JSON", 0, 10).unwrap();
        assert_eq!(hits.len(), 2);
        let paged = context.find_packages("JSON", 1, 10).unwrap();
        assert_eq!(paged.len(), 1);
    }

    #[test]
    fn downloads_update_matches_id_case_insensitively() {
        let context = MemoryContext::new();
        context.insert_package(record("Demo", "1.0.0", None)).unwrap();
        context.set_downloads("demo", "1.0.0", 42).unwrap();
        let rows = context.find_packages("demo", 0, 10).unwrap();
        assert_eq!(rows[0].downloads, 42);
    }
}
