//! Search capability: query service and indexer contracts.
//!
//! The database-backed implementation satisfies both contracts at once,
//! which is what lets the fallback composer register one instance for the
//! search-service and search-indexer capabilities in its deferred pass.

use crate::services::context::{PackageContext, PackageRecord};
use anyhow::Result;
use std::sync::Arc;

/// Read side of the search capability.
pub trait SearchService: Send + Sync {
    fn name(&self) -> &'static str;
    fn search(&self, query: &str, skip: usize, take: usize) -> Result<Vec<PackageRecord>>;
}

/// Write side: invoked after a package lands in storage.
pub trait SearchIndexer: Send + Sync {
    fn name(&self) -> &'static str;
    fn index(&self, record: &PackageRecord) -> Result<()>;
}

/// Explicit opt-out: every query is empty.
pub struct NullSearch;

impl SearchService for NullSearch {
    fn name(&self) -> &'static str {
        "null"
    }

    fn search(&self, _query: &str, _skip: usize, _take: usize) -> Result<Vec<PackageRecord>> {
        Ok(Vec::new())
    }
}

/// Explicit opt-out: indexing is a no-op.
pub struct NullSearchIndexer;

impl SearchIndexer for NullSearchIndexer {
    fn name(&self) -> &'static str {
        "null"
    }

    fn index(&self, _record: &PackageRecord) -> Result<()> {
        Ok(())
    }
}

/// Queries and indexes straight through the database context.
pub struct DatabaseSearch {
    context: Arc<dyn PackageContext>,
}

impl DatabaseSearch {
    pub fn new(context: Arc<dyn PackageContext>) -> Self {
        Self { context }
    }
}

impl SearchService for DatabaseSearch {
    fn name(&self) -> &'static str {
        "database"
    }

    fn search(&self, query: &str, skip: usize, take: usize) -> Result<Vec<PackageRecord>> {
        self.context.find_packages(query, skip, take)
    }
}

impl SearchIndexer for DatabaseSearch {
    fn name(&self) -> &'static str {
        "database"
    }

    fn index(&self, record: &PackageRecord) -> Result<()> {
        self.context.insert_package(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context::MemoryContext;

    #[test]
    fn database_search_reads_what_it_indexed() {
        let context = Arc::new(MemoryContext::new());
        let search = DatabaseSearch::new(context);
        search
            .index(&PackageRecord {
                id: "demo".to_string(),
                version: "1.0.0".to_string(),
                description: None,
                downloads: 0,
            })
            .unwrap();
        let hits = search.search("demo", 0, 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "demo");
    }

    #[test]
    fn null_search_always_comes_back_empty() {
        let search = NullSearch;
        assert!(search.search("anything", 0, 10).unwrap().is_empty());
        NullSearchIndexer
            .index(&PackageRecord {
                id: "demo".to_string(),
                version: "1.0.0".to_string(),
                description: None,
                downloads: 0,
            })
            .unwrap();
    }
}
