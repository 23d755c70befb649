//! Capability provider registry.
//!
//! One [`ProviderSet`] per abstract capability, grouped in a
//! [`ServiceRegistry`]. Registration happens in three strictly ordered
//! phases during bootstrap: the embedding application first (so its
//! candidates shadow everything), then the declared defaults, then the
//! fallback composer's two passes. Nothing is ever removed or reordered.

pub mod defaults;
pub mod fallback;
pub mod registry;

pub use defaults::register_default_providers;
pub use fallback::{register_deferred_search, register_plain_defaults};
pub use registry::ProviderSet;

use crate::services::{
    PackageContext, SearchIndexer, SearchService, StorageService, SymbolStorage,
};
use crate::upstream::UpstreamClient;

/// All capability candidate lists for one bootstrap run.
pub struct ServiceRegistry {
    pub storage: ProviderSet<dyn StorageService>,
    pub search: ProviderSet<dyn SearchService>,
    pub search_indexer: ProviderSet<dyn SearchIndexer>,
    pub context: ProviderSet<dyn PackageContext>,
    pub upstream: ProviderSet<dyn UpstreamClient>,
    pub symbols: ProviderSet<dyn SymbolStorage>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            storage: ProviderSet::new("storage-service"),
            search: ProviderSet::new("search-service"),
            search_indexer: ProviderSet::new("search-indexer"),
            context: ProviderSet::new("database-context"),
            upstream: ProviderSet::new("upstream-client"),
            symbols: ProviderSet::new("symbol-storage"),
        }
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
