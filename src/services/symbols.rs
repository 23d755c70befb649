//! Symbol storage capability.
//!
//! Debug symbols ride the resolved package store under a dedicated prefix;
//! the default candidate is registered after the embedding pass so a custom
//! symbol store registered earlier still wins by order.

use crate::services::storage::StorageService;
use anyhow::Result;
use std::sync::Arc;

pub trait SymbolStorage: Send + Sync {
    fn name(&self) -> &'static str;
    fn put_symbols(&self, key: &str, content: &[u8]) -> Result<()>;
    fn get_symbols(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

const SYMBOL_PREFIX: &str = "symbols";

/// Symbol store layered over whichever storage capability resolved.
pub struct StorageBackedSymbols {
    storage: Arc<dyn StorageService>,
}

impl StorageBackedSymbols {
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self { storage }
    }

    fn prefixed(key: &str) -> String {
        format!("{SYMBOL_PREFIX}/{key}")
    }
}

impl SymbolStorage for StorageBackedSymbols {
    fn name(&self) -> &'static str {
        "storage"
    }

    fn put_symbols(&self, key: &str, content: &[u8]) -> Result<()> {
        self.storage.put(&Self::prefixed(key), content)
    }

    fn get_symbols(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.storage.get(&Self::prefixed(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::FileStorage;

    #[test]
    fn symbols_live_under_their_own_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(FileStorage::new(dir.path()));
        let symbols = StorageBackedSymbols::new(storage.clone());

        symbols.put_symbols("demo/1.0.0.pdb", b"symbols").unwrap();
        assert_eq!(
            symbols.get_symbols("demo/1.0.0.pdb").unwrap().as_deref(),
            Some(b"symbols".as_ref())
        );
        // The same key outside the prefix stays untouched.
        assert_eq!(storage.get("demo/1.0.0.pdb").unwrap(), None);
        assert!(storage.get("symbols/demo/1.0.0.pdb").unwrap().is_some());
    }
}
