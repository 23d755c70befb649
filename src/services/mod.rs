//! Capability contracts and their generic implementations.
//!
//! Each trait names one abstract capability the rest of the application
//! depends on; exactly one implementation per capability survives bootstrap.
//! Every trait carries `name()` so the resolved set stays inspectable (the
//! CLI `plan` command and the test suite both report on it) without
//! downcasting.

pub mod context;
pub mod search;
pub mod storage;
pub mod symbols;

pub use context::{MemoryContext, NullContext, PackageContext, PackageRecord};
pub use search::{DatabaseSearch, NullSearch, NullSearchIndexer, SearchIndexer, SearchService};
pub use storage::{FileStorage, NullStorage, StorageService};
pub use symbols::{StorageBackedSymbols, SymbolStorage};
