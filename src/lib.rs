//! Bootstrap layer for a light-weight package server.
//!
//! The crate decides, at process start, which concrete implementation backs
//! each abstract capability the server needs (package storage, search,
//! upstream mirroring, symbol storage) and gates inbound requests with a
//! Basic-authentication check. Selection runs through ordered
//! (predicate, factory) candidate lists: embedding applications override
//! defaults purely by registering first, and a two-pass fallback composer
//! fills whatever is left, including the deferred rule that lets a database
//! capability silently satisfy search. Transport, routing, and the package
//! business logic live in the embedding host; this crate hands it the
//! resolved capability set and the per-request authentication decision.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod downloads;
pub mod provider;
pub mod services;
pub mod upstream;

pub use auth::{AuthOutcome, AuthRejection, AuthenticationGate, Credential, WWW_AUTHENTICATE};
pub use bootstrap::{BootstrapOptions, ResolvedServices, bootstrap, check_configuration};
pub use config::{
    AppOptions, AuthenticationOptions, CONFIG_ENV_PREFIX, CONFIG_FILE_NAME, CONFIG_ROOT_ENV,
    DEFAULT_SECRETS_DIR, DatabaseOptions, MirrorOptions, SearchOptions, SearchType, ServerOptions,
    StatisticsOptions, StorageOptions, StorageType,
};
pub use downloads::{DownloadCount, DownloadsImporter, DownloadsSource, JsonFileDownloadsSource};
pub use provider::{ProviderSet, ServiceRegistry};
pub use services::{
    DatabaseSearch, FileStorage, MemoryContext, NullContext, NullSearch, NullSearchIndexer,
    NullStorage, PackageContext, PackageRecord, SearchIndexer, SearchService, StorageBackedSymbols,
    StorageService, SymbolStorage,
};
pub use upstream::{
    DisabledUpstream, UpstreamClient, V2UpstreamClient, V3UpstreamClient, shared_http_client,
};
