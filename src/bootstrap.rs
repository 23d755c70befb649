//! Bootstrap orchestration: configuration → registration → resolution.
//!
//! Runs single-threaded, strictly before any request is served. The
//! registration phases are ordered so shadowing works purely through the
//! registry: embedding application first, declared defaults second, the
//! fallback composer's two passes last. The returned [`ResolvedServices`]
//! set is immutable; its `Arc`s are shared across however many request
//! handlers the embedding host spins up.

use crate::auth::AuthenticationGate;
use crate::config::{self, AppOptions};
use crate::provider::{
    ServiceRegistry, register_default_providers, register_deferred_search,
    register_plain_defaults,
};
use crate::services::{
    PackageContext, SearchIndexer, SearchService, StorageBackedSymbols, StorageService,
    SymbolStorage,
};
use crate::upstream::{UpstreamClient, shared_http_client};
use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

/// Inputs the embedding process controls.
#[derive(Clone, Debug, Default)]
pub struct BootstrapOptions {
    /// Configuration root directory; falls back to `PACKDOCK_CONFIG_ROOT`,
    /// then the current directory.
    pub config_root: Option<PathBuf>,
    /// Secrets directory; `/run/secrets` when unset.
    pub secrets_dir: Option<PathBuf>,
}

/// Immutable capability set handed to the rest of the application.
pub struct ResolvedServices {
    pub options: Arc<AppOptions>,
    pub storage: Arc<dyn StorageService>,
    pub search: Arc<dyn SearchService>,
    pub search_indexer: Arc<dyn SearchIndexer>,
    pub context: Arc<dyn PackageContext>,
    pub upstream: Arc<dyn UpstreamClient>,
    pub symbols: Arc<dyn SymbolStorage>,
    pub auth: AuthenticationGate,
}

impl ResolvedServices {
    /// Which implementation answered each capability, for `plan` output and
    /// assertions.
    pub fn provider_summary(&self) -> Value {
        json!({
            "storage": self.storage.name(),
            "search": self.search.name(),
            "search_indexer": self.search_indexer.name(),
            "database_context": self.context.name(),
            "upstream": self.upstream.name(),
            "symbols": self.symbols.name(),
            "authentication": if self.auth.anonymous_mode() { "anonymous" } else { "basic" },
        })
    }
}

/// Load and validate configuration without building any service.
///
/// Returns the bound options together with the aggregated violation report;
/// the CLI `check` command prints the report instead of failing fast.
pub fn check_configuration(boot: &BootstrapOptions) -> Result<(AppOptions, Vec<String>)> {
    let raw = config::load_configuration(boot.config_root.as_deref(), boot.secrets_dir.as_deref())?;
    let report = config::validate_raw_configuration(&raw)?;
    if !report.is_empty() {
        // Binding against a structurally broken tree would fail with a
        // single serde error; the schema report is the better answer.
        return Ok((AppOptions::default(), report));
    }
    let options = config::bind_options(&raw)?;
    let report = config::validate_options(&options);
    Ok((options, report))
}

/// Full bootstrap: validate, register, resolve.
///
/// `configure` is the embedding application's registration hook and runs
/// before any default, so its candidates win by order. Validation failure
/// and an unresolvable storage capability are fatal; optional capabilities
/// fall back or stay absent per the composer's rules.
pub fn bootstrap<F>(boot: &BootstrapOptions, configure: F) -> Result<ResolvedServices>
where
    F: FnOnce(&mut ServiceRegistry, &AppOptions),
{
    let (options, report) = check_configuration(boot)?;
    config::require_valid(report)?;
    let options = Arc::new(options);

    let http = shared_http_client(&options.mirror)?;

    let mut registry = ServiceRegistry::new();
    configure(&mut registry, &options);
    register_default_providers(&mut registry, &options, &http);

    register_plain_defaults(&mut registry, &options);
    let context = registry
        .context
        .resolve(&options)
        .ok_or_else(|| anyhow!("no database context provider resolved"))?;
    register_deferred_search(&mut registry, &options, Arc::clone(&context));

    let storage = registry.storage.resolve(&options).ok_or_else(|| {
        anyhow!(
            "no storage provider matched storage type '{}'; register one before bootstrap or pick a supported type",
            options.storage.storage_type.as_str()
        )
    })?;
    let search = registry
        .search
        .resolve(&options)
        .ok_or_else(|| anyhow!("no search provider resolved"))?;
    let search_indexer = registry
        .search_indexer
        .resolve(&options)
        .ok_or_else(|| anyhow!("no search indexer resolved"))?;
    let upstream = registry
        .upstream
        .resolve(&options)
        .ok_or_else(|| anyhow!("no upstream client resolved"))?;

    // The symbol default needs the materialized storage instance, so it is
    // appended only now; embedding candidates registered in `configure`
    // still precede it.
    let symbol_backing = Arc::clone(&storage);
    registry
        .symbols
        .register(|_| true, move || Arc::new(StorageBackedSymbols::new(symbol_backing)));
    let symbols = registry
        .symbols
        .resolve(&options)
        .ok_or_else(|| anyhow!("no symbol storage resolved"))?;

    let auth = AuthenticationGate::from_options(&options);

    Ok(ResolvedServices {
        options,
        storage,
        search,
        search_indexer,
        context,
        upstream,
        symbols,
        auth,
    })
}
