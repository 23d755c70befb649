//! Declared default providers.
//!
//! These candidates examine the options snapshot to decide whether their
//! implementation is active; they run after the embedding application's
//! registrations, so anything registered there wins by order regardless of
//! configuration.

use crate::config::{AppOptions, SearchType, StorageType};
use crate::provider::ServiceRegistry;
use crate::services::{FileStorage, NullSearch, NullSearchIndexer, NullStorage};
use crate::upstream::{DisabledUpstream, UpstreamClient, V2UpstreamClient, V3UpstreamClient};
use reqwest::blocking::Client;
use std::path::PathBuf;
use std::sync::Arc;

pub fn register_default_providers(
    registry: &mut ServiceRegistry,
    options: &Arc<AppOptions>,
    http: &Client,
) {
    register_storage(registry, options);
    register_search(registry);
    register_upstream(registry, options, http);
}

fn register_storage(registry: &mut ServiceRegistry, options: &Arc<AppOptions>) {
    let opts = Arc::clone(options);
    registry.storage.register(
        |options| options.storage.storage_type == StorageType::FileSystem,
        move || Arc::new(FileStorage::new(PathBuf::from(opts.storage.path.clone()))),
    );
    registry.storage.register(
        |options| options.storage.storage_type == StorageType::Null,
        || Arc::new(NullStorage),
    );
    // Any other storage type matches nothing here; an embedding application
    // must have claimed it, otherwise bootstrap fails its mandatory check.
}

fn register_search(registry: &mut ServiceRegistry) {
    // `search.type = null` is an explicit opt-out and must beat every
    // fallback, including the deferred database-backed one.
    registry.search.register(
        |options| options.search.search_type == SearchType::Null,
        || Arc::new(NullSearch),
    );
    registry.search_indexer.register(
        |options| options.search.search_type == SearchType::Null,
        || Arc::new(NullSearchIndexer),
    );
}

fn register_upstream(registry: &mut ServiceRegistry, options: &Arc<AppOptions>, http: &Client) {
    registry.upstream.register(
        |options| !options.mirror.enabled,
        || Arc::new(DisabledUpstream),
    );

    let opts = Arc::clone(options);
    let client = http.clone();
    registry.upstream.register(
        |options| options.mirror.enabled && options.mirror.legacy,
        move || -> Arc<dyn UpstreamClient> {
            match opts.mirror.package_source.clone() {
                Some(source) => Arc::new(V2UpstreamClient::new(client, source)),
                // Unreachable after validation; mirroring without a source
                // behaves as disabled rather than panicking.
                None => Arc::new(DisabledUpstream),
            }
        },
    );

    let opts = Arc::clone(options);
    let client = http.clone();
    registry.upstream.register(
        |options| options.mirror.enabled,
        move || -> Arc<dyn UpstreamClient> {
            match opts.mirror.package_source.clone() {
                Some(source) => Arc::new(V3UpstreamClient::new(client, source)),
                None => Arc::new(DisabledUpstream),
            }
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::shared_http_client;
    use serde_json::json;

    fn bootstrap_registry(raw: serde_json::Value) -> (ServiceRegistry, Arc<AppOptions>) {
        let options: AppOptions = serde_json::from_value(raw).unwrap();
        let options = Arc::new(options);
        let http = shared_http_client(&options.mirror).unwrap();
        let mut registry = ServiceRegistry::new();
        register_default_providers(&mut registry, &options, &http);
        (registry, options)
    }

    #[test]
    fn storage_type_selects_the_matching_store() {
        let (mut registry, options) =
            bootstrap_registry(json!({"storage": {"type": "filesystem", "path": "/tmp/pkgs"}}));
        assert_eq!(registry.storage.resolve(&options).unwrap().name(), "filesystem");

        let (mut registry, options) = bootstrap_registry(json!({"storage": {"type": "null"}}));
        assert_eq!(registry.storage.resolve(&options).unwrap().name(), "null");

        let (mut registry, options) = bootstrap_registry(json!({"storage": {"type": "AwsS3"}}));
        assert!(registry.storage.resolve(&options).is_none());
    }

    #[test]
    fn upstream_selection_is_a_three_way_switch() {
        let (mut registry, options) = bootstrap_registry(json!({"mirror": {"enabled": false}}));
        assert_eq!(registry.upstream.resolve(&options).unwrap().name(), "disabled");

        let source = "https://upstream.example/v3/index.json";
        let (mut registry, options) = bootstrap_registry(
            json!({"mirror": {"enabled": true, "legacy": true, "packagesource": source}}),
        );
        assert_eq!(registry.upstream.resolve(&options).unwrap().name(), "v2");

        let (mut registry, options) =
            bootstrap_registry(json!({"mirror": {"enabled": true, "packagesource": source}}));
        assert_eq!(registry.upstream.resolve(&options).unwrap().name(), "v3");
    }

    #[test]
    fn explicit_null_search_matches_the_declared_provider() {
        let (mut registry, options) = bootstrap_registry(json!({"search": {"type": "null"}}));
        assert_eq!(registry.search.resolve(&options).unwrap().name(), "null");
        assert_eq!(registry.search_indexer.resolve(&options).unwrap().name(), "null");

        // The default search type leaves the capability for the fallback
        // composer.
        let (registry, options) = bootstrap_registry(json!({}));
        assert!(!registry.search.would_resolve(&options));
    }
}
