//! Fallback composer: two ordered passes appended after every explicit
//! registration.
//!
//! Pass A supplies the plain defaults, pass B the deferred database-backed
//! search. The passes never interleave, and pass B runs last in the whole
//! process, which is what makes the precedence auditable:
//!
//! 1. an explicit search candidate was registered earlier, so it wins;
//! 2. only a database was chosen: pass A's no-op default declines (its
//!    predicate requires "no database"), pass B's database-backed search
//!    activates;
//! 3. neither was chosen: pass A's no-op matches and wins over pass B purely
//!    by registration order.
//!
//! Each candidate is appended only when the capability is still unresolved
//! under the current configuration, checked without running any factory.

use crate::config::AppOptions;
use crate::provider::ServiceRegistry;
use crate::services::{DatabaseSearch, NullContext, NullSearch, NullSearchIndexer, PackageContext};
use std::sync::Arc;

/// Pass A: plain defaults with no cross-capability dependency.
pub fn register_plain_defaults(registry: &mut ServiceRegistry, options: &AppOptions) {
    if !registry.context.would_resolve(options) {
        registry.context.register(|_| true, || Arc::new(NullContext));
    }

    if !registry.search.would_resolve(options) {
        registry.search.register(
            |options| !options.database.is_configured(),
            || Arc::new(NullSearch),
        );
    }

    if !registry.search_indexer.would_resolve(options) {
        registry.search_indexer.register(
            |options| !options.database.is_configured(),
            || Arc::new(NullSearchIndexer),
        );
    }
}

/// Pass B: the deferred compound rule.
///
/// One database-backed search instance satisfies both the search-service
/// and the search-indexer capability. It is registered unconditionally,
/// regardless of whether a database was explicitly requested for other
/// purposes, and last, so everything registered earlier takes precedence.
/// The context is materialized between the passes so both factories share
/// it.
pub fn register_deferred_search(
    registry: &mut ServiceRegistry,
    options: &AppOptions,
    context: Arc<dyn PackageContext>,
) {
    let shared = Arc::new(DatabaseSearch::new(context));

    if !registry.search.would_resolve(options) {
        let instance = Arc::clone(&shared);
        registry.search.register(|_| true, move || instance);
    }

    if !registry.search_indexer.would_resolve(options) {
        let instance = shared;
        registry.search_indexer.register(|_| true, move || instance);
    }
}
