//! Configuration wiring: sources, typed binding, and startup validation.
//!
//! The flow is load → normalize → schema-validate → bind → semantic-validate,
//! run exactly once at bootstrap. The resulting [`AppOptions`] snapshot is
//! immutable; every predicate and factory reads from it instead of ambient
//! global state.

pub mod model;
pub mod sources;
pub mod validate;

pub use model::{
    AppOptions, AuthenticationOptions, DatabaseOptions, MirrorOptions, SearchOptions, SearchType,
    ServerOptions, StatisticsOptions, StorageOptions, StorageType,
};
pub use sources::{
    CONFIG_ENV_PREFIX, CONFIG_FILE_NAME, CONFIG_ROOT_ENV, DEFAULT_SECRETS_DIR, load_configuration,
    normalize_keys, resolve_config_root,
};
pub use validate::{require_valid, validate_options, validate_raw_configuration};

use anyhow::{Context, Result};
use serde_json::Value;

/// Bind the normalized raw tree into the typed options snapshot.
pub fn bind_options(raw: &Value) -> Result<AppOptions> {
    serde_json::from_value(raw.clone()).context("binding configuration to typed options")
}
