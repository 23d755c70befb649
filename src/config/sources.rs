//! Configuration sources: file, environment overrides, and secrets files.
//!
//! The merged result is a plain JSON tree with every object key folded to
//! lowercase, ready for schema validation and typed binding. Later sources
//! win: file < environment < secrets directory.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// File name looked up inside the configuration root.
pub const CONFIG_FILE_NAME: &str = "packdock.json";

/// Environment variable overriding the configuration root directory.
pub const CONFIG_ROOT_ENV: &str = "PACKDOCK_CONFIG_ROOT";

/// Prefix for per-key environment overrides (`PACKDOCK__STORAGE__TYPE`).
pub const CONFIG_ENV_PREFIX: &str = "PACKDOCK__";

/// Conventional secrets directory; each file is one configuration key.
pub const DEFAULT_SECRETS_DIR: &str = "/run/secrets";

/// Resolve the configuration root directory.
///
/// Explicit override first, then `PACKDOCK_CONFIG_ROOT`, then the current
/// directory. The root is not required to exist; a missing config file is
/// treated as an empty tree because overrides and secrets may carry the
/// whole configuration.
pub fn resolve_config_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(root) = explicit {
        return root.to_path_buf();
    }
    if let Ok(root) = env::var(CONFIG_ROOT_ENV) {
        if !root.trim().is_empty() {
            return PathBuf::from(root);
        }
    }
    PathBuf::from(".")
}

/// Load and merge every configuration source into one normalized tree.
pub fn load_configuration(config_root: Option<&Path>, secrets_dir: Option<&Path>) -> Result<Value> {
    let root = resolve_config_root(config_root);
    let mut tree = load_config_file(&root.join(CONFIG_FILE_NAME))?;

    apply_env_overrides(&mut tree, env::vars());

    let secrets = secrets_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_DIR));
    apply_secrets_overlay(&mut tree, &secrets)?;

    Ok(tree)
}

fn load_config_file(path: &Path) -> Result<Value> {
    if !path.is_file() {
        return Ok(Value::Object(Map::new()));
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading configuration {}", path.display()))?;
    let value: Value = serde_json::from_str(&data)
        .with_context(|| format!("parsing configuration {}", path.display()))?;
    Ok(normalize_keys(value))
}

/// Fold every object key to lowercase, recursively.
///
/// Section and key names are case-insensitive by contract; when two keys
/// collide after folding, the later one wins.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut folded = Map::new();
            for (key, inner) in map {
                folded.insert(key.to_lowercase(), normalize_keys(inner));
            }
            Value::Object(folded)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Apply `PACKDOCK__SECTION__KEY=value` environment overrides.
pub fn apply_env_overrides(tree: &mut Value, vars: impl Iterator<Item = (String, String)>) {
    for (name, raw) in vars {
        let Some(stripped) = name.strip_prefix(CONFIG_ENV_PREFIX) else {
            continue;
        };
        let segments: Vec<String> = stripped
            .split("__")
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect();
        if segments.is_empty() {
            continue;
        }
        let value = coerce_scalar(&segments, &raw);
        set_config_path(tree, &segments, value);
    }
}

/// Overlay a key-per-file secrets directory, if it exists.
///
/// File names use `:` or `__` as the section separator
/// (`Authentication__Password`); contents are trimmed so trailing newlines
/// from secret tooling do not leak into credentials.
pub fn apply_secrets_overlay(tree: &mut Value, dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = fs::read_dir(dir)
        .with_context(|| format!("reading secrets directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading secret {}", path.display()))?;
        let segments: Vec<String> = name
            .replace("__", ":")
            .split(':')
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect();
        if segments.is_empty() {
            continue;
        }
        let value = coerce_scalar(&segments, content.trim_end());
        set_config_path(tree, &segments, value);
    }
    Ok(())
}

/// Interpret an env/secret string as the JSON type its destination binds to.
///
/// Env and secrets sources are stringly typed; without coercion a secret
/// holding `true` could never bind to a boolean option. Coercion is limited
/// to keys the schema declares as boolean or integer so a credential that
/// merely looks like one (`12345`, `true`) survives verbatim.
fn coerce_scalar(segments: &[String], raw: &str) -> Value {
    match declared_type(segments) {
        Some("boolean") => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        Some("integer") => raw
            .parse::<i64>()
            .map(|number| Value::Number(number.into()))
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}

/// Scalar type the embedded schema declares for a configuration path.
fn declared_type(segments: &[String]) -> Option<&'static str> {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    let schema = SCHEMA.get_or_init(|| {
        serde_json::from_str(crate::config::validate::CONFIG_SCHEMA).unwrap_or(Value::Null)
    });
    let mut cursor = schema;
    for segment in segments {
        cursor = cursor.get("properties")?.get(segment.as_str())?;
    }
    match cursor.get("type")?.as_str()? {
        "boolean" => Some("boolean"),
        "integer" => Some("integer"),
        _ => None,
    }
}

fn set_config_path(tree: &mut Value, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut cursor = tree;
    for segment in parents {
        // Scalars in the way are replaced; an override naming a deeper key
        // wins over a flat value from an earlier source.
        if !cursor.is_object() {
            *cursor = Value::Object(Map::new());
        }
        let Value::Object(map) = cursor else {
            return;
        };
        cursor = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !cursor.is_object() {
        *cursor = Value::Object(Map::new());
    }
    if let Value::Object(map) = cursor {
        map.insert(last.clone(), value);
    }
}
