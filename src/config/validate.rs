//! Startup validation for the merged configuration.
//!
//! Two passes, both aggregating every violation instead of stopping at the
//! first so an operator sees the whole misconfiguration in one run: a
//! structural pass over the raw tree against the embedded JSON Schema, then
//! a semantic pass over the bound option bundles. A non-empty report is
//! fatal; no capability factory runs against an invalid bundle.

use crate::config::model::{AppOptions, StorageType};
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

pub(crate) const CONFIG_SCHEMA: &str = include_str!("../../schema/config.schema.json");

/// Validate the normalized raw tree against the embedded schema.
///
/// Returns one message per violation; compiling the embedded schema can only
/// fail if the crate ships a broken schema file, which is an error rather
/// than a report entry.
pub fn validate_raw_configuration(raw: &Value) -> Result<Vec<String>> {
    let schema: Value =
        serde_json::from_str(CONFIG_SCHEMA).context("parsing embedded configuration schema")?;
    // The compile error borrows `schema`, so it cannot ride through
    // anyhow's context directly; format it into an owned error instead.
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("compiling embedded configuration schema: {err}"))?;

    let mut report = Vec::new();
    if let Err(errors) = compiled.validate(raw) {
        for error in errors {
            report.push(format!("configuration{}: {}", error.instance_path, error));
        }
    }
    Ok(report)
}

/// Semantic cross-field rules the schema cannot express.
pub fn validate_options(options: &AppOptions) -> Vec<String> {
    let mut report = Vec::new();

    if options.storage.storage_type == StorageType::FileSystem
        && options.storage.path.trim().is_empty()
    {
        report.push("storage.path is required when storage.type is 'filesystem'".to_string());
    }

    if options.mirror.enabled {
        if options.mirror.package_source.is_none() {
            report.push("mirror.package_source is required when mirroring is enabled".to_string());
        }
        if options.mirror.package_download_timeout_seconds == 0 {
            report.push(
                "mirror.package_download_timeout_seconds must be at least 1 second".to_string(),
            );
        }
    }

    if options.database.is_configured() && options.database.connection_string.trim().is_empty() {
        report.push(format!(
            "database.connection_string is required when database.type is '{}'",
            options.database.database_type.trim()
        ));
    }

    report
}

/// Fail startup with every collected violation in one message.
pub fn require_valid(report: Vec<String>) -> Result<()> {
    if report.is_empty() {
        return Ok(());
    }
    bail!("configuration failed validation:\n{}", report.join("\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::AppOptions;
    use serde_json::json;

    fn bind(raw: Value) -> AppOptions {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn embedded_schema_compiles_and_accepts_a_clean_tree() {
        let raw = json!({"storage": {"type": "filesystem", "path": "/tmp/pkgs"}});
        assert!(validate_raw_configuration(&raw).unwrap().is_empty());
    }

    #[test]
    fn schema_rejects_wrongly_typed_sections() {
        let raw = json!({"mirror": {"enabled": "yes"}, "storage": "filesystem"});
        let report = validate_raw_configuration(&raw).unwrap();
        assert_eq!(report.len(), 2, "unexpected report: {report:?}");
    }

    #[test]
    fn filesystem_storage_requires_a_path() {
        let options = bind(json!({"storage": {"type": "filesystem"}}));
        let report = validate_options(&options);
        assert_eq!(report.len(), 1);
        assert!(report[0].contains("storage.path"));

        let options = bind(json!({"storage": {"type": "null"}}));
        assert!(validate_options(&options).is_empty());
    }

    #[test]
    fn violations_are_aggregated_not_short_circuited() {
        let options = bind(json!({
            "storage": {"type": "filesystem"},
            "mirror": {"enabled": true, "packagedownloadtimeoutseconds": 0},
            "database": {"type": "sqlite"}
        }));
        let report = validate_options(&options);
        assert_eq!(report.len(), 4, "unexpected report: {report:?}");
        let joined = report.join("\n");
        assert!(joined.contains("storage.path"));
        assert!(joined.contains("mirror.package_source"));
        assert!(joined.contains("timeout"));
        assert!(joined.contains("database.connection_string"));
    }

    #[test]
    fn require_valid_carries_every_message() {
        let err = require_valid(vec!["first".to_string(), "second".to_string()]).unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("first"));
        assert!(text.contains("second"));
    }
}
