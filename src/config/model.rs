//! Typed option bundles bound from the merged configuration tree.
//!
//! One struct per configuration section. Every bundle is `#[serde(default)]`
//! so operators only spell out what they change; multi-word keys carry a
//! lowercase alias because the loader folds all keys to lowercase before
//! binding (`Storage:PackageSource` and `storage.package_source` bind to the
//! same field).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

/// Root options snapshot covering every section the bootstrap consumes.
///
/// Constructed once at startup from the merged configuration sources and
/// treated as immutable afterwards; components receive it by reference.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppOptions {
    pub server: ServerOptions,
    pub database: DatabaseOptions,
    pub storage: StorageOptions,
    pub mirror: MirrorOptions,
    pub search: SearchOptions,
    pub statistics: StatisticsOptions,
    pub authentication: AuthenticationOptions,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerOptions {
    /// Realm announced in the `WWW-Authenticate` challenge header.
    pub realm: String,
    /// Bind URLs, consumed by the embedding web host rather than this crate.
    pub urls: Option<String>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            realm: "Package Server".to_string(),
            urls: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    #[serde(rename = "type")]
    pub database_type: String,
    #[serde(alias = "connectionstring")]
    pub connection_string: String,
}

impl DatabaseOptions {
    /// Whether the operator asked for a database capability at all.
    ///
    /// Drives the fallback composer's choice between the no-op search
    /// default and the deferred database-backed search.
    pub fn is_configured(&self) -> bool {
        let kind = self.database_type.trim();
        !kind.is_empty() && !kind.eq_ignore_ascii_case("none")
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    pub path: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MirrorOptions {
    pub enabled: bool,
    /// Selects the legacy v2 upstream protocol instead of v3.
    pub legacy: bool,
    #[serde(alias = "packagesource")]
    pub package_source: Option<Url>,
    #[serde(alias = "packagedownloadtimeoutseconds")]
    pub package_download_timeout_seconds: u64,
    /// Optional credentials for the upstream feed, attached to every
    /// outbound request by the shared HTTP client.
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            legacy: false,
            package_source: None,
            package_download_timeout_seconds: 600,
            username: None,
            password: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    #[serde(rename = "type")]
    pub search_type: SearchType,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            // Unconfigured deployments lean on the fallback composer, which
            // picks database-backed search only when a database was chosen.
            search_type: SearchType::Database,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatisticsOptions {
    pub enabled: bool,
    /// Path or URL of the downloads report consumed by `import-downloads`.
    #[serde(alias = "downloadssource")]
    pub downloads_source: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthenticationOptions {
    pub username: String,
    pub password: String,
}

impl AuthenticationOptions {
    /// Both credentials blank (or the section absent entirely) means the
    /// deployment intentionally runs in anonymous mode.
    pub fn is_anonymous(&self) -> bool {
        self.username.trim().is_empty() && self.password.trim().is_empty()
    }
}

/// Storage backend selector.
///
/// Known variants keep matching case-insensitive; `Other` preserves values
/// an embedding application may claim with its own provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StorageType {
    FileSystem,
    Null,
    Other(String),
}

impl Default for StorageType {
    fn default() -> Self {
        StorageType::FileSystem
    }
}

impl StorageType {
    pub fn as_str(&self) -> &str {
        match self {
            StorageType::FileSystem => "filesystem",
            StorageType::Null => "null",
            StorageType::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "filesystem" => StorageType::FileSystem,
            "null" => StorageType::Null,
            _ => StorageType::Other(value.to_string()),
        }
    }
}

/// Search backend selector; `Null` is an explicit operator opt-out that
/// beats every fallback.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SearchType {
    Null,
    Database,
    Other(String),
}

impl SearchType {
    pub fn as_str(&self) -> &str {
        match self {
            SearchType::Null => "null",
            SearchType::Database => "database",
            SearchType::Other(value) => value.as_str(),
        }
    }

    fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "null" => SearchType::Null,
            "database" => SearchType::Database,
            _ => SearchType::Other(value.to_string()),
        }
    }
}

impl Serialize for StorageType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StorageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}

impl Serialize for SearchType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SearchType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_str(&value))
    }
}
