//! Upstream mirroring capability and the shared HTTP client behind it.
//!
//! One long-lived blocking client is built at bootstrap with the mirror
//! timeout, automatic gzip/deflate decompression, and pre-computed upstream
//! credentials; every upstream client clones it instead of opening fresh
//! connections per call. There is no cancellation beyond the per-call
//! timeout.

use crate::config::MirrorOptions;
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use std::time::Duration;
use url::Url;

/// Abstract upstream package feed.
pub trait UpstreamClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// The configured feed, absent when mirroring is off.
    fn package_source(&self) -> Option<&Url>;

    /// Fetch a package archive; `Ok(None)` when the upstream does not have
    /// it (or mirroring is disabled).
    fn download_package(&self, id: &str, version: &str) -> Result<Option<Vec<u8>>>;
}

/// Build the shared client from the bound mirror options.
pub fn shared_http_client(mirror: &MirrorOptions) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let (Some(username), Some(password)) = (&mirror.username, &mirror.password) {
        if !username.is_empty() && !password.is_empty() {
            let token = BASE64.encode(format!("{username}:{password}"));
            let mut value = HeaderValue::from_str(&format!("Basic {token}"))
                .context("building upstream authorization header")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
    }

    Client::builder()
        .timeout(Duration::from_secs(mirror.package_download_timeout_seconds))
        .gzip(true)
        .deflate(true)
        .user_agent(concat!("packdock/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .build()
        .context("building shared upstream HTTP client")
}

/// Mirroring switched off: every lookup misses without touching the network.
pub struct DisabledUpstream;

impl UpstreamClient for DisabledUpstream {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn package_source(&self) -> Option<&Url> {
        None
    }

    fn download_package(&self, _id: &str, _version: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Legacy v2 protocol client (`package/{id}/{version}` download path).
pub struct V2UpstreamClient {
    http: Client,
    source: Url,
}

impl V2UpstreamClient {
    pub fn new(http: Client, source: Url) -> Self {
        Self { http, source }
    }

    fn download_url(&self, id: &str, version: &str) -> Result<Url> {
        join_feed_path(&self.source, &["package", &id.to_lowercase(), version])
    }
}

impl UpstreamClient for V2UpstreamClient {
    fn name(&self) -> &'static str {
        "v2"
    }

    fn package_source(&self) -> Option<&Url> {
        Some(&self.source)
    }

    fn download_package(&self, id: &str, version: &str) -> Result<Option<Vec<u8>>> {
        fetch_bytes(&self.http, self.download_url(id, version)?)
    }
}

/// v3 protocol client using the flat-container layout
/// (`{id}/{version}/{id}.{version}.nupkg`, identifiers lowercased).
pub struct V3UpstreamClient {
    http: Client,
    source: Url,
}

impl V3UpstreamClient {
    pub fn new(http: Client, source: Url) -> Self {
        Self { http, source }
    }

    fn download_url(&self, id: &str, version: &str) -> Result<Url> {
        let id = id.to_lowercase();
        let version = version.to_lowercase();
        let file = format!("{id}.{version}.nupkg");
        join_feed_path(&self.source, &[&id, &version, &file])
    }
}

impl UpstreamClient for V3UpstreamClient {
    fn name(&self) -> &'static str {
        "v3"
    }

    fn package_source(&self) -> Option<&Url> {
        Some(&self.source)
    }

    fn download_package(&self, id: &str, version: &str) -> Result<Option<Vec<u8>>> {
        fetch_bytes(&self.http, self.download_url(id, version)?)
    }
}

fn join_feed_path(source: &Url, segments: &[&str]) -> Result<Url> {
    // Feeds are often configured as their index document
    // (`.../v3/index.json`); package paths attach to the directory above it.
    let trailing_index = source
        .path_segments()
        .and_then(|mut path| path.next_back().map(str::to_string))
        .is_some_and(|last| last.ends_with(".json"));

    let mut url = source.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("mirror package source '{source}' cannot take a path"))?;
        path.pop_if_empty();
        if trailing_index {
            path.pop();
        }
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

fn fetch_bytes(http: &Client, url: Url) -> Result<Option<Vec<u8>>> {
    let response = http
        .get(url.clone())
        .send()
        .with_context(|| format!("requesting {url}"))?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let response = response
        .error_for_status()
        .with_context(|| format!("fetching {url}"))?;
    let bytes = response
        .bytes()
        .with_context(|| format!("reading body of {url}"))?;
    Ok(Some(bytes.to_vec()))
}
