// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Chart release download and extraction

use crate::config::Config;
use crate::constants::chart;
use crate::error::{Error, Result};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use semver::Version;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tar::Archive;
use tempfile::TempDir;
use tracing::{debug, info, instrument};
use url::Url;

/// An extracted chart release on local disk.
///
/// The directory is removed when this value is dropped or closed.
#[derive(Debug)]
pub struct ArtifactDirectory {
    root: TempDir,
    crd_dir: PathBuf,
}

impl ArtifactDirectory {
    /// Wrap an extracted chart; CRDs are expected under `<root>/<chart_name>/crds`
    pub fn new(root: TempDir, chart_name: &str) -> Self {
        let crd_dir = root.path().join(chart_name).join(chart::CRD_DIR);
        Self { root, crd_dir }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn crd_dir(&self) -> &Path {
        &self.crd_dir
    }

    /// Remove the directory now, reporting any failure
    pub fn close(self) -> Result<()> {
        let path = self.root.path().to_path_buf();
        self.root
            .close()
            .map_err(|source| Error::Io { path, source })
    }
}

/// Source of chart releases
#[async_trait]
pub trait ArtifactProvider: Send + Sync {
    async fn fetch_release(&self, version: &Version) -> Result<ArtifactDirectory>;
}

#[derive(Debug, Deserialize)]
struct ChartIndex {
    #[serde(default)]
    entries: HashMap<String, Vec<ChartEntry>>,
}

#[derive(Debug, Deserialize)]
struct ChartEntry {
    version: String,
    #[serde(default)]
    urls: Vec<String>,
}

/// Downloads chart releases from a Helm chart repository
pub struct HelmRepositoryProvider {
    http: reqwest::Client,
    repository: Url,
    chart_name: String,
}

impl HelmRepositoryProvider {
    pub fn new(repository: Url, chart_name: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            repository: with_trailing_slash(repository),
            chart_name: chart_name.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.chart_repository.clone(), config.chart_name.clone())
    }

    async fn get_bytes(&self, url: &Url, version: &Version) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(version, format!("request to {} failed: {}", url, e)))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(version, format!("reading {} failed: {}", url, e)))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ArtifactProvider for HelmRepositoryProvider {
    #[instrument(skip(self, version), fields(chart = %self.chart_name, version = %version))]
    async fn fetch_release(&self, version: &Version) -> Result<ArtifactDirectory> {
        let index_url = self
            .repository
            .join(chart::INDEX_FILE)
            .map_err(|e| fetch_error(version, e.to_string()))?;
        let index = self.get_bytes(&index_url, version).await?;

        let chart_url = resolve_chart_url(&index, &self.repository, &self.chart_name, version)?;
        info!("Downloading {} {} from {}", self.chart_name, version, chart_url);

        let archive = self.get_bytes(&chart_url, version).await?;
        extract_chart(&archive, &self.chart_name, version)
    }
}

fn fetch_error(version: &Version, reason: impl Into<String>) -> Error {
    Error::ArtifactFetch {
        version: version.to_string(),
        reason: reason.into(),
    }
}

// Url::join drops the last path segment unless the base ends with '/'
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Find the archive URL of `chart` at `version` in a repository `index.yaml`
fn resolve_chart_url(index: &[u8], repository: &Url, chart: &str, version: &Version) -> Result<Url> {
    let index: ChartIndex = serde_yaml::from_slice(index)
        .map_err(|e| fetch_error(version, format!("invalid repository index: {}", e)))?;

    let entry = index
        .entries
        .get(chart)
        .into_iter()
        .flatten()
        .find(|e| {
            let listed = e.version.trim_start_matches('v');
            Version::parse(listed).is_ok_and(|v| &v == version)
        })
        .ok_or_else(|| fetch_error(version, format!("chart {} has no release {}", chart, version)))?;

    let url = entry
        .urls
        .first()
        .ok_or_else(|| fetch_error(version, "release entry lists no download URL"))?;

    // Relative URLs are relative to the repository
    repository
        .join(url)
        .map_err(|e| fetch_error(version, format!("invalid chart URL {}: {}", url, e)))
}

/// Unpack a gzipped chart tarball into a fresh temporary directory
fn extract_chart(archive: &[u8], chart_name: &str, version: &Version) -> Result<ArtifactDirectory> {
    let root = tempfile::Builder::new()
        .prefix("k8ssandra-chart-")
        .tempdir()
        .map_err(|e| fetch_error(version, format!("creating extraction directory failed: {}", e)))?;

    let mut tarball = Archive::new(GzDecoder::new(Cursor::new(archive)));
    tarball
        .unpack(root.path())
        .map_err(|e| fetch_error(version, format!("extracting chart failed: {}", e)))?;

    debug!("Extracted {} {} to {}", chart_name, version, root.path().display());
    Ok(ArtifactDirectory::new(root, chart_name))
}
