// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Install or update the CRDs bundled with a chart release, for use in a
//! Helm pre-upgrade hook (Helm itself never upgrades CRDs).

pub mod artifact;
pub mod documents;

use crate::error::{Error, Result};
use crate::kubernetes::ResourceClient;
use artifact::{ArtifactDirectory, ArtifactProvider};
use kube::api::DynamicObject;
use kube::ResourceExt;
use semver::Version;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Stages of a single upgrade run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradePhase {
    Fetching,
    Parsing,
    Reconciling,
    Done,
    Failed,
}

impl fmt::Display for UpgradePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpgradePhase::Fetching => "fetching",
            UpgradePhase::Parsing => "parsing",
            UpgradePhase::Reconciling => "reconciling",
            UpgradePhase::Done => "done",
            UpgradePhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Names of the definitions applied by one upgrade run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpgradeReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
}

impl UpgradeReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len()
    }
}

enum Applied {
    Created,
    Updated,
}

pub struct DefinitionUpgrader<C, P> {
    client: Arc<C>,
    provider: P,
}

impl<C: ResourceClient, P: ArtifactProvider> DefinitionUpgrader<C, P> {
    pub fn new(client: Arc<C>, provider: P) -> Self {
        Self { client, provider }
    }

    /// Create or replace every resource definition shipped in chart release `target_version`.
    ///
    /// The downloaded chart is removed before returning, whatever the outcome.
    /// The first failure aborts the run; definitions applied before it stay applied.
    #[instrument(skip(self))]
    pub async fn upgrade(&self, target_version: &str) -> Result<UpgradeReport> {
        let version = Version::parse(target_version).map_err(|source| Error::InvalidVersion {
            version: target_version.to_string(),
            source,
        })?;

        let mut phase = UpgradePhase::Fetching;
        info!(%phase, "Fetching chart release {}", version);
        let artifact = match self.provider.fetch_release(&version).await {
            Ok(artifact) => artifact,
            Err(e) => return Err(Self::failed(phase, e)),
        };

        let result = self.apply_artifact(&artifact, &mut phase).await;

        let path = artifact.path().to_path_buf();
        if let Err(e) = artifact.close() {
            warn!("Failed to remove chart directory {}: {}", path.display(), e);
        }

        match result {
            Ok(report) => {
                info!(
                    phase = %UpgradePhase::Done,
                    "Applied {} resource definition(s) from {}: {} created, {} updated",
                    report.total(),
                    version,
                    report.created.len(),
                    report.updated.len()
                );
                Ok(report)
            }
            Err(e) => Err(Self::failed(phase, e)),
        }
    }

    async fn apply_artifact(
        &self,
        artifact: &ArtifactDirectory,
        phase: &mut UpgradePhase,
    ) -> Result<UpgradeReport> {
        *phase = UpgradePhase::Parsing;
        info!(%phase, "Reading resource definitions from {}", artifact.crd_dir().display());
        // Everything is parsed before anything is applied
        let definitions = documents::load_directory(artifact.crd_dir())?;

        *phase = UpgradePhase::Reconciling;
        info!(%phase, "Applying {} resource definition(s)", definitions.len());
        let mut report = UpgradeReport::default();
        for definition in &definitions {
            match self.apply(definition).await? {
                Applied::Created => report.created.push(definition.name_any()),
                Applied::Updated => report.updated.push(definition.name_any()),
            }
        }

        Ok(report)
    }

    /// Create the definition, replacing it instead if it already exists
    async fn apply(&self, definition: &DynamicObject) -> Result<Applied> {
        match self.client.create(definition).await {
            Ok(()) => Ok(Applied::Created),
            Err(e) if e.is_already_exists() => {
                self.client.update(definition).await?;
                Ok(Applied::Updated)
            }
            Err(e) => Err(e),
        }
    }

    fn failed(phase: UpgradePhase, e: Error) -> Error {
        error!(phase = %UpgradePhase::Failed, "Upgrade failed while {}: {}", phase, e);
        e
    }
}
