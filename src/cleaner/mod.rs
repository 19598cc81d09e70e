// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Removal of release-owned resources ahead of a Helm uninstall.
//!
//! Deleting a CassandraDatacenter only requests deletion: cass-operator is
//! expected to drop its finalizers and reap the pods, services and volumes
//! it created. Nothing here waits for that to happen.

pub mod ownership;

use crate::error::{Error, Result};
use crate::kubernetes::{ResourceClient, ResourceKind};
use crate::types::{CassandraBackup, CassandraDatacenter};
use kube::api::DynamicObject;
use kube::ResourceExt;
use ownership::{instance_selector, is_owned_by_release, managed_by_selector, validate_release_name};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Names of the resources deleted by one cleanup run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    pub datacenters: Vec<String>,
    pub backups: Vec<String>,
}

impl RemovalReport {
    pub fn is_empty(&self) -> bool {
        self.datacenters.is_empty() && self.backups.is_empty()
    }
}

/// Deletes the resources a Helm pre-delete hook must get rid of
pub struct ReleaseCleaner<C> {
    client: Arc<C>,
    namespace: Option<String>,
}

impl<C: ResourceClient> ReleaseCleaner<C> {
    /// `namespace` of `None` searches every namespace the client can see
    pub fn new(client: Arc<C>, namespace: Option<String>) -> Self {
        Self { client, namespace }
    }

    /// Delete every CassandraDatacenter owned by `release`, along with its backups.
    ///
    /// Stops at the first failure; deletions already issued are not undone.
    #[instrument(skip(self), fields(namespace = self.namespace.as_deref().unwrap_or("*")))]
    pub async fn remove_resources(&self, release: &str) -> Result<RemovalReport> {
        validate_release_name(release)?;

        info!(
            "Removing CassandraDatacenter(s) managed in release {} from namespace {}",
            release,
            self.namespace.as_deref().unwrap_or("<all>")
        );

        // Annotations can't be filtered server side, so list everything Helm manages
        let datacenters = self
            .client
            .list(
                &ResourceKind::of::<CassandraDatacenter>(),
                self.namespace.as_deref(),
                &managed_by_selector(),
            )
            .await?;

        let mut report = RemovalReport::default();
        for dc in datacenters {
            let name = dc.name_any();
            if !is_owned_by_release(&dc.metadata, release) {
                debug!("CassandraDatacenter {} is not part of release {}, skipping", name, release);
                continue;
            }

            self.client.delete(&dc).await?;
            report.datacenters.push(name);

            let backups = self.remove_backups(&dc, release).await?;
            report.backups.extend(backups);
        }

        info!(
            "Removed {} CassandraDatacenter(s) and {} CassandraBackup(s) of release {}",
            report.datacenters.len(),
            report.backups.len(),
            release
        );
        Ok(report)
    }

    /// Delete the backups of a removed datacenter. Both the release label and the
    /// datacenter reference must match.
    async fn remove_backups(&self, datacenter: &DynamicObject, release: &str) -> Result<Vec<String>> {
        let dc_name = datacenter.name_any();
        let namespace = datacenter.namespace().or_else(|| self.namespace.clone());

        let candidates = self
            .client
            .list(
                &ResourceKind::of::<CassandraBackup>(),
                namespace.as_deref(),
                &instance_selector(release),
            )
            .await?;

        let mut removed = Vec::new();
        for obj in candidates {
            let name = obj.name_any();
            let backup: CassandraBackup =
                obj.clone().try_parse().map_err(|e| Error::Decode {
                    kind: "CassandraBackup".to_string(),
                    name: name.clone(),
                    reason: e.to_string(),
                })?;

            if !backup.belongs_to(&dc_name) {
                debug!(
                    "CassandraBackup {} belongs to {:?}, not {}, skipping",
                    name,
                    backup.parent_datacenter(),
                    dc_name
                );
                continue;
            }

            self.client.delete(&obj).await?;
            removed.push(name);
        }

        Ok(removed)
    }
}
