// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// A Medusa backup of a single CassandraDatacenter.
///
/// The owning datacenter is referenced by name in `spec.cassandraDatacenter`
/// rather than through an owner reference.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(
    group = "cassandra.k8ssandra.io",
    version = "v1alpha1",
    kind = "CassandraBackup"
)]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct CassandraBackupSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cassandra_datacenter: Option<String>,
    #[serde(rename = "backupType", skip_serializing_if = "Option::is_none")]
    pub backup_type: Option<String>,
}

impl CassandraBackup {
    /// Name of the datacenter this backup was taken from
    pub fn parent_datacenter(&self) -> Option<&str> {
        self.spec.cassandra_datacenter.as_deref()
    }

    /// Check whether this backup references the given datacenter
    pub fn belongs_to(&self, datacenter: &str) -> bool {
        self.parent_datacenter() == Some(datacenter)
    }
}
