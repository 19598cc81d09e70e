// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid release name '{name}': {reason}")]
    InvalidReleaseName { name: String, reason: String },

    #[error("Invalid target version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Failed to fetch chart release {version}: {reason}")]
    ArtifactFetch { version: String, reason: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: String, name: String },

    #[error("Failed to {operation} {kind} '{name}': {source}")]
    ClientOperation {
        operation: &'static str,
        kind: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Resource type {api_version}/{kind} is not registered with the client")]
    UnknownResourceKind { api_version: String, kind: String },

    #[error("Failed to decode {kind} '{name}': {reason}")]
    Decode {
        kind: String,
        name: String,
        reason: String,
    },

    #[error("No namespace available for namespaced {kind} '{name}'")]
    MissingNamespace { kind: String, name: String },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid resource document in {}: {reason}", path.display())]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to configure Kubernetes client: {0}")]
    Kubeconfig(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
}

impl Error {
    /// True when a create was rejected because the object is already present
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
