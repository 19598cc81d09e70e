// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Helm's ownership markers on the resources it installs
pub mod helm {
    /// Label set on every resource installed by Helm
    pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
    pub const MANAGED_BY_VALUE: &str = "Helm";
    /// Annotation naming the release that installed the resource
    pub const RELEASE_NAME_ANNOTATION: &str = "meta.helm.sh/release-name";
    /// Label carrying the release name on chart-templated resources
    pub const INSTANCE_LABEL: &str = "app.kubernetes.io/instance";
    /// Helm refuses release names longer than this
    pub const MAX_RELEASE_NAME_LEN: usize = 53;
}

/// Chart repository defaults
pub mod chart {
    pub const DEFAULT_REPOSITORY: &str = "https://helm.k8ssandra.io/stable";
    pub const DEFAULT_NAME: &str = "k8ssandra";
    /// Directory inside the chart holding the CRD manifests
    pub const CRD_DIR: &str = "crds";
    pub const INDEX_FILE: &str = "index.yaml";
}
