// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes access: the resource client capability and its type registry.

pub mod client;
pub mod registry;

pub use client::{label_selector, load_kube_config, KubeResourceClient, ResourceClient};
pub use registry::{ResourceKind, ResourceRegistry, ResourceType};
