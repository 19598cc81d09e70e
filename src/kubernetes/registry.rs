// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types a client is allowed to operate on.
//!
//! The registry is built by the caller and handed to the client constructor,
//! so the set of recognised kinds is always explicit.

use crate::error::{Error, Result};
use crate::types::{CassandraBackup, CassandraDatacenter};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::api::{ApiResource, DynamicObject, TypeMeta};
use kube::{Resource, ResourceExt};
use std::collections::HashMap;
use std::fmt;

/// `apiVersion` + `kind` pair identifying a resource type
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceKind {
    pub api_version: String,
    pub kind: String,
}

impl ResourceKind {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }

    pub fn of<K: Resource<DynamicType = ()>>() -> Self {
        Self::new(K::api_version(&()), K::kind(&()))
    }

    pub fn from_type_meta(types: &TypeMeta) -> Self {
        Self::new(types.api_version.clone(), types.kind.clone())
    }

    /// Kind of a dynamic object, read from its `apiVersion`/`kind` fields
    pub fn of_object(obj: &DynamicObject) -> Result<Self> {
        obj.types
            .as_ref()
            .map(Self::from_type_meta)
            .ok_or_else(|| Error::UnknownResourceKind {
                api_version: String::new(),
                kind: format!("<untyped object {}>", obj.name_any()),
            })
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version, self.kind)
    }
}

/// A registered resource type and its scope
#[derive(Clone, Debug)]
pub struct ResourceType {
    pub api_resource: ApiResource,
    pub namespaced: bool,
}

impl ResourceType {
    pub fn namespaced<K>() -> Self
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope>,
    {
        Self {
            api_resource: ApiResource::erase::<K>(&()),
            namespaced: true,
        }
    }

    pub fn cluster<K>() -> Self
    where
        K: Resource<DynamicType = (), Scope = ClusterResourceScope>,
    {
        Self {
            api_resource: ApiResource::erase::<K>(&()),
            namespaced: false,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        ResourceKind::new(
            self.api_resource.api_version.clone(),
            self.api_resource.kind.clone(),
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResourceRegistry {
    types: HashMap<ResourceKind, ResourceType>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The kinds handled by this tool: datacenters, backups and CRDs
    pub fn k8ssandra() -> Self {
        Self::new()
            .with(ResourceType::namespaced::<CassandraDatacenter>())
            .with(ResourceType::namespaced::<CassandraBackup>())
            .with(ResourceType::cluster::<CustomResourceDefinition>())
    }

    pub fn with(mut self, resource_type: ResourceType) -> Self {
        self.types.insert(resource_type.kind(), resource_type);
        self
    }

    pub fn resolve(&self, kind: &ResourceKind) -> Result<&ResourceType> {
        self.types
            .get(kind)
            .ok_or_else(|| Error::UnknownResourceKind {
                api_version: kind.api_version.clone(),
                kind: kind.kind.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
