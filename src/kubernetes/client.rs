// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster resource client used by the cleaner and the upgrader

use crate::error::{Error, Result};
use crate::kubernetes::registry::{ResourceKind, ResourceRegistry, ResourceType};
use async_trait::async_trait;
use kube::{
    api::{DeleteParams, DynamicObject, ListParams, PostParams, TypeMeta},
    config::KubeConfigOptions,
    Api, Client, Config as KConfig, ResourceExt,
};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Minimal set of cluster operations needed to reconcile resources.
///
/// `create` must fail with [`Error::AlreadyExists`] when the object is
/// already present so callers can fall back to `update`.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// List objects of `kind` carrying all of `labels`.
    /// `namespace` overrides the client's own namespace scope.
    async fn list(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        labels: &BTreeMap<String, String>,
    ) -> Result<Vec<DynamicObject>>;

    async fn delete(&self, resource: &DynamicObject) -> Result<()>;

    async fn create(&self, resource: &DynamicObject) -> Result<()>;

    /// Replace the live object with `resource`
    async fn update(&self, resource: &DynamicObject) -> Result<()>;
}

/// Load kubeconfig (or in-cluster config), optionally selecting a kubeconfig context
pub async fn load_kube_config(context: Option<String>) -> Result<KConfig> {
    match context {
        Some(context) => {
            let options = KubeConfigOptions {
                context: Some(context),
                ..Default::default()
            };
            KConfig::from_kubeconfig(&options)
                .await
                .map_err(|e| Error::Kubeconfig(format!("Failed to load kubeconfig: {}", e)))
        }
        None => KConfig::infer()
            .await
            .map_err(|e| Error::Kubeconfig(format!("Failed to infer config: {}", e))),
    }
}

/// Render a label map as an equality-based label selector
pub fn label_selector(labels: &BTreeMap<String, String>) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// [`ResourceClient`] backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeResourceClient {
    client: Client,
    namespace: Option<String>,
    registry: ResourceRegistry,
}

impl KubeResourceClient {
    /// `namespace` restricts all namespaced operations; `None` means all namespaces
    pub fn new(client: Client, namespace: Option<String>, registry: ResourceRegistry) -> Self {
        Self {
            client,
            namespace,
            registry,
        }
    }

    pub fn from_config(
        config: KConfig,
        namespace: Option<String>,
        registry: ResourceRegistry,
    ) -> Result<Self> {
        let client = Client::try_from(config)?;
        Ok(Self::new(client, namespace, registry))
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn scoped_api(&self, resource_type: &ResourceType, namespace: Option<&str>) -> Api<DynamicObject> {
        let ar = &resource_type.api_resource;
        match namespace.or(self.namespace.as_deref()) {
            Some(ns) if resource_type.namespaced => {
                Api::namespaced_with(self.client.clone(), ns, ar)
            }
            _ => Api::all_with(self.client.clone(), ar),
        }
    }

    /// Api handle addressing a single object
    fn object_api(&self, resource: &DynamicObject) -> Result<(Api<DynamicObject>, ResourceKind)> {
        let kind = ResourceKind::of_object(resource)?;
        let resource_type = self.registry.resolve(&kind)?;

        if !resource_type.namespaced {
            return Ok((Api::all_with(self.client.clone(), &resource_type.api_resource), kind));
        }

        let namespace = resource
            .metadata
            .namespace
            .as_deref()
            .or(self.namespace.as_deref())
            .ok_or_else(|| Error::MissingNamespace {
                kind: kind.kind.clone(),
                name: resource.name_any(),
            })?;

        Ok((
            Api::namespaced_with(self.client.clone(), namespace, &resource_type.api_resource),
            kind,
        ))
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    #[instrument(skip(self, kind, labels), fields(kind = %kind.kind))]
    async fn list(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        labels: &BTreeMap<String, String>,
    ) -> Result<Vec<DynamicObject>> {
        let resource_type = self.registry.resolve(kind)?;
        let api = self.scoped_api(resource_type, namespace);

        let mut lp = ListParams::default();
        if !labels.is_empty() {
            lp = lp.labels(&label_selector(labels));
        }

        let list = api.list(&lp).await.map_err(|source| Error::ClientOperation {
            operation: "list",
            kind: kind.kind.clone(),
            name: namespace
                .or(self.namespace.as_deref())
                .unwrap_or("*")
                .to_string(),
            source,
        })?;

        debug!("Listed {} {} object(s)", list.items.len(), kind.kind);

        // Items in a list response carry no apiVersion/kind of their own
        let types = TypeMeta {
            api_version: kind.api_version.clone(),
            kind: kind.kind.clone(),
        };
        Ok(list
            .items
            .into_iter()
            .map(|mut obj| {
                obj.types.get_or_insert_with(|| types.clone());
                obj
            })
            .collect())
    }

    #[instrument(skip(self, resource), fields(name = %resource.name_any()))]
    async fn delete(&self, resource: &DynamicObject) -> Result<()> {
        let (api, kind) = self.object_api(resource)?;
        let name = resource.name_any();

        api.delete(&name, &DeleteParams::default())
            .await
            .map_err(|source| Error::ClientOperation {
                operation: "delete",
                kind: kind.kind.clone(),
                name: name.clone(),
                source,
            })?;

        info!("Deleted {} {}", kind.kind, name);
        Ok(())
    }

    #[instrument(skip(self, resource), fields(name = %resource.name_any()))]
    async fn create(&self, resource: &DynamicObject) -> Result<()> {
        let (api, kind) = self.object_api(resource)?;
        let name = resource.name_any();

        match api.create(&PostParams::default(), resource).await {
            Ok(_) => {
                info!("Created {} {}", kind.kind, name);
                Ok(())
            }
            Err(kube::Error::Api(err)) if err.code == 409 && err.reason == "AlreadyExists" => {
                debug!("{} {} already exists", kind.kind, name);
                Err(Error::AlreadyExists {
                    kind: kind.kind,
                    name,
                })
            }
            Err(source) => Err(Error::ClientOperation {
                operation: "create",
                kind: kind.kind,
                name,
                source,
            }),
        }
    }

    #[instrument(skip(self, resource), fields(name = %resource.name_any()))]
    async fn update(&self, resource: &DynamicObject) -> Result<()> {
        let (api, kind) = self.object_api(resource)?;
        let name = resource.name_any();
        let op_error = |operation: &'static str| {
            let kind = kind.kind.clone();
            let name = name.clone();
            move |source: kube::Error| Error::ClientOperation {
                operation,
                kind,
                name,
                source,
            }
        };

        // The API server rejects unconditional replaces of CRDs, so carry over the live version
        let mut desired = resource.clone();
        if desired.metadata.resource_version.is_none() {
            let live = api.get(&name).await.map_err(op_error("get"))?;
            desired.metadata.resource_version = live.metadata.resource_version;
        }

        api.replace(&name, &PostParams::default(), &desired)
            .await
            .map_err(op_error("update"))?;

        info!("Updated {} {}", kind.kind, name);
        Ok(())
    }
}
