// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes API server and an in-memory cluster.

use crate::error::{Error, Result};
use crate::kubernetes::{ResourceClient, ResourceKind};
use async_trait::async_trait;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::api::DynamicObject;
use kube::client::Body;
use kube::core::ErrorResponse;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request received by [`MockService`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: Vec<u8>,
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let query = req.uri().query().unwrap_or_default().to_string();

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req.into_body().collect().await?.to_bytes().to_vec();
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                query,
                body,
            });

            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("resource", "unknown")));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": if code < 400 { "Success" } else { "Failure" },
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

/// Create a 409 already exists response
pub fn already_exists_json(resource: &str, name: &str) -> String {
    status_json(409, "AlreadyExists", &format!("{} \"{}\" already exists", resource, name))
}

/// Status body returned by a successful delete
pub fn status_success_json() -> String {
    status_json(200, "", "")
}

/// Build an API error like the ones the API server returns
pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("injected {} failure", reason),
        reason: reason.to_string(),
        code,
    })
}

/// A call made against [`FakeCluster`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    List { kind: String, namespace: Option<String> },
    Delete { kind: String, name: String },
    Create { kind: String, name: String },
    Update { kind: String, name: String },
}

type ObjectKey = (ResourceKind, String, String);

#[derive(Default)]
struct FakeState {
    objects: BTreeMap<String, (ObjectKey, DynamicObject)>,
    calls: Vec<Call>,
    failing: HashSet<(&'static str, String)>,
}

/// In-memory [`ResourceClient`] recording every call made against it
#[derive(Default)]
pub struct FakeCluster {
    namespace: Option<String>,
    state: Mutex<FakeState>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(namespace: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }
    }

    fn key(obj: &DynamicObject) -> ObjectKey {
        let kind = ResourceKind::of_object(obj).expect("test objects carry apiVersion/kind");
        (kind, obj.namespace().unwrap_or_default(), obj.name_any())
    }

    fn index(key: &ObjectKey) -> String {
        format!("{}|{}|{}", key.0, key.1, key.2)
    }

    /// Seed an object into the cluster
    pub fn insert(&self, obj: DynamicObject) {
        let key = Self::key(&obj);
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(Self::index(&key), (key, obj));
    }

    /// Make `operation` ("list", "delete", "create", "update") fail for `name`.
    /// For "list" the name is the kind.
    pub fn fail_on(&self, operation: &'static str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert((operation, name.to_string()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Names of the objects a delete was issued for, of the given kind
    pub fn deleted(&self, kind: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete { kind: k, name } if k == kind => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| f(c)).count()
    }

    pub fn get(&self, kind: &str, name: &str) -> Option<DynamicObject> {
        self.state
            .lock()
            .unwrap()
            .objects
            .values()
            .find(|((k, _, n), _)| k.kind == kind && n == name)
            .map(|(_, obj)| obj.clone())
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    fn check_failure(state: &FakeState, operation: &'static str, kind: &str, name: &str) -> Result<()> {
        if state.failing.contains(&(operation, name.to_string())) {
            return Err(Error::ClientOperation {
                operation,
                kind: kind.to_string(),
                name: name.to_string(),
                source: api_error(500, "InternalError"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceClient for FakeCluster {
    async fn list(
        &self,
        kind: &ResourceKind,
        namespace: Option<&str>,
        labels: &BTreeMap<String, String>,
    ) -> Result<Vec<DynamicObject>> {
        let mut state = self.state.lock().unwrap();
        let namespace = namespace.or(self.namespace.as_deref()).map(String::from);
        state.calls.push(Call::List {
            kind: kind.kind.clone(),
            namespace: namespace.clone(),
        });
        Self::check_failure(&state, "list", &kind.kind, &kind.kind)?;

        Ok(state
            .objects
            .values()
            .filter(|((k, ns, _), _)| k == kind && namespace.as_deref().map_or(true, |n| n == ns.as_str()))
            .filter(|(_, obj)| {
                let obj_labels = obj.labels();
                labels.iter().all(|(k, v)| obj_labels.get(k) == Some(v))
            })
            .map(|(_, obj)| obj.clone())
            .collect())
    }

    async fn delete(&self, resource: &DynamicObject) -> Result<()> {
        let key = Self::key(resource);
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete {
            kind: key.0.kind.clone(),
            name: key.2.clone(),
        });
        Self::check_failure(&state, "delete", &key.0.kind, &key.2)?;

        match state.objects.remove(&Self::index(&key)) {
            Some(_) => Ok(()),
            None => Err(Error::ClientOperation {
                operation: "delete",
                kind: key.0.kind,
                name: key.2,
                source: api_error(404, "NotFound"),
            }),
        }
    }

    async fn create(&self, resource: &DynamicObject) -> Result<()> {
        let key = Self::key(resource);
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            kind: key.0.kind.clone(),
            name: key.2.clone(),
        });
        Self::check_failure(&state, "create", &key.0.kind, &key.2)?;

        let index = Self::index(&key);
        if state.objects.contains_key(&index) {
            return Err(Error::AlreadyExists {
                kind: key.0.kind,
                name: key.2,
            });
        }
        state.objects.insert(index, (key, resource.clone()));
        Ok(())
    }

    async fn update(&self, resource: &DynamicObject) -> Result<()> {
        let key = Self::key(resource);
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Update {
            kind: key.0.kind.clone(),
            name: key.2.clone(),
        });
        Self::check_failure(&state, "update", &key.0.kind, &key.2)?;

        let index = Self::index(&key);
        if !state.objects.contains_key(&index) {
            return Err(Error::ClientOperation {
                operation: "update",
                kind: key.0.kind,
                name: key.2,
                source: api_error(404, "NotFound"),
            });
        }
        state.objects.insert(index, (key, resource.clone()));
        Ok(())
    }
}

/// Build a dynamic object of the given kind
pub fn dynamic_object(
    kind: &ResourceKind,
    name: &str,
    namespace: Option<&str>,
    labels: &[(&str, &str)],
    annotations: &[(&str, &str)],
    spec: serde_json::Value,
) -> DynamicObject {
    let to_map = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    };

    serde_json::from_value(serde_json::json!({
        "apiVersion": kind.api_version,
        "kind": kind.kind,
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": to_map(labels),
            "annotations": to_map(annotations),
        },
        "spec": spec,
    }))
    .expect("valid dynamic object")
}
