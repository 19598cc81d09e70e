// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Helm release ownership checks

use crate::constants::helm;
use crate::error::{Error, Result};
use kube::api::ObjectMeta;
use std::collections::BTreeMap;

/// Label selector matching every resource installed by Helm
pub fn managed_by_selector() -> BTreeMap<String, String> {
    BTreeMap::from([(
        helm::MANAGED_BY_LABEL.to_string(),
        helm::MANAGED_BY_VALUE.to_string(),
    )])
}

/// Label selector matching chart-templated resources of a release
pub fn instance_selector(release: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(helm::INSTANCE_LABEL.to_string(), release.to_string())])
}

/// A resource belongs to a release when Helm manages it and it is annotated with the release name
pub fn is_owned_by_release(meta: &ObjectMeta, release: &str) -> bool {
    let managed = meta
        .labels
        .as_ref()
        .and_then(|l| l.get(helm::MANAGED_BY_LABEL))
        .is_some_and(|v| v == helm::MANAGED_BY_VALUE);

    let annotated = meta
        .annotations
        .as_ref()
        .and_then(|a| a.get(helm::RELEASE_NAME_ANNOTATION))
        .is_some_and(|v| v == release);

    managed && annotated
}

pub fn validate_release_name(release: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(Error::InvalidReleaseName {
            name: release.to_string(),
            reason: reason.to_string(),
        })
    };

    if release.is_empty() {
        return invalid("must not be empty");
    }
    if release.chars().any(char::is_whitespace) {
        return invalid("must not contain whitespace");
    }
    if release.len() > helm::MAX_RELEASE_NAME_LEN {
        return invalid(&format!(
            "must be at most {} characters",
            helm::MAX_RELEASE_NAME_LEN
        ));
    }
    Ok(())
}
