// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Multi-document YAML loading of resource definitions

use crate::error::{Error, Result};
use kube::api::DynamicObject;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Parse every `---` separated document in `text`.
///
/// Empty and comment-only documents are skipped. `source` is only used in errors.
pub fn parse_documents(source: &Path, text: &str) -> Result<Vec<DynamicObject>> {
    let mut objects = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = serde_yaml::Value::deserialize(document).map_err(|source_err| Error::Parse {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        if value.is_null() {
            continue;
        }

        let obj: DynamicObject = serde_yaml::from_value(value).map_err(|source_err| Error::Parse {
            path: source.to_path_buf(),
            source: source_err,
        })?;

        let invalid = |reason: &str| Error::InvalidDocument {
            path: source.to_path_buf(),
            reason: format!("document {}: {}", index, reason),
        };
        match &obj.types {
            Some(t) if !t.api_version.is_empty() && !t.kind.is_empty() => {}
            _ => return Err(invalid("missing apiVersion or kind")),
        }
        if obj.metadata.name.as_deref().map_or(true, str::is_empty) {
            return Err(invalid("missing metadata.name"));
        }

        objects.push(obj);
    }

    Ok(objects)
}

/// Load all documents from every file below `dir`, in lexical path order.
///
/// The first unreadable file or malformed document aborts the whole load.
pub fn load_directory(dir: &Path) -> Result<Vec<DynamicObject>> {
    let mut objects = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let documents = parse_documents(path, &text)?;
        debug!("Parsed {} document(s) from {}", documents.len(), path.display());
        objects.extend(documents);
    }

    Ok(objects)
}
