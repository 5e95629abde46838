// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace label reconciliation

use crate::constants::DEFAULT_NAMESPACE_LABELS;
use crate::error::{KfError, Result};
use k8s_openapi::api::core::v1::Namespace;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Desired baseline of namespace labels.
///
/// A key mapped to an empty value is a retired default: reconciliation removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceLabels(BTreeMap<String, String>);

impl NamespaceLabels {
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self(labels)
    }

    pub fn kubeflow_defaults() -> Self {
        Self(
            DEFAULT_NAMESPACE_LABELS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// Load a flat YAML mapping of label keys to values
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| KfError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| {
            KfError::Config(format!("{} is not a label mapping: {}", path.display(), e))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// Overlay the desired labels onto a namespace.
///
/// Missing keys are added, keys with an empty desired value are removed and
/// existing values are kept. Returns true when the label map changed.
pub fn reconcile_namespace_labels(namespace: &mut Namespace, desired: &NamespaceLabels) -> bool {
    let labels = namespace.metadata.labels.get_or_insert_with(BTreeMap::new);
    let mut changed = false;

    for (key, value) in desired.iter() {
        if value.is_empty() {
            changed |= labels.remove(key).is_some();
        } else if !labels.contains_key(key) {
            labels.insert(key.clone(), value.clone());
            changed = true;
        }
    }

    changed
}
