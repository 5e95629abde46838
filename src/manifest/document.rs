// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Multi-document manifest splitting and generic document access

use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Line separating documents in a manifest file
pub const DOCUMENT_SEPARATOR: &str = "---";

/// API group and kind of a resource, independent of its version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GroupKind {
    #[serde(default)]
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

/// Split file content on separator lines.
///
/// A separator is a line holding only `---`, optionally followed by blanks.
/// Content without separators yields exactly one document.
pub fn split_documents(content: &str) -> Vec<&str> {
    let mut documents = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        if is_separator(line) {
            documents.push(&content[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    documents.push(&content[start..]);

    documents
}

fn is_separator(line: &str) -> bool {
    line.trim_end_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n')) == DOCUMENT_SEPARATOR
}

/// Split an apiVersion into (group, version); the core group is empty
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

/// One parsed manifest document
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    object: Map<String, Value>,
}

impl ManifestDocument {
    /// Parse a single YAML document. Returns `Ok(None)` for empty documents.
    pub fn parse(source: &str) -> Result<Option<Self>, String> {
        let blank = source.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if blank {
            return Ok(None);
        }

        let value: serde_yaml::Value = serde_yaml::from_str(source).map_err(|e| e.to_string())?;
        if value.is_null() {
            return Ok(None);
        }

        match serde_json::to_value(value).map_err(|e| e.to_string())? {
            Value::Object(object) => Ok(Some(Self { object })),
            other => Err(format!("expected a mapping, found {}", type_name(&other))),
        }
    }

    pub fn api_version(&self) -> Option<&str> {
        self.object.get("apiVersion").and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.object
            .get("kind")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata_str("name")
    }

    /// Namespace set on the object; an empty value counts as unset
    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str("namespace").filter(|ns| !ns.is_empty())
    }

    fn metadata_str(&self, field: &str) -> Option<&str> {
        self.object
            .get("metadata")
            .and_then(Value::as_object)
            .and_then(|m| m.get(field))
            .and_then(Value::as_str)
    }

    pub fn object(&self) -> &Map<String, Value> {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.object
    }

    /// Wire form of the document
    pub fn to_dynamic(&self) -> serde_json::Result<DynamicObject> {
        serde_json::from_value(Value::Object(self.object.clone()))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
