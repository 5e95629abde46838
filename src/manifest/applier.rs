// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generic create/delete of every object in rendered manifest files.
//!
//! Documents are handled strictly in file order. A document without
//! `apiVersion` or without `metadata.name` is skipped with a warning; invalid
//! YAML, a missing kind, an unresolvable kind or a failed request aborts the
//! file and every file after it.

use crate::constants::DEFAULT_OBJECT_NAMESPACE;
use crate::error::{KfError, Result};
use crate::kubernetes::{RequestOutcome, ResourceClient};
use crate::manifest::document::{split_api_version, split_documents, GroupKind, ManifestDocument};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Callback invoked with (namespace, group kind, object) for every routed
/// document, before its request is sent. It may modify the object.
pub type ObserverFn<'a> = dyn FnMut(&str, &GroupKind, &mut Map<String, Value>) + 'a;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Apply,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Apply => write!(f, "creating"),
            Operation::Delete => write!(f, "deleting"),
        }
    }
}

pub struct Applier<C> {
    client: C,
}

impl<C: ResourceClient> Applier<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Create every object in a manifest file, like `kubectl create -f`
    pub async fn apply_file(&self, path: &Path, observer: Option<&mut ObserverFn<'_>>) -> Result<()> {
        self.run(&[path], Operation::Apply, observer).await
    }

    /// Delete every object in a manifest file
    pub async fn delete_file(&self, path: &Path, observer: Option<&mut ObserverFn<'_>>) -> Result<()> {
        self.run(&[path], Operation::Delete, observer).await
    }

    /// Apply files in the given order, stopping at the first failure
    pub async fn apply_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        observer: Option<&mut ObserverFn<'_>>,
    ) -> Result<()> {
        self.run(paths, Operation::Apply, observer).await
    }

    /// Delete files in the given order, stopping at the first failure
    pub async fn delete_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        observer: Option<&mut ObserverFn<'_>>,
    ) -> Result<()> {
        self.run(paths, Operation::Delete, observer).await
    }

    async fn run<P: AsRef<Path>>(
        &self,
        paths: &[P],
        operation: Operation,
        observer: Option<&mut ObserverFn<'_>>,
    ) -> Result<()> {
        match observer {
            Some(observer) => self.run_with(paths, operation, observer).await,
            None => {
                let mut noop = |_: &str, _: &GroupKind, _: &mut Map<String, Value>| {};
                self.run_with(paths, operation, &mut noop).await
            }
        }
    }

    async fn run_with<P: AsRef<Path>>(
        &self,
        paths: &[P],
        operation: Operation,
        observer: &mut ObserverFn<'_>,
    ) -> Result<()> {
        for path in paths {
            self.process_file(path.as_ref(), operation, &mut *observer)
                .await?;
        }
        Ok(())
    }

    #[instrument(skip(self, path, observer), fields(file = %path.display()))]
    async fn process_file(
        &self,
        path: &Path,
        operation: Operation,
        observer: &mut ObserverFn<'_>,
    ) -> Result<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| KfError::io(path, e))?;

        for (index, source) in split_documents(&content).into_iter().enumerate() {
            let document = ManifestDocument::parse(source).map_err(|reason| {
                KfError::InvalidManifest {
                    file: path.to_path_buf(),
                    reason: format!("document {}: {}", index, reason),
                }
            })?;
            let Some(mut document) = document else {
                debug!("Skipping empty document {}", index);
                continue;
            };

            let Some(api_version) = document.api_version() else {
                warn!("Unknown resource: {}", source.trim());
                continue;
            };
            let (group, version) = split_api_version(api_version);
            let (group, version) = (group.to_string(), version.to_string());

            let Some(kind) = document.kind().map(str::to_string) else {
                return Err(KfError::InvalidManifest {
                    file: path.to_path_buf(),
                    reason: format!("document {} has no kind", index),
                });
            };

            let mapping = self
                .client
                .resolve(&group, &version, &kind)
                .await
                .map_err(|e| KfError::UnknownResource {
                    file: path.to_path_buf(),
                    group: group.clone(),
                    version: version.clone(),
                    kind: kind.clone(),
                    reason: e.to_string(),
                })?;

            let Some(name) = document.name().map(str::to_string) else {
                warn!("object with kind {} has no name", kind);
                continue;
            };
            let namespace = document
                .namespace()
                .unwrap_or(DEFAULT_OBJECT_NAMESPACE)
                .to_string();

            let group_kind = GroupKind::new(group, kind.clone());
            observer(&namespace, &group_kind, document.object_mut());
            let name = document.name().map(str::to_string).unwrap_or(name);

            let target_namespace = mapping.namespaced.then_some(namespace.as_str());
            info!("{} {} {}", operation, group_kind, name);

            let request_error = |source| KfError::Request {
                file: path.to_path_buf(),
                kind: kind.clone(),
                name: name.clone(),
                source,
            };
            let outcome = match operation {
                Operation::Apply => {
                    let object = document.to_dynamic().map_err(|e| KfError::InvalidManifest {
                        file: path.to_path_buf(),
                        reason: format!("{} {}: {}", kind, name, e),
                    })?;
                    self.client
                        .create(&mapping, target_namespace, &object)
                        .await
                        .map_err(request_error)?
                }
                Operation::Delete => self
                    .client
                    .delete(&mapping, target_namespace, &name)
                    .await
                    .map_err(request_error)?,
            };

            match outcome {
                RequestOutcome::Done => {}
                RequestOutcome::AlreadyExists => info!("{} {} already exists", group_kind, name),
                RequestOutcome::NotFound => info!("{} {} already deleted", group_kind, name),
            }
        }

        Ok(())
    }
}
