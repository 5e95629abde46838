// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::error::{KfError, Result};
use crate::kubernetes::labels::{reconcile_namespace_labels, NamespaceLabels};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{DeleteParams, ObjectMeta, PostParams},
    Api, Client,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

/// Lifecycle phase of a namespace as observed while waiting for its deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespacePhase {
    Active,
    Terminating,
    Gone,
}

impl NamespacePhase {
    pub fn of(namespace: Option<&Namespace>) -> Self {
        match namespace {
            None => NamespacePhase::Gone,
            Some(ns) if ns.metadata.deletion_timestamp.is_some() => NamespacePhase::Terminating,
            Some(_) => NamespacePhase::Active,
        }
    }
}

/// Ensure a namespace exists and carries the desired labels
#[instrument(skip(client, labels))]
pub async fn ensure_namespace(client: &Client, name: &str, labels: &NamespaceLabels) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.get(name).await {
        Ok(mut ns) => {
            if reconcile_namespace_labels(&mut ns, labels) {
                info!("Updating labels on namespace {}", name);
                namespaces.replace(name, &PostParams::default(), &ns).await?;
            } else {
                debug!("Namespace {} already exists", name);
            }
            Ok(())
        }
        Err(kube::Error::Api(err)) if err.code == 404 => {
            info!("Creating namespace: {}", name);
            let mut ns = Namespace {
                metadata: ObjectMeta {
                    name: Some(name.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            };
            reconcile_namespace_labels(&mut ns, labels);

            match namespaces.create(&PostParams::default(), &ns).await {
                Ok(_) => info!("Namespace {} created successfully", name),
                Err(kube::Error::Api(err)) if err.code == 409 => {
                    debug!("Namespace {} was created concurrently", name)
                }
                Err(e) => {
                    return Err(KfError::Namespace(format!(
                        "couldn't create namespace {}: {}",
                        name, e
                    )))
                }
            }
            Ok(())
        }
        Err(e) => Err(KfError::Namespace(format!(
            "Failed to check/create namespace {}: {}",
            name, e
        ))),
    }
}

/// Delete a namespace and block until the API server no longer returns it.
///
/// There is no attempt limit: finalization depends on garbage collection of
/// everything the namespace owns.
#[instrument(skip(client))]
pub async fn delete_namespace_and_wait(
    client: &Client,
    name: &str,
    interval: Duration,
) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    loop {
        let current = match namespaces.get(name).await {
            Ok(ns) => Some(ns),
            Err(kube::Error::Api(err)) if err.code == 404 => None,
            Err(e) => return Err(e.into()),
        };

        match NamespacePhase::of(current.as_ref()) {
            NamespacePhase::Gone => {
                info!("Namespace {} is gone", name);
                return Ok(());
            }
            NamespacePhase::Active => {
                info!("Deleting namespace: {}", name);
                match namespaces.delete(name, &DeleteParams::default()).await {
                    Ok(_) => {}
                    Err(kube::Error::Api(err)) if err.code == 404 => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            NamespacePhase::Terminating => {}
        }

        info!("Waiting for namespace {} deletion to finish...", name);
        sleep(interval).await;
    }
}
