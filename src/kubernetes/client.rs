// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation and generic resource access through API discovery

use crate::error::{KfError, Result};
use kube::{
    api::{DeleteParams, DynamicObject, PostParams},
    config::{KubeConfigOptions, Kubeconfig},
    core::GroupVersionKind,
    discovery::{self, ApiResource, Scope},
    Api, Client,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Create a Kubernetes client, optionally pinned to a kubeconfig context
pub async fn create_client(context: Option<&str>) -> Result<Client> {
    let Some(context) = context else {
        return Client::try_default().await.map_err(KfError::from);
    };

    info!("Using kubeconfig context {}", context);

    let kubeconfig = Kubeconfig::read()
        .map_err(|e| KfError::Kubeconfig(format!("Failed to read kubeconfig: {}", e)))?;
    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };
    let client_config = kube::Config::from_custom_kubeconfig(kubeconfig, &options)
        .await
        .map_err(|e| KfError::Kubeconfig(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| KfError::Kubeconfig(format!("Failed to create client: {}", e)))
}

/// REST resource a (group, version, kind) resolves to
#[derive(Debug, Clone)]
pub struct ResourceMapping {
    pub resource: ApiResource,
    /// Whether requests are scoped to a namespace
    pub namespaced: bool,
}

/// Result of a create or delete request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Done,
    /// Create found the object already present
    AlreadyExists,
    /// Delete found nothing to delete
    NotFound,
}

/// Discovery and generic request capabilities the manifest applier needs
#[allow(async_fn_in_trait)]
pub trait ResourceClient {
    async fn resolve(
        &self,
        group: &str,
        version: &str,
        kind: &str,
    ) -> std::result::Result<ResourceMapping, kube::Error>;

    async fn create(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> std::result::Result<RequestOutcome, kube::Error>;

    async fn delete(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
    ) -> std::result::Result<RequestOutcome, kube::Error>;
}

/// [`ResourceClient`] backed by a live API server.
///
/// Discovery results are cached for the lifetime of the value only; build a
/// new one for every run so newly installed CRDs are picked up.
pub struct KubeResourceClient {
    client: Client,
    mappings: Mutex<HashMap<(String, String, String), ResourceMapping>>,
}

impl KubeResourceClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            mappings: Mutex::new(HashMap::new()),
        }
    }

    fn api(&self, mapping: &ResourceMapping, namespace: Option<&str>) -> Api<DynamicObject> {
        match namespace {
            Some(ns) if mapping.namespaced => {
                Api::namespaced_with(self.client.clone(), ns, &mapping.resource)
            }
            _ => Api::all_with(self.client.clone(), &mapping.resource),
        }
    }
}

impl ResourceClient for KubeResourceClient {
    #[instrument(skip(self))]
    async fn resolve(
        &self,
        group: &str,
        version: &str,
        kind: &str,
    ) -> std::result::Result<ResourceMapping, kube::Error> {
        let key = (group.to_string(), version.to_string(), kind.to_string());
        if let Some(mapping) = self.mappings.lock().await.get(&key) {
            return Ok(mapping.clone());
        }

        let gvk = GroupVersionKind::gvk(group, version, kind);
        let (resource, capabilities) = discovery::pinned_kind(&self.client, &gvk).await?;
        let mapping = ResourceMapping {
            namespaced: matches!(capabilities.scope, Scope::Namespaced),
            resource,
        };
        debug!(
            "Resolved {} to resource {} (namespaced: {})",
            kind, mapping.resource.plural, mapping.namespaced
        );

        self.mappings.lock().await.insert(key, mapping.clone());
        Ok(mapping)
    }

    async fn create(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> std::result::Result<RequestOutcome, kube::Error> {
        match self
            .api(mapping, namespace)
            .create(&PostParams::default(), object)
            .await
        {
            Ok(_) => Ok(RequestOutcome::Done),
            Err(kube::Error::Api(err)) if err.code == 409 => Ok(RequestOutcome::AlreadyExists),
            Err(e) => Err(e),
        }
    }

    async fn delete(
        &self,
        mapping: &ResourceMapping,
        namespace: Option<&str>,
        name: &str,
    ) -> std::result::Result<RequestOutcome, kube::Error> {
        match self
            .api(mapping, namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(RequestOutcome::Done),
            Err(kube::Error::Api(err)) if err.code == 404 => Ok(RequestOutcome::NotFound),
            Err(e) => Err(e),
        }
    }
}
