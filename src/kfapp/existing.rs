// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! KfApp for clusters that already run Kubernetes without a cloud integration

use crate::config::Config;
use crate::constants::{ingress, poll};
use crate::error::{KfError, Result};
use crate::kfapp::kustomize::KustomizeApp;
use crate::kfapp::ResourceEnum;
use crate::kubernetes::{
    delete_namespace_and_wait, ensure_namespace, wait_for_load_balancer_ip, KubeResourceClient,
    NamespaceLabels, ResourceClient,
};
use crate::manifest::Applier;
use crate::types::KfDef;
use kube::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

const OIDC_PORT_PATH: &str = ":5556/dex";

/// A manifest file installed as one step
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub name: &'static str,
    pub path: PathBuf,
}

impl Manifest {
    fn new(name: &'static str, dir: &Path, file: &str) -> Self {
        Self {
            name,
            path: dir.join(file),
        }
    }
}

/// Public endpoints Kubeflow and its OIDC provider are reachable on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub kubeflow: String,
    pub oidc: String,
}

/// Istio and the OIDC stack form the platform; the Kubeflow packages are
/// deployed by the wrapped kustomize app.
#[derive(Debug, Clone)]
pub struct ExistingApp {
    kustomize: KustomizeApp,
    namespace_labels: NamespaceLabels,
    poll_interval: Duration,
    load_balancer_max_attempts: u32,
    kubeflow_endpoint: Option<String>,
    oidc_endpoint: Option<String>,
    istio_manifests: Vec<Manifest>,
    auth_oidc_manifests: Vec<Manifest>,
}

impl ExistingApp {
    pub fn new(kfdef: KfDef, config: &Config) -> Result<Self> {
        let repo = kfdef.spec.repo.as_deref().ok_or_else(|| {
            KfError::InvalidArgument("spec.repo is required for the existing platform".to_string())
        })?;
        info!("Repo dir: {}", repo.display());

        let deployment_dir = repo
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("deployment/existing");
        let istio_dir = deployment_dir.join("istio");
        let auth_dir = deployment_dir.join("auth_oidc");

        Ok(Self {
            istio_manifests: vec![
                Manifest::new("Istio CRDs", &istio_dir, "crds.yaml"),
                Manifest::new("Istio Control Plane", &istio_dir, "istio-noauth.yaml"),
            ],
            auth_oidc_manifests: vec![
                Manifest::new("Istio Gateway", &auth_dir, "gateway.yaml"),
                Manifest::new("Istio Ext-Auth Envoy Filter", &auth_dir, "envoy-filter.yaml"),
                Manifest::new("Dex", &auth_dir, "dex.yaml"),
                Manifest::new("AuthService", &auth_dir, "authservice.yaml"),
            ],
            kustomize: KustomizeApp::new(kfdef, config),
            namespace_labels: config.namespace_labels.clone(),
            poll_interval: config.namespace_poll_interval,
            load_balancer_max_attempts: config.load_balancer_max_attempts,
            kubeflow_endpoint: config.kubeflow_endpoint.clone(),
            oidc_endpoint: config.oidc_endpoint.clone(),
        })
    }

    pub fn kfdef(&self) -> &KfDef {
        self.kustomize.kfdef()
    }

    pub fn istio_manifests(&self) -> &[Manifest] {
        &self.istio_manifests
    }

    pub fn auth_oidc_manifests(&self) -> &[Manifest] {
        &self.auth_oidc_manifests
    }

    pub async fn init(&self, resources: ResourceEnum) -> Result<()> {
        if resources == ResourceEnum::Platform {
            return Ok(());
        }
        self.kustomize.init(ResourceEnum::K8s).await
    }

    pub async fn generate(&self, resources: ResourceEnum) -> Result<()> {
        if resources == ResourceEnum::Platform {
            return Ok(());
        }
        self.kustomize.generate(ResourceEnum::K8s).await
    }

    /// Install the platform first, then the Kubeflow packages
    #[instrument(skip(self, client), fields(app = %self.kfdef().name()))]
    pub async fn apply(&self, client: &Client, resources: ResourceEnum) -> Result<()> {
        if resources != ResourceEnum::K8s {
            self.apply_platform(client).await?;
        }
        if resources != ResourceEnum::Platform {
            self.kustomize.apply(client, ResourceEnum::K8s).await?;
        }
        Ok(())
    }

    /// Remove the Kubeflow packages first, then the platform
    #[instrument(skip(self, client), fields(app = %self.kfdef().name()))]
    pub async fn delete(&self, client: &Client, resources: ResourceEnum) -> Result<()> {
        if resources != ResourceEnum::Platform {
            self.kustomize.delete(client, ResourceEnum::K8s).await?;
        }
        if resources != ResourceEnum::K8s {
            self.delete_platform(client).await?;
        }
        Ok(())
    }

    /// Install Istio, wait for the endpoints, then install the OIDC stack.
    ///
    /// The endpoints are not templated into the OIDC manifests: `dex.yaml`
    /// and `authservice.yaml` must already be rendered. Waiting for the
    /// ingress gateway address gates the OIDC install on Istio being up.
    async fn apply_platform(&self, client: &Client) -> Result<()> {
        ensure_namespace(client, self.kfdef().namespace(), &self.namespace_labels).await?;

        let applier = Applier::new(KubeResourceClient::new(client.clone()));
        install(&applier, &self.istio_manifests).await?;

        let endpoints = self.endpoints(client).await?;
        info!(
            "Kubeflow endpoint: {}, OIDC endpoint: {}",
            endpoints.kubeflow, endpoints.oidc
        );

        install(&applier, &self.auth_oidc_manifests).await
    }

    /// Wait for the namespace to go away, then remove both stacks newest first
    async fn delete_platform(&self, client: &Client) -> Result<()> {
        delete_namespace_and_wait(client, self.kfdef().namespace(), self.poll_interval).await?;

        let applier = Applier::new(KubeResourceClient::new(client.clone()));
        let files: Vec<&Path> = reversed(&self.auth_oidc_manifests)
            .chain(reversed(&self.istio_manifests))
            .map(|m| m.path.as_path())
            .collect();
        applier.delete_files(&files, None).await
    }

    async fn endpoints(&self, client: &Client) -> Result<Endpoints> {
        let kubeflow = match &self.kubeflow_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => {
                let ip = wait_for_load_balancer_ip(
                    client,
                    ingress::NAMESPACE,
                    ingress::SERVICE,
                    self.load_balancer_max_attempts,
                    Duration::from_secs(poll::LOAD_BALANCER_INTERVAL_SECS),
                )
                .await?;
                let endpoint = format!("http://{}", ip);
                info!("KUBEFLOW_ENDPOINT not set, using {}", endpoint);
                endpoint
            }
        };

        Ok(resolve_endpoints(kubeflow, self.oidc_endpoint.clone()))
    }
}

/// OIDC defaults to the dex port on the Kubeflow endpoint
pub fn resolve_endpoints(kubeflow: String, oidc: Option<String>) -> Endpoints {
    let oidc = oidc.unwrap_or_else(|| {
        let endpoint = format!("{}{}", kubeflow, OIDC_PORT_PATH);
        info!("OIDC_ENDPOINT not set, using {}", endpoint);
        endpoint
    });
    Endpoints { kubeflow, oidc }
}

fn reversed(manifests: &[Manifest]) -> impl Iterator<Item = &Manifest> {
    manifests.iter().rev()
}

async fn install<C: ResourceClient>(applier: &Applier<C>, manifests: &[Manifest]) -> Result<()> {
    for manifest in manifests {
        info!("Installing {}...", manifest.name);
        applier.apply_file(&manifest.path, None).await?;
    }
    Ok(())
}
