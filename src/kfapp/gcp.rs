// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! GCP KfApp: the kustomize app plus the project it is deployed for

use crate::config::Config;
use crate::error::{KfError, Result};
use crate::kfapp::kustomize::KustomizeApp;
use crate::kfapp::ResourceEnum;
use crate::types::KfDef;
use kube::Client;
use tracing::info;

/// GCP settings taken from the KfDef spec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcpOptions {
    pub project: String,
    pub zone: Option<String>,
}

impl GcpOptions {
    pub fn from_kfdef(kfdef: &KfDef) -> Result<Self> {
        let project = kfdef
            .spec
            .project
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                KfError::InvalidArgument("spec.project is required for the gcp platform".to_string())
            })?;

        Ok(Self {
            project,
            zone: kfdef.spec.zone.clone().filter(|z| !z.is_empty()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GcpApp {
    options: GcpOptions,
    kustomize: KustomizeApp,
}

impl GcpApp {
    pub fn new(mut kfdef: KfDef, config: &Config) -> Result<Self> {
        let options = GcpOptions::from_kfdef(&kfdef)?;
        kfdef.spec.project = Some(options.project.clone());
        kfdef.spec.zone = options.zone.clone();

        Ok(Self {
            options,
            kustomize: KustomizeApp::new(kfdef, config),
        })
    }

    pub fn options(&self) -> &GcpOptions {
        &self.options
    }

    pub fn kfdef(&self) -> &KfDef {
        self.kustomize.kfdef()
    }

    pub async fn init(&self, resources: ResourceEnum) -> Result<()> {
        info!(
            "Initializing for project {} (zone {})",
            self.options.project,
            self.options.zone.as_deref().unwrap_or("unset")
        );
        self.kustomize.init(resources).await.map_err(wrap("init"))
    }

    pub async fn generate(&self, resources: ResourceEnum) -> Result<()> {
        self.kustomize.generate(resources).await.map_err(wrap("generate"))
    }

    pub async fn apply(&self, client: &Client, resources: ResourceEnum) -> Result<()> {
        self.kustomize
            .apply(client, resources)
            .await
            .map_err(wrap("apply"))
    }

    pub async fn delete(&self, client: &Client, resources: ResourceEnum) -> Result<()> {
        self.kustomize
            .delete(client, resources)
            .await
            .map_err(wrap("delete"))
    }
}

fn wrap(operation: &'static str) -> impl Fn(KfError) -> KfError {
    move |source| KfError::Platform {
        platform: "gcp".to_string(),
        operation: operation.to_string(),
        source: Box::new(source),
    }
}
