// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubeflow apps and the platforms they are deployed on

pub mod existing;
pub mod gcp;
pub mod kustomize;

use crate::config::Config;
use crate::error::{KfError, Result};
use crate::types::KfDef;
use kube::Client;
use std::fmt;
use std::str::FromStr;
use tracing::info;

pub use existing::ExistingApp;
pub use gcp::{GcpApp, GcpOptions};
pub use kustomize::KustomizeApp;

/// Which part of an app a command acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceEnum {
    #[default]
    All,
    K8s,
    Platform,
}

impl FromStr for ResourceEnum {
    type Err = KfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(ResourceEnum::All),
            "k8s" => Ok(ResourceEnum::K8s),
            "platform" => Ok(ResourceEnum::Platform),
            other => Err(KfError::InvalidArgument(format!(
                "unknown resources {}; expected one of all, k8s, platform",
                other
            ))),
        }
    }
}

/// Lifecycle step run against an app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Init,
    Generate,
    Apply,
    Delete,
}

impl Command {
    /// Whether the command talks to the cluster
    pub fn needs_cluster(&self) -> bool {
        matches!(self, Command::Apply | Command::Delete)
    }
}

impl FromStr for Command {
    type Err = KfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "init" => Ok(Command::Init),
            "generate" => Ok(Command::Generate),
            "apply" => Ok(Command::Apply),
            "delete" => Ok(Command::Delete),
            other => Err(KfError::InvalidArgument(format!(
                "unknown command {}; expected one of init, generate, apply, delete",
                other
            ))),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Init => "init",
            Command::Generate => "generate",
            Command::Apply => "apply",
            Command::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Deployment target named by `spec.platform`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Kustomize,
    Existing,
    Gcp,
    DockerForDesktop,
}

impl FromStr for Platform {
    type Err = KfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "none" | "kustomize" | "minikube" => Ok(Platform::Kustomize),
            "existing" | "existing_arrikto" => Ok(Platform::Existing),
            "gcp" => Ok(Platform::Gcp),
            "docker-for-desktop" => Ok(Platform::DockerForDesktop),
            other => Err(KfError::InvalidArgument(format!("unknown platform {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub enum KfApp {
    Kustomize(KustomizeApp),
    Existing(ExistingApp),
    Gcp(GcpApp),
    DockerForDesktop(KustomizeApp),
}

impl KfApp {
    /// Build the app for the platform its definition names
    pub fn new(kfdef: KfDef, config: &Config) -> Result<Self> {
        let platform: Platform = kfdef.spec.platform.parse()?;
        info!("Using platform {:?} for app {}", platform, kfdef.name());

        Ok(match platform {
            Platform::Kustomize => KfApp::Kustomize(KustomizeApp::new(kfdef, config)),
            Platform::Existing => KfApp::Existing(ExistingApp::new(kfdef, config)?),
            Platform::Gcp => KfApp::Gcp(GcpApp::new(kfdef, config)?),
            Platform::DockerForDesktop => {
                KfApp::DockerForDesktop(KustomizeApp::new(kfdef, config))
            }
        })
    }

    pub fn platform(&self) -> Platform {
        match self {
            KfApp::Kustomize(_) => Platform::Kustomize,
            KfApp::Existing(_) => Platform::Existing,
            KfApp::Gcp(_) => Platform::Gcp,
            KfApp::DockerForDesktop(_) => Platform::DockerForDesktop,
        }
    }

    pub fn kfdef(&self) -> &KfDef {
        match self {
            KfApp::Kustomize(app) | KfApp::DockerForDesktop(app) => app.kfdef(),
            KfApp::Existing(app) => app.kfdef(),
            KfApp::Gcp(app) => app.kfdef(),
        }
    }

    pub async fn init(&self, resources: ResourceEnum) -> Result<()> {
        match self {
            KfApp::Kustomize(app) | KfApp::DockerForDesktop(app) => app.init(resources).await,
            KfApp::Existing(app) => app.init(resources).await,
            KfApp::Gcp(app) => app.init(resources).await,
        }
    }

    pub async fn generate(&self, resources: ResourceEnum) -> Result<()> {
        match self {
            KfApp::Kustomize(app) | KfApp::DockerForDesktop(app) => app.generate(resources).await,
            KfApp::Existing(app) => app.generate(resources).await,
            KfApp::Gcp(app) => app.generate(resources).await,
        }
    }

    pub async fn apply(&self, client: &Client, resources: ResourceEnum) -> Result<()> {
        match self {
            KfApp::Kustomize(app) | KfApp::DockerForDesktop(app) => {
                app.apply(client, resources).await
            }
            KfApp::Existing(app) => app.apply(client, resources).await,
            KfApp::Gcp(app) => app.apply(client, resources).await,
        }
    }

    pub async fn delete(&self, client: &Client, resources: ResourceEnum) -> Result<()> {
        match self {
            KfApp::Kustomize(app) | KfApp::DockerForDesktop(app) => {
                app.delete(client, resources).await
            }
            KfApp::Existing(app) => app.delete(client, resources).await,
            KfApp::Gcp(app) => app.delete(client, resources).await,
        }
    }
}
