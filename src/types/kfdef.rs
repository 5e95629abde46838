// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{files, kfdef, DEFAULT_APP_NAMESPACE};
use crate::error::{KfError, Result};
use crate::manifest::split_api_version;
use kube::api::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Definition of a Kubeflow deployment
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KfDef {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: KfDefSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KfDefSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_dir: Option<PathBuf>,
    /// Checkout of the kubeflow repo, used by the existing platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<PathBuf>,
    /// Checkout of the manifests repo holding the kustomize packages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests_repo: Option<PathBuf>,
    /// `kustomize` optionally followed by `@<version>`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub package_manager: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub component_params: BTreeMap<String, Vec<NameValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NameValue {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl KfDef {
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Namespace the app is deployed into
    pub fn namespace(&self) -> &str {
        self.metadata
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(DEFAULT_APP_NAMESPACE)
    }

    pub fn app_dir(&self) -> PathBuf {
        self.spec
            .app_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Version requested after `@` in the package manager, if any
    pub fn package_manager_version(&self) -> Option<&str> {
        self.spec
            .package_manager
            .split_once('@')
            .map(|(_, version)| version)
            .filter(|v| !v.is_empty())
    }

    /// Persist the definition as the app config file inside `app_dir`
    pub fn write_config_file(&self, app_dir: &Path) -> Result<PathBuf> {
        let path = app_dir.join(files::KF_CONFIG_FILE);
        let content = serde_yaml::to_string(self)
            .map_err(|e| KfError::Config(format!("Failed to serialize KfDef: {}", e)))?;
        fs::write(&path, content).map_err(|e| KfError::io(&path, e))?;

        info!("Wrote app config to {}", path.display());
        Ok(path)
    }
}

/// Load a KfDef from disk, validating its API version
pub fn load_kfdef(path: &Path) -> Result<KfDef> {
    let content = fs::read_to_string(path).map_err(|e| KfError::io(path, e))?;
    parse_kfdef(&content)
}

pub fn parse_kfdef(content: &str) -> Result<KfDef> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| KfError::Config(format!("KfDef is not valid YAML: {}", e)))?;

    let api_version = value
        .get("apiVersion")
        .and_then(serde_yaml::Value::as_str)
        .ok_or_else(|| KfError::InvalidArgument("apiVersion is not found".to_string()))?;
    check_api_version(api_version)?;

    let kfdef: KfDef = serde_yaml::from_value(value)
        .map_err(|e| KfError::Config(format!("Failed to parse KfDef: {}", e)))?;
    debug!("Loaded KfDef {} ({})", kfdef.name(), kfdef.api_version);
    Ok(kfdef)
}

fn check_api_version(api_version: &str) -> Result<()> {
    let (group, version) = split_api_version(api_version);
    if group != kfdef::API_GROUP {
        return Err(KfError::InvalidArgument(format!(
            "apiVersion must be in the format of {}/<version>, got {}",
            kfdef::API_GROUP,
            api_version
        )));
    }
    if !kfdef::SUPPORTED_VERSIONS.contains(&version) {
        return Err(KfError::InvalidArgument(format!(
            "version not supported; supported versions: {}, got {}",
            kfdef::SUPPORTED_VERSIONS.join(", "),
            version
        )));
    }
    Ok(())
}
