// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! KfApp rendered from kustomize packages of the manifests repo

use crate::config::Config;
use crate::constants::{files, DEFAULT_APP_LABEL};
use crate::error::{KfError, Result};
use crate::kfapp::ResourceEnum;
use crate::kubernetes::{
    delete_namespace_and_wait, ensure_namespace, KubeResourceClient, NamespaceLabels,
};
use crate::manifest::{Applier, GroupKind};
use crate::types::{ApplicationComponents, KfDef, NameValue};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{DeleteParams, ListParams};
use kube::{Api, Client};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

const KUSTOMIZATION_API_VERSION: &str = "kustomize.config.k8s.io/v1beta1";
const DEFAULT_MANIFESTS_VERSION: &str = "master";

#[derive(Debug, Clone)]
pub struct KustomizeApp {
    kfdef: KfDef,
    kustomize_bin: String,
    namespace_labels: NamespaceLabels,
    poll_interval: Duration,
}

impl KustomizeApp {
    pub fn new(kfdef: KfDef, config: &Config) -> Self {
        Self {
            kfdef,
            kustomize_bin: config.kustomize_bin.clone(),
            namespace_labels: config.namespace_labels.clone(),
            poll_interval: config.namespace_poll_interval,
        }
    }

    pub fn kfdef(&self) -> &KfDef {
        &self.kfdef
    }

    fn manifests_repo(&self) -> Result<&Path> {
        self.kfdef
            .spec
            .manifests_repo
            .as_deref()
            .ok_or_else(|| KfError::InvalidArgument("spec.manifestsRepo is not set".to_string()))
    }

    fn output_dir(&self) -> PathBuf {
        self.kfdef.app_dir().join(files::KUSTOMIZE_OUTPUT_DIR)
    }

    /// Rendered manifest of every configured component that was generated
    fn component_files(&self) -> Vec<PathBuf> {
        let output_dir = self.output_dir();
        self.kfdef
            .spec
            .components
            .iter()
            .map(|component| output_dir.join(format!("{}.yaml", component)))
            .filter(|file| file.is_file())
            .collect()
    }

    /// Check the manifests checkout and write the app config into the app dir
    #[instrument(skip(self), fields(app = %self.kfdef.name()))]
    pub async fn init(&self, _resources: ResourceEnum) -> Result<()> {
        let version = self
            .kfdef
            .package_manager_version()
            .unwrap_or(DEFAULT_MANIFESTS_VERSION);
        let repo = self.manifests_repo()?;
        if !repo.is_dir() {
            return Err(KfError::InvalidArgument(format!(
                "manifests repo {} (version {}) is not a local directory",
                repo.display(),
                version
            )));
        }
        info!("Using manifests from {} (version {})", repo.display(), version);

        let app_dir = self.kfdef.app_dir();
        fs::create_dir_all(&app_dir).map_err(|e| KfError::io(&app_dir, e))?;
        self.kfdef.write_config_file(&app_dir)?;
        Ok(())
    }

    /// Render every configured component into the app's kustomize directory
    #[instrument(skip(self), fields(app = %self.kfdef.name()))]
    pub async fn generate(&self, resources: ResourceEnum) -> Result<()> {
        if resources == ResourceEnum::Platform {
            return Ok(());
        }

        let repo = self.manifests_repo()?;
        let component_map = map_components(repo, &self.kfdef.spec.packages)?;
        update_param_files(
            repo,
            &component_map,
            &self.kfdef.spec.components,
            &self.kfdef.spec.component_params,
        )?;

        let output_dir = self.output_dir();
        fs::create_dir_all(&output_dir).map_err(|e| KfError::io(&output_dir, e))?;

        // One kustomization at the repo root is rewritten per component, so
        // components are rendered one after the other.
        for component in &self.kfdef.spec.components {
            let Some(component_path) = component_map.get(component) else {
                warn!("Component {} not found in any listed package", component);
                continue;
            };

            write_kustomization_file(
                repo,
                component_path,
                self.kfdef.name(),
                self.kfdef.namespace(),
            )?;
            let rendered = render(&self.kustomize_bin, repo, component).await?;

            let file = output_dir.join(format!("{}.yaml", component));
            fs::write(&file, rendered).map_err(|e| KfError::io(&file, e))?;
            info!("Generated {}", file.display());
        }
        Ok(())
    }

    /// Create the app namespace and everything generated for it
    #[instrument(skip(self, client), fields(app = %self.kfdef.name()))]
    pub async fn apply(&self, client: &Client, resources: ResourceEnum) -> Result<()> {
        if resources == ResourceEnum::Platform {
            return Ok(());
        }

        let namespace = self.kfdef.namespace();
        ensure_namespace(client, namespace, &self.namespace_labels).await?;

        let applier = Applier::new(KubeResourceClient::new(client.clone()));
        let mut components = ApplicationComponents::new(namespace);
        let mut observer = |ns: &str, gk: &GroupKind, object: &mut Map<String, Value>| {
            components.observe(ns, gk, object)
        };

        applier
            .apply_files(&self.component_files(), Some(&mut observer))
            .await?;

        info!("Applied {} to namespace {}", self.kfdef.name(), namespace);
        Ok(())
    }

    /// Remove cluster-scoped objects carrying the app label, then the namespace
    #[instrument(skip(self, client), fields(app = %self.kfdef.name()))]
    pub async fn delete(&self, client: &Client, resources: ResourceEnum) -> Result<()> {
        if resources == ResourceEnum::Platform {
            return Ok(());
        }

        let selector = format!("{}={}", DEFAULT_APP_LABEL, self.kfdef.name());
        delete_global_resources(client, &selector).await;

        delete_namespace_and_wait(client, self.kfdef.namespace(), self.poll_interval).await
    }
}

/// Best effort: failures are logged so the namespace deletion still happens
async fn delete_global_resources(client: &Client, selector: &str) {
    let params = ListParams::default().labels(selector);
    let delete = DeleteParams::default();

    let crds: Api<CustomResourceDefinition> = Api::all(client.clone());
    if let Err(e) = crds.delete_collection(&delete, &params).await {
        warn!("Couldn't delete customresourcedefinitions: {}", e);
    }

    let bindings: Api<ClusterRoleBinding> = Api::all(client.clone());
    if let Err(e) = bindings.delete_collection(&delete, &params).await {
        warn!("Couldn't delete clusterrolebindings: {}", e);
    }

    let roles: Api<ClusterRole> = Api::all(client.clone());
    if let Err(e) = roles.delete_collection(&delete, &params).await {
        warn!("Couldn't delete clusterroles: {}", e);
    }
}

/// Map every leaf directory of a listed package to its path in the repo.
///
/// Leaves are keyed by directory name; a package list containing `all`
/// accepts every package. Hidden directories are not searched.
pub fn map_components(repo: &Path, packages: &[String]) -> Result<BTreeMap<String, String>> {
    let mut components = BTreeMap::new();
    collect_leaves(repo, repo, packages, &mut components)?;
    Ok(components)
}

fn collect_leaves(
    repo: &Path,
    dir: &Path,
    packages: &[String],
    components: &mut BTreeMap<String, String>,
) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| KfError::io(dir, e))?;

    let mut subdirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| KfError::io(dir, e))?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_dir() && !hidden {
            subdirs.push(path);
        }
    }
    subdirs.sort();

    if subdirs.is_empty() && dir != repo {
        let Ok(relative) = dir.strip_prefix(repo) else {
            return Ok(());
        };
        let component_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let package = component_path.split('/').next().unwrap_or_default();

        if packages.iter().any(|p| p == package || p == "all") {
            if let Some(name) = dir.file_name() {
                debug!("Found component {} in package {}", component_path, package);
                components.insert(name.to_string_lossy().into_owned(), component_path);
            }
        }
        return Ok(());
    }

    for subdir in subdirs {
        collect_leaves(repo, &subdir, packages, components)?;
    }
    Ok(())
}

/// Overwrite `name=value` lines of component param files with configured values.
///
/// Names that are not already present in the file are not added.
pub fn update_param_files(
    repo: &Path,
    component_map: &BTreeMap<String, String>,
    components: &[String],
    component_params: &BTreeMap<String, Vec<NameValue>>,
) -> Result<()> {
    for component in components {
        let (Some(params), Some(component_path)) =
            (component_params.get(component), component_map.get(component))
        else {
            continue;
        };

        let file = repo
            .join(component_path)
            .join(files::KUSTOMIZATION_PARAM_FILE);
        if !file.is_file() {
            continue;
        }

        let values: BTreeMap<&str, &str> = params
            .iter()
            .map(|nv| (nv.name.as_str(), nv.value.as_str()))
            .collect();
        let content = fs::read_to_string(&file).map_err(|e| KfError::io(&file, e))?;

        let mut updated = String::with_capacity(content.len());
        for line in content.lines() {
            let name = line.split('=').next().unwrap_or_default();
            match values.get(name) {
                Some(value) => updated.push_str(&format!("{}={}", name, value)),
                None => updated.push_str(line),
            }
            updated.push('\n');
        }

        fs::write(&file, updated).map_err(|e| KfError::io(&file, e))?;
        debug!("Updated {}", file.display());
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Kustomization<'a> {
    api_version: &'a str,
    kind: &'a str,
    bases: Vec<&'a str>,
    common_labels: BTreeMap<&'a str, &'a str>,
    namespace: &'a str,
}

/// Write the root kustomization selecting one component of the repo
pub fn write_kustomization_file(
    repo: &Path,
    component_path: &str,
    app_name: &str,
    namespace: &str,
) -> Result<()> {
    let kustomization = Kustomization {
        api_version: KUSTOMIZATION_API_VERSION,
        kind: "Kustomization",
        bases: vec![component_path],
        common_labels: BTreeMap::from([(DEFAULT_APP_LABEL, app_name)]),
        namespace,
    };
    let content = serde_yaml::to_string(&kustomization).map_err(|e| KfError::Render {
        component: component_path.to_string(),
        reason: e.to_string(),
    })?;

    let file = repo.join(files::KUSTOMIZATION_FILE);
    fs::write(&file, content).map_err(|e| KfError::io(&file, e))
}

/// Run `<bin> build <dir>` and return its standard output
async fn render(bin: &str, dir: &Path, component: &str) -> Result<String> {
    let output = Command::new(bin)
        .arg("build")
        .arg(dir)
        .output()
        .await
        .map_err(|e| KfError::Render {
            component: component.to_string(),
            reason: format!("couldn't run {}: {}", bin, e),
        })?;

    if !output.status.success() {
        return Err(KfError::Render {
            component: component.to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| KfError::Render {
        component: component.to_string(),
        reason: format!("output is not UTF-8: {}", e),
    })
}
