// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{files, poll};
use crate::kubernetes::NamespaceLabels;

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the KfDef file describing the app
    pub config_file: PathBuf,
    /// Kubeconfig context to use instead of the current one
    pub kube_context: Option<String>,
    pub kubeflow_endpoint: Option<String>,
    pub oidc_endpoint: Option<String>,
    /// Labels reconciled onto the app namespace
    pub namespace_labels: NamespaceLabels,
    /// Renderer invoked as `<bin> build <dir>`
    pub kustomize_bin: String,
    pub namespace_poll_interval: Duration,
    pub load_balancer_max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            config_file: PathBuf::from(files::KF_CONFIG_FILE),
            kube_context: None,
            kubeflow_endpoint: None,
            oidc_endpoint: None,
            namespace_labels: NamespaceLabels::kubeflow_defaults(),
            kustomize_bin: "kustomize".to_string(),
            namespace_poll_interval: Duration::from_secs(poll::NAMESPACE_INTERVAL_SECS),
            load_balancer_max_attempts: poll::LOAD_BALANCER_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration from any variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = var("KFCTL_CONFIG") {
            config.config_file = PathBuf::from(path);
        }
        config.kube_context = var("KFCTL_KUBE_CONTEXT").filter(|c| !c.is_empty());
        config.kubeflow_endpoint = endpoint_var(&var, "KUBEFLOW_ENDPOINT")?;
        config.oidc_endpoint = endpoint_var(&var, "OIDC_ENDPOINT")?;

        if let Some(path) = var("KFCTL_NAMESPACE_LABELS") {
            config.namespace_labels = NamespaceLabels::from_file(&path)
                .with_context(|| format!("Failed to load namespace labels from {}", path))?;
        }
        if let Some(bin) = var("KFCTL_KUSTOMIZE_BIN") {
            config.kustomize_bin = bin;
        }
        if let Some(secs) = var("KFCTL_POLL_INTERVAL_SECS") {
            let secs: u64 = secs
                .parse()
                .context("KFCTL_POLL_INTERVAL_SECS must be a number of seconds")?;
            config.namespace_poll_interval = Duration::from_secs(secs);
        }
        if let Some(attempts) = var("KFCTL_LB_MAX_ATTEMPTS") {
            let attempts: u32 = attempts
                .parse()
                .context("KFCTL_LB_MAX_ATTEMPTS must be a positive number")?;
            if attempts == 0 {
                bail!("KFCTL_LB_MAX_ATTEMPTS must be a positive number");
            }
            config.load_balancer_max_attempts = attempts;
        }

        Ok(config)
    }
}

/// Read an optional endpoint variable, rejecting values that are not URLs
fn endpoint_var<F>(var: &F, name: &str) -> Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) if !value.is_empty() => {
            url::Url::parse(&value).with_context(|| format!("{} is not a valid URL", name))?;
            Ok(Some(value))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = load(&[]).unwrap();

        assert_eq!(config.config_file, PathBuf::from("app.yaml"));
        assert_eq!(config.kube_context, None);
        assert_eq!(config.kubeflow_endpoint, None);
        assert_eq!(config.kustomize_bin, "kustomize");
        assert_eq!(config.namespace_poll_interval, Duration::from_secs(5));
        assert_eq!(config.load_balancer_max_attempts, 20);
        assert_eq!(config.namespace_labels, NamespaceLabels::kubeflow_defaults());
    }

    #[test]
    fn test_overrides_from_variables() {
        let config = load(&[
            ("KFCTL_CONFIG", "/work/app.yaml"),
            ("KFCTL_KUBE_CONTEXT", "staging"),
            ("KUBEFLOW_ENDPOINT", "https://kf.example.com"),
            ("OIDC_ENDPOINT", ""),
            ("KFCTL_KUSTOMIZE_BIN", "/usr/local/bin/kustomize"),
            ("KFCTL_POLL_INTERVAL_SECS", "1"),
            ("KFCTL_LB_MAX_ATTEMPTS", "3"),
        ])
        .unwrap();

        assert_eq!(config.config_file, PathBuf::from("/work/app.yaml"));
        assert_eq!(config.kube_context.as_deref(), Some("staging"));
        assert_eq!(config.kubeflow_endpoint.as_deref(), Some("https://kf.example.com"));
        assert_eq!(config.oidc_endpoint, None);
        assert_eq!(config.kustomize_bin, "/usr/local/bin/kustomize");
        assert_eq!(config.namespace_poll_interval, Duration::from_secs(1));
        assert_eq!(config.load_balancer_max_attempts, 3);
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        let err = load(&[("KUBEFLOW_ENDPOINT", "not a url")]).unwrap_err();
        assert!(err.to_string().contains("KUBEFLOW_ENDPOINT"));
    }

    #[test]
    fn test_rejects_non_numeric_poll_interval() {
        let err = load(&[("KFCTL_POLL_INTERVAL_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("KFCTL_POLL_INTERVAL_SECS"));
    }

    #[test]
    fn test_rejects_zero_load_balancer_attempts() {
        let err = load(&[("KFCTL_LB_MAX_ATTEMPTS", "0")]).unwrap_err();
        assert!(err.to_string().contains("KFCTL_LB_MAX_ATTEMPTS"));
    }

    #[test]
    fn test_loads_namespace_labels_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.yaml");
        std::fs::write(&path, "team: ml\n").unwrap();

        let config = load(&[("KFCTL_NAMESPACE_LABELS", path.to_str().unwrap())]).unwrap();

        let labels: Vec<_> = config.namespace_labels.iter().collect();
        assert_eq!(labels, vec![(&"team".to_string(), &"ml".to_string())]);
    }

    #[test]
    fn test_missing_namespace_labels_file_fails() {
        let err = load(&[("KFCTL_NAMESPACE_LABELS", "/nonexistent/labels.yaml")]).unwrap_err();
        assert!(err.to_string().contains("namespace labels"));
    }
}
