// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Namespace used for manifests that do not set `metadata.namespace`
pub const DEFAULT_OBJECT_NAMESPACE: &str = "default";

/// Namespace a KfApp is deployed into when the KfDef does not name one
pub const DEFAULT_APP_NAMESPACE: &str = "kubeflow";

/// Label carrying the KfApp name on every generated object
pub const DEFAULT_APP_LABEL: &str = "app.kubernetes.io/name";

/// File names inside the app directory and the manifests repo
pub mod files {
    pub const KF_CONFIG_FILE: &str = "app.yaml";
    pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";
    pub const KUSTOMIZATION_PARAM_FILE: &str = "params.env";
    /// Directory under the app dir holding rendered component manifests
    pub const KUSTOMIZE_OUTPUT_DIR: &str = "kustomize";
}

/// KfDef API group and the versions the loader understands
pub mod kfdef {
    pub const API_GROUP: &str = "kfdef.apps.kubeflow.org";
    pub const SUPPORTED_VERSIONS: &[&str] = &["v1alpha1", "v1beta1"];
}

/// Polling configuration
pub mod poll {
    /// Interval between namespace deletion checks
    pub const NAMESPACE_INTERVAL_SECS: u64 = 5;
    /// Interval between load balancer checks
    pub const LOAD_BALANCER_INTERVAL_SECS: u64 = 10;
    /// Number of load balancer checks before giving up
    pub const LOAD_BALANCER_MAX_ATTEMPTS: u32 = 20;
}

/// Istio ingress gateway the existing platform exposes Kubeflow through
pub mod ingress {
    pub const NAMESPACE: &str = "istio-system";
    pub const SERVICE: &str = "istio-ingressgateway";
}

/// Labels enforced on Kubeflow namespaces unless configured otherwise
pub const DEFAULT_NAMESPACE_LABELS: &[(&str, &str)] = &[
    ("katib-metricscollector-injection", "enabled"),
    ("serving.kubeflow.org/inferenceservice", "enabled"),
    ("pipelines.kubeflow.org/enabled", "true"),
    ("app.kubernetes.io/part-of", "kubeflow-profile"),
];
