// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::manifest::GroupKind;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::{CustomResource, Resource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "app.k8s.io", version = "v1beta1", kind = "Application")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    #[serde(default)]
    pub component_group_kinds: Vec<GroupKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub selector: Option<LabelSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<Descriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_owner_ref: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub app_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Application {
    /// Whether a manifest object with this group and kind is an Application
    pub fn matches(group_kind: &GroupKind) -> bool {
        group_kind.group == Self::group(&()) && group_kind.kind == Self::kind(&())
    }
}

/// Collects the kinds deployed into an app namespace so they can be listed on
/// the Application objects of that namespace.
///
/// Applied objects are seen one by one, so an Application only lists the
/// kinds observed before it in the apply order.
#[derive(Debug, Clone)]
pub struct ApplicationComponents {
    namespace: String,
    spec: ApplicationSpec,
}

impl ApplicationComponents {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            spec: ApplicationSpec::default(),
        }
    }

    pub fn group_kinds(&self) -> &[GroupKind] {
        &self.spec.component_group_kinds
    }

    /// Record one routed object; Applications get the kinds seen so far
    pub fn observe(&mut self, namespace: &str, group_kind: &GroupKind, object: &mut Map<String, Value>) {
        if namespace != self.namespace {
            return;
        }

        if Application::matches(group_kind) {
            let kinds = serde_json::to_value(&self.spec.component_group_kinds)
                .unwrap_or_else(|_| Value::Array(Vec::new()));
            let spec = object
                .entry("spec")
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(spec) = spec {
                spec.insert("componentGroupKinds".to_string(), kinds);
            }
            return;
        }

        if !self.spec.component_group_kinds.contains(group_kind) {
            self.spec.component_group_kinds.push(group_kind.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_application_matches_group_and_kind() {
        assert!(Application::matches(&GroupKind::new("app.k8s.io", "Application")));
        assert!(!Application::matches(&GroupKind::new("", "Application")));
        assert!(!Application::matches(&GroupKind::new("app.k8s.io", "Deployment")));
    }

    #[test]
    fn test_collects_unique_kinds_in_namespace() {
        let mut components = ApplicationComponents::new("kubeflow");
        let mut obj = Map::new();

        components.observe("kubeflow", &GroupKind::new("apps", "Deployment"), &mut obj);
        components.observe("kubeflow", &GroupKind::new("", "Service"), &mut obj);
        components.observe("kubeflow", &GroupKind::new("apps", "Deployment"), &mut obj);
        components.observe("default", &GroupKind::new("", "ConfigMap"), &mut obj);

        assert_eq!(
            components.group_kinds(),
            &[GroupKind::new("apps", "Deployment"), GroupKind::new("", "Service")]
        );
    }

    #[test]
    fn test_injects_kinds_into_application() {
        let mut components = ApplicationComponents::new("kubeflow");
        let mut other = Map::new();
        components.observe("kubeflow", &GroupKind::new("apps", "Deployment"), &mut other);

        let mut app = object(json!({
            "apiVersion": "app.k8s.io/v1beta1",
            "kind": "Application",
            "metadata": { "name": "jupyter" },
            "spec": { "addOwnerRef": true }
        }));
        components.observe("kubeflow", &GroupKind::new("app.k8s.io", "Application"), &mut app);

        assert_eq!(
            app["spec"]["componentGroupKinds"],
            json!([{ "group": "apps", "kind": "Deployment" }])
        );
        assert_eq!(app["spec"]["addOwnerRef"], true);
        assert_eq!(components.group_kinds().len(), 1);

        let parsed: Application = serde_json::from_value(Value::Object(app)).unwrap();
        assert_eq!(
            parsed.spec.component_group_kinds,
            vec![GroupKind::new("apps", "Deployment")]
        );
    }

    #[test]
    fn test_leaves_applications_in_other_namespaces_alone() {
        let mut components = ApplicationComponents::new("kubeflow");
        let mut app = object(json!({ "kind": "Application" }));

        components.observe("default", &GroupKind::new("app.k8s.io", "Application"), &mut app);

        assert!(app.get("spec").is_none());
    }
}
