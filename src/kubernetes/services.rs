// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Service load balancer lookups

use crate::error::{KfError, Result};
use crate::kubernetes::wait::poll_bounded;
use k8s_openapi::api::core::v1::Service;
use kube::{Api, Client};
use std::time::Duration;
use tracing::{info, instrument};

/// First load balancer address published on a service, preferring the IP
pub fn load_balancer_address(service: &Service) -> Option<String> {
    let ingress = service
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .as_ref()?
        .first()?;

    ingress.ip.clone().or_else(|| ingress.hostname.clone())
}

/// Wait until a LoadBalancer service has an external address.
///
/// Fails with a timeout after `max_attempts` lookups; a failed lookup aborts
/// the wait immediately.
#[instrument(skip(client))]
pub async fn wait_for_load_balancer_ip(
    client: &Client,
    namespace: &str,
    name: &str,
    max_attempts: u32,
    interval: Duration,
) -> Result<String> {
    let services: Api<Service> = Api::namespaced(client.clone(), namespace);
    let operation = format!("{}/{} Service External IP", namespace, name);

    let address = poll_bounded(&operation, max_attempts, interval, || {
        let services = services.clone();
        async move {
            info!("Trying to get {} Service External IP", name);
            let service = services.get(name).await?;
            Ok::<_, KfError>(load_balancer_address(&service))
        }
    })
    .await?;

    info!("Found {} External IP: {}", name, address);
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{not_found_json, service_json, MockService};

    const SVC_PATH: &str = "/api/v1/namespaces/istio-system/services/istio-ingressgateway";

    #[test]
    fn test_load_balancer_address_prefers_ip() {
        let service: Service = serde_json::from_value(serde_json::json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": { "name": "gw" },
            "status": { "loadBalancer": { "ingress": [
                { "ip": "10.0.0.7", "hostname": "gw.example.com" }
            ] } }
        }))
        .unwrap();

        assert_eq!(load_balancer_address(&service).as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn test_load_balancer_address_falls_back_to_hostname() {
        let service: Service = serde_json::from_value(serde_json::json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": { "name": "gw" },
            "status": { "loadBalancer": { "ingress": [ { "hostname": "gw.example.com" } ] } }
        }))
        .unwrap();

        assert_eq!(
            load_balancer_address(&service).as_deref(),
            Some("gw.example.com")
        );
    }

    #[test]
    fn test_load_balancer_address_missing_status() {
        let service = Service::default();
        assert_eq!(load_balancer_address(&service), None);
    }

    #[tokio::test]
    async fn test_wait_returns_once_ip_is_assigned() {
        let mock = MockService::new()
            .on_get(SVC_PATH, 200, &service_json("istio-system", "istio-ingressgateway", None))
            .on_get(
                SVC_PATH,
                200,
                &service_json("istio-system", "istio-ingressgateway", Some("34.1.2.3")),
            );
        let client = mock.clone().into_client();

        let ip = wait_for_load_balancer_ip(
            &client,
            "istio-system",
            "istio-ingressgateway",
            20,
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(ip, "34.1.2.3");
        assert_eq!(mock.count("GET", SVC_PATH), 2);
    }

    #[tokio::test]
    async fn test_wait_times_out_after_max_attempts() {
        let mock = MockService::new().on_get(
            SVC_PATH,
            200,
            &service_json("istio-system", "istio-ingressgateway", None),
        );
        let client = mock.clone().into_client();

        let result = wait_for_load_balancer_ip(
            &client,
            "istio-system",
            "istio-ingressgateway",
            4,
            Duration::ZERO,
        )
        .await;

        assert!(matches!(result, Err(KfError::Timeout { attempts: 4, .. })));
        assert_eq!(mock.count("GET", SVC_PATH), 4);
    }

    #[tokio::test]
    async fn test_wait_aborts_on_lookup_error() {
        let mock = MockService::new().on_get(
            SVC_PATH,
            404,
            &not_found_json("services", "istio-ingressgateway"),
        );
        let client = mock.clone().into_client();

        let result = wait_for_load_balancer_ip(
            &client,
            "istio-system",
            "istio-ingressgateway",
            4,
            Duration::ZERO,
        )
        .await;

        assert!(matches!(result, Err(KfError::Kube(_))));
        assert_eq!(mock.count("GET", SVC_PATH), 1);
    }
}
