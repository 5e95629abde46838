// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for discovery-driven resource access, namespace
//! lifecycle, label reconciliation and bounded polling.

pub mod client;
pub mod labels;
pub mod namespaces;
pub mod services;
pub mod wait;

pub use client::{create_client, KubeResourceClient, RequestOutcome, ResourceClient, ResourceMapping};
pub use labels::{reconcile_namespace_labels, NamespaceLabels};
pub use namespaces::{delete_namespace_and_wait, ensure_namespace, NamespacePhase};
pub use services::wait_for_load_balancer_ip;
pub use wait::poll_bounded;
