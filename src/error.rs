// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KfError {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(String),

    #[error("Invalid manifest in {file}: {reason}")]
    InvalidManifest { file: PathBuf, reason: String },

    #[error("Cannot map {kind} in group '{group}' version '{version}' from {file}: {reason}")]
    UnknownResource {
        file: PathBuf,
        group: String,
        version: String,
        kind: String,
        reason: String,
    },

    #[error("Request for {kind} '{name}' from {file} failed: {source}")]
    Request {
        file: PathBuf,
        kind: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Timed out after {attempts} attempts while waiting for {operation}")]
    Timeout { operation: String, attempts: u32 },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Rendering component {component} failed: {reason}")]
    Render { component: String, reason: String },

    #[error("{platform} {operation} failed: {source}")]
    Platform {
        platform: String,
        operation: String,
        #[source]
        source: Box<KfError>,
    },

    #[error("Namespace operation failed: {0}")]
    Namespace(String),
}

impl KfError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KfError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, KfError>;
