// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Rendered manifest handling: document splitting and the generic applier.

pub mod applier;
pub mod document;

pub use applier::{Applier, ObserverFn, Operation};
pub use document::{split_api_version, split_documents, GroupKind, ManifestDocument};
