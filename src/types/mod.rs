// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod application;
pub mod kfdef;

pub use application::{Application, ApplicationComponents, ApplicationSpec};
pub use kfdef::{load_kfdef, KfDef, KfDefSpec, NameValue};
