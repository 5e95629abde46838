// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod kfapp;
pub mod kubernetes;
pub mod manifest;
pub mod types;

#[cfg(test)]
mod test_utils;
