// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # Gatekeeper Operator
//!
//! A Kubernetes operator that installs and manages the Gatekeeper
//! admission-control system. A single cluster-scoped `Gatekeeper` custom
//! resource describes the desired installation; the operator renders its
//! embedded manifest catalog with field-level overrides from the spec and
//! reconciles the result against live cluster state.
//!
//! ## Modules
//!
//! - [`crd`] - The `Gatekeeper` custom resource types
//! - [`assets`] - Embedded manifest catalog and asset selection
//! - [`manifest`] - Typed access to semi-structured manifest documents
//! - [`args`] - Codec for `--key=value` container arguments
//! - [`overrides`] - Per-asset override rules
//! - [`reconcilers`] - Reconciliation driver and cluster CRUD
//! - [`context`] - Shared controller context and platform detection
//!
//! ## Example
//!
//! ```rust,no_run
//! use gatekeeper_operator::assets::{self, select_assets};
//! use gatekeeper_operator::crd::GatekeeperSpec;
//! use gatekeeper_operator::overrides::{apply_overrides, OverrideContext};
//!
//! # fn main() -> anyhow::Result<()> {
//! let spec = GatekeeperSpec::default();
//! let selection = select_assets(&spec);
//!
//! let ctx = OverrideContext {
//!     namespace: "gatekeeper-system".to_string(),
//!     webhook_deployment_pending: false,
//! };
//! for asset in &selection.apply {
//!     let mut doc = assets::load(asset)?;
//!     apply_overrides(&mut doc, &spec, &ctx)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod assets;
pub mod constants;
pub mod context;
pub mod crd;
pub mod duration;
pub mod manifest;
pub mod metrics;
pub mod overrides;
pub mod reconcilers;
