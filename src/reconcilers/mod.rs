// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Reconciliation logic for the Gatekeeper operator.
//!
//! The operator follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Monitor `Gatekeeper` resource changes via the API server
//! 2. **Reconcile** - Render the asset catalog with spec overrides applied
//! 3. **Apply** - Create, update, or delete the rendered cluster objects
//! 4. **Requeue** - Re-run after a delay while the webhook rollout is pending
//!
//! [`gatekeeper`] holds the driver; [`resources`] holds the dynamic cluster
//! CRUD and server-field retention.

pub mod gatekeeper;
pub mod resources;

pub use gatekeeper::{evaluate_deployment_readiness, reconcile_gatekeeper, Outcome, Readiness};
