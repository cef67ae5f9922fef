// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Global constants for the Gatekeeper operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the Gatekeeper operator CRD
pub const API_GROUP: &str = "operator.gatekeeper.sh";

/// API version for the Gatekeeper operator CRD
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "operator.gatekeeper.sh/v1alpha1";

/// Kind name for the `Gatekeeper` resource
pub const KIND_GATEKEEPER: &str = "Gatekeeper";

/// The single accepted name for a `Gatekeeper` resource. Any other name is
/// logged and ignored rather than reconciled.
pub const GATEKEEPER_CR_NAME: &str = "gatekeeper";

// ============================================================================
// Managed Workload Names
// ============================================================================

/// Default namespace the Gatekeeper components are installed into
pub const DEFAULT_GATEKEEPER_NAMESPACE: &str = "gatekeeper-system";

/// Name of the audit Deployment
pub const AUDIT_DEPLOYMENT_NAME: &str = "gatekeeper-audit";

/// Name of the webhook (controller-manager) Deployment
pub const WEBHOOK_DEPLOYMENT_NAME: &str = "gatekeeper-controller-manager";

/// Name of the manager container inside both Deployments
pub const MANAGER_CONTAINER_NAME: &str = "manager";

/// Name of the primary enforcement webhook entry inside the validating
/// webhook configuration
pub const VALIDATION_WEBHOOK_NAME: &str = "validation.gatekeeper.sh";

/// Name of the namespace-label guard webhook entry
pub const CHECK_IGNORE_LABEL_WEBHOOK_NAME: &str = "check-ignore-label.gatekeeper.sh";

/// Name of the mutation webhook entry inside the mutating webhook configuration
pub const MUTATION_WEBHOOK_NAME: &str = "mutation.gatekeeper.sh";

/// Name of the mutating webhook configuration object, referenced by the
/// `ClusterRole` rule that is pruned when mutation is disabled
pub const MUTATING_WEBHOOK_CONFIGURATION_NAME: &str = "gatekeeper-mutating-webhook-configuration";

/// API group granting access to Gatekeeper mutators, pruned from the
/// `ClusterRole` when mutation is disabled
pub const MUTATION_API_GROUP: &str = "mutations.gatekeeper.sh";

// ============================================================================
// Managed Workload Container Flags
//
// Exact spellings are part of the compatibility contract with the Gatekeeper
// binary and must be reproduced verbatim.
// ============================================================================

/// Log verbosity flag, shared by both Deployments
pub const LOG_LEVEL_ARG: &str = "log-level";

/// Interval between audit runs, in seconds
pub const AUDIT_INTERVAL_ARG: &str = "audit-interval";

/// Upper bound on reported constraint violations
pub const CONSTRAINT_VIOLATIONS_LIMIT_ARG: &str = "constraint-violations-limit";

/// Audit from the informer cache instead of live API reads
pub const AUDIT_FROM_CACHE_ARG: &str = "audit-from-cache";

/// Page size for audit list requests
pub const AUDIT_CHUNK_SIZE_ARG: &str = "audit-chunk-size";

/// Emit Kubernetes events for audit violations
pub const EMIT_AUDIT_EVENTS_ARG: &str = "emit-audit-events";

/// Emit Kubernetes events for admission violations
pub const EMIT_ADMISSION_EVENTS_ARG: &str = "emit-admission-events";

/// Namespace exempted from admission review (the install namespace itself)
pub const EXEMPT_NAMESPACE_ARG: &str = "exempt-namespace";

/// Enable the mutation feature in the webhook Deployment
pub const ENABLE_MUTATION_ARG: &str = "enable-mutation";

// ============================================================================
// Controller Scheduling Constants
// ============================================================================

/// Requeue delay while waiting for the webhook Deployment to become ready
pub const DEPLOYMENT_PENDING_REQUEUE_SECS: u64 = 5;

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Number of worker threads for the Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for the Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for the Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for the metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
