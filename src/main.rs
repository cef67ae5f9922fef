// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use futures::StreamExt;
use gatekeeper_operator::constants::{
    DEFAULT_GATEKEEPER_NAMESPACE, ERROR_REQUEUE_DURATION_SECS, TOKIO_WORKER_THREADS,
};
use gatekeeper_operator::context::{detect_platform, Context, Platform};
use gatekeeper_operator::crd::Gatekeeper;
use gatekeeper_operator::metrics::{record_reconciliation, run_metrics_server};
use gatekeeper_operator::reconcilers::{reconcile_gatekeeper, Outcome};
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

/// Command-line options for the operator process.
#[derive(Debug, Parser)]
#[command(name = "gatekeeper-operator", about = "Gatekeeper admission-control operator")]
struct Options {
    /// Namespace to install the Gatekeeper components into. Defaults to the
    /// operator's own namespace (POD_NAMESPACE) or gatekeeper-system.
    #[arg(long)]
    namespace: Option<String>,

    /// Override platform detection: "kubernetes" or "openshift".
    #[arg(long)]
    platform: Option<String>,
}

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("gatekeeper-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Initialize logging with custom format
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Respects RUST_LOG_FORMAT environment variable for output format (text/json)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let options = Options::parse();

    info!("Starting Gatekeeper operator");

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;

    let platform = match options.platform.as_deref() {
        Some("openshift") => Platform::OpenShift,
        Some("kubernetes") => Platform::Kubernetes,
        Some(other) => anyhow::bail!("unknown platform override '{other}'"),
        None => detect_platform(&client).await?,
    };
    info!("Detected platform: {:?}", platform);

    let namespace = options
        .namespace
        .or_else(|| std::env::var("POD_NAMESPACE").ok())
        .unwrap_or_else(|| DEFAULT_GATEKEEPER_NAMESPACE.to_string());
    info!("Installing Gatekeeper into namespace '{}'", namespace);

    let ctx = Arc::new(Context::new(client.clone(), namespace, platform));

    tokio::select! {
        result = run_gatekeeper_controller(client, ctx) => {
            error!("CRITICAL: Gatekeeper controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Gatekeeper controller exited unexpectedly without error")
        }
        result = run_metrics_server() => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
    }
}

async fn run_gatekeeper_controller(client: Client, ctx: Arc<Context>) -> Result<()> {
    let gatekeepers: Api<Gatekeeper> = Api::all(client);

    info!("Starting Gatekeeper controller");
    Controller::new(gatekeepers, Config::default())
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((object, _)) => debug!("Reconciled {}", object.name),
                Err(e) => error!("Reconciliation error: {:?}", e),
            }
        })
        .await;

    Ok(())
}

async fn reconcile(
    gatekeeper: Arc<Gatekeeper>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    match reconcile_gatekeeper(&ctx, &gatekeeper).await {
        Ok(Outcome::Converged) => {
            record_reconciliation("success", started.elapsed());
            Ok(Action::await_change())
        }
        Ok(Outcome::Requeue(after)) => {
            record_reconciliation("requeue", started.elapsed());
            Ok(Action::requeue(after))
        }
        Err(e) => {
            record_reconciliation("error", started.elapsed());
            error!("Failed to reconcile {}: {:?}", gatekeeper.name_any(), e);
            Err(ReconcileError(e))
        }
    }
}

fn error_policy(_gatekeeper: Arc<Gatekeeper>, _error: &ReconcileError, _ctx: Arc<Context>) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
