//! Backend that serves the dashboard bundle and its evaluated signals.
//!
//! The bundle is rebuilt at most once per cache TTL unless a client asks for
//! `force_refresh=true`.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::cache::{BundleCache, CacheOutcome};
use crate::models::{DashboardBundle, RiskSignal, Severity};
use crate::risk;
use crate::source::DASHBOARD_PATH;

pub const RISK_PATH: &str = "/api/risk";

type BuildBundle = dyn Fn() -> DashboardBundle + Send + Sync;

pub struct ServerState {
    cache: BundleCache,
    build: Box<BuildBundle>,
}

impl ServerState {
    pub fn new(
        cache: BundleCache,
        build: impl Fn() -> DashboardBundle + Send + Sync + 'static,
    ) -> Self {
        Self {
            cache,
            build: Box::new(build),
        }
    }

    fn bundle(&self, force_refresh: bool) -> DashboardBundle {
        let (bundle, outcome) = self
            .cache
            .get_or_refresh(Instant::now(), force_refresh, || (self.build)());
        if outcome == CacheOutcome::Refreshed {
            tracing::debug!(force_refresh, "dashboard bundle rebuilt");
        }
        bundle
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResponse {
    pub date: chrono::NaiveDate,
    pub peak_severity: Option<Severity>,
    pub signals: Vec<RiskSignal>,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(DASHBOARD_PATH, get(read_dashboard))
        .route(RISK_PATH, get(read_risk))
        .with_state(state)
}

async fn read_dashboard(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<DashboardParams>,
) -> Json<DashboardBundle> {
    Json(state.bundle(params.force_refresh))
}

async fn read_risk(State(state): State<Arc<ServerState>>) -> Json<RiskResponse> {
    let bundle = state.bundle(false);
    let signals = risk::evaluate(&bundle);
    Json(RiskResponse {
        date: bundle.summary.date,
        peak_severity: risk::peak_severity(&signals),
        signals,
    })
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr().context("failed to read bound address")?;

    tracing::info!(addr = %local, ttl_secs = state.cache.ttl().as_secs(), "dashboard backend listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await
        .context("dashboard backend stopped unexpectedly")?;

    Ok(())
}

/// Resolves once `signal` fires. If the listener cannot be installed the
/// server keeps running instead of shutting down immediately.
async fn shutdown_signal(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => tracing::info!("dashboard backend shutting down"),
        Err(error) => {
            tracing::error!(%error, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct Running {
        base: String,
        builds: Arc<AtomicU32>,
    }

    async fn spawn_backend() -> Running {
        let builds = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&builds);
        let state = Arc::new(ServerState::new(BundleCache::new(Duration::from_secs(300)), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            mock::mock_bundle(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap())
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        Running {
            base: format!("http://{addr}"),
            builds,
        }
    }

    #[tokio::test]
    async fn dashboard_is_served_in_camel_case_from_cache() {
        let backend = spawn_backend().await;
        let url = format!("{}{DASHBOARD_PATH}", backend.base);

        let body: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(body["summary"]["caloriesConsumed"], 1920);
        assert_eq!(body["trend"]["sevenDay"].as_array().unwrap().len(), 7);

        reqwest::get(&url).await.unwrap();
        assert_eq!(backend.builds.load(Ordering::SeqCst), 1);

        reqwest::get(format!("{url}?force_refresh=true")).await.unwrap();
        assert_eq!(backend.builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn risk_endpoint_evaluates_cached_bundle() {
        let backend = spawn_backend().await;
        let response: RiskResponse = reqwest::get(format!("{}{RISK_PATH}", backend.base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(response.peak_severity, Some(Severity::Medium));
        assert_eq!(response.signals.len(), 1);
        assert_eq!(response.signals[0].id, "medication-miss");
    }

    #[tokio::test]
    async fn shutdown_waits_forever_when_signal_listener_fails() {
        let failing = async { Err::<(), _>(std::io::Error::other("no signal handler")) };
        let outcome = tokio::time::timeout(Duration::from_millis(50), shutdown_signal(failing)).await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn shutdown_completes_when_signal_fires() {
        let fired = async { Ok::<(), std::io::Error>(()) };
        let outcome = tokio::time::timeout(Duration::from_millis(50), shutdown_signal(fired)).await;
        assert!(outcome.is_ok());
    }
}
