//! Query gateway service: router, handlers and the serving loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bloomserver_filter::{BloomFilter, ScanError, ScanRequest, ScanResult, SubstringScanner};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{GatewayConfig, GatewayError, QueryError};
use crate::listener::GatewayListener;
use crate::middleware::{GatewayMetrics, TracingLayer};

/// Search endpoint path
pub const SEARCH_ROUTE: &str = "/api/search";

/// Health endpoint path
pub const HEALTH_ROUTE: &str = "/health";

/// Query gateway over one loaded filter
pub struct QueryGatewayService {
    config: Arc<GatewayConfig>,
    filter: Arc<BloomFilter>,
    metrics: Arc<GatewayMetrics>,
    bits_set: usize,
}

impl QueryGatewayService {
    /// Create a new gateway. Fails if the configuration is invalid.
    pub fn new(config: GatewayConfig, filter: Arc<BloomFilter>) -> Result<Self, GatewayError> {
        config.validate()?;
        let bits_set = filter.bits_set();

        Ok(Self {
            config: Arc::new(config),
            filter,
            metrics: Arc::new(GatewayMetrics::new()),
            bits_set,
        })
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let state = AppState {
            config: Arc::clone(&self.config),
            filter: Arc::clone(&self.filter),
            metrics: Arc::clone(&self.metrics),
            bits_set: self.bits_set,
        };

        Router::new()
            .route(SEARCH_ROUTE, get(handle_search))
            .route(HEALTH_ROUTE, get(health_check))
            .layer(TracingLayer::new())
            .with_state(state)
    }

    /// Serve until `shutdown` resolves
    pub async fn serve<F>(self, listener: GatewayListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        info!(
            m = self.filter.size_bits(),
            k = self.filter.hash_count(),
            max_body = self.config.max_request_body_length,
            scan_timeout_ms = self.config.scan_timeout_ms,
            "query gateway started"
        );

        let result = match listener {
            GatewayListener::Tcp(listener) => axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
                .map_err(GatewayError::Serve),
            #[cfg(unix)]
            GatewayListener::Unix { listener, path } => {
                let result = unix::serve(listener, router, shutdown).await;
                if let Err(e) = std::fs::remove_file(&path) {
                    debug!(path = %path.display(), error = %e, "could not remove socket");
                }
                result
            }
        };

        info!("query gateway stopped");
        result
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    config: Arc<GatewayConfig>,
    filter: Arc<BloomFilter>,
    metrics: Arc<GatewayMetrics>,
    bits_set: usize,
}

/// Query string of `GET /api/search`
#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(rename = "substringLength")]
    substring_length: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    guilty_substrings: Vec<String>,
}

/// Handle `GET /api/search`
async fn handle_search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, axum::extract::rejection::QueryRejection>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let started = Instant::now();
    let deadline = started + state.config.scan_budget();

    let outcome = match params {
        Ok(Query(params)) => search(&state, params, &headers, body, deadline).await,
        Err(rejection) => Err(QueryError::InvalidSubstringLength(rejection.body_text())),
    };

    match outcome.and_then(|result| encode_matches(&state, result, started)) {
        Ok(response) => response,
        Err(error) => {
            state.metrics.record_failure(&error, started.elapsed());
            error.into_response()
        }
    }
}

async fn search(
    state: &AppState,
    params: SearchParams,
    headers: &HeaderMap,
    body: Body,
    deadline: Instant,
) -> Result<ScanResult, QueryError> {
    let min_substring_length = parse_substring_length(params.substring_length.as_deref())?;
    let declared = declared_length(headers)?;

    let max = state.config.max_request_body_length;
    if declared > max as u64 {
        return Err(QueryError::BodyTooLarge { declared, max });
    }
    let expected = declared as usize;

    let bytes = axum::body::to_bytes(body, expected)
        .await
        .map_err(|e| QueryError::BodyRead(e.to_string()))?;
    if bytes.len() != expected {
        return Err(QueryError::ShortRead {
            expected,
            actual: bytes.len(),
        });
    }

    let text = String::from_utf8(bytes.to_vec()).map_err(|_| QueryError::InvalidEncoding)?;
    let request = ScanRequest::new(text, min_substring_length, deadline);
    let filter = Arc::clone(&state.filter);

    tokio::task::spawn_blocking(move || SubstringScanner::new(filter).scan(&request))
        .await
        .map_err(|e| QueryError::Internal(e.to_string()))?
        .map_err(|e| match e {
            ScanError::Timeout { tested } => QueryError::Timeout { tested },
        })
}

fn encode_matches(
    state: &AppState,
    result: ScanResult,
    started: Instant,
) -> Result<Response, QueryError> {
    let matched = result.matches.len();
    let body = serde_json::to_vec(&SearchResponse {
        guilty_substrings: result.matches,
    })
    .map_err(|e| QueryError::Internal(e.to_string()))?;

    state
        .metrics
        .record_success(matched, result.tested, started.elapsed());
    debug!(matched, tested = result.tested, "search completed");

    Ok((
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        body,
    )
        .into_response())
}

/// Absent or empty means "whole text only"
fn parse_substring_length(raw: Option<&str>) -> Result<usize, QueryError> {
    match raw {
        None | Some("") => Ok(0),
        Some(value) => value
            .parse::<u16>()
            .map(usize::from)
            .map_err(|_| QueryError::InvalidSubstringLength(value.to_string())),
    }
}

fn declared_length(headers: &HeaderMap) -> Result<u64, QueryError> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|&length| length > 0)
        .ok_or(QueryError::MissingBody)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "m": state.filter.size_bits(),
        "k": state.filter.hash_count(),
        "bitsSet": state.bits_set,
        "metrics": state.metrics.snapshot(),
    }))
}

#[cfg(unix)]
mod unix {
    use std::future::Future;
    use std::time::Duration;

    use axum::Router;
    use hyper_util::rt::{TokioExecutor, TokioIo};
    use hyper_util::server::conn::auto;
    use hyper_util::service::TowerToHyperService;
    use tokio::net::UnixListener;
    use tracing::{debug, info, warn};

    use crate::domain::GatewayError;

    /// Accept loop for Unix domain sockets
    pub(super) async fn serve<F>(
        listener: UnixListener,
        router: Router,
        shutdown: F,
    ) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::pin!(shutdown);

        loop {
            let stream = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => stream,
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        continue;
                    }
                },
                _ = &mut shutdown => {
                    info!("shutdown signal received");
                    return Ok(());
                }
            };

            let service = TowerToHyperService::new(router.clone());
            tokio::spawn(async move {
                if let Err(e) = auto::Builder::new(TokioExecutor::new())
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    debug!(error = %e, "connection closed with error");
                }
            });
        }
    }
}
