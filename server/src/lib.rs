use anyhow::Result;
use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use ragcore::{QueryHit, RagConfig, RagStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    /// Falls back to the configured top_k
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub enabled: bool,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<QueryHit>,
    /// Distinct hit sources in rank order, for citing provenance.
    pub sources: Vec<String>,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub loaded: bool,
    pub total_docs: u32,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<RagStore>>,
    pub config: RagConfig,
    pub admin_token: Option<String>,
}

pub fn build_app(config: RagConfig) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    build_app_with_token(config, admin_token)
}

pub fn build_app_with_token(config: RagConfig, admin_token: Option<String>) -> Result<Router> {
    let mut store = RagStore::from_config(&config);
    if config.enabled {
        // a corrupt snapshot is fatal; a missing one just means no results yet
        if !store.load()? {
            tracing::warn!(path = %store.index_path().display(), "no index found; searches return nothing until one is built");
        }
    } else {
        tracing::info!("retrieval disabled");
    }
    let app_state = AppState { store: Arc::new(RwLock::new(store)), config, admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/index/reload", post(index_reload))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    if !state.config.enabled {
        return Ok(Json(SearchResponse {
            query: params.q,
            enabled: false,
            took_s: start.elapsed().as_secs_f64(),
            total_hits: 0,
            results: vec![],
            sources: vec![],
        }));
    }

    let k = params.k.unwrap_or(state.config.top_k).clamp(1, MAX_K);
    let store = state.store.clone();
    let q = params.q.clone();
    // scoring is synchronous; keep it off the async workers
    let results = tokio::task::spawn_blocking(move || {
        {
            let guard = store.read();
            if guard.has_index() {
                return Ok(guard.search(&q, k));
            }
        }
        store.write().query(&q, k)
    })
    .await
    .map_err(internal)?
    .map_err(internal)?;

    let mut sources: Vec<String> = Vec::new();
    for hit in &results {
        if !sources.contains(&hit.source) {
            sources.push(hit.source.clone());
        }
    }

    Ok(Json(SearchResponse {
        query: params.q,
        enabled: true,
        took_s: start.elapsed().as_secs_f64(),
        total_hits: results.len(),
        results,
        sources,
    }))
}

async fn index_reload(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReloadResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let store = state.store.clone();
    let response = tokio::task::spawn_blocking(move || {
        let mut store = store.write();
        let loaded = store.load()?;
        let total_docs = store.index().map(|i| i.total_docs).unwrap_or(0);
        Ok::<_, ragcore::RagError>(ReloadResponse { loaded, total_docs })
    })
    .await
    .map_err(internal)?
    .map_err(internal)?;
    tracing::info!(loaded = response.loaded, total_docs = response.total_docs, "index reloaded");
    Ok(Json(response))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

fn internal<E: std::fmt::Display>(err: E) -> (StatusCode, String) {
    tracing::error!(error = %err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
