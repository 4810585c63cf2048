use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use ragcore::{RagConfig, RagStore};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn config_for(index_path: &Path) -> RagConfig {
    RagConfig { index_path: index_path.to_path_buf(), ..RagConfig::default() }
}

fn build_tiny_index(dir: &Path) -> RagConfig {
    let docs = dir.join("docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("a.txt"), "the quick brown fox").unwrap();
    fs::write(docs.join("b.txt"), "the lazy dog sleeps").unwrap();

    let config = config_for(&dir.join("rag_index.json"));
    let mut store = RagStore::from_config(&config);
    store.build_from_paths([&docs], 100, 0);
    store.save().unwrap();
    config
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn search_returns_ranked_hits_with_sources() {
    let dir = tempdir().unwrap();
    let config = build_tiny_index(dir.path());
    let app = server::build_app_with_token(config, None).unwrap();

    let (status, json) = call(app, get("/search?q=fox&k=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["enabled"], true);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0]["source"].as_str().unwrap().ends_with("a.txt"));
    assert!(results[0]["score"].as_f64().unwrap() > 0.0);
    assert_eq!(json["sources"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_terms_give_empty_results() {
    let dir = tempdir().unwrap();
    let config = build_tiny_index(dir.path());
    let app = server::build_app_with_token(config, None).unwrap();

    let (status, json) = call(app, get("/search?q=cat")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_hits"], 0);
}

#[tokio::test]
async fn disabled_retrieval_skips_the_index() {
    let dir = tempdir().unwrap();
    let mut config = build_tiny_index(dir.path());
    config.enabled = false;
    let app = server::build_app_with_token(config, None).unwrap();

    let (status, json) = call(app, get("/search?q=fox")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["enabled"], false);
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_index_is_lazily_loaded_after_build() {
    let dir = tempdir().unwrap();
    let index_path = dir.path().join("later.json");
    let app = server::build_app_with_token(config_for(&index_path), None).unwrap();

    let (_, json) = call(app.clone(), get("/search?q=fox")).await;
    assert_eq!(json["total_hits"], 0);

    fs::write(dir.path().join("a.md"), "fox tracks in the snow").unwrap();
    let mut store = RagStore::new(&index_path);
    store.build_from_paths([dir.path().join("a.md")], 100, 0);
    store.save().unwrap();

    let (_, json) = call(app, get("/search?q=fox")).await;
    assert_eq!(json["total_hits"], 1);
}

#[tokio::test]
async fn corrupt_index_fails_startup() {
    let dir = tempdir().unwrap();
    let index_path = dir.path().join("rag_index.json");
    fs::write(&index_path, "not json").unwrap();
    assert!(server::build_app_with_token(config_for(&index_path), None).is_err());
}

#[tokio::test]
async fn reload_requires_admin_token() {
    let dir = tempdir().unwrap();
    let config = build_tiny_index(dir.path());
    let app = server::build_app_with_token(config, Some("secret".into())).unwrap();

    let req = Request::post("/index/reload").body(Body::empty()).unwrap();
    let (status, _) = call(app.clone(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::post("/index/reload").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, json) = call(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["loaded"], true);
    assert_eq!(json["total_docs"], 2);
}

#[tokio::test]
async fn health_is_ok() {
    let dir = tempdir().unwrap();
    let app = server::build_app_with_token(config_for(&dir.path().join("x.json")), None).unwrap();
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
