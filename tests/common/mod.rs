#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use ecoscore_api::{
    config::AppConfig,
    db,
    models::{BatchJob, BatchJobStatus},
    store::{DatabaseStore, InMemoryStore, Store},
    AppState,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "ecoscore-test-boundary";

/// Helper harness for driving the full router without a network socket.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _db_dir: Option<TempDir>,
}

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        5_000,
        "test".to_string(),
    );
    cfg.cors_allow_any_origin = true;
    cfg.training_delay_ms = 50;
    cfg.batch_progress_interval = 1;
    cfg.max_upload_bytes = 4 * 1024;
    cfg
}

impl TestApp {
    /// Application backed by the in-memory store.
    pub async fn new() -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()), test_config(), None)
    }

    /// Application backed by a fresh SQLite file.
    pub async fn with_database() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let mut cfg = test_config();
        cfg.database_url = format!("sqlite://{}?mode=rwc", dir.path().join("app.db").display());
        cfg.db_max_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        Self::with_store(Arc::new(DatabaseStore::new(Arc::new(pool))), cfg, Some(dir))
    }

    pub fn with_store(store: Arc<dyn Store>, cfg: AppConfig, db_dir: Option<TempDir>) -> Self {
        let state = AppState::new(store, cfg);
        Self {
            router: ecoscore_api::app_router(state.clone()),
            state,
            _db_dir: db_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request");
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.post_raw(uri, serde_json::to_vec(body).expect("serialize body"))
            .await
    }

    pub async fn post_raw(&self, uri: &str, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("failed to build request");
        self.send(request).await
    }

    pub async fn post_empty(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request");
        self.send(request).await
    }

    /// Uploads `csv` as the `file` part, plus `modelType` when given.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        csv: &str,
        model_type: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut body = String::new();
        if let Some(model_type) = model_type {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"modelType\"\r\n\r\n{model_type}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n{csv}\r\n"
        ));
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/batch/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("failed to build request");
        self.send(request).await
    }

    /// Polls a batch job until it reaches a terminal state.
    pub async fn wait_for_job(&self, job_id: i64) -> BatchJob {
        for _ in 0..200 {
            let (status, body) = self.get(&format!("/api/batch/jobs/{}", job_id)).await;
            assert_eq!(status, StatusCode::OK, "job lookup failed: {}", body);
            let job: BatchJob = serde_json::from_value(body).expect("batch job body");
            if matches!(job.status, BatchJobStatus::Completed | BatchJobStatus::Failed) {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("batch job {} did not finish", job_id);
    }
}
