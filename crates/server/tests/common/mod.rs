//! Common test utilities for in-process API testing.
//!
//! Builds the real router and job queue around a [`MockCrew`], so podcast
//! jobs run end to end without any network provider.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use balado_core::{
    load_config_from_str,
    testing::{FixedClock, MockCrew},
    JobQueue, PipelineRunner,
};
use balado_server::{create_router, AppState};

/// Test fixture for API tests.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_submit() {
///     let fixture = TestFixture::new();
///     let response = fixture.post("/api/v1/podcasts", json!({"topic": "Hockey"})).await;
///     assert_eq!(response.status, 202);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Scripted crew driving every job
    pub crew: Arc<MockCrew>,
    /// Audio directory served under `/audio`
    pub audio_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Fixture whose jobs run to completion immediately.
    pub fn new() -> Self {
        Self::with_crew(MockCrew::new())
    }

    /// Fixture whose jobs stay running until `crew.release` is called.
    pub fn gated() -> Self {
        Self::with_crew(MockCrew::gated())
    }

    pub fn with_crew(crew: MockCrew) -> Self {
        let audio_dir = TempDir::new().expect("Failed to create audio dir");
        let config = load_config_from_str(&format!(
            r#"
[server]
host = "127.0.0.1"
port = 8080

[output]
audio_dir = "{}"

[llm]
provider = "ollama"
model = "llama3"

[search]
api_key = "serper-secret"
"#,
            audio_dir.path().display()
        ))
        .expect("Failed to parse test config");

        let crew = Arc::new(crew);
        let clock = Arc::new(FixedClock::at_date(2025, 6, 1).expect("valid date"));
        let runner = PipelineRunner::new(crew.clone(), clock);
        let state = Arc::new(AppState::new(config, JobQueue::new(runner)));

        Self {
            router: create_router(state),
            crew,
            audio_dir,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a request with a raw string body.
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Poll a job until it reaches `completed` or `failed`.
    pub async fn wait_for_terminal(&self, job_id: &str) -> Value {
        for _ in 0..300 {
            let response = self.get(&format!("/api/v1/podcasts/{}", job_id)).await;
            let status = response.body["status"].as_str().unwrap_or_default();
            if status == "completed" || status == "failed" {
                return response.body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", job_id);
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };
        let text = String::from_utf8_lossy(&body_bytes).into_owned();

        TestResponse { status, body, text }
    }
}
