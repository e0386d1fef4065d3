use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use specd_core::domain::job_run::{JobRun, RunStatus};
use specd_core::domain::job_spec::JobSpec;
use specd_server::app;
use specd_server::config::ServerConfig;
use specd_server::repository::{EntityKind, JobSpecStore, MemoryStore, StoreError, StoreResult};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

fn config() -> ServerConfig {
    ServerConfig::from_lookup(|_| None).expect("default config")
}

fn build(store: Arc<dyn JobSpecStore>, config: &ServerConfig) -> (Router, mpsc::Receiver<JobSpec>) {
    let app = app::with_store(config, store);
    (app.router, app.scheduled)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("router call");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

async fn post_json(router: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

fn valid_spec() -> Value {
    json!({
        "initiators": [{ "type": "web" }],
        "tasks": [
            { "type": "httpget", "params": { "url": "https://bitstamp.net/api/ticker/" } },
            { "type": "jsonparse", "params": { "path": ["last"] } },
            { "type": "multiply", "params": { "times": 100 } },
            { "type": "ethuint256" },
        ],
    })
}

fn errors(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|e| e.as_str().expect("string message").to_string())
        .collect()
}

#[tokio::test]
async fn list_on_empty_store_returns_empty_envelope() {
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config());

    let (status, body) = get(&router, "/specs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["count"], 0);
    assert!(body["links"].get("next").is_none());
    assert!(body["links"].get("prev").is_none());
}

#[tokio::test]
async fn list_rejects_zero_size() {
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config());

    let (status, body) = get(&router, "/specs?size=0").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let messages = errors(&body);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("size"));
}

#[tokio::test]
async fn list_rejects_bad_offset_and_oversized_pages() {
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config());

    let (status, body) = get(&router, "/specs?offset=-1").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(errors(&body)[0].contains("offset"));

    let (status, _) = get(&router, "/specs?size=abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = get(&router, "/specs?size=101").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_with_missing_fields_is_rejected_without_saving() {
    let store = Arc::new(MemoryStore::new());
    let (router, mut rx) = build(store.clone(), &config());

    let (status, body) = post_json(&router, "/specs", "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let messages = errors(&body);
    assert!(!messages.is_empty());
    assert!(messages.iter().any(|m| m.contains("initiators")));
    assert_eq!(store.count(EntityKind::JobSpec).await.unwrap(), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn create_with_malformed_body_is_bad_request() {
    let store = Arc::new(MemoryStore::new());
    let (router, _rx) = build(store.clone(), &config());

    let (status, body) = post_json(&router, "/specs", "{ not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors(&body).len(), 1);

    let (status, _) = post_json(&router, "/specs", r#"{ "tasks": "httpget" }"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(store.count(EntityKind::JobSpec).await.unwrap(), 0);
}

#[tokio::test]
async fn create_reports_every_semantic_reason() {
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config());

    let body = json!({
        "initiators": [{ "type": "cron", "params": { "schedule": "whenever" } }],
        "tasks": [{ "type": "httpget" }, { "type": "multiply", "params": { "times": "x" } }],
    });
    let (status, body) = post_json(&router, "/specs", &body.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let messages = errors(&body);
    assert_eq!(messages.len(), 3);
    assert!(messages[0].starts_with("initiators[0] (cron)"));
    assert!(messages[1].starts_with("tasks[0] (httpget)"));
    assert!(messages[2].starts_with("tasks[1] (multiply)"));
}

#[tokio::test]
async fn create_rejects_unknown_adapter_but_accepts_configured_bridge() {
    let mut config = config();
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config);

    let body = json!({
        "initiators": [{ "type": "web" }],
        "tasks": [{ "type": "randomnumber" }],
    });
    let (status, response) = post_json(&router, "/specs", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(errors(&response)[0].contains("randomnumber"));

    config.bridges = vec![specd_server::validation::Bridge::new(
        "randomnumber",
        "http://localhost:6690/random".parse().unwrap(),
    )];
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config);
    let (status, _) = post_json(&router, "/specs", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn create_then_show_round_trips() {
    let store = Arc::new(MemoryStore::new());
    let (router, mut rx) = build(store.clone(), &config());

    let (status, created) = post_json(&router, "/specs", &valid_spec().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().expect("id").to_string();
    assert!(!id.is_empty());
    assert!(created.get("runs").is_none());

    let scheduled = rx.try_recv().expect("spec handed to scheduler");
    assert_eq!(scheduled.id.to_string(), id);

    let (status, shown) = get(&router, &format!("/specs/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["id"], created["id"]);
    assert_eq!(shown["createdAt"], created["createdAt"]);
    assert_eq!(shown["tasks"], created["tasks"]);
    assert_eq!(shown["runs"], json!([]));
}

#[tokio::test]
async fn show_embeds_runs_in_store_order() {
    let store = Arc::new(MemoryStore::new());
    let (router, _rx) = build(store.clone(), &config());

    let (_, created) = post_json(&router, "/specs", &valid_spec().to_string()).await;
    let job_id: Uuid = created["id"].as_str().unwrap().parse().unwrap();

    let t0 = Utc::now();
    let later = JobRun {
        id: Uuid::new_v4(),
        job_id,
        status: RunStatus::InProgress,
        created_at: t0 + Duration::seconds(30),
        completed_at: None,
        result: None,
    };
    let earlier = JobRun {
        id: Uuid::new_v4(),
        job_id,
        status: RunStatus::Completed,
        created_at: t0,
        completed_at: Some(t0 + Duration::seconds(5)),
        result: Some(json!({ "value": "10000" })),
    };
    store.insert_run(later.clone()).await.unwrap();
    store.insert_run(earlier.clone()).await.unwrap();

    let (status, shown) = get(&router, &format!("/specs/{}", job_id)).await;
    assert_eq!(status, StatusCode::OK);
    let runs = shown["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["id"], earlier.id.to_string());
    assert_eq!(runs[0]["status"], "completed");
    assert_eq!(runs[1]["id"], later.id.to_string());
}

#[tokio::test]
async fn show_unknown_id_is_not_found() {
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config());

    for uri in [format!("/specs/{}", Uuid::new_v4()), "/specs/garbage".to_string()] {
        let (status, body) = get(&router, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(errors(&body), vec!["JobSpec not found.".to_string()]);
    }
}

#[tokio::test]
async fn listing_pages_in_creation_order_with_links() {
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config());

    let mut ids = Vec::new();
    for _ in 0..3 {
        let (_, created) = post_json(&router, "/specs", &valid_spec().to_string()).await;
        ids.push(created["id"].clone());
    }

    let (status, first) = get(&router, "/specs?size=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["meta"]["count"], 3);
    assert_eq!(first["data"].as_array().unwrap().len(), 2);
    assert_eq!(first["data"][0]["id"], ids[0]);
    assert_eq!(first["data"][1]["id"], ids[1]);
    assert!(first["data"][0].get("runs").is_none());
    assert_eq!(
        first["links"]["next"],
        "http://localhost:8080/specs?size=2&offset=2"
    );
    assert!(first["links"].get("prev").is_none());

    let (status, second) = get(&router, "/specs?size=2&offset=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"].as_array().unwrap().len(), 1);
    assert_eq!(second["data"][0]["id"], ids[2]);
    assert!(second["links"].get("next").is_none());
    assert_eq!(
        second["links"]["prev"],
        "http://localhost:8080/specs?size=2&offset=0"
    );
}

#[tokio::test]
async fn scheduling_failure_keeps_spec_and_reports_error() {
    let mut config = config();
    config.scheduler_queue = 1;
    let store = Arc::new(MemoryStore::new());
    let (router, _rx) = build(store.clone(), &config);

    // Nothing drains the queue, so the second handoff finds it full
    let (status, _) = post_json(&router, "/specs", &valid_spec().to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(&router, "/specs", &valid_spec().to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = &errors(&body)[0];
    assert!(message.contains("could not be scheduled"));

    assert_eq!(store.count(EntityKind::JobSpec).await.unwrap(), 2);
    let (_, listing) = get(&router, "/specs").await;
    assert_eq!(listing["meta"]["count"], 2);
    let stored_ids: Vec<String> = listing["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();
    assert!(stored_ids.iter().any(|id| message.contains(id.as_str())));
}

struct UnavailableStore;

#[async_trait]
impl JobSpecStore for UnavailableStore {
    async fn count(&self, _kind: EntityKind) -> StoreResult<u64> {
        Err(StoreError::Unavailable("connection reset by 10.1.2.3".to_string()))
    }
    async fn list_specs(&self, _limit: usize, _skip: usize) -> StoreResult<Vec<JobSpec>> {
        Err(StoreError::Unavailable("connection reset by 10.1.2.3".to_string()))
    }
    async fn find_spec(&self, _id: Uuid) -> StoreResult<JobSpec> {
        Err(StoreError::Unavailable("connection reset by 10.1.2.3".to_string()))
    }
    async fn insert_spec(&self, _spec: &JobSpec) -> StoreResult<()> {
        Err(StoreError::Unavailable("connection reset by 10.1.2.3".to_string()))
    }
    async fn runs_for(&self, _job_id: Uuid) -> StoreResult<Vec<JobRun>> {
        Err(StoreError::Unavailable("connection reset by 10.1.2.3".to_string()))
    }
}

#[tokio::test]
async fn store_failures_are_500_without_internal_detail() {
    let (router, mut rx) = build(Arc::new(UnavailableStore), &config());

    let (status, body) = get(&router, "/specs").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(errors(&body), vec!["error getting count of JobSpec".to_string()]);

    let (status, body) = get(&router, &format!("/specs/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(errors(&body), vec!["error fetching JobSpec".to_string()]);

    let (status, body) = post_json(&router, "/specs", &valid_spec().to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(errors(&body), vec!["error saving JobSpec".to_string()]);
    assert!(rx.try_recv().is_err());
}

/// Admits one extra spec between the count read and the page read
struct InterleavingStore {
    inner: MemoryStore,
    pending: Mutex<Option<JobSpec>>,
}

#[async_trait]
impl JobSpecStore for InterleavingStore {
    async fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        let count = self.inner.count(kind).await?;
        let pending = self.pending.lock().unwrap().take();
        if let Some(spec) = pending {
            self.inner.insert_spec(&spec).await?;
        }
        Ok(count)
    }
    async fn list_specs(&self, limit: usize, skip: usize) -> StoreResult<Vec<JobSpec>> {
        self.inner.list_specs(limit, skip).await
    }
    async fn find_spec(&self, id: Uuid) -> StoreResult<JobSpec> {
        self.inner.find_spec(id).await
    }
    async fn insert_spec(&self, spec: &JobSpec) -> StoreResult<()> {
        self.inner.insert_spec(spec).await
    }
    async fn runs_for(&self, job_id: Uuid) -> StoreResult<Vec<JobRun>> {
        self.inner.runs_for(job_id).await
    }
}

#[tokio::test]
async fn count_and_page_may_come_from_different_reads() {
    let concurrent = JobSpec {
        id: Uuid::new_v4(),
        created_at: Utc::now() + Duration::seconds(60),
        initiators: vec![],
        tasks: vec![],
        start_at: None,
        end_at: None,
    };
    let store = Arc::new(InterleavingStore {
        inner: MemoryStore::new(),
        pending: Mutex::new(None),
    });
    let (router, _rx) = build(store.clone(), &config());

    let (status, _) = post_json(&router, "/specs", &valid_spec().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    *store.pending.lock().unwrap() = Some(concurrent.clone());

    let (status, body) = get(&router, "/specs").await;

    // The listing still succeeds; the count lags the page by the concurrent write
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 1);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[1]["id"], concurrent.id.to_string());

    let (_, body) = get(&router, "/specs").await;
    assert_eq!(body["meta"]["count"], 2);
}

#[tokio::test]
async fn health_check() {
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config());
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_rejects_repeated_pagination_param() {
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config());

    let request = Request::builder()
        .uri("/specs?size=1&size=2")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let messages = errors(&body);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("size"));
}

#[tokio::test]
async fn page_links_keep_public_url_prefix() {
    let mut config = config();
    config.public_url = "https://example.com/api".parse().unwrap();
    let (router, _rx) = build(Arc::new(MemoryStore::new()), &config);

    for _ in 0..3 {
        post_json(&router, "/specs", &valid_spec().to_string()).await;
    }

    let (status, body) = get(&router, "/specs?size=1&offset=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["links"]["next"],
        "https://example.com/api/specs?size=1&offset=2"
    );
    assert_eq!(
        body["links"]["prev"],
        "https://example.com/api/specs?size=1&offset=0"
    );
}

/// Store whose count never finishes within a request's time budget
struct SlowStore(MemoryStore);

#[async_trait]
impl JobSpecStore for SlowStore {
    async fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        self.0.count(kind).await
    }
    async fn list_specs(&self, limit: usize, skip: usize) -> StoreResult<Vec<JobSpec>> {
        self.0.list_specs(limit, skip).await
    }
    async fn find_spec(&self, id: Uuid) -> StoreResult<JobSpec> {
        self.0.find_spec(id).await
    }
    async fn insert_spec(&self, spec: &JobSpec) -> StoreResult<()> {
        self.0.insert_spec(spec).await
    }
    async fn runs_for(&self, job_id: Uuid) -> StoreResult<Vec<JobRun>> {
        self.0.runs_for(job_id).await
    }
}

#[tokio::test]
async fn slow_store_is_cut_off_by_request_timeout() {
    let mut config = config();
    config.request_timeout = std::time::Duration::from_millis(200);
    let (router, _rx) = build(Arc::new(SlowStore(MemoryStore::new())), &config);

    let started = std::time::Instant::now();
    let (status, body) = get(&router, "/specs").await;

    assert!(started.elapsed() < std::time::Duration::from_secs(5));
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(errors(&body), vec!["request timed out".to_string()]);

    // Handlers that do not touch the slow path are unaffected
    let (status, _) = get(&router, &format!("/specs/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
