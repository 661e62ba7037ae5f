#![allow(dead_code)]

use axum_test::TestServer;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use link_shortener::application::services::{LinkService, OwnerService};
use link_shortener::domain::deletion_worker::{DeletionConfig, DeletionPipeline};
use link_shortener::domain::repositories::LinkStore;
use link_shortener::infrastructure::persistence::MemoryLinkStore;
use link_shortener::routes::app_router;
use link_shortener::state::AppState;
use link_shortener::utils::code_generator::RandomCodeGenerator;

pub const TEST_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "http://short.test";

/// Deletion settings that flush quickly.
pub fn fast_deletion_config() -> DeletionConfig {
    DeletionConfig {
        queue_capacity: 20,
        max_batch_size: 10,
        flush_interval: Duration::from_millis(50),
    }
}

pub async fn open_temp_store() -> (Arc<MemoryLinkStore>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryLinkStore::open(dir.path().join("links.jsonl"))
        .await
        .unwrap();
    (Arc::new(store), dir)
}

pub fn create_test_state(store: Arc<dyn LinkStore>, deletion: DeletionPipeline) -> AppState {
    let link_service = Arc::new(LinkService::new(
        Arc::clone(&store),
        Arc::new(RandomCodeGenerator::new(5)),
    ));
    let owner_service = Arc::new(OwnerService::new(TEST_SECRET).unwrap());

    AppState::new(
        link_service,
        deletion,
        owner_service,
        BASE_URL,
        Duration::from_millis(100),
    )
}

/// A full application over a journal store in a temp dir, with a running
/// deletion worker.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: Arc<MemoryLinkStore>,
    pub shutdown: CancellationToken,
    pub worker: Option<JoinHandle<()>>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(fast_deletion_config(), true).await
    }

    pub async fn spawn_with(config: DeletionConfig, start_worker: bool) -> Self {
        let (store, dir) = open_temp_store().await;
        let dyn_store: Arc<dyn LinkStore> = store.clone();
        let deletion = DeletionPipeline::new(Arc::clone(&dyn_store), config);

        let shutdown = CancellationToken::new();
        let worker = start_worker.then(|| deletion.start(shutdown.clone()).unwrap());

        let state = create_test_state(dyn_store, deletion);
        let server = TestServer::new(app_router(state.clone())).unwrap();

        Self {
            server,
            state,
            store,
            shutdown,
            worker,
            _dir: dir,
        }
    }

    /// `Cookie` header value identifying `owner_id`.
    pub fn cookie(&self, owner_id: &str) -> String {
        format!("user_session={}", self.state.owner_service.sign(owner_id))
    }

    /// Creates a link for `owner_id` through the HTTP API and returns its code.
    pub async fn shorten(&self, owner_id: &str, url: &str) -> String {
        let response = self
            .server
            .post("/")
            .add_header("Cookie", self.cookie(owner_id))
            .text(url)
            .await;

        response.text().rsplit('/').next().unwrap().to_string()
    }
}

/// Polls `check` until it returns true or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
