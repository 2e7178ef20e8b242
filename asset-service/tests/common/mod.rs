#![allow(dead_code)]

use asset_service::models::{Asset, DeleteOutcome, Orientation};
use asset_service::services::{
    AssetOrchestrator, AssetRepository, GeneratedImage, ImageFetcher, ImageGenerator,
    ProviderError, Storage,
};
use asset_service::startup::{build_router, AppState};
use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;

/// Ordered record of every collaborator call, shared by all fakes.
#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
}

impl CallLog {
    fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

pub struct FakeGenerator {
    log: Arc<CallLog>,
    revised_prompt: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    fail: Mutex<bool>,
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    async fn generate(
        &self,
        prompt: &str,
        orientation: Orientation,
    ) -> Result<GeneratedImage, ProviderError> {
        self.log.push(format!("generate:{}:{}", prompt, orientation));

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail.lock().unwrap() {
            return Err(ProviderError::ApiError("generator down".to_string()));
        }

        Ok(GeneratedImage {
            url: format!("https://images.example/{}", prompt.replace(' ', "-")),
            revised_prompt: self.revised_prompt.lock().unwrap().clone(),
        })
    }
}

pub struct FakeFetcher {
    log: Arc<CallLog>,
    fetches: Mutex<usize>,
    fail_fetch_at: Mutex<Option<usize>>,
}

#[async_trait]
impl ImageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.log.push(format!("fetch:{}", url));

        let attempt = next_attempt(&self.fetches);
        if *self.fail_fetch_at.lock().unwrap() == Some(attempt) {
            return Err(ProviderError::NetworkError("connection reset".to_string()));
        }

        Ok(url.as_bytes().to_vec())
    }
}

fn next_attempt(counter: &Mutex<usize>) -> usize {
    let mut count = counter.lock().unwrap();
    let attempt = *count;
    *count += 1;
    attempt
}

pub struct FakeStorage {
    log: Arc<CallLog>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    uploads: Mutex<usize>,
    fail_upload_at: Mutex<Option<usize>>,
    fail_deletes: Mutex<bool>,
}

impl FakeStorage {
    pub fn contains(&self, name: &str) -> bool {
        self.objects.lock().unwrap().contains_key(name)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn put(&self, name: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), vec![0]);
    }
}

#[async_trait]
impl Storage for FakeStorage {
    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<String, AppError> {
        self.log.push(format!("upload:{}", name));

        let attempt = next_attempt(&self.uploads);
        if *self.fail_upload_at.lock().unwrap() == Some(attempt) {
            return Err(AppError::InternalError(anyhow::anyhow!("blob store unavailable")));
        }

        self.objects.lock().unwrap().insert(name.to_string(), data);
        Ok(format!("https://blob.example/motion-ai/{}", name))
    }

    async fn delete(&self, name: &str, include_snapshots: bool) -> Result<(), AppError> {
        self.log
            .push(format!("delete_object:{}:{}", name, include_snapshots));

        if *self.fail_deletes.lock().unwrap() {
            return Err(AppError::InternalError(anyhow::anyhow!("blob not found")));
        }

        self.objects.lock().unwrap().remove(name);
        Ok(())
    }
}

pub struct FakeRepository {
    log: Arc<CallLog>,
    assets: Mutex<Vec<Asset>>,
    inserts: Mutex<usize>,
    fail_insert_at: Mutex<Option<usize>>,
    healthy: Mutex<bool>,
}

impl FakeRepository {
    pub fn assets(&self) -> Vec<Asset> {
        self.assets.lock().unwrap().clone()
    }

    pub fn seed(&self, asset: Asset) {
        self.assets.lock().unwrap().push(asset);
    }
}

#[async_trait]
impl AssetRepository for FakeRepository {
    async fn insert(&self, asset: &Asset) -> Result<(), AppError> {
        self.log.push(format!("insert:{}", asset.code));

        let attempt = next_attempt(&self.inserts);
        if *self.fail_insert_at.lock().unwrap() == Some(attempt) {
            return Err(AppError::DatabaseError(anyhow::anyhow!("write concern timeout")));
        }

        self.assets.lock().unwrap().push(asset.clone());
        Ok(())
    }

    async fn delete_by_code(&self, code: &str) -> Result<DeleteOutcome, AppError> {
        self.log.push(format!("delete_metadata:{}", code));
        let mut assets = self.assets.lock().unwrap();
        let before = assets.len();
        assets.retain(|a| a.code != code);
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: (before - assets.len()) as u64,
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        if *self.healthy.lock().unwrap() {
            Ok(())
        } else {
            Err(AppError::DatabaseError(anyhow::anyhow!("ping failed")))
        }
    }
}

/// Fake collaborators wired into a real orchestrator and router.
pub struct TestHarness {
    pub log: Arc<CallLog>,
    pub generator: Arc<FakeGenerator>,
    pub fetcher: Arc<FakeFetcher>,
    pub storage: Arc<FakeStorage>,
    pub repository: Arc<FakeRepository>,
    step_timeout: Option<Duration>,
}

impl TestHarness {
    pub fn new() -> Self {
        let log = Arc::new(CallLog::default());
        Self {
            generator: Arc::new(FakeGenerator {
                log: log.clone(),
                revised_prompt: Mutex::new(None),
                delay: Mutex::new(None),
                fail: Mutex::new(false),
            }),
            fetcher: Arc::new(FakeFetcher {
                log: log.clone(),
                fetches: Mutex::new(0),
                fail_fetch_at: Mutex::new(None),
            }),
            storage: Arc::new(FakeStorage {
                log: log.clone(),
                objects: Mutex::new(HashMap::new()),
                uploads: Mutex::new(0),
                fail_upload_at: Mutex::new(None),
                fail_deletes: Mutex::new(false),
            }),
            repository: Arc::new(FakeRepository {
                log: log.clone(),
                assets: Mutex::new(Vec::new()),
                inserts: Mutex::new(0),
                fail_insert_at: Mutex::new(None),
                healthy: Mutex::new(true),
            }),
            log,
            step_timeout: None,
        }
    }

    pub fn revise_prompts_to(self, revised: &str) -> Self {
        *self.generator.revised_prompt.lock().unwrap() = Some(revised.to_string());
        self
    }

    pub fn slow_generator(self, delay: Duration) -> Self {
        *self.generator.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn failing_generator(self) -> Self {
        *self.generator.fail.lock().unwrap() = true;
        self
    }

    /// Fails the fetch with the given zero-based index.
    pub fn fail_fetch_at(self, index: usize) -> Self {
        *self.fetcher.fail_fetch_at.lock().unwrap() = Some(index);
        self
    }

    /// Fails the metadata insert with the given zero-based index.
    pub fn fail_insert_at(self, index: usize) -> Self {
        *self.repository.fail_insert_at.lock().unwrap() = Some(index);
        self
    }

    /// Fails the upload with the given zero-based index.
    pub fn fail_upload_at(self, index: usize) -> Self {
        *self.storage.fail_upload_at.lock().unwrap() = Some(index);
        self
    }

    pub fn failing_deletes(self) -> Self {
        *self.storage.fail_deletes.lock().unwrap() = true;
        self
    }

    pub fn unhealthy_repository(self) -> Self {
        *self.repository.healthy.lock().unwrap() = false;
        self
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    pub fn orchestrator(&self) -> AssetOrchestrator {
        AssetOrchestrator::new(
            self.generator.clone(),
            self.fetcher.clone(),
            self.storage.clone(),
            self.repository.clone(),
        )
        .with_step_timeout(self.step_timeout)
    }

    pub fn router(&self) -> Router {
        build_router(AppState::new(self.orchestrator()))
    }

    /// Number of calls that cause side effects or reach an external API.
    pub fn side_effect_calls(&self) -> usize {
        self.log.count("generate:")
            + self.log.count("fetch:")
            + self.log.count("upload:")
            + self.log.count("insert:")
    }
}

pub fn sample_asset(code: &str) -> Asset {
    Asset {
        code: code.to_string(),
        prompt: "cat".to_string(),
        orientation: Orientation::Square,
        is_transparent: false,
        description: "d".to_string(),
        tags: vec![],
        width: 1024,
        height: 1024,
        revised_prompt: None,
        url: Some(format!("https://blob.example/motion-ai/{}.png", code)),
        scene: None,
    }
}

pub async fn send_json(
    router: Router,
    method: &str,
    uri: &str,
    body: impl Into<Body>,
) -> (StatusCode, Bytes) {
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}
