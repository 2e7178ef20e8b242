//! Asset orchestration.
//!
//! Drives the generator, fetcher, object store and metadata store for batch
//! creation and single-asset deletion. Items are processed one after another
//! in input order; the first failure stops the batch and nothing already
//! written is rolled back.

use crate::dtos::CreateAssetRequest;
use crate::error::AssetError;
use crate::models::{Asset, DeleteOutcome};
use crate::services::database::AssetRepository;
use crate::services::metrics::{
    record_asset_created, record_asset_deleted, record_batch, record_step_duration,
};
use crate::services::providers::{ImageFetcher, ImageGenerator};
use crate::services::storage::Storage;
use service_core::error::AppError;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use validator::Validate;

pub struct AssetOrchestrator {
    generator: Arc<dyn ImageGenerator>,
    fetcher: Arc<dyn ImageFetcher>,
    storage: Arc<dyn Storage>,
    repository: Arc<dyn AssetRepository>,
    step_timeout: Option<Duration>,
}

impl AssetOrchestrator {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        fetcher: Arc<dyn ImageFetcher>,
        storage: Arc<dyn Storage>,
        repository: Arc<dyn AssetRepository>,
    ) -> Self {
        Self {
            generator,
            fetcher,
            storage,
            repository,
            step_timeout: None,
        }
    }

    /// Bounds every collaborator call. `None` waits indefinitely.
    pub fn with_step_timeout(mut self, step_timeout: Option<Duration>) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    /// Checks every request in the batch; a single bad item rejects all of them.
    pub fn validate_batch(requests: &[CreateAssetRequest]) -> Result<(), AssetError> {
        for (index, request) in requests.iter().enumerate() {
            request.validate().map_err(|e| {
                tracing::warn!(index, "Rejected asset batch: {}", e);
                AssetError::InvalidInput(format!("item {}: {}", index, e))
            })?;
        }
        Ok(())
    }

    pub async fn create_assets(
        &self,
        requests: Vec<CreateAssetRequest>,
    ) -> Result<Vec<Asset>, AssetError> {
        let batch_size = requests.len();

        if let Err(e) = Self::validate_batch(&requests) {
            record_batch("rejected", batch_size);
            return Err(e);
        }

        tracing::info!(count = batch_size, "Asset batch started");

        let mut created = Vec::with_capacity(batch_size);
        for (index, request) in requests.into_iter().enumerate() {
            match self.create_one(request).await {
                Ok(asset) => {
                    tracing::info!(index, code = %asset.code, "Asset created");
                    created.push(asset);
                }
                Err(e) => {
                    tracing::error!(
                        index,
                        completed = created.len(),
                        remaining = batch_size - index,
                        "Asset batch aborted: {}",
                        e
                    );
                    record_batch("failed", batch_size);
                    return Err(e);
                }
            }
        }

        record_batch("success", batch_size);
        tracing::info!(count = created.len(), "Asset batch completed");

        Ok(created)
    }

    async fn create_one(&self, request: CreateAssetRequest) -> Result<Asset, AssetError> {
        let orientation = request.orientation;

        let generated = self
            .run_step("generate", async {
                self.generator
                    .generate(&request.prompt, orientation)
                    .await
                    .map_err(AssetError::Generation)
            })
            .await?;

        let bytes = self
            .run_step("fetch", async {
                self.fetcher
                    .fetch(&generated.url)
                    .await
                    .map_err(AssetError::Fetch)
            })
            .await?;

        let code = Asset::new_code();
        let blob_name = Asset::blob_name(&code);

        let url = self
            .run_step("upload", async {
                self.storage
                    .upload(&blob_name, bytes)
                    .await
                    .map_err(AssetError::Upload)
            })
            .await?;

        let asset = request.into_asset(code, url, generated.revised_prompt);

        self.run_step("persist", async {
            self.repository
                .insert(&asset)
                .await
                .map_err(AssetError::Persistence)
        })
        .await?;

        record_asset_created(orientation.as_str());

        Ok(asset)
    }

    /// Removes the metadata row, then the stored image and its snapshots.
    ///
    /// Malformed codes are rejected before either store is touched.
    ///
    /// The two calls are independent: if the second fails the row is already
    /// gone. The image delete is attempted even when no row matched.
    pub async fn delete_asset(&self, code: &str) -> Result<DeleteOutcome, AssetError> {
        if !Asset::is_valid_code(code) {
            tracing::warn!(code = %code, "Rejected delete for malformed code");
            return Err(AssetError::InvalidInput(format!("invalid code: {:?}", code)));
        }

        let outcome = self
            .run_step("delete_metadata", async {
                self.repository
                    .delete_by_code(code)
                    .await
                    .map_err(AssetError::Persistence)
            })
            .await?;

        let blob_name = Asset::blob_name(code);
        self.run_step("delete_object", async {
            self.storage
                .delete(&blob_name, true)
                .await
                .map_err(AssetError::Delete)
        })
        .await
        .map_err(|e| {
            tracing::error!(
                code = %code,
                metadata_deleted = outcome.deleted_count,
                "Image delete failed after metadata removal: {}",
                e
            );
            e
        })?;

        record_asset_deleted(outcome.deleted_count > 0);
        tracing::info!(code = %code, deleted_count = outcome.deleted_count, "Asset deleted");

        Ok(outcome)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.repository.health_check().await
    }

    async fn run_step<T, F>(&self, step: &'static str, fut: F) -> Result<T, AssetError>
    where
        F: Future<Output = Result<T, AssetError>>,
    {
        let start = Instant::now();
        let result = match self.step_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| AssetError::Timeout { step, after: limit })?,
            None => fut.await,
        };
        record_step_duration(step, start.elapsed());
        result
    }
}
