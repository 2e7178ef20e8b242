use crate::models::{Asset, DeleteOutcome};
use async_trait::async_trait;
use mongodb::{
    bson::doc, options::IndexOptions, Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

/// Document store holding asset records, keyed by `code`.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn insert(&self, asset: &Asset) -> Result<(), AppError>;

    async fn delete_by_code(&self, code: &str) -> Result<DeleteOutcome, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct AssetDb {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl AssetDb {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self {
            client,
            db,
            collection: collection.to_string(),
        })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for asset-service");

        // Codes are the lookup key for deletion and must never repeat
        let code_index = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(
                IndexOptions::builder()
                    .name("code_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.assets()
            .create_index(code_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create code index on {} collection: {}",
                    self.collection,
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on {}.code", self.collection);

        Ok(())
    }

    pub fn assets(&self) -> Collection<Asset> {
        self.db.collection(&self.collection)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl AssetRepository for AssetDb {
    async fn insert(&self, asset: &Asset) -> Result<(), AppError> {
        self.assets().insert_one(asset, None).await.map_err(|e| {
            tracing::error!(code = %asset.code, "Failed to insert asset: {}", e);
            AppError::from(e)
        })?;
        Ok(())
    }

    async fn delete_by_code(&self, code: &str) -> Result<DeleteOutcome, AppError> {
        let result = self
            .assets()
            .delete_one(doc! { "code": code }, None)
            .await
            .map_err(|e| {
                tracing::error!(code = %code, "Failed to delete asset: {}", e);
                AppError::from(e)
            })?;

        // The driver only yields a DeleteResult for acknowledged writes;
        // unacknowledged ones surface as errors above.
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }
}
