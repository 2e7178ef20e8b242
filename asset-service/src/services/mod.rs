pub mod database;
pub mod metrics;
pub mod orchestrator;
pub mod providers;
pub mod storage;

pub use database::{AssetDb, AssetRepository};
pub use metrics::{get_metrics, init_metrics};
pub use orchestrator::AssetOrchestrator;
pub use providers::{
    GeneratedImage, HttpImageFetcher, ImageFetcher, ImageGenerator, MockImageFetcher,
    MockImageGenerator, OpenAiConfig, OpenAiImageGenerator, ProviderError,
};
pub use storage::{AzureBlobStorage, LocalStorage, Storage};
