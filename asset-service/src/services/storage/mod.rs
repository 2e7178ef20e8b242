pub mod azure;

use async_trait::async_trait;
use service_core::error::AppError;
use std::path::PathBuf;
use tokio::fs;

pub use azure::{AzureBlobStorage, AzureConnectionString};

/// Object store holding the generated images.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stores `data` under `name` and returns its public URL.
    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<String, AppError>;

    /// Removes `name`, and its snapshots when the backend keeps any.
    async fn delete(&self, name: &str, include_snapshots: bool) -> Result<(), AppError>;
}

/// Accepts only flat object names: no separators, no `.`/`..`, nothing a URL
/// would treat as a query or fragment.
pub(crate) fn check_object_name(name: &str) -> Result<(), AppError> {
    let flat = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '?', '#', '%'])
        && !name.chars().any(char::is_control);
    if flat {
        Ok(())
    } else {
        Err(AppError::InternalError(anyhow::anyhow!(
            "Refusing object name {:?}",
            name
        )))
    }
}

pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub async fn new(
        base_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self {
            base_path,
            public_base_url: public_base_url.into(),
        })
    }

    fn object_path(&self, name: &str) -> Result<PathBuf, AppError> {
        check_object_name(name)?;
        Ok(self.base_path.join(name))
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.public_base_url.trim_end_matches('/'), name)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<String, AppError> {
        let path = self.object_path(name)?;
        fs::write(path, data).await?;
        Ok(self.public_url(name))
    }

    // Files have no snapshots.
    async fn delete(&self, name: &str, _include_snapshots: bool) -> Result<(), AppError> {
        let path = self.object_path(name)?;
        if path.exists() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}
