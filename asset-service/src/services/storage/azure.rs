//! Azure Blob Storage backend.
//!
//! Talks to the Blob REST API directly and authenticates every request with a
//! Shared Key signature derived from the account connection string.

use super::{check_object_name, Storage};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Url};
use service_core::error::AppError;
use sha2::Sha256;
use std::collections::HashMap;
use std::str::FromStr;

type HmacSha256 = Hmac<Sha256>;

const API_VERSION: &str = "2021-08-06";
const IMAGE_CONTENT_TYPE: &str = "image/png";

// Well-known Azurite credentials.
const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Parsed `AZURE_STORAGE_CONNECTION_STRING`.
#[derive(Clone)]
pub struct AzureConnectionString {
    pub account_name: String,
    account_key: Vec<u8>,
    pub blob_endpoint: String,
}

impl std::fmt::Debug for AzureConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureConnectionString")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("blob_endpoint", &self.blob_endpoint)
            .finish()
    }
}

impl AzureConnectionString {
    fn development_storage() -> Result<Self, AppError> {
        Ok(Self {
            account_name: DEV_ACCOUNT_NAME.to_string(),
            account_key: decode_key(DEV_ACCOUNT_KEY)?,
            blob_endpoint: DEV_BLOB_ENDPOINT.to_string(),
        })
    }
}

fn invalid(reason: &str) -> AppError {
    AppError::ConfigError(anyhow::anyhow!(
        "Invalid storage connection string: {}",
        reason
    ))
}

fn decode_key(key: &str) -> Result<Vec<u8>, AppError> {
    BASE64
        .decode(key.as_bytes())
        .map_err(|_| invalid("AccountKey is not valid base64"))
}

impl FromStr for AzureConnectionString {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: HashMap<String, String> = HashMap::new();
        for segment in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            // Keys end in '=' padding, so only split on the first one.
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| invalid("segment without '='"))?;
            parts.insert(key.trim().to_string(), value.trim().to_string());
        }

        if parts
            .get("UseDevelopmentStorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return Self::development_storage();
        }

        let account_name = parts
            .remove("AccountName")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| invalid("missing AccountName"))?;
        let account_key = parts
            .remove("AccountKey")
            .ok_or_else(|| invalid("missing AccountKey"))
            .and_then(|k| decode_key(&k))?;

        let blob_endpoint = match parts.remove("BlobEndpoint") {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => {
                let protocol = parts
                    .remove("DefaultEndpointsProtocol")
                    .unwrap_or_else(|| "https".to_string());
                let suffix = parts
                    .remove("EndpointSuffix")
                    .unwrap_or_else(|| "core.windows.net".to_string());
                format!("{}://{}.blob.{}", protocol, account_name, suffix)
            }
        };

        Ok(Self {
            account_name,
            account_key,
            blob_endpoint,
        })
    }
}

pub struct AzureBlobStorage {
    client: Client,
    credentials: AzureConnectionString,
    container: String,
}

impl AzureBlobStorage {
    pub fn new(client: Client, credentials: AzureConnectionString, container: String) -> Self {
        Self {
            client,
            credentials,
            container,
        }
    }

    pub fn from_connection_string(
        client: Client,
        connection_string: &str,
        container: String,
    ) -> Result<Self, AppError> {
        let credentials = connection_string.parse()?;
        Ok(Self::new(client, credentials, container))
    }

    /// `<endpoint>/<container>/<name>`, with `name` pushed as one encoded
    /// path segment.
    pub fn blob_url(&self, name: &str) -> Result<Url, AppError> {
        check_object_name(name)?;

        let endpoint = &self.credentials.blob_endpoint;
        let mut url = Url::parse(endpoint).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid blob endpoint {}: {}", endpoint, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                AppError::ConfigError(anyhow::anyhow!(
                    "Blob endpoint {} cannot carry a path",
                    endpoint
                ))
            })?
            .pop_if_empty()
            .push(&self.container)
            .push(name);
        Ok(url)
    }

    fn authorization(
        &self,
        method: &str,
        url: &Url,
        content_length: usize,
        ms_headers: &[(&str, String)],
    ) -> Result<String, AppError> {
        let canonical_resource = format!("/{}{}", self.credentials.account_name, url.path());
        let payload = string_to_sign(method, content_length, ms_headers, &canonical_resource);
        let signature = sign(&self.credentials.account_key, &payload)?;
        Ok(format!(
            "SharedKey {}:{}",
            self.credentials.account_name, signature
        ))
    }
}

/// Shared Key string-to-sign for requests without standard content headers
/// other than Content-Length and without query parameters.
fn string_to_sign(
    method: &str,
    content_length: usize,
    ms_headers: &[(&str, String)],
    canonical_resource: &str,
) -> String {
    // Content-Length is empty, not "0", for bodiless requests.
    let content_length = if content_length == 0 {
        String::new()
    } else {
        content_length.to_string()
    };

    let mut headers: Vec<(String, &str)> = ms_headers
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value.trim()))
        .collect();
    headers.sort_by(|a, b| a.0.cmp(&b.0));
    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();

    let standard: [&str; 12] = [
        method,
        "",              // Content-Encoding
        "",              // Content-Language
        content_length.as_str(), // Content-Length
        "",              // Content-MD5
        "",              // Content-Type
        "",              // Date (x-ms-date is used instead)
        "",              // If-Modified-Since
        "",              // If-Match
        "",              // If-None-Match
        "",              // If-Unmodified-Since
        "",              // Range
    ];

    format!(
        "{}\n{}{}",
        standard.join("\n"),
        canonical_headers,
        canonical_resource
    )
}

fn sign(key: &[u8], payload: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("Invalid storage account key: {}", e))
    })?;
    mac.update(payload.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

fn request_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

#[async_trait]
impl Storage for AzureBlobStorage {
    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<String, AppError> {
        let url = self.blob_url(name)?;
        let ms_headers = [
            ("x-ms-blob-content-type", IMAGE_CONTENT_TYPE.to_string()),
            ("x-ms-blob-type", "BlockBlob".to_string()),
            ("x-ms-date", request_date()),
            ("x-ms-version", API_VERSION.to_string()),
        ];
        let authorization = self.authorization("PUT", &url, data.len(), &ms_headers)?;

        let mut request = self
            .client
            .put(url.clone())
            .header(AUTHORIZATION, authorization);
        for (name, value) in &ms_headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.body(data).send().await.map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Azure blob upload failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BadGateway(format!(
                "Azure blob upload of {} returned {}: {}",
                name, status, body
            )));
        }

        tracing::debug!(blob = %name, container = %self.container, "Uploaded blob");

        Ok(url.to_string())
    }

    async fn delete(&self, name: &str, include_snapshots: bool) -> Result<(), AppError> {
        let url = self.blob_url(name)?;
        let mut ms_headers = vec![("x-ms-date", request_date())];
        if include_snapshots {
            ms_headers.push(("x-ms-delete-snapshots", "include".to_string()));
        }
        ms_headers.push(("x-ms-version", API_VERSION.to_string()));
        let authorization = self.authorization("DELETE", &url, 0, &ms_headers)?;

        let mut request = self
            .client
            .delete(url)
            .header(AUTHORIZATION, authorization);
        for (name, value) in &ms_headers {
            request = request.header(*name, value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Azure blob delete failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BadGateway(format!(
                "Azure blob delete of {} returned {}: {}",
                name, status, body
            )));
        }

        tracing::debug!(blob = %name, container = %self.container, "Deleted blob");

        Ok(())
    }
}
