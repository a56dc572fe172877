use crate::error::AppError;
use async_trait::async_trait;
use reqwest::{multipart, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, instrument};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// A file destined for a `multipart/form-data` request. Carries owned bytes
/// so the form can be rebuilt when a request is retried after a token
/// refresh.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Reads `path` into memory, guessing the MIME type from the extension.
    pub fn from_path(field_name: &str, path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        Ok(Self {
            field_name: field_name.to_string(),
            file_name,
            content_type,
            bytes,
        })
    }
}

/// Uniform request interface over the booking platform's REST API. All
/// service wrappers and the session layer go through this seam, which keeps
/// them testable against a mock server.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<T, AppError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send;

    async fn request_multipart<T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        upload: &FileUpload,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned + Send;
}

/// Production transport backed by `reqwest`. Prefixes every path with the
/// configured base URL and speaks JSON except for file uploads.
pub struct ReqwestClient {
    client: Client,
    base_url: String,
}

impl ReqwestClient {
    pub fn new(base_url: &str, timeout: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &crate::config::Config) -> Result<Self, AppError> {
        Self::new(&config.rest_api.base_url, config.rest_api.timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        let status = response.status();
        let body_text = response.text().await?;

        debug!("Response status: {}", status);

        if status.is_success() {
            // Empty 2xx bodies (204-style endpoints) deserialize as null.
            let raw = if body_text.trim().is_empty() {
                "null"
            } else {
                body_text.as_str()
            };
            return Ok(serde_json::from_str(raw)?);
        }

        if status == StatusCode::UNAUTHORIZED {
            debug!("Request rejected with 401");
            return Err(AppError::Unauthorized);
        }

        error!("API request failed. Status: {}, Body: {}", status, body_text);
        if let Ok(ErrorBody { detail }) = serde_json::from_str::<ErrorBody>(&body_text) {
            return Err(AppError::Api { status, detail });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound);
        }
        Err(AppError::Unexpected(status))
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    #[instrument(skip(self, token, body))]
    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<T, AppError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let url = self.url(path);
        debug!("Sending {} request to {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    #[instrument(skip(self, token, upload))]
    async fn request_multipart<T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        upload: &FileUpload,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.url(path);
        debug!(
            "Sending multipart {} request to {} ({} bytes)",
            method,
            url,
            upload.bytes.len()
        );

        let part = multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)?;
        let form = multipart::Form::new().part(upload.field_name.clone(), part);

        let mut request = self.client.request(method, &url).multipart(form);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }
}
