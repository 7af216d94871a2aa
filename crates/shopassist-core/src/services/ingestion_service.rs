use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

use super::error::{ServiceError, rejection_message};
use crate::settings::AppSettings;

/// Extensions the file picker offers for the product catalog
pub const ACCEPTED_UPLOAD_EXTENSIONS: &[&str] = &["pdf", "txt", "doc", "docx"];

/// Client-side extension filter; the ingestion service does its own checks
pub fn is_accepted_upload(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_UPLOAD_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

fn mime_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

/// A selected file, read into memory
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Ok(Self { file_name, bytes })
    }

    /// Read every accepted file among `paths`, skipping the rest
    pub async fn from_paths(paths: &[PathBuf]) -> Result<Vec<Self>> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path.to_string_lossy();
            if !is_accepted_upload(&name) {
                debug!(path = %path.display(), "Skipping unsupported upload");
                continue;
            }
            files.push(Self::from_path(path).await?);
        }
        Ok(files)
    }
}

/// Accepts raw files into the knowledge base backing the agent
#[async_trait]
pub trait KnowledgeBaseIngestor: Send + Sync {
    async fn ingest(&self, knowledge_base_id: &str, files: &[UploadFile])
    -> Result<(), ServiceError>;
}

/// Ingestion collaborator reached over HTTP (multipart upload)
pub struct HttpIngestionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpIngestionClient {
    pub fn new(settings: &AppSettings) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.ingestion_endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    fn build_form(knowledge_base_id: &str, files: &[UploadFile]) -> Result<Form, ServiceError> {
        let mut form = Form::new().text("knowledge_base_id", knowledge_base_id.to_string());
        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(mime_type_for(&file.file_name))?;
            form = form.part("files", part);
        }
        Ok(form)
    }
}

#[async_trait]
impl KnowledgeBaseIngestor for HttpIngestionClient {
    async fn ingest(
        &self,
        knowledge_base_id: &str,
        files: &[UploadFile],
    ) -> Result<(), ServiceError> {
        info!(
            knowledge_base_id = %knowledge_base_id,
            file_count = files.len(),
            "Uploading files to knowledge base"
        );

        let form = Self::build_form(knowledge_base_id, files)?;

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = rejection_message(&body, status.as_u16(), "Ingestion service");
            warn!(status = %status, error = %message, "Ingestion service rejected upload");
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
