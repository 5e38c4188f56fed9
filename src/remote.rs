//! Remote document-management API client.
//!
//! Two operations are consumed by the migration pipeline: create a document
//! (returning its identifier) and create + upload an attachment (returning
//! a retrieval URL). Both are modeled by the [`DocumentStore`] trait so the
//! orchestrator can run against a fake in tests. Every outbound call asks
//! the shared [`RateLimiter`](crate::rate::RateLimiter) for admission first.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::rate::RateLimiter;

/// Where an uploaded attachment ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLink {
    pub id: String,
    /// Retrieval URL to substitute for the original reference.
    pub url: String,
}

/// The two remote operations the orchestrator depends on.
#[async_trait]
pub trait DocumentStore {
    /// Creates a document and returns its identifier.
    async fn create_document(
        &self,
        title: &str,
        text: &str,
        collection_id: &str,
        parent_id: Option<&str>,
    ) -> Result<String>;

    /// Uploads one attachment file. Returns `Ok(None)` when the file is
    /// skipped (HTML documents are never attachments; unknown MIME types
    /// are skipped with a log line).
    async fn upload_attachment(&self, path: &Path) -> Result<Option<AttachmentLink>>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Serialize)]
struct DocumentPayload<'a> {
    title: &'a str,
    text: &'a str,
    #[serde(rename = "collectionId")]
    collection_id: &'a str,
    #[serde(rename = "parentDocumentId", skip_serializing_if = "Option::is_none")]
    parent_document_id: Option<&'a str>,
    publish: bool,
}

#[derive(Serialize)]
struct AttachmentPayload<'a> {
    name: &'a str,
    #[serde(rename = "contentType")]
    content_type: &'a str,
    size: u64,
    preset: &'a str,
}

#[derive(Deserialize)]
struct DocumentResponse {
    data: DocumentData,
}

#[derive(Deserialize)]
struct DocumentData {
    id: String,
}

#[derive(Deserialize)]
struct AttachmentCreateResponse {
    data: AttachmentCreateData,
}

#[derive(Deserialize)]
struct AttachmentCreateData {
    #[serde(rename = "uploadUrl")]
    upload_url: String,
    form: HashMap<String, serde_json::Value>,
    attachment: AttachmentData,
}

#[derive(Deserialize)]
struct AttachmentData {
    id: String,
}

#[derive(Deserialize)]
struct CollectionsResponse {
    data: Vec<Collection>,
}

pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    limiter: RateLimiter,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig, limiter: RateLimiter) -> anyhow::Result<Self> {
        let token = config.token()?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token,
            limiter,
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        name: &str,
        payload: &impl Serialize,
    ) -> Result<T> {
        self.limiter.admit().await;
        let response = self
            .http
            .post(self.endpoint(name))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Remote(format!("{} request failed: {}", name, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!(
                "{} returned {}: {}",
                name, status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::Remote(format!("{} returned an unexpected body: {}", name, e)))
    }

    /// Lists the instance's collections so an operator can pick a target.
    pub async fn list_collections(&self) -> Result<Vec<Collection>> {
        let response: CollectionsResponse = self
            .post_json("collections.list", &serde_json::json!({}))
            .await?;
        let mut collections = response.data;
        for collection in &mut collections {
            if collection.url.starts_with('/') {
                collection.url = format!("{}{}", self.base_url, collection.url);
            }
        }
        Ok(collections)
    }

    /// The instance serves uploads from the site root, not the API root.
    fn absolute_upload_url(&self, upload_url: &str) -> String {
        if let Some(rest) = upload_url.strip_prefix('/') {
            let rest = rest.strip_prefix("api").unwrap_or(rest);
            format!("{}/{}", self.base_url, rest.trim_start_matches('/'))
        } else {
            upload_url.to_string()
        }
    }
}

#[async_trait]
impl DocumentStore for RemoteClient {
    async fn create_document(
        &self,
        title: &str,
        text: &str,
        collection_id: &str,
        parent_id: Option<&str>,
    ) -> Result<String> {
        let payload = DocumentPayload {
            title,
            text,
            collection_id,
            parent_document_id: parent_id,
            publish: true,
        };
        let response: DocumentResponse = self.post_json("documents.create", &payload).await?;
        Ok(response.data.id)
    }

    async fn upload_attachment(&self, path: &Path) -> Result<Option<AttachmentLink>> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if extension == "html" {
            info!(path = %path.display(), "skipping HTML file");
            return Ok(None);
        }

        let Some(content_type) = mime_guess::from_path(path).first_raw() else {
            info!(path = %path.display(), "cannot determine mimetype, skipping");
            return Ok(None);
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let metadata = std::fs::metadata(path)
            .map_err(|e| Error::io(format!("failed to stat {}", path.display()), e))?;

        let payload = AttachmentPayload {
            name: &name,
            content_type,
            size: metadata.len(),
            preset: "documentAttachment",
        };
        let response: AttachmentCreateResponse =
            self.post_json("attachments.create", &payload).await?;
        let data = response.data;

        let key = data
            .form
            .get("key")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                Error::Remote("attachments.create response is missing form.key".to_string())
            })?
            .to_string();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;

        let mut form = reqwest::multipart::Form::new();
        for (field, value) in &data.form {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            form = form.text(field.clone(), text);
        }
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(name.clone())
            .mime_str(content_type)
            .map_err(|e| Error::Remote(format!("invalid attachment mimetype: {}", e)))?;
        form = form.part("file", part);

        // Second admission covers the upload call itself.
        self.limiter.admit().await;
        let upload_url = self.absolute_upload_url(&data.upload_url);
        let response = self
            .http
            .post(&upload_url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Remote(format!("attachment upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(format!(
                "attachment upload returned {}: {}",
                status, body
            )));
        }

        Ok(Some(AttachmentLink {
            id: data.attachment.id,
            url: format!("{}/files.get?key={}", self.base_url, key),
        }))
    }
}
