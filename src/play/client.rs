//! reqwest-backed client for the Google Play Developer API.

use super::api::EditsApi;
use super::models::{AppEdit, Apk, Bundle, ErrorEnvelope, Track, UploadedArtifact};
use crate::config::{ApiSettings, ArtifactKind};
use crate::credentials::ServiceAccountCredentials;
use crate::error::{ApiError, ConfigError};
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio_util::io::ReaderStream;
use url::Url;

const API_ROOT: &[&str] = &["androidpublisher", "v3", "applications"];

/// Build an API URL: `{base}[/upload]/androidpublisher/v3/applications/{segments...}`.
///
/// Every segment is percent-encoded on its own, so package and track names
/// can never introduce extra path components.
pub fn endpoint_url(base: &str, upload: bool, segments: &[&str]) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: base.to_string(),
        reason,
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| invalid("not a hierarchical URL".to_string()))?;
        path.pop_if_empty();
        if upload {
            path.push("upload");
        }
        path.extend(API_ROOT);
        path.extend(segments);
    }
    Ok(url)
}

/// Turn a non-success response body into a readable message
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) if !envelope.error.message.is_empty() => {
                format!("{} ({status})", envelope.error.message)
            }
            Some(status) => status,
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Publishing API client authenticated as a service account
#[derive(Debug)]
pub struct AndroidPublisherClient {
    http: reqwest::Client,
    credentials: ServiceAccountCredentials,
    base_url: String,
}

impl AndroidPublisherClient {
    /// Create a client with bounded connect and read timeouts
    pub fn new(
        credentials: ServiceAccountCredentials,
        settings: &ApiSettings,
        application_name: &str,
    ) -> crate::error::Result<Self> {
        settings.validate()?;

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.read_timeout)
            .user_agent(format!(
                "{application_name} {}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| ApiError::Transport {
                operation: "Initialise HTTP client",
                reason: e.to_string(),
            })?;

        log::debug!(
            "Publisher client for {} against {}",
            credentials.client_email(),
            settings.base_url
        );

        Ok(Self {
            http,
            credentials,
            base_url: settings.base_url.clone(),
        })
    }

    fn url(&self, operation: &'static str, upload: bool, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint_url(&self.base_url, upload, segments).map_err(|e| ApiError::Transport {
            operation,
            reason: e.to_string(),
        })
    }

    /// Authenticate, send and check the status of a request
    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let token = self
            .credentials
            .access_token(&self.http)
            .await
            .map_err(|source| ApiError::Credentials { operation, source })?;

        log::debug!("{operation}: sending request");
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                operation,
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log::debug!("{operation}: HTTP {status}: {body}");
        Err(ApiError::Status {
            operation,
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let body = response.text().await.map_err(|e| ApiError::Transport {
            operation,
            reason: format!("failed to read response: {e}"),
        })?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            operation,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl EditsApi for AndroidPublisherClient {
    async fn insert_edit(&self, package_name: &str) -> Result<AppEdit, ApiError> {
        const OP: &str = "Insert edit";
        let url = self.url(OP, false, &[package_name, "edits"])?;
        let response = self
            .send(OP, self.http.post(url).json(&serde_json::json!({})))
            .await?;
        Self::decode(OP, response).await
    }

    async fn upload_artifact(
        &self,
        package_name: &str,
        edit_id: &str,
        kind: ArtifactKind,
        path: &Path,
    ) -> Result<UploadedArtifact, ApiError> {
        const OP: &str = "Upload artifact";
        let mut url = self.url(OP, true, &[package_name, "edits", edit_id, kind.collection()])?;
        url.query_pairs_mut().append_pair("uploadType", "media");

        let io_error = |e: std::io::Error| ApiError::Transport {
            operation: OP,
            reason: format!("failed to read {}: {e}", path.display()),
        };
        let file = tokio::fs::File::open(path).await.map_err(io_error)?;
        let length = file.metadata().await.map_err(io_error)?.len();

        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, kind.mime_type())
            .header(CONTENT_LENGTH, length)
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)));

        let response = self.send(OP, request).await?;
        match kind {
            ArtifactKind::Apk => Self::decode::<Apk>(OP, response).await.map(Into::into),
            ArtifactKind::Aab => Self::decode::<Bundle>(OP, response).await.map(Into::into),
        }
    }

    async fn update_track(
        &self,
        package_name: &str,
        edit_id: &str,
        track: &Track,
    ) -> Result<Track, ApiError> {
        const OP: &str = "Update track";
        let url = self.url(OP, false, &[package_name, "edits", edit_id, "tracks", &track.track])?;
        let response = self.send(OP, self.http.put(url).json(track)).await?;
        Self::decode(OP, response).await
    }

    async fn commit_edit(&self, package_name: &str, edit_id: &str) -> Result<AppEdit, ApiError> {
        const OP: &str = "Commit edit";
        let url = self.url(OP, false, &[package_name, "edits", &format!("{edit_id}:commit")])?;
        // Google's front end answers 411 to a POST without Content-Length
        let request = self.http.post(url).header(CONTENT_LENGTH, 0);
        let response = self.send(OP, request).await?;
        Self::decode(OP, response).await
    }

    async fn delete_edit(&self, package_name: &str, edit_id: &str) -> Result<(), ApiError> {
        const OP: &str = "Delete edit";
        let url = self.url(OP, false, &[package_name, "edits", edit_id])?;
        self.send(OP, self.http.delete(url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://androidpublisher.googleapis.com";

    #[test]
    fn builds_edit_urls() {
        let url = endpoint_url(BASE, false, &["com.example.app", "edits"]).expect("url");
        assert_eq!(
            url.as_str(),
            "https://androidpublisher.googleapis.com/androidpublisher/v3/applications/com.example.app/edits"
        );

        let url = endpoint_url(BASE, false, &["com.example.app", "edits", "E1:commit"]).expect("url");
        assert!(url.as_str().ends_with("/edits/E1:commit"));
    }

    #[test]
    fn builds_upload_urls() {
        let url = endpoint_url(BASE, true, &["com.example.app", "edits", "E1", "bundles"]).expect("url");
        assert_eq!(
            url.as_str(),
            "https://androidpublisher.googleapis.com/upload/androidpublisher/v3/applications/com.example.app/edits/E1/bundles"
        );
    }

    #[test]
    fn encodes_hostile_segments() {
        let url = endpoint_url("http://127.0.0.1:9000/", false, &["pkg", "edits", "E1", "tracks", "a/../b"])
            .expect("url");
        assert!(url.as_str().ends_with("/tracks/a%2F..%2Fb"));
        assert!(url.as_str().starts_with("http://127.0.0.1:9000/androidpublisher/"));
    }

    #[test]
    fn decodes_google_error_envelope() {
        let body = r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(
            error_message(body),
            "The caller does not have permission (PERMISSION_DENIED)"
        );
        assert_eq!(error_message("  upstream timeout \n"), "upstream timeout");
        assert_eq!(error_message(""), "empty response body");
    }
}
