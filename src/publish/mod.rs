//! The publish workflow: one edit, one upload, one track update, one commit.
//!
//! Any failure after the edit exists deletes the edit before the error is returned.

mod edit;
mod identity;
mod notes;
mod reporter;

pub use edit::EditSession;
pub use identity::resolve_identity;
pub use notes::build_release_notes;
pub use reporter::{LogReporter, ProgressReporter};

use crate::config::ArtifactKind;
use crate::error::{ApiError, PublishError};
use crate::play::{EditsApi, LocalizedText, Track, TrackRelease, UploadedArtifact};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Identity of the app being published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    /// Application name (client user agent, console output)
    pub name: String,
    /// Application id on Google Play
    pub package_name: String,
    /// Version code, when known before upload
    pub version_code: Option<u32>,
    /// Version name, when known before upload
    pub version_name: Option<String>,
}

/// Everything one publish operation needs
#[derive(Debug, Clone)]
pub struct ReleaseRequest {
    /// Application id
    pub package_name: String,
    /// Target track
    pub track: String,
    /// Binary kind
    pub kind: ArtifactKind,
    /// Binary location
    pub artifact_path: PathBuf,
    /// Zero or one localized notes
    pub release_notes: Vec<LocalizedText>,
}

/// Result of a committed publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Committed edit
    pub edit_id: String,
    /// Version code the backend assigned to the upload
    pub version_code: i64,
    /// Track the release went to
    pub track: String,
}

/// Runs the publish workflow against an [`EditsApi`]
pub struct Publisher<'a, A: EditsApi + ?Sized> {
    api: &'a A,
    reporter: &'a dyn ProgressReporter,
}

impl<'a, A: EditsApi + ?Sized> Publisher<'a, A> {
    /// Create a publisher reporting progress to `reporter`
    pub fn new(api: &'a A, reporter: &'a dyn ProgressReporter) -> Self {
        Self { api, reporter }
    }

    /// Open an edit, upload, update the track and commit.
    ///
    /// Every remote call is attempted once. After the edit exists, a failure
    /// triggers exactly one delete of that edit.
    pub async fn publish(&self, request: &ReleaseRequest) -> Result<PublishOutcome, PublishError> {
        self.reporter.step("Initialising new edit...");
        let mut edit = EditSession::open(self.api, &request.package_name).await?;
        self.reporter
            .success(&format!("Edit created. Id: {}", edit.id()));

        match self.run_steps(&mut edit, request).await {
            Ok(uploaded) => {
                let outcome = PublishOutcome {
                    edit_id: edit.id().to_string(),
                    version_code: uploaded.version_code,
                    track: request.track.clone(),
                };
                self.reporter.success(&format!(
                    "Success. Committed edit id: {}",
                    outcome.edit_id
                ));
                Ok(outcome)
            }
            Err(cause) => {
                self.reporter
                    .warn("Operation failed due to an error! Deleting edit...");
                Err(edit.abort(cause).await)
            }
        }
    }

    async fn run_steps(
        &self,
        edit: &mut EditSession<'a, A>,
        request: &ReleaseRequest,
    ) -> Result<UploadedArtifact, ApiError> {
        self.reporter
            .step(&format!("Uploading {} file...", request.kind.label()));
        let uploaded = self
            .api
            .upload_artifact(
                edit.package_name(),
                edit.id(),
                request.kind,
                &request.artifact_path,
            )
            .await?;
        self.reporter.success(&format!(
            "File uploaded. Version Code: {}",
            uploaded.version_code
        ));
        self.verify_digest(&request.artifact_path, uploaded.sha256.as_deref())
            .await;

        self.reporter.step(&format!(
            "On track: {}. Creating a release...",
            request.track
        ));
        let track = Track {
            track: request.track.clone(),
            releases: vec![TrackRelease::completed(
                uploaded.version_code,
                request.release_notes.clone(),
            )],
        };
        self.api
            .update_track(edit.package_name(), edit.id(), &track)
            .await?;
        self.reporter
            .success(&format!("Release created on track: {}", request.track));

        self.reporter.step("Committing edit...");
        edit.commit().await?;

        Ok(uploaded)
    }

    /// Warn when the backend's digest differs from the local file
    async fn verify_digest(&self, path: &Path, remote: Option<&str>) {
        let Some(remote) = remote else {
            return;
        };

        match file_sha256(path.to_path_buf()).await {
            Ok(local) if local.eq_ignore_ascii_case(remote) => {
                log::debug!("Upload digest verified: {local}");
            }
            Ok(local) => self.reporter.warn(&format!(
                "Uploaded SHA-256 {remote} does not match local file {local}"
            )),
            Err(e) => log::warn!("Could not hash {}: {e}", path.display()),
        }
    }
}

/// Hex SHA-256 of a file, hashed off the async runtime
pub async fn file_sha256(path: PathBuf) -> std::io::Result<String> {
    tokio::task::spawn_blocking(move || {
        let mut file = std::fs::File::open(&path)?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let read = file.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
        Ok(hex::encode(hasher.finalize()))
    })
    .await
    .map_err(std::io::Error::other)?
}
