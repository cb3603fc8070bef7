//! The edit operations the publish workflow consumes.

use super::models::{AppEdit, Track, UploadedArtifact};
use crate::config::ArtifactKind;
use crate::error::ApiError;
use async_trait::async_trait;
use std::path::Path;

/// Edits API of the Google Play Developer API.
///
/// Each method is exactly one round trip; callers decide what happens on failure.
#[async_trait]
pub trait EditsApi: Send + Sync {
    /// Open a new edit for `package_name`
    async fn insert_edit(&self, package_name: &str) -> Result<AppEdit, ApiError>;

    /// Upload the binary at `path` into the edit
    async fn upload_artifact(
        &self,
        package_name: &str,
        edit_id: &str,
        kind: ArtifactKind,
        path: &Path,
    ) -> Result<UploadedArtifact, ApiError>;

    /// Replace the releases of `track` within the edit
    async fn update_track(
        &self,
        package_name: &str,
        edit_id: &str,
        track: &Track,
    ) -> Result<Track, ApiError>;

    /// Commit the edit, publishing its changes
    async fn commit_edit(&self, package_name: &str, edit_id: &str) -> Result<AppEdit, ApiError>;

    /// Discard the edit
    async fn delete_edit(&self, package_name: &str, edit_id: &str) -> Result<(), ApiError>;
}
