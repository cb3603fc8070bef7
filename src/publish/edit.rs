//! Edit session guard.
//!
//! An edit is acquired by [`EditSession::open`] and must end in [`EditSession::commit`]
//! or [`EditSession::abort`]. Dropping a session that reached neither logs a warning,
//! since the backend keeps the pending edit until it expires.

use crate::error::{ApiError, PublishError};
use crate::play::{AppEdit, EditsApi};

/// In-progress edit on the publishing backend
pub struct EditSession<'a, A: EditsApi + ?Sized> {
    api: &'a A,
    package_name: String,
    id: String,
    resolved: bool,
}

impl<'a, A: EditsApi + ?Sized> EditSession<'a, A> {
    /// Create a new edit; failure leaves nothing to clean up
    pub async fn open(api: &'a A, package_name: &str) -> Result<Self, PublishError> {
        let edit = api
            .insert_edit(package_name)
            .await
            .map_err(PublishError::EditCreation)?;

        log::info!("Opened edit {} for {}", edit.id, package_name);
        Ok(Self {
            api,
            package_name: package_name.to_string(),
            id: edit.id,
            resolved: false,
        })
    }

    /// Backend edit id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Package the edit belongs to
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Commit the edit. On error the session stays open and must be aborted.
    pub async fn commit(&mut self) -> Result<AppEdit, ApiError> {
        let committed = self.api.commit_edit(&self.package_name, &self.id).await?;
        self.resolved = true;
        log::info!("Committed edit {}", self.id);
        Ok(committed)
    }

    /// Delete the edit after `cause` and fold any delete failure into the error
    pub async fn abort(mut self, cause: ApiError) -> PublishError {
        self.resolved = true;
        log::warn!("Deleting edit {} after failure: {}", self.id, cause);

        let cleanup = match self.api.delete_edit(&self.package_name, &self.id).await {
            Ok(()) => None,
            Err(err) => {
                log::error!("Failed to delete edit {}: {}", self.id, err);
                Some(err)
            }
        };

        PublishError::Aborted {
            edit_id: std::mem::take(&mut self.id),
            cause,
            cleanup,
        }
    }
}

impl<A: EditsApi + ?Sized> Drop for EditSession<'_, A> {
    fn drop(&mut self) {
        if !self.resolved {
            log::warn!(
                "Edit {} for {} was neither committed nor deleted; it stays pending until it expires",
                self.id,
                self.package_name
            );
        }
    }
}
