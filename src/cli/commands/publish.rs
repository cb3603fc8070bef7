//! Publish command: credentials, identity, notes, then the edit workflow.

use crate::cli::RuntimeConfig;
use crate::config::{ApiSettings, PublishConfig};
use crate::credentials::{ANDROID_PUBLISHER_SCOPE, ServiceAccountCredentials};
use crate::error::{ArtifactError, Result};
use crate::play::AndroidPublisherClient;
use crate::publish::{
    ProgressReporter, PublishOutcome, Publisher, ReleaseRequest, build_release_notes,
    resolve_identity,
};

/// Publish the configured binary with the real Play client
pub async fn execute_publish(
    config: &PublishConfig,
    runtime: &RuntimeConfig,
) -> Result<PublishOutcome> {
    if !config.artifact_path.is_file() {
        return Err(ArtifactError::NotFound {
            path: config.artifact_path.clone(),
        }
        .into());
    }

    runtime.step("Loading account credentials...");
    let credentials =
        ServiceAccountCredentials::from_file(&config.key_path, &[ANDROID_PUBLISHER_SCOPE])?;
    runtime.detail(&format!("Service account: {}", credentials.client_email()));

    let identity = resolve_identity(config, runtime)?;

    runtime.step("Loading release notes...");
    let release_notes = build_release_notes(&config.notes)?;
    if release_notes.is_empty() {
        runtime.detail("No release notes");
    }

    runtime.step("Initialising publisher service...");
    let settings = ApiSettings::from_env();
    let client = AndroidPublisherClient::new(credentials, &settings, &identity.name)?;

    let request = ReleaseRequest {
        package_name: identity.package_name,
        track: config.track.clone(),
        kind: config.kind,
        artifact_path: config.artifact_path.clone(),
        release_notes,
    };

    let outcome = Publisher::new(&client, runtime).publish(&request).await?;
    Ok(outcome)
}
