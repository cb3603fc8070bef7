//! Application identity for the two artifact kinds.

use super::{AppIdentity, ProgressReporter};
use crate::apk::read_apk_metadata;
use crate::config::{ArtifactKind, PublishConfig};
use crate::error::{ArtifactError, Result};

/// Work out name and package for the configured artifact.
///
/// APKs are read locally and `-name` overrides the manifest label. App bundles
/// take both values from the configuration; the name defaults to the package.
pub fn resolve_identity(
    config: &PublishConfig,
    reporter: &dyn ProgressReporter,
) -> Result<AppIdentity> {
    match config.kind {
        ArtifactKind::Apk => {
            reporter.step("Loading APK file information...");
            let meta = read_apk_metadata(&config.artifact_path)?;

            reporter.detail(&format!("Application Name: {}", meta.name));
            reporter.detail(&format!("Application Id: {}", meta.package_name));
            reporter.detail(&format!("Application Version Code: {}", meta.version_code));
            reporter.detail(&format!(
                "Application Version Name: {}",
                meta.version_name.as_deref().unwrap_or("-")
            ));

            if let Some(given) = config.package_name.as_deref()
                && given != meta.package_name
            {
                reporter.warn(&format!(
                    "Ignoring -packageName {given}; the APK declares {}",
                    meta.package_name
                ));
            }

            Ok(AppIdentity {
                name: config.app_name.clone().unwrap_or(meta.name),
                package_name: meta.package_name,
                version_code: Some(meta.version_code),
                version_name: meta.version_name,
            })
        }
        ArtifactKind::Aab => {
            reporter.step("Loading file information...");
            let package_name = config.package_name.clone().ok_or_else(|| {
                ArtifactError::MissingPackageName {
                    path: config.artifact_path.clone(),
                }
            })?;
            let name = config
                .app_name
                .clone()
                .unwrap_or_else(|| package_name.clone());

            reporter.detail(&format!("Application Name: {name}"));
            reporter.detail(&format!("Package Name: {package_name}"));

            Ok(AppIdentity {
                name,
                package_name,
                version_code: None,
                version_name: None,
            })
        }
    }
}
