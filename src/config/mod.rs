//! Publish configuration resolved from command line arguments.
//!
//! Resolution is pure: it validates the argument combination and selects the
//! artifact kind without touching the filesystem or the network.

mod env;

pub use env::ApiSettings;

use crate::cli::Args;
use crate::error::{ArtifactError, CliError, ReleaseError, Result};
use std::path::{Path, PathBuf};

/// The two kinds of binary Google Play accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Android package, metadata read from its manifest
    Apk,
    /// Android App Bundle, identity supplied by the caller
    Aab,
}

impl ArtifactKind {
    /// Select the kind from a file extension, case-insensitively
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("apk") {
            Some(Self::Apk)
        } else if extension.eq_ignore_ascii_case("aab") {
            Some(Self::Aab)
        } else {
            None
        }
    }

    /// MIME type used for the media upload
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Apk => "application/vnd.android.package-archive",
            Self::Aab => "application/octet-stream",
        }
    }

    /// Edit sub-collection the binary is uploaded into
    pub fn collection(self) -> &'static str {
        match self {
            Self::Apk => "apks",
            Self::Aab => "bundles",
        }
    }

    /// Human readable label for progress output
    pub fn label(self) -> &'static str {
        match self {
            Self::Apk => "APK",
            Self::Aab => "AAB",
        }
    }
}

/// Where release notes come from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NotesSource {
    /// No release notes
    #[default]
    None,
    /// Notes given on the command line
    Inline(String),
    /// Notes read from a file
    File(PathBuf),
}

/// Fully validated configuration for one publish invocation
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Service account key file
    pub key_path: PathBuf,
    /// Binary to upload
    pub artifact_path: PathBuf,
    /// Binary kind selected from the extension
    pub kind: ArtifactKind,
    /// Target release track
    pub track: String,
    /// Application name override
    pub app_name: Option<String>,
    /// Package name (always set for AAB)
    pub package_name: Option<String>,
    /// Release notes source
    pub notes: NotesSource,
}

impl PublishConfig {
    /// Validate arguments and derive the publishing strategy
    pub fn resolve(args: &Args) -> Result<Self> {
        if args.notes.is_some() && args.notes_file.is_some() {
            return Err(CliError::ConflictingArguments {
                arguments: vec!["-notes".to_string(), "-notesFile".to_string()],
            }
            .into());
        }

        require_path(&args.key, "-key")?;
        require_path(&args.file, "-file")?;
        let track = args.track.trim();
        if track.is_empty() {
            return Err(missing("-track"));
        }

        let kind = ArtifactKind::from_path(&args.file).ok_or_else(|| {
            ArtifactError::UnsupportedFileType {
                path: args.file.clone(),
            }
        })?;

        let package_name = non_blank(args.package_name.as_deref());
        if kind == ArtifactKind::Aab && package_name.is_none() {
            return Err(ArtifactError::MissingPackageName {
                path: args.file.clone(),
            }
            .into());
        }

        let notes = match (&args.notes, &args.notes_file) {
            (Some(text), None) => NotesSource::Inline(text.clone()),
            (None, Some(path)) => NotesSource::File(path.clone()),
            _ => NotesSource::None,
        };

        Ok(Self {
            key_path: args.key.clone(),
            artifact_path: args.file.clone(),
            kind,
            track: track.to_string(),
            app_name: non_blank(args.name.as_deref()),
            package_name,
            notes,
        })
    }
}

fn require_path(path: &Path, flag: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(missing(flag));
    }
    Ok(())
}

fn missing(flag: &str) -> ReleaseError {
    CliError::MissingArgument {
        argument: flag.to_string(),
    }
    .into()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(file: &str) -> Args {
        Args {
            key: PathBuf::from("k.json"),
            file: PathBuf::from(file),
            track: "internal".to_string(),
            name: None,
            package_name: None,
            notes: None,
            notes_file: None,
        }
    }

    #[test]
    fn kind_is_case_insensitive() {
        assert_eq!(ArtifactKind::from_path(Path::new("a.APK")), Some(ArtifactKind::Apk));
        assert_eq!(ArtifactKind::from_path(Path::new("out/a.Aab")), Some(ArtifactKind::Aab));
        assert_eq!(ArtifactKind::from_path(Path::new("a.apk.zip")), None);
        assert_eq!(ArtifactKind::from_path(Path::new("apk")), None);
    }

    #[test]
    fn resolves_apk_with_inline_notes() {
        let mut a = args("app.apk");
        a.notes = Some("fix bug".to_string());

        let config = PublishConfig::resolve(&a).expect("valid");
        assert_eq!(config.kind, ArtifactKind::Apk);
        assert_eq!(config.notes, NotesSource::Inline("fix bug".to_string()));
        assert_eq!(config.track, "internal");
        assert!(config.package_name.is_none());
    }

    #[test]
    fn unsupported_extension_fails() {
        let err = PublishConfig::resolve(&args("app.ipa")).expect_err("ipa is not supported");
        assert!(matches!(
            err,
            ReleaseError::Artifact(ArtifactError::UnsupportedFileType { .. })
        ));
    }

    #[test]
    fn bundle_requires_package_name() {
        let err = PublishConfig::resolve(&args("app.aab")).expect_err("package needed");
        assert!(matches!(
            err,
            ReleaseError::Artifact(ArtifactError::MissingPackageName { .. })
        ));

        let mut a = args("app.aab");
        a.package_name = Some("com.example.app".to_string());
        a.notes_file = Some(PathBuf::from("notes.txt"));
        let config = PublishConfig::resolve(&a).expect("valid bundle");
        assert_eq!(config.kind, ArtifactKind::Aab);
        assert_eq!(config.package_name.as_deref(), Some("com.example.app"));
        assert_eq!(config.notes, NotesSource::File(PathBuf::from("notes.txt")));
    }

    #[test]
    fn both_notes_sources_conflict() {
        let mut a = args("app.apk");
        a.notes = Some("x".to_string());
        a.notes_file = Some(PathBuf::from("n.txt"));
        let err = PublishConfig::resolve(&a).expect_err("exclusive");
        assert!(matches!(
            err,
            ReleaseError::Cli(CliError::ConflictingArguments { .. })
        ));
    }

    #[test]
    fn blank_required_fields_are_missing() {
        let mut a = args("app.apk");
        a.track = "  ".to_string();
        assert!(matches!(
            PublishConfig::resolve(&a),
            Err(ReleaseError::Cli(CliError::MissingArgument { .. }))
        ));

        let mut a = args("app.apk");
        a.key = PathBuf::new();
        assert!(matches!(
            PublishConfig::resolve(&a),
            Err(ReleaseError::Cli(CliError::MissingArgument { .. }))
        ));
    }
}
