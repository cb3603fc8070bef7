//! Comprehensive error types for kodegen_bundler_playstore operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for kodegen_bundler_playstore operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Process exit code used for every argument or workflow failure
pub const FAILURE_EXIT_CODE: i32 = 2;

/// Main error type for all kodegen_bundler_playstore operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Artifact selection errors
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential loading errors
    #[error("Credential error: {0}")]
    Credentials(#[from] CredentialError),

    /// APK metadata errors
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Release notes errors
    #[error("Release notes error: {0}")]
    Notes(#[from] NotesError),

    /// Publishing API errors raised outside an edit
    #[error("Play API error: {0}")]
    Api(#[from] ApiError),

    /// Edit workflow errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// The tool was invoked without any argument
    #[error("No arguments given")]
    NoArguments,

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Conflicting arguments
    #[error("Conflicting arguments: {}", .arguments.join(", "))]
    ConflictingArguments {
        /// Arguments that conflict
        arguments: Vec<String>,
    },
}

/// Errors selecting how the binary is published
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// Extension is neither `.apk` nor `.aab`
    #[error("File type is not supported for: {}", .path.display())]
    UnsupportedFileType {
        /// Offending file
        path: PathBuf,
    },

    /// App bundles carry no readable manifest, so the package must be given
    #[error("Package name is required for app bundle {}; pass -packageName", .path.display())]
    MissingPackageName {
        /// Bundle path
        path: PathBuf,
    },

    /// Binary does not exist
    #[error("Artifact not found: {}", .path.display())]
    NotFound {
        /// Missing path
        path: PathBuf,
    },
}

/// Environment configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Base URL of the publishing API does not parse
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Configured value
        url: String,
        /// Parser message
        reason: String,
    },
}

/// Service account credential errors
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Key file could not be read
    #[error("Failed to read key file {}: {source}", .path.display())]
    Read {
        /// Key path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Key file is not a service account JSON document
    #[error("Failed to parse key file {}: {source}", .path.display())]
    Parse {
        /// Key path
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Key file parsed but is unusable
    #[error("Invalid service account key: {reason}")]
    InvalidKey {
        /// Reason for the error
        reason: String,
    },

    /// OAuth token endpoint refused or failed the exchange
    #[error("Token exchange failed: {reason}")]
    TokenExchange {
        /// Reason for the error
        reason: String,
    },
}

/// APK metadata extraction errors
#[derive(Error, Debug)]
pub enum MetadataError {
    /// APK is not a readable zip archive
    #[error("Failed to open APK {}: {reason}", .path.display())]
    Archive {
        /// APK path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Required archive entry is absent
    #[error("APK entry '{entry}' not found")]
    MissingEntry {
        /// Entry name
        entry: String,
    },

    /// Binary resource data is truncated or inconsistent
    #[error("Malformed {what}: {reason}")]
    Malformed {
        /// Which structure failed to parse
        what: &'static str,
        /// Reason for the error
        reason: String,
    },

    /// Manifest lacks a required attribute
    #[error("Manifest attribute '{attribute}' not found")]
    MissingAttribute {
        /// Attribute name
        attribute: &'static str,
    },
}

/// Release notes loading errors
#[derive(Error, Debug)]
pub enum NotesError {
    /// Notes file could not be read
    #[error("Failed to read notes file {}: {source}", .path.display())]
    Read {
        /// Notes path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Publishing API call failures
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request never produced a response
    #[error("{operation} failed: {reason}")]
    Transport {
        /// API operation name
        operation: &'static str,
        /// Reason for the error
        reason: String,
    },

    /// Backend answered with a non-success status
    #[error("{operation} failed with HTTP {status}: {message}")]
    Status {
        /// API operation name
        operation: &'static str,
        /// HTTP status code
        status: u16,
        /// Message from the error envelope, or the raw body
        message: String,
    },

    /// Response body did not match the expected model
    #[error("{operation} returned an unexpected response: {reason}")]
    Decode {
        /// API operation name
        operation: &'static str,
        /// Reason for the error
        reason: String,
    },

    /// Access token could not be obtained
    #[error("{operation} could not authenticate: {source}")]
    Credentials {
        /// API operation name
        operation: &'static str,
        /// Underlying credential error
        #[source]
        source: CredentialError,
    },
}

/// Edit workflow errors
#[derive(Error, Debug)]
pub enum PublishError {
    /// Edit could not be created; nothing was left behind
    #[error("Failed to create edit: {0}")]
    EditCreation(#[source] ApiError),

    /// A step after edit creation failed and the edit was deleted (or deletion was attempted)
    #[error("Operation failed: {cause}{}", cleanup_suffix(.edit_id, .cleanup.as_ref()))]
    Aborted {
        /// Edit that was abandoned
        edit_id: String,
        /// Primary failure
        cause: ApiError,
        /// Failure of the compensating delete, if any
        cleanup: Option<ApiError>,
    },
}

fn cleanup_suffix(edit_id: &str, cleanup: Option<&ApiError>) -> String {
    match cleanup {
        Some(err) => format!("\nFailed to delete edit {edit_id}: {err}"),
        None => String::new(),
    }
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Cli(_) => vec![
                "Run with --help to list the accepted flags".to_string(),
                "Required: -key <json> -file <apk|aab> -track <name>".to_string(),
            ],
            ReleaseError::Artifact(ArtifactError::UnsupportedFileType { .. }) => vec![
                "Pass an Android package ending in .apk or an app bundle ending in .aab".to_string(),
            ],
            ReleaseError::Artifact(ArtifactError::MissingPackageName { .. }) => vec![
                "App bundles need -packageName <application id>, e.g. com.example.app".to_string(),
            ],
            ReleaseError::Credentials(_)
            | ReleaseError::Api(ApiError::Credentials { .. })
            | ReleaseError::Publish(PublishError::EditCreation(ApiError::Credentials { .. })) => {
                vec![
                    "Verify the -key file is a service account JSON key downloaded from Google Cloud"
                        .to_string(),
                    "Ensure the service account is invited in Play Console with release permissions"
                        .to_string(),
                ]
            }
            ReleaseError::Publish(PublishError::EditCreation(ApiError::Status {
                status: 404,
                ..
            })) => vec![
                "Check the package name; the app must already exist in Play Console".to_string(),
            ],
            ReleaseError::Publish(PublishError::Aborted { cleanup: Some(_), edit_id, .. }) => {
                vec![format!(
                    "Edit {edit_id} may still be open; it expires on its own or is replaced by the next edit"
                )]
            }
            ReleaseError::Publish(PublishError::Aborted { .. }) => vec![
                "The edit was discarded; fix the reported problem and run the tool again".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Exit code reported to the shell for this error
    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }
}
