//! Request and response bodies of the `androidpublisher` v3 edits API.

use serde::{Deserialize, Serialize};

/// Language tag attached to release notes
pub const RELEASE_NOTES_LANGUAGE: &str = "en-US";

/// Release name used for every automated release
pub const AUTOMATED_RELEASE_NAME: &str = "Automated publish";

/// Status of a release rolled out to the whole track
pub const RELEASE_STATUS_COMPLETED: &str = "completed";

/// `AppEdit` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEdit {
    /// Edit id
    pub id: String,
    /// Seconds since epoch at which the edit expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time_seconds: Option<String>,
}

/// Digest block of an uploaded APK
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BinaryDigest {
    /// Hex SHA-1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    /// Hex SHA-256
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// `Apk` resource returned from an APK upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Apk {
    /// Version code of the uploaded package
    pub version_code: i64,
    /// Digests computed by the backend
    #[serde(default)]
    pub binary: BinaryDigest,
}

/// `Bundle` resource returned from an AAB upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Version code of the uploaded bundle
    pub version_code: i64,
    /// Hex SHA-1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    /// Hex SHA-256
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// What the workflow needs to know about an uploaded binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedArtifact {
    /// Version code assigned to the binary
    pub version_code: i64,
    /// Hex SHA-256 reported by the backend
    pub sha256: Option<String>,
}

impl From<Apk> for UploadedArtifact {
    fn from(apk: Apk) -> Self {
        Self {
            version_code: apk.version_code,
            sha256: apk.binary.sha256,
        }
    }
}

impl From<Bundle> for UploadedArtifact {
    fn from(bundle: Bundle) -> Self {
        Self {
            version_code: bundle.version_code,
            sha256: bundle.sha256,
        }
    }
}

/// `LocalizedText` release note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// BCP-47 language tag
    pub language: String,
    /// Note text
    pub text: String,
}

impl LocalizedText {
    /// Note in the default release notes language
    pub fn en_us(text: impl Into<String>) -> Self {
        Self {
            language: RELEASE_NOTES_LANGUAGE.to_string(),
            text: text.into(),
        }
    }
}

/// `TrackRelease` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRelease {
    /// Release name shown in Play Console
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Rollout status
    pub status: String,
    /// Version codes, int64 encoded as decimal strings
    #[serde(default)]
    pub version_codes: Vec<String>,
    /// Localized notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub release_notes: Vec<LocalizedText>,
}

impl TrackRelease {
    /// A fully rolled out release of a single version
    pub fn completed(version_code: i64, release_notes: Vec<LocalizedText>) -> Self {
        Self {
            name: Some(AUTOMATED_RELEASE_NAME.to_string()),
            status: RELEASE_STATUS_COMPLETED.to_string(),
            version_codes: vec![version_code.to_string()],
            release_notes,
        }
    }
}

/// `Track` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track name
    pub track: String,
    /// Releases on the track
    #[serde(default)]
    pub releases: Vec<TrackRelease>,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub(crate) error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_serializes_version_codes_as_strings() {
        let track = Track {
            track: "internal".to_string(),
            releases: vec![TrackRelease::completed(
                1042,
                vec![LocalizedText::en_us("fix bug")],
            )],
        };

        let json = serde_json::to_value(&track).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!({
                "track": "internal",
                "releases": [{
                    "name": "Automated publish",
                    "status": "completed",
                    "versionCodes": ["1042"],
                    "releaseNotes": [{"language": "en-US", "text": "fix bug"}]
                }]
            })
        );
    }

    #[test]
    fn empty_notes_are_omitted() {
        let release = TrackRelease::completed(7, Vec::new());
        let json = serde_json::to_value(&release).expect("serializes");
        assert!(json.get("releaseNotes").is_none());
    }

    #[test]
    fn upload_responses_decode() {
        let apk: Apk = serde_json::from_str(
            r#"{"versionCode": 12, "binary": {"sha1": "aa", "sha256": "bb"}}"#,
        )
        .expect("apk");
        assert_eq!(
            UploadedArtifact::from(apk),
            UploadedArtifact {
                version_code: 12,
                sha256: Some("bb".to_string())
            }
        );

        let bundle: Bundle =
            serde_json::from_str(r#"{"versionCode": 13, "sha256": "cc"}"#).expect("bundle");
        assert_eq!(UploadedArtifact::from(bundle).version_code, 13);

        let edit: AppEdit =
            serde_json::from_str(r#"{"id": "E1", "expiryTimeSeconds": "1700000000"}"#)
                .expect("edit");
        assert_eq!(edit.id, "E1");
    }
}
