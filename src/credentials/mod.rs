//! Service account credentials for the Google Play Developer API.
//!
//! A key file is loaded and validated up front; the OAuth2 access token is
//! obtained lazily on the first API call through the JWT bearer grant and
//! cached until shortly before it expires.

use crate::error::CredentialError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

/// OAuth scope granting access to the publishing API
pub const ANDROID_PUBLISHER_SCOPE: &str = "https://www.googleapis.com/auth/androidpublisher";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Service account JSON key as downloaded from Google Cloud
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Credential type, `service_account` for usable keys
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    /// Owning project
    #[serde(default)]
    pub project_id: Option<String>,
    /// Key id, sent as the JWT `kid`
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// PKCS#8 PEM private key
    pub private_key: String,
    /// Service account identity
    pub client_email: String,
    /// OAuth token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Load and parse a key file
    pub fn from_file(path: &Path) -> Result<Self, CredentialError> {
        let content = std::fs::read_to_string(path).map_err(|source| CredentialError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| CredentialError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Claims of the signed assertion exchanged for an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionClaims {
    /// Issuer: the service account email
    pub iss: String,
    /// Space separated scopes
    pub scope: String,
    /// Audience: the token endpoint
    pub aud: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

/// Expiry of a freshly issued token; `expires_in` is clamped to the assertion lifetime
fn token_expiry(now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
    let secs = expires_in
        .unwrap_or(ASSERTION_LIFETIME_SECS)
        .clamp(0, ASSERTION_LIFETIME_SECS);
    now + Duration::seconds(secs)
}

/// Scoped, validated service account credentials with a token cache
pub struct ServiceAccountCredentials {
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    scopes: Vec<String>,
    signing_key: EncodingKey,
    cached: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("key_id", &self.key_id)
            .field("token_uri", &self.token_uri)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountCredentials {
    /// Load a key file and scope it
    pub fn from_file(path: &Path, scopes: &[&str]) -> Result<Self, CredentialError> {
        Self::scoped(ServiceAccountKey::from_file(path)?, scopes)
    }

    /// Validate a parsed key and bind it to the given scopes
    pub fn scoped(key: ServiceAccountKey, scopes: &[&str]) -> Result<Self, CredentialError> {
        if let Some(kind) = key.key_type.as_deref()
            && kind != "service_account"
        {
            return Err(CredentialError::InvalidKey {
                reason: format!("expected a service_account key, found '{kind}'"),
            });
        }
        if key.client_email.trim().is_empty() {
            return Err(CredentialError::InvalidKey {
                reason: "client_email is empty".to_string(),
            });
        }
        if scopes.is_empty() {
            return Err(CredentialError::InvalidKey {
                reason: "at least one scope is required".to_string(),
            });
        }

        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            CredentialError::InvalidKey {
                reason: format!("private_key is not a valid RSA PEM key: {e}"),
            }
        })?;

        Ok(Self {
            client_email: key.client_email,
            key_id: key.private_key_id,
            token_uri: key.token_uri,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            signing_key,
            cached: Mutex::new(None),
        })
    }

    /// Service account identity
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Build the assertion claims for a given instant
    pub fn assertion_claims(&self, now: DateTime<Utc>) -> AssertionClaims {
        let iat = now.timestamp();
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Sign the assertion with the service account key
    pub fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, CredentialError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        jsonwebtoken::encode(&header, &self.assertion_claims(now), &self.signing_key).map_err(
            |e| CredentialError::InvalidKey {
                reason: format!("failed to sign token request: {e}"),
            },
        )
    }

    /// Return a valid access token, exchanging a new assertion when needed
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, CredentialError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        log::debug!("Requesting access token for {}", self.client_email);
        let token = self.exchange(http, now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn exchange(
        &self,
        http: &reqwest::Client,
        now: DateTime<Utc>,
    ) -> Result<AccessToken, CredentialError> {
        let assertion = self.signed_assertion(now)?;

        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| CredentialError::TokenExchange {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CredentialError::TokenExchange {
                reason: format!("failed to read token response: {e}"),
            })?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("HTTP {status}: {body}"),
            };
            return Err(CredentialError::TokenExchange { reason });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| CredentialError::TokenExchange {
                reason: format!("unexpected token response: {e}"),
            })?;

        Ok(AccessToken {
            value: parsed.access_token,
            expires_at: token_expiry(now, parsed.expires_in),
        })
    }
}
