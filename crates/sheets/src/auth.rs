use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::SheetsError;

const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const TOKEN_LIFETIME_SECS: u64 = 3600;
// Refresh a little early so in-flight requests never carry a dying token.
const REFRESH_MARGIN_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Service-account access tokens for the Sheets API: sign a short-lived JWT
/// with the account's RSA key, trade it for a bearer token, cache until near
/// expiry.
pub struct ServiceAccountAuth {
    client_email: String,
    encoding_key: EncodingKey,
    token_uri: String,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn from_key_file(path: &Path) -> Result<Self, SheetsError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SheetsError::Auth(format!("cannot read {}: {e}", path.display())))?;
        Self::from_key_json(&raw)
    }

    pub fn from_key_json(raw: &str) -> Result<Self, SheetsError> {
        let key: ServiceAccountKey = serde_json::from_str(raw)
            .map_err(|e| SheetsError::Auth(format!("invalid service account JSON: {e}")))?;
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetsError::Auth(format!("invalid private key: {e}")))?;
        Ok(ServiceAccountAuth {
            client_email: key.client_email,
            encoding_key,
            token_uri: key.token_uri.unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            cache: Mutex::new(None),
        })
    }

    fn signed_assertion(&self) -> Result<String, SheetsError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS as i64,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| SheetsError::Auth(format!("JWT signing failed: {e}")))
    }

    /// A bearer token that is valid for at least `REFRESH_MARGIN_SECS`.
    pub async fn access_token(&self, http: &Client) -> Result<String, SheetsError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at > Instant::now() + Duration::from_secs(REFRESH_MARGIN_SECS) {
                return Ok(cached.token.clone());
            }
        }

        let assertion = self.signed_assertion()?;
        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let token: TokenResponse = response.json().await?;
        tracing::debug!("refreshed sheets access token");

        let cached = CachedToken {
            token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        };
        *cache = Some(cached);
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_key_json() {
        let err = ServiceAccountAuth::from_key_json("{not json")
            .err()
            .expect("malformed json must not produce a signer");
        assert!(matches!(err, SheetsError::Auth(_)));
    }

    #[test]
    fn rejects_bad_private_key() {
        let raw = r#"{"client_email": "bot@example.iam.gserviceaccount.com", "private_key": "not a pem"}"#;
        let err = ServiceAccountAuth::from_key_json(raw)
            .err()
            .expect("a bad PEM must not produce a signer");
        assert!(matches!(err, SheetsError::Auth(_)));
    }
}
