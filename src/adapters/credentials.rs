use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::adapters::warehouse::WarehouseError;

pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECONDS: i64 = 3600;
const EXPIRY_MARGIN_SECONDS: i64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, WarehouseError> {
        let credentials_error = |reason: String| WarehouseError::Credentials {
            path: path.display().to_string(),
            reason,
        };

        let raw =
            std::fs::read_to_string(path).map_err(|error| credentials_error(error.to_string()))?;
        let key: Self =
            serde_json::from_str(&raw).map_err(|error| credentials_error(error.to_string()))?;

        if key.key_type != "service_account" {
            return Err(credentials_error(format!(
                "unsupported credential type {:?}",
                key.key_type
            )));
        }

        Ok(key)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// OAuth2 JWT-bearer flow for a service account, with an in-memory token cache.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    http: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey, http: Client) -> Self {
        Self {
            key,
            http,
            cached: Mutex::new(None),
        }
    }

    pub fn access_token(&self) -> Result<String, WarehouseError> {
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| WarehouseError::Auth("token cache lock poisoned".to_string()))?;

        if let Some(token) = cached.as_ref()
            && token.expires_at > Utc::now()
        {
            return Ok(token.token.clone());
        }

        let fresh = self.exchange_assertion()?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    fn signed_assertion(&self, issued_at: DateTime<Utc>) -> Result<String, WarehouseError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: BIGQUERY_SCOPE,
            aud: &self.key.token_uri,
            iat: issued_at.timestamp(),
            exp: issued_at.timestamp() + ASSERTION_LIFETIME_SECONDS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|error| WarehouseError::Auth(format!("invalid private key: {error}")))?;

        encode(&header, &claims, &encoding_key)
            .map_err(|error| WarehouseError::Auth(format!("failed to sign assertion: {error}")))
    }

    fn exchange_assertion(&self) -> Result<CachedToken, WarehouseError> {
        let issued_at = Utc::now();
        let assertion = self.signed_assertion(issued_at)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(WarehouseError::Auth(format!(
                "token request failed with status {}: {body}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response.json()?;
        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECONDS);

        tracing::debug!(
            client_email = %self.key.client_email,
            expires_in = lifetime,
            "access token obtained"
        );

        Ok(CachedToken {
            token: token.access_token,
            expires_at: issued_at + Duration::seconds(lifetime - EXPIRY_MARGIN_SECONDS),
        })
    }
}
