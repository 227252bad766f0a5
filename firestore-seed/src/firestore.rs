#![doc = "Cloud Firestore implementation of the core `DocumentStore` trait, over the Firestore REST API."]
//
//! # Firestore client
//!
//! [`FirestoreClient`] writes documents with
//! `PATCH {api}/v1/projects/{project}/databases/{database}/documents/{path}`
//! and no update mask, which replaces the whole document (the `set`
//! semantics the importer relies on).
//!
//! ## Authentication
//! - Service account: an RS256-signed JWT is exchanged at the key's
//!   `token_uri` for an OAuth2 access token. The token is fetched on the
//!   first write and cached until shortly before it expires.
//! - Emulator: when `FIRESTORE_EMULATOR_HOST` is set, requests go to
//!   `http://$FIRESTORE_EMULATOR_HOST` with the emulator's `owner` token.
//!
//! ## Values
//! JSON field values are encoded into Firestore's typed value representation
//! by [`encode_value`].

use async_trait::async_trait;
use firestore_seed_core::contract::{DocumentPath, DocumentStore, Fields, StoreError};
use firestore_seed_core::error::SeedError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::credentials::{load_service_account, ServiceAccountKey};

pub const FIRESTORE_API_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE_ID: &str = "(default)";
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";
pub const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";
const EMULATOR_TOKEN: &str = "owner";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before their reported expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the documents live.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    /// Base URL of the Firestore API (e.g. `https://firestore.googleapis.com`).
    pub api_base_url: String,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: DEFAULT_DATABASE_ID.to_string(),
            api_base_url: FIRESTORE_API_BASE_URL.to_string(),
        }
    }

    /// REST URL of the document at `path`.
    pub fn document_url(&self, path: &DocumentPath) -> String {
        let encoded: Vec<String> = path
            .segments()
            .iter()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{}",
            self.api_base_url.trim_end_matches('/'),
            self.project_id,
            self.database_id,
            encoded.join("/")
        )
    }
}

enum Auth {
    ServiceAccount {
        key: ServiceAccountKey,
        signing_key: EncodingKey,
    },
    Static(String),
}

struct AccessToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

pub struct FirestoreClient {
    config: FirestoreConfig,
    http: Client,
    auth: Auth,
    token: Mutex<Option<AccessToken>>,
}

impl FirestoreClient {
    /// Client authenticating with a service account key.
    pub fn with_service_account(
        config: FirestoreConfig,
        key: ServiceAccountKey,
    ) -> Result<Self, StoreError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| format!("invalid service account private key: {e}"))?;
        Self::build(config, Auth::ServiceAccount { key, signing_key })
    }

    /// Client for a local Firestore emulator at `host` (`host:port`).
    pub fn for_emulator(host: &str, project_id: impl Into<String>) -> Result<Self, StoreError> {
        let mut config = FirestoreConfig::new(project_id);
        config.api_base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}")
        };
        Self::build(config, Auth::Static(EMULATOR_TOKEN.to_string()))
    }

    /// Client chosen from the environment-derived settings: the emulator when
    /// `emulator_host` is set, otherwise the service account key at
    /// `credentials_path`.
    pub fn connect(
        credentials_path: &Path,
        emulator_host: Option<&str>,
        project_id: Option<&str>,
    ) -> Result<Self, SeedError> {
        let invalid = |reason: String| SeedError::MissingCredential {
            path: credentials_path.to_path_buf(),
            reason,
        };

        if let Some(host) = emulator_host {
            let project_id = match project_id {
                Some(id) => id.to_string(),
                None if credentials_path.exists() => load_service_account(credentials_path)?.project_id,
                None => {
                    error!(emulator_host = host, "No project id for the Firestore emulator");
                    return Err(invalid(format!(
                        "{EMULATOR_HOST_ENV} is set but no project id is known; set GCLOUD_PROJECT"
                    )));
                }
            };
            info!(emulator_host = host, project_id = %project_id, "Using Firestore emulator");
            return Self::for_emulator(host, project_id).map_err(|e| invalid(e.to_string()));
        }

        let key = load_service_account(credentials_path)?;
        let mut config = FirestoreConfig::new(key.project_id.clone());
        if let Some(id) = project_id {
            config.project_id = id.to_string();
        }
        info!(project_id = %config.project_id, "Using Cloud Firestore");
        Self::with_service_account(config, key).map_err(|e| invalid(e.to_string()))
    }

    fn build(config: FirestoreConfig, auth: Auth) -> Result<Self, StoreError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            config,
            http,
            auth,
            token: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    /// Bearer token for the next request, fetching a new one if needed.
    async fn access_token(&self) -> Result<String, StoreError> {
        let (key, signing_key) = match &self.auth {
            Auth::Static(token) => return Ok(token.clone()),
            Auth::ServiceAccount { key, signing_key } => (key, signing_key),
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
            return Ok(token.value.clone());
        }

        let token = self.fetch_token(key, signing_key).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch_token(
        &self,
        key: &ServiceAccountKey,
        signing_key: &EncodingKey,
    ) -> Result<AccessToken, StoreError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &key.client_email,
            scope: DATASTORE_SCOPE,
            aud: &key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, signing_key)?;

        debug!(token_uri = %key.token_uri, "Requesting OAuth2 access token");
        let response = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Token exchange failed");
            return Err(format!("token exchange failed with {status}: {body}").into());
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS as u64));
        info!(expires_in = lifetime.as_secs(), "Obtained OAuth2 access token");
        Ok(AccessToken {
            value: token.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn set(&self, path: DocumentPath, payload: Fields) -> Result<(), StoreError> {
        if path.is_root() {
            return Err("cannot write a document at the database root".into());
        }
        let url = self.config.document_url(&path);
        let token = self.access_token().await?;
        let body = json!({ "fields": encode_fields(&payload) });

        debug!(path = %path, url = %url, "PATCH Firestore document");
        let response = self
            .http
            .patch(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(path = %path, %status, body = %body, "Firestore rejected document write");
            return Err(format!("Firestore returned {status} for {path}: {body}").into());
        }
        Ok(())
    }
}

/// Encode a field map as Firestore `fields`.
pub fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect::<Map<String, Value>>(),
    )
}

/// Encode one JSON value as a Firestore typed `Value`.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // int64 travels as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}
