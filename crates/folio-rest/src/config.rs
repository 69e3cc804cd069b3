//! Firebase project configuration.

use std::time::Duration;

use folio_core::{Result, StoreUrl};

/// Hosted Firestore endpoint.
pub const PRODUCTION_URL: &str = "https://firestore.googleapis.com";

/// Emulator address used when `FIRESTORE_EMULATOR_HOST` is unset.
pub const DEFAULT_EMULATOR_HOST: &str = "localhost:8080";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Firebase web-app configuration.
///
/// Every value falls back to a placeholder when its environment variable is
/// unset, so a misconfigured deployment fails at the first request rather
/// than at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

impl FirebaseConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            api_key: get("FIREBASE_API_KEY", "your-api-key"),
            auth_domain: get("FIREBASE_AUTH_DOMAIN", "your-project.firebaseapp.com"),
            project_id: get("FIREBASE_PROJECT_ID", "your-project-id"),
            storage_bucket: get("FIREBASE_STORAGE_BUCKET", "your-project.appspot.com"),
            messaging_sender_id: get("FIREBASE_MESSAGING_SENDER_ID", "123456789"),
            app_id: get("FIREBASE_APP_ID", "1:123456789:web:abcdef123456"),
        }
    }

    /// Returns true if the project id is still the placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.project_id == "your-project-id"
    }
}

/// Connection settings for a [`FirestoreDatabase`](crate::FirestoreDatabase).
#[derive(Debug, Clone)]
pub struct FirestoreOptions {
    pub base_url: StoreUrl,
    pub project_id: String,
    pub database: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    pub poll_interval: Duration,
}

impl FirestoreOptions {
    /// Options for the hosted service.
    pub fn production(config: &FirebaseConfig) -> Result<Self> {
        Ok(Self {
            base_url: StoreUrl::new(PRODUCTION_URL)?,
            project_id: config.project_id.clone(),
            database: "(default)".to_string(),
            api_key: Some(config.api_key.clone()),
            bearer_token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Options for a local emulator at `host` (`host:port`).
    ///
    /// The emulator accepts any credentials, so none are sent.
    pub fn emulator(project_id: impl Into<String>, host: &str) -> Result<Self> {
        Ok(Self {
            base_url: StoreUrl::new(format!("http://{}", host))?,
            project_id: project_id.into(),
            database: "(default)".to_string(),
            api_key: None,
            bearer_token: Some("owner".to_string()),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Options from the process environment.
    ///
    /// `USE_FIRESTORE_EMULATOR=true` selects the emulator at
    /// `FIRESTORE_EMULATOR_HOST` (default `localhost:8080`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = FirebaseConfig::from_lookup(&lookup);

        let use_emulator = lookup("USE_FIRESTORE_EMULATOR")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        if use_emulator {
            let host = lookup("FIRESTORE_EMULATOR_HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EMULATOR_HOST.to_string());
            Self::emulator(config.project_id, &host)
        } else {
            Self::production(&config)
        }
    }

    pub fn with_base_url(mut self, base_url: StoreUrl) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Resource name of the documents root:
    /// `projects/{project}/databases/{database}/documents`.
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    /// Returns true if this points at a local emulator.
    pub fn is_emulator(&self) -> bool {
        self.base_url.scheme() == "http"
    }
}
