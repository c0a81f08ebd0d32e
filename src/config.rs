//! Application configuration loaded from environment variables.
//!
//! Google endpoint URLs default to the production endpoints and can be
//! overridden to point at a local fake.

use std::env;

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_OPENID_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
pub const DEFAULT_OAUTH2_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Frontend URL (allowed CORS origin)
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Keep accounts in process memory instead of Firestore
    pub use_memory_store: bool,

    // --- Google endpoints ---
    pub google_token_url: String,
    pub google_calendar_api_url: String,
    pub google_openid_userinfo_url: String,
    pub google_oauth2_userinfo_url: String,

    // --- Secrets ---
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Signing key for session JWTs (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            use_memory_store: env::var("ACCOUNT_STORE")
                .map(|v| v.eq_ignore_ascii_case("memory"))
                .unwrap_or(false),

            google_token_url: env_or("GOOGLE_TOKEN_URL", DEFAULT_TOKEN_URL),
            google_calendar_api_url: env_or("GOOGLE_CALENDAR_API_URL", DEFAULT_CALENDAR_API_URL),
            google_openid_userinfo_url: env_or(
                "GOOGLE_OPENID_USERINFO_URL",
                DEFAULT_OPENID_USERINFO_URL,
            ),
            google_oauth2_userinfo_url: env_or(
                "GOOGLE_OAUTH2_USERINFO_URL",
                DEFAULT_OAUTH2_USERINFO_URL,
            ),

            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?,
            session_signing_key: env::var("SESSION_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Config for tests; Google endpoints point at production until overridden.
    pub fn test_default() -> Self {
        Self {
            google_client_id: "test_client_id".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            use_memory_store: true,
            google_token_url: DEFAULT_TOKEN_URL.to_string(),
            google_calendar_api_url: DEFAULT_CALENDAR_API_URL.to_string(),
            google_openid_userinfo_url: DEFAULT_OPENID_USERINFO_URL.to_string(),
            google_oauth2_userinfo_url: DEFAULT_OAUTH2_USERINFO_URL.to_string(),
            google_client_secret: "test_secret".to_string(),
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
        }
    }

    /// Point every Google endpoint at `base` (a fake server in tests).
    pub fn with_google_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.google_token_url = format!("{}/token", base);
        self.google_calendar_api_url = format!("{}/calendar/v3", base);
        self.google_openid_userinfo_url = format!("{}/v1/userinfo", base);
        self.google_oauth2_userinfo_url = format!("{}/oauth2/v2/userinfo", base);
        self
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
