use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Which implementation of the remote store the shell talks to.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The hosted PostgREST endpoint at `store_url`.
    Rest,
    /// A local SQLite file at `sqlite_path`.
    #[default]
    Sqlite,
}

/// Configuration of the portal shell, read from `PORTAL_*` environment variables.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Open the shell in the default browser once the server is up.
    #[serde(default = "default_true")]
    pub open_browser: bool,
    #[serde(default)]
    pub store_backend: StoreBackend,
    /// Base URL of the hosted store, e.g. `https://<project>.supabase.co`.
    pub store_url: Option<String>,
    /// API key sent as `apikey` and bearer token to the hosted store.
    pub store_key: Option<String>,
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,
    /// Base URL of the service exposing `/v1/students/{id}/eligibility`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Shared secret of admin logins. Admin login is disabled when unset.
    pub admin_key: Option<String>,
    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: PathBuf,
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,
    #[serde(default = "default_preview_revoke_ms")]
    pub preview_revoke_ms: u64,
    #[serde(default = "default_max_template_bytes")]
    pub max_template_bytes: usize,
    /// Lifetime of a login session.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Externally visible base URL of the shell; derived from host and port when unset.
    pub public_url: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_sqlite_path() -> String {
    "portal.sqlite".to_string()
}

fn default_api_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_fonts_dir() -> PathBuf {
    PathBuf::from("./fonts")
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_preview_revoke_ms() -> u64 {
    10_000
}

fn default_max_template_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_session_ttl_secs() -> u64 {
    8 * 60 * 60
}

impl Config {
    pub const ENV_PREFIX: &'static str = "PORTAL_";

    /// Loads `.env` (when present) and then the process environment.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenv::dotenv().ok();
        envy::prefixed(Self::ENV_PREFIX).from_env::<Config>()
    }

    pub fn public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn preview_revoke_delay(&self) -> Duration {
        Duration::from_millis(self.preview_revoke_ms)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    envy::prefixed(Config::ENV_PREFIX)
        .from_iter(Vec::<(String, String)>::new())
        .expect("defaults deserialize")
}
