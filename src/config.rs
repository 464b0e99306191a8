//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; the OAuth client settings are
//! static for the life of the process.

use std::env;
use std::str::FromStr;

const DEFAULT_AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";
const DEFAULT_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const DEFAULT_PROFILE_URL: &str = "https://discord.com/api/users/@me";

/// Which persistent store backs users and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process store, for local development only.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

/// Identity provider endpoints. Overridable so tests and staging can
/// point at a different provider host.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub profile_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            profile_url: DEFAULT_PROFILE_URL.to_string(),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    /// Discord OAuth client ID (public)
    pub discord_client_id: String,
    /// Discord OAuth client secret
    pub discord_client_secret: String,
    /// Callback URL registered with Discord
    pub discord_redirect_uri: String,
    /// Requested OAuth scopes
    pub discord_scope: String,
    pub discord_endpoints: ProviderEndpoints,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    pub store_backend: StoreBackend,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_client_id", &self.discord_client_id)
            .field("discord_client_secret", &"[REDACTED]")
            .field("discord_redirect_uri", &self.discord_redirect_uri)
            .field("discord_scope", &self.discord_scope)
            .field("discord_endpoints", &self.discord_endpoints)
            .field("frontend_url", &self.frontend_url)
            .field("store_backend", &self.store_backend)
            .field("gcp_project_id", &self.gcp_project_id)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = ProviderEndpoints::default();

        Ok(Self {
            discord_client_id: required("DISCORD_CLIENT_ID")?,
            discord_client_secret: required("DISCORD_CLIENT_SECRET")?,
            discord_redirect_uri: required("DISCORD_REDIRECT_URI")?,
            discord_scope: env::var("DISCORD_SCOPE").unwrap_or_else(|_| "identify".to_string()),
            discord_endpoints: ProviderEndpoints {
                authorize_url: env::var("DISCORD_AUTHORIZE_URL")
                    .unwrap_or(defaults.authorize_url),
                token_url: env::var("DISCORD_TOKEN_URL").unwrap_or(defaults.token_url),
                profile_url: env::var("DISCORD_PROFILE_URL").unwrap_or(defaults.profile_url),
            },
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            store_backend: env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "firestore".to_string())
                .parse()?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .unwrap_or(5001),
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            discord_client_id: "test_client_id".to_string(),
            discord_client_secret: "test_secret".to_string(),
            discord_redirect_uri: "http://localhost:5001/callback".to_string(),
            discord_scope: "identify".to_string(),
            discord_endpoints: ProviderEndpoints::default(),
            frontend_url: "http://localhost:5173".to_string(),
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            port: 5001,
        }
    }
}

/// Read a required variable, trimming stray whitespace from secret bindings.
fn required(name: &'static str) -> Result<String, ConfigError> {
    let value = env::var(name).map_err(|_| ConfigError::Missing(name))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Missing(name));
    }
    Ok(value.to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Single test touches the process environment to avoid races.
        env::set_var("DISCORD_CLIENT_ID", "test_id");
        env::set_var("DISCORD_CLIENT_SECRET", " test_secret\n");
        env::set_var("DISCORD_REDIRECT_URI", "http://localhost:5001/callback");
        env::set_var("STORE_BACKEND", "memory");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.discord_client_id, "test_id");
        assert_eq!(config.discord_client_secret, "test_secret");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 5001);

        env::set_var("STORE_BACKEND", "postgres");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                ..
            })
        ));

        env::remove_var("DISCORD_CLIENT_ID");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("DISCORD_CLIENT_ID"))
        ));
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("Firestore".parse::<StoreBackend>().unwrap(), StoreBackend::Firestore);
        assert_eq!(" memory ".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", Config::test_default());
        assert!(!rendered.contains("test_secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
