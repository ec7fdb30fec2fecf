use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub password: PasswordConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string, or `memory` for the in-process store
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: i64,
    #[serde(default = "default_email_verification_expire_hours")]
    pub email_verification_expire_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistrationConfig {
    pub allowed_email_suffix: String,
    pub baseline_permissions: Vec<String>,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            allowed_email_suffix: "@troy.edu".to_string(),
            baseline_permissions: vec!["document:read".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    /// Outbound email is disabled when no key is configured
    pub resend_api_key: Option<String>,
    pub resend_endpoint: String,
    pub from_email: String,
    pub from_name: String,
    /// Public base URL used to build verification links
    pub server_host: String,
    pub project_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: None,
            resend_endpoint: "https://api.resend.com/emails".to_string(),
            from_email: "noreply@troy.edu".to_string(),
            from_name: "Accounts".to_string(),
            server_host: "http://localhost:8000".to_string(),
            project_name: "Accounts".to_string(),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub accounts: Vec<SeedAccountConfig>,
}

/// Account created verified at startup when absent.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedAccountConfig {
    pub email: String,
    pub password: String,
    pub name: String,
    pub id_troy: String,
    pub role: String,
}

fn default_access_token_expire_minutes() -> i64 {
    60 * 24 * 8
}

fn default_email_verification_expire_hours() -> i64 {
    48
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        Self::from_sources(&run_mode, environment())
    }

    fn from_sources(run_mode: &str, environment: Environment) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment)
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

/// Unprefixed variables with `__` between path segments.
///
/// `EMAIL__RESEND_API_KEY=re_...` overrides `email.resend_api_key`. A prefix
/// must not be set: `with_prefix("")` only matches names starting with `__`.
fn environment() -> Environment {
    Environment::default().separator("__")
}
