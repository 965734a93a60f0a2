use linkmark_utils::version_info::RuntimeEnv;
use serde::Deserialize;
use std::env::vars;
use std::fmt::Display;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub enum Env {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "prod")]
    Prod,
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "pr")]
    Pr,
    #[serde(rename = "nightly")]
    Nightly,
}

impl From<&Env> for RuntimeEnv {
    fn from(env: &Env) -> Self {
        match env {
            Env::Local => RuntimeEnv::Local,
            Env::Prod => RuntimeEnv::Prod,
            Env::Test => RuntimeEnv::Test,
            Env::Pr => RuntimeEnv::Pr,
            Env::Nightly => RuntimeEnv::Nightly,
        }
    }
}

impl Display for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Env::Local => write!(f, "local"),
            Env::Prod => write!(f, "prod"),
            Env::Test => write!(f, "test"),
            Env::Pr => write!(f, "pr"),
            Env::Nightly => write!(f, "nightly"),
        }
    }
}

// The final, validated configuration struct.
// `server_addr` is guaranteed to be a valid string.
#[derive(Debug, Clone)]
pub struct Config {
    env: Env,
    database_url: String,
    server_addr: String,
    port: u16,
    // Secret the identity provider signs bearer tokens with
    jwt_secret: String,
}

// An intermediate struct for deserializing environment variables
// where most fields are optional until validated.
#[derive(Deserialize)]
struct RawConfig {
    env: Env,
    database_url: String,
    server_addr: Option<String>,
    port: Option<u16>,
    jwt_secret: Option<String>,
}

impl Config {
    /// Create a test configuration with default values.
    ///
    /// This function is available for both unit tests and integration tests.
    /// It should not be used in production code.
    pub fn new_for_test() -> Self {
        Self {
            env: Env::Local,
            database_url: "postgres://localhost:5432/test".to_string(),
            server_addr: "127.0.0.1".to_string(),
            port: 8080,
            jwt_secret: "test-jwt-secret-key-for-local-development".to_string(),
        }
    }

    pub fn environment(&self) -> &Env {
        &self.env
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_local(&self) -> bool {
        matches!(self.env, Env::Local)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self.env, Env::Prod)
    }

    /// Get the secret used to verify identity-provider bearer tokens.
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Initializes configuration by reading from environment variables
    /// and applying environment-aware defaults.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading configuration from environment variables");

        // First, deserialize into a temporary struct that allows for optional fields
        let raw_config: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            env,
            database_url,
            server_addr,
            port,
            jwt_secret,
        } = raw_config;

        // Apply the default logic for `server_addr` based on the environment
        let server_addr = match server_addr {
            Some(addr) => {
                info!("Using provided SERVER_ADDR: {}", addr);
                addr
            }
            None => {
                let default_addr = match env {
                    Env::Local => "127.0.0.1",
                    _ => "0.0.0.0",
                };
                info!(
                    "SERVER_ADDR not set, defaulting to {} for {} environment",
                    default_addr, env
                );
                default_addr.to_string()
            }
        };

        let port = match port {
            Some(port) => port,
            None if matches!(env, Env::Local | Env::Test) => {
                info!("PORT not set, defaulting to 8080 for {} environment", env);
                8080
            }
            None => anyhow::bail!("PORT must be set for {} environment", env),
        };

        // JWT secret is required for production, optional for local/test
        let jwt_secret = match jwt_secret {
            Some(secret) => secret,
            None if matches!(env, Env::Local | Env::Test) => {
                info!("JWT_SECRET not set, using default for {} environment", env);
                "default-jwt-secret-for-local-development-only".to_string()
            }
            None => anyhow::bail!("JWT_SECRET must be set for {} environment", env),
        };

        // Construct the final, validated Config struct
        Ok(Config {
            env,
            database_url,
            port,
            server_addr,
            jwt_secret,
        })
    }
}
