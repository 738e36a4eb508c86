use std::fmt;
use std::str::FromStr;

use axum::http::HeaderValue;
use corner_core::class_mode::DemoPolicy;

/// Error raised while reading configuration. The server refuses to start.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Connection details for the Supabase project.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Service-role key used for PostgREST and as the identity `apikey`.
    pub service_key: String,
    /// JWT secret for local access-token verification. Remote verification
    /// through the identity service is used when unset.
    pub jwt_secret: Option<String>,
    /// Direct Postgres connection. PostgREST is used when unset.
    pub database_url: Option<String>,
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `10000`).
    pub port: u16,
    /// Allowed CORS origins. `["*"]` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Timeout for calls to the store and identity service (default: `10`).
    pub upstream_timeout_secs: u64,
    pub supabase: SupabaseConfig,
    pub demo: DemoPolicy,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                     | Required | Default   |
    /// |-----------------------------|----------|-----------|
    /// | `SUPABASE_URL`              | **yes**  | --        |
    /// | `SUPABASE_SERVICE_ROLE_KEY` | **yes**  | `SUPABASE_KEY` |
    /// | `SUPABASE_JWT_SECRET`       | no       | --        |
    /// | `DATABASE_URL`              | no       | --        |
    /// | `HOST`                      | no       | `0.0.0.0` |
    /// | `PORT`                      | no       | `10000`   |
    /// | `CORS_ORIGINS`              | no       | `*`       |
    /// | `REQUEST_TIMEOUT_SECS`      | no       | `30`      |
    /// | `UPSTREAM_TIMEOUT_SECS`     | no       | `10`      |
    /// | `DEMO_MODE_ENABLED`         | no       | `false`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let url = var("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "SUPABASE_URL",
                expected: "http(s) URL",
                value: url,
            });
        }

        let service_key = var("SUPABASE_SERVICE_ROLE_KEY")
            .or_else(|| var("SUPABASE_KEY"))
            .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;

        let supabase = SupabaseConfig {
            url,
            service_key,
            jwt_secret: var("SUPABASE_JWT_SECRET"),
            database_url: var("DATABASE_URL"),
        };

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or("PORT", var("PORT"), 10000u16, "u16")?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in cors_origins.iter().filter(|o| o.as_str() != "*") {
            if HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    name: "CORS_ORIGINS",
                    expected: "origin",
                    value: origin.clone(),
                });
            }
        }

        let request_timeout_secs =
            parse_or("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS"), 30u64, "u64")?;
        let upstream_timeout_secs =
            parse_or("UPSTREAM_TIMEOUT_SECS", var("UPSTREAM_TIMEOUT_SECS"), 10u64, "u64")?;
        let demo_enabled = parse_or("DEMO_MODE_ENABLED", var("DEMO_MODE_ENABLED"), false, "bool")?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upstream_timeout_secs,
            supabase,
            demo: DemoPolicy::new(demo_enabled),
        })
    }

    /// Whether any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<T: FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}
