use std::env;
use std::fmt;
use std::path::PathBuf;

/// Process-wide settings, read once at startup and handed to whoever needs them.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub cors_allowed_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub seed_demo: bool,
}

#[derive(Debug)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if cfg!(debug_assertions) => "secret".to_string(),
            _ => {
                return Err(ConfigError(
                    "JWT_SECRET environment variable must be set in production".to_string(),
                ));
            }
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://bookclub.db?mode=rwc".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            jwt_secret,
            access_token_expire_minutes: env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(30),
            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.into()),
            ),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            seed_demo: env::var("SEED_DEMO").is_ok(),
        })
    }

    /// Settings for tests and embedded use: in-memory database, fixed secret.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            access_token_expire_minutes: 30,
            cors_allowed_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            upload_dir: env::temp_dir().join(format!("bookclub-{}", uuid::Uuid::new_v4())),
            public_base_url: "http://localhost:8000".to_string(),
            seed_demo: false,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_empty_entries_dropped() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
