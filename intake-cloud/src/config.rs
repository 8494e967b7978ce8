//! Portal server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which persistence backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// PostgreSQL tables + S3 object storage
    Postgres,
    /// In-process tables and object store (local development)
    Memory,
}

/// Portal server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// Persistence backend (env: BACKEND = postgres | memory)
    pub backend: BackendKind,
    /// PostgreSQL connection URL (required for the postgres backend)
    pub database_url: Option<String>,
    /// JWT secret for session tokens
    pub jwt_secret: String,
    /// S3 bucket holding the `profile-pictures` and `source-code` prefixes
    pub storage_s3_bucket: String,
    /// Base URL that stored keys are resolved against
    pub storage_public_base_url: String,
    /// Email provider API key (env: BREVO_API_KEY); sends fail without it
    pub email_api_key: Option<String>,
    /// Email provider endpoint
    pub email_api_url: String,
    /// Sender address
    pub sender_email: String,
    /// Sender display name
    pub sender_name: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_backend(raw: &str) -> Result<BackendKind, BoxError> {
        match raw {
            "postgres" => Ok(BackendKind::Postgres),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("BACKEND must be postgres or memory, got {other}").into()),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let backend =
            Self::parse_backend(&std::env::var("BACKEND").unwrap_or_else(|_| "postgres".into()))?;

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if backend == BackendKind::Postgres && database_url.is_none() {
            return Err("DATABASE_URL must be set for the postgres backend".into());
        }

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            backend,
            database_url,
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            storage_s3_bucket: std::env::var("STORAGE_S3_BUCKET")
                .unwrap_or_else(|_| "intake-portal".into()),
            storage_public_base_url: std::env::var("STORAGE_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/storage".into()),
            email_api_key: std::env::var("BREVO_API_KEY").ok().filter(|s| !s.is_empty()),
            email_api_url: std::env::var("EMAIL_API_URL")
                .unwrap_or_else(|_| "https://api.brevo.com/v3/smtp/email".into()),
            sender_email: std::env::var("SENDER_EMAIL")
                .unwrap_or_else(|_| "noreply@intake.local".into()),
            sender_name: std::env::var("SENDER_NAME").unwrap_or_else(|_| "Intake Portal".into()),
            environment,
        })
    }

    /// In-memory configuration used by tests and local tooling
    pub fn for_memory(jwt_secret: &str) -> Self {
        Self {
            environment: "development".into(),
            http_port: 0,
            backend: BackendKind::Memory,
            database_url: None,
            jwt_secret: jwt_secret.to_string(),
            storage_s3_bucket: "intake-portal".into(),
            storage_public_base_url: "http://localhost:8080/storage".into(),
            email_api_key: None,
            email_api_url: "https://api.brevo.com/v3/smtp/email".into(),
            sender_email: "noreply@intake.local".into(),
            sender_name: "Intake Portal".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parsing() {
        assert_eq!(
            Config::parse_backend("postgres").unwrap(),
            BackendKind::Postgres
        );
        assert_eq!(Config::parse_backend("memory").unwrap(), BackendKind::Memory);
        assert!(Config::parse_backend("sqlite").is_err());
    }

    #[test]
    fn memory_config_has_no_database() {
        let config = Config::for_memory("secret");
        assert_eq!(config.backend, BackendKind::Memory);
        assert!(config.database_url.is_none());
        assert!(config.email_api_key.is_none());
    }
}
