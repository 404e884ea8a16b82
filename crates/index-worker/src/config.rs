//! Worker configuration from environment variables and AWS Secrets Manager

use std::env;
use std::str::FromStr;

use aws_sdk_secretsmanager::Client as SecretsClient;
use tracing::info;

use crate::error::WorkerError;
use crate::source::chess_com::DEFAULT_USER_AGENT;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Database connection URL (fetched from Secrets Manager in prod)
    pub database_url: String,

    pub sqs_queue_url: String,

    /// Custom SQS endpoint URL (for LocalStack)
    pub sqs_endpoint_url: Option<String>,

    pub visibility_timeout_secs: u32,

    /// Jobs processed at once
    pub concurrency: usize,

    pub db_max_connections: u32,

    /// Consecutive empty receives before exiting; 0 polls forever
    pub max_empty_receives: u32,

    pub user_agent: String,

    pub retention_days: i64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    /// Outside LOCAL_DEV the database URL comes from Secrets Manager.
    pub async fn load() -> Result<Self, WorkerError> {
        let sqs_queue_url =
            env::var("SQS_QUEUE_URL").map_err(|_| WorkerError::Config("SQS_QUEUE_URL not set"))?;

        Ok(Self {
            database_url: database_url().await?,
            sqs_queue_url,
            sqs_endpoint_url: env::var("SQS_ENDPOINT_URL").ok(),
            visibility_timeout_secs: env_or("SQS_VISIBILITY_TIMEOUT", 900),
            concurrency: env_or("WORKER_CONCURRENCY", num_cpus::get()).max(1),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            max_empty_receives: env_or("MAX_EMPTY_RECEIVES", 0),
            user_agent: env::var("CHESS_COM_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            retention_days: retention_days(),
        })
    }
}

/// Days games and fetched periods are kept. `RETENTION_DAYS`, default 7.
pub fn retention_days() -> i64 {
    env_or("RETENTION_DAYS", 7).max(1)
}

/// DATABASE_URL directly under LOCAL_DEV, otherwise the secret named by DB_SECRET_ARN.
pub async fn database_url() -> Result<String, WorkerError> {
    if env::var("LOCAL_DEV").is_ok() {
        info!("Local dev mode: using DATABASE_URL from environment");
        return env::var("DATABASE_URL")
            .map_err(|_| WorkerError::Config("DATABASE_URL not set (LOCAL_DEV mode)"));
    }

    let secret_arn =
        env::var("DB_SECRET_ARN").map_err(|_| WorkerError::Config("DB_SECRET_ARN not set"))?;

    info!(secret_arn = %secret_arn, "Fetching database URL from Secrets Manager");
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let client = SecretsClient::new(&aws_config);

    let response = client
        .get_secret_value()
        .secret_id(&secret_arn)
        .send()
        .await
        .map_err(|e| WorkerError::SecretsManager(e.to_string()))?;

    let secret = response
        .secret_string()
        .ok_or_else(|| WorkerError::SecretsManager("Secret has no string value".into()))?;

    database_url_from_secret(secret)
}

/// A secret is either a plain connection string or JSON with either a `url`
/// field or the RDS-style connection parts.
fn database_url_from_secret(secret: &str) -> Result<String, WorkerError> {
    if secret.starts_with("postgresql://") || secret.starts_with("postgres://") {
        return Ok(secret.to_string());
    }

    let json: serde_json::Value = serde_json::from_str(secret)
        .map_err(|e| WorkerError::SecretsManager(format!("Failed to parse secret JSON: {e}")))?;

    if let Some(url) = json.get("url").or(json.get("DATABASE_URL")) {
        return url
            .as_str()
            .map(String::from)
            .ok_or_else(|| WorkerError::SecretsManager("Database URL is not a string".into()));
    }

    let field = |name: &str| {
        json.get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| WorkerError::SecretsManager(format!("Missing '{name}' in secret")))
    };
    let host = field("host")?;
    let username = field("username")?;
    let password = field("password")?;
    let database = field("dbname").or_else(|_| field("database"))?;
    let port = json.get("port").and_then(|v| v.as_u64()).unwrap_or(5432);

    Ok(format!("postgresql://{username}:{password}@{host}:{port}/{database}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_url_secret() {
        let url = database_url_from_secret("postgres://u:p@db:5432/motifs").unwrap();
        assert_eq!(url, "postgres://u:p@db:5432/motifs");
    }

    #[test]
    fn test_json_url_secret() {
        let url = database_url_from_secret(r#"{"DATABASE_URL":"postgresql://x/y"}"#).unwrap();
        assert_eq!(url, "postgresql://x/y");
    }

    #[test]
    fn test_rds_style_secret() {
        let secret = r#"{"host":"db.internal","username":"idx","password":"pw","database":"motifs"}"#;
        let url = database_url_from_secret(secret).unwrap();
        assert_eq!(url, "postgresql://idx:pw@db.internal:5432/motifs");
    }

    #[test]
    fn test_incomplete_secret() {
        let err = database_url_from_secret(r#"{"host":"db"}"#).unwrap_err();
        assert!(err.to_string().contains("username"));
    }
}
