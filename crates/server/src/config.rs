use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Without a queue URL, index requests are stored but never processed.
    pub sqs_queue_url: Option<String>,
    pub sqs_endpoint_url: Option<String>,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            sqs_queue_url: env::var("SQS_QUEUE_URL").ok().filter(|v| !v.is_empty()),
            sqs_endpoint_url: env::var("SQS_ENDPOINT_URL").ok().filter(|v| !v.is_empty()),
            cors_origins: parse_origins(&env::var("CORS_ORIGINS").unwrap_or_default()),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(String::from)
        .collect()
}
