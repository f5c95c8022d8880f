use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct TicketingConfig {
    pub common: core_config::Config,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub mongodb: MongoConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Empty in local development: the service falls back to in-memory
    /// stores. Required in production.
    pub uri: Secret<String>,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    pub enabled: bool,
}

impl TicketingConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(TicketingConfig {
            common,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            mongodb: MongoConfig {
                uri: Secret::new(get_env("MONGODB_URI", Some(""), is_prod)?),
                database: get_env("MONGODB_DATABASE", Some("ticketing_db"), is_prod)?,
            },
            smtp: SmtpConfig {
                host: get_env("SMTP_HOST", Some("smtp.gmail.com"), is_prod)?,
                port: get_env("SMTP_PORT", Some("587"), is_prod)?
                    .parse()
                    .unwrap_or(587),
                user: get_env("SMTP_USER", Some(""), is_prod)?,
                password: Secret::new(get_env("SMTP_PASSWORD", Some(""), is_prod)?),
                from_email: get_env("SMTP_FROM_EMAIL", Some("noreply@example.com"), is_prod)?,
                from_name: get_env("SMTP_FROM_NAME", Some("Ferry Ticketing"), is_prod)?,
                enabled: env::var("SMTP_ENABLED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .unwrap_or(false),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
