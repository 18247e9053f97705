use crate::auth::session::DEFAULT_SESSION_DAYS;
use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::{env, fs};

#[derive(Deserialize)]
pub struct SSLConfig {
    pub private_key_file: PathBuf,
    pub certificate_chain_file: PathBuf,
}

/// OTLP trace export.
#[derive(Deserialize, Clone, Debug)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
}

/// What appears in the header of exported reports.
#[derive(Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct ReportConfig {
    #[serde(default = "default_company_name")]
    pub company_name: String,
    pub logo_url: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            company_name: default_company_name(),
            logo_url: None,
        }
    }
}

#[derive(Deserialize)]
pub struct Config {
    pub database_url: String,
    pub signups_enabled: bool,
    #[serde(default = "default_true")]
    pub seed_default_categories: bool,
    /// Root directory of the receipt store. Defaults to the state directory.
    pub receipts_dir: Option<PathBuf>,
    /// Origins allowed to call the API from a browser. CORS is off when empty.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default)]
    pub report: ReportConfig,
    /// Days a login stays valid.
    #[serde(default = "default_session_days")]
    pub session_days: i64,
    pub telemetry: Option<TelemetryConfig>,
    pub ssl: Option<SSLConfig>,
}

fn default_true() -> bool {
    true
}

fn default_session_days() -> i64 {
    DEFAULT_SESSION_DAYS
}

fn default_company_name() -> String {
    "SYU Business Co.".to_owned()
}

fn default_telemetry_endpoint() -> String {
    "https://api.honeycomb.io".to_owned()
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(path).context("Unable to read config file")?;
        Config::parse(&config)
    }

    pub fn parse(config: &str) -> Result<Config, anyhow::Error> {
        let config: Config = toml::from_str(config).with_context(|| "Unable to parse config")?;
        Ok(config)
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        let signups_enabled = read_env("SIGNUPS_ENABLED")?;
        let signups_enabled = signups_enabled
            .parse()
            .context("Unable to parse SIGNUPS_ENABLED value")?;
        let database_url = read_env("DATABASE_URL")?;
        let seed_default_categories = match env::var("SEED_DEFAULT_CATEGORIES") {
            Ok(value) => value
                .parse()
                .context("Unable to parse SEED_DEFAULT_CATEGORIES value")?,
            Err(_) => true,
        };
        let receipts_dir = env::var("RECEIPTS_DIR").ok().map(PathBuf::from);
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        let report = ReportConfig {
            company_name: env::var("COMPANY_NAME").unwrap_or_else(|_| default_company_name()),
            logo_url: env::var("COMPANY_LOGO_URL").ok(),
        };
        let session_days = match env::var("SESSION_DAYS") {
            Ok(value) => value.parse().context("Unable to parse SESSION_DAYS value")?,
            Err(_) => DEFAULT_SESSION_DAYS,
        };
        let telemetry = env::var("OTLP_ENDPOINT").ok().map(|endpoint| TelemetryConfig {
            endpoint,
            api_key: env::var("OTLP_API_KEY").ok(),
        });

        let config = Config {
            database_url,
            signups_enabled,
            seed_default_categories,
            receipts_dir,
            cors_allowed_origins,
            report,
            session_days,
            telemetry,
            ssl: None,
        };
        Ok(config)
    }
}

fn read_env(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).with_context(|| format!("Unable to read env var: {}", key))
}
