use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    // Billing backend settings
    pub billing_api_url: String,
    pub billing_api_timeout_secs: u64,
    // Stripe payment settings
    pub stripe_secret_key: String,
    // Plan catalog JSON file; the built-in catalog is used when unset
    pub plan_catalog_path: Option<String>,
    // How long a successful checkout stays open before closing itself
    pub success_delay_ms: u64,
    // Per-IP rate limit
    pub rate_limit_seconds_per_request: u64,
    pub rate_limit_burst: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

fn parse_u64(var: &str, default: u64) -> Result<u64, ConfigError> {
    Ok(env::var(var)
        .ok()
        .map(|v| {
            v.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                var: var.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()?
        .unwrap_or(default))
}

fn require_non_zero(var: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            var: var.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Skip loading .env in test mode to allow tests to control env vars
        if env::var("CHECKOUT_TEST_MODE").is_err() {
            dotenvy::dotenv().ok();
        }

        // Required variables
        let billing_api_url = env::var("BILLING_API_URL")
            .map_err(|_| ConfigError::MissingVar("BILLING_API_URL".to_string()))?;

        if !billing_api_url.starts_with("http://") && !billing_api_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "BILLING_API_URL".to_string(),
                message: "must start with http:// or https://".to_string(),
            });
        }

        let stripe_secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|_| ConfigError::MissingVar("STRIPE_SECRET_KEY".to_string()))?;

        // Optional variables with defaults
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .ok()
            .map(|v| {
                v.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                    var: "PORT".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?
            .unwrap_or(8080);

        let billing_api_timeout_secs = parse_u64("BILLING_API_TIMEOUT_SECS", 15)?;
        let success_delay_ms = parse_u64("CHECKOUT_SUCCESS_DELAY_MS", 3000)?;

        let plan_catalog_path = env::var("PLAN_CATALOG_PATH").ok();

        let rate_limit_seconds_per_request = parse_u64("RATE_LIMIT_SECONDS_PER_REQUEST", 1)?;

        let rate_limit_burst = env::var("RATE_LIMIT_BURST")
            .ok()
            .map(|v| {
                v.parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                    var: "RATE_LIMIT_BURST".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?
            .unwrap_or(30);

        require_non_zero(
            "RATE_LIMIT_SECONDS_PER_REQUEST",
            rate_limit_seconds_per_request,
        )?;
        require_non_zero("RATE_LIMIT_BURST", u64::from(rate_limit_burst))?;

        Ok(Config {
            host,
            port,
            billing_api_url,
            billing_api_timeout_secs,
            stripe_secret_key,
            plan_catalog_path,
            success_delay_ms,
            rate_limit_seconds_per_request,
            rate_limit_burst,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn billing_api_timeout(&self) -> Duration {
        Duration::from_secs(self.billing_api_timeout_secs)
    }

    pub fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_delay_ms)
    }
}
