use anyhow::anyhow;
use jsonwebtoken::{Algorithm, DecodingKey};
use jwt_auth::util::{parse_jwt_algorithms, parse_jwt_key};
use std::time::Duration;

pub struct ApplicationEnv {
    pub log_directory: String,
    pub log_filename: String,

    pub api_base_url: String,
    pub api_request_timeout: Duration,

    pub refresh_interval: Duration,

    /// Algorithms must belong to the same family
    pub jwt_algorithms: Vec<Algorithm>,
    pub jwt_key: DecodingKey,

    /// Token used to sign in on startup
    pub session_token: Option<String>,
}

impl ApplicationEnv {
    pub fn parse() -> anyhow::Result<Self> {
        let log_directory = Self::env_var("TOM_NOTIFIER_BELL_LOG_DIRECTORY")?;
        let log_filename = Self::env_var("TOM_NOTIFIER_BELL_LOG_FILENAME")?;
        let api_base_url = Self::env_var("TOM_NOTIFIER_BELL_API_BASE_URL")?;
        let api_request_timeout =
            Self::env_var("TOM_NOTIFIER_BELL_API_REQUEST_TIMEOUT")?.parse()?;
        let api_request_timeout = Duration::from_secs(api_request_timeout);
        let refresh_interval = Self::env_var("TOM_NOTIFIER_BELL_REFRESH_INTERVAL")?.parse()?;
        let refresh_interval = Duration::from_secs(refresh_interval);
        if refresh_interval.is_zero() {
            return Err(anyhow!(
                "TOM_NOTIFIER_BELL_REFRESH_INTERVAL must be greater than 0"
            ));
        }
        let jwt_algorithms =
            parse_jwt_algorithms(Self::env_var("TOM_NOTIFIER_BELL_JWT_ALGORITHMS")?)?;
        let jwt_algorithm = jwt_algorithms.first().ok_or(anyhow!(
            "TOM_NOTIFIER_BELL_JWT_ALGORITHMS need to contain at least one algorithm"
        ))?;
        let jwt_key = parse_jwt_key(jwt_algorithm, Self::env_var("TOM_NOTIFIER_BELL_JWT_KEY")?)?;
        let session_token = std::env::var("TOM_NOTIFIER_BELL_SESSION_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        Ok(Self {
            log_directory,
            log_filename,
            api_base_url,
            api_request_timeout,
            refresh_interval,
            jwt_algorithms,
            jwt_key,
            session_token,
        })
    }

    fn env_var(name: &'static str) -> anyhow::Result<String> {
        std::env::var(name).map_err(|_| anyhow!("environment variable {name} not set"))
    }
}
