use std::{env, net::SocketAddr, time::Duration};

use url::Url;

use crate::error::AppError;

/// Where trips, activities and budgets are persisted.
#[derive(Debug, Clone)]
pub enum GatewayBackend {
    Sqlite,
    Hasura {
        endpoint: Url,
        admin_secret: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub backend: GatewayBackend,
    pub gateway_timeout: Duration,
    pub default_currency: String,
    pub google_maps_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://travelplanner.db".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let backend = match env::var("GATEWAY_BACKEND")
            .unwrap_or_else(|_| "sqlite".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "sqlite" => GatewayBackend::Sqlite,
            "hasura" => {
                let raw = env::var("HASURA_ENDPOINT").map_err(|_| {
                    AppError::Config("HASURA_ENDPOINT is required for the hasura backend".into())
                })?;
                let endpoint = Url::parse(&raw)
                    .map_err(|err| AppError::Config(format!("invalid HASURA_ENDPOINT: {err}")))?;
                GatewayBackend::Hasura {
                    endpoint,
                    admin_secret: non_empty_var("HASURA_ADMIN_SECRET"),
                }
            }
            other => {
                return Err(AppError::Config(format!(
                    "unknown GATEWAY_BACKEND `{other}` (expected sqlite or hasura)"
                )))
            }
        };

        let timeout_secs = match env::var("GATEWAY_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|err| AppError::Config(format!("invalid GATEWAY_TIMEOUT_SECS: {err}")))?,
            Err(_) => 10,
        };

        let default_currency =
            non_empty_var("DEFAULT_CURRENCY").unwrap_or_else(|| "JPY".to_string());

        Ok(Self {
            database_url,
            listen_addr,
            backend,
            gateway_timeout: Duration::from_secs(timeout_secs),
            default_currency,
            google_maps_api_key: non_empty_var("GOOGLE_MAPS_API_KEY"),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
