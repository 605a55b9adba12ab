use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub cmr_url: String,
    pub cmr_client_id: String,
    pub stac_version: String,
    pub api_base_path: String, // Prefix for every route, e.g. "/cmr-stac" behind a gateway
    pub default_limit: u64,    // Page size sent to CMR when the request has no limit
    pub app_name: String,
    pub deployment: String,
    pub port: u16,
    pub log_format: String, // "text" or "json"
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok(); // Load from .env file if available

        Config {
            cmr_url: env::var("CMR_URL")
                .unwrap_or_else(|_| "https://cmr.earthdata.nasa.gov".to_string())
                .trim_end_matches('/')
                .to_string(),
            cmr_client_id: env::var("CMR_CLIENT_ID")
                .unwrap_or_else(|_| "cmr-stac-api".to_string()),
            stac_version: env::var("STAC_VERSION").unwrap_or_else(|_| "1.0.0".to_string()),
            api_base_path: normalize_base_path(&env::var("API_BASE_PATH").unwrap_or_default()),
            default_limit: env::var("DEFAULT_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "cmr-stac-api".to_string()),
            deployment: env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        }
    }

    pub fn for_tests() -> Self {
        Config {
            cmr_url: "http://localhost:3003".to_string(),
            cmr_client_id: "cmr-stac-api-test".to_string(),
            stac_version: "1.0.0".to_string(),
            api_base_path: String::new(),
            default_limit: 10,
            app_name: "cmr-stac-api-test".to_string(),
            deployment: "test".to_string(),
            port: 3000,
            log_format: "text".to_string(),
        }
    }
}

/// Ensures a leading slash and no trailing slash, "" stays "".
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
