use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub cms_base_url: String,
    pub cms_token: String,
    pub session_store_path: String,
    pub source_tag: String,
    pub landing_url: Option<String>,
    pub success_display_ms: u64,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            cms_base_url: std::env::var("CMS_BASE_URL")
                .map_err(|_| anyhow::anyhow!("CMS_BASE_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("CMS_BASE_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("CMS_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })?,
            cms_token: std::env::var("CMS_API_TOKEN")
                .map_err(|_| anyhow::anyhow!("CMS_API_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("CMS_API_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            session_store_path: std::env::var("SESSION_STORE_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| ".sidecart-session.json".to_string()),
            source_tag: std::env::var("LEAD_SOURCE_TAG")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "website".to_string()),
            landing_url: std::env::var("LANDING_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            success_display_ms: std::env::var("SUCCESS_DISPLAY_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SUCCESS_DISPLAY_MS must be a number"))?,
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be a number"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("CMS Base URL: {}", config.cms_base_url);
        tracing::debug!("Session store: {}", config.session_store_path);
        tracing::debug!("Source tag: {}", config.source_tag);
        if let Some(ref landing) = config.landing_url {
            tracing::debug!("Landing URL: {}", landing);
        }

        Ok(config)
    }

    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
