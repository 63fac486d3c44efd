use std::time::Duration;
use tracing::warn;

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub data_dir: String,
    pub allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    pub gemini: GeminiConfig,
    pub wikipedia_api_url: String,
    pub user_agent: String,
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 5000;
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
    const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
    const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
    const DEFAULT_WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";
    const DEFAULT_USER_AGENT: &str = "TravelGenie/1.0";

    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = var("GEMINI_API_KEY").filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("GEMINI_API_KEY not set, place generation will be unavailable");
        }

        Self {
            host: var("GENIE_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port: var("GENIE_HTTP_PORT")
                .and_then(|port| port.parse::<u16>().ok())
                .unwrap_or(Self::DEFAULT_HTTP_PORT),
            data_dir: var("GENIE_DATA_DIR").unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            allowed_origins: var("GENIE_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            request_timeout: Duration::from_secs(
                var("GENIE_REQUEST_TIMEOUT_SECS")
                    .and_then(|secs| secs.parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(Self::DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            gemini: GeminiConfig {
                api_key,
                model: var("GEMINI_MODEL")
                    .unwrap_or_else(|| Self::DEFAULT_GEMINI_MODEL.to_string()),
                base_url: var("GEMINI_BASE_URL")
                    .unwrap_or_else(|| Self::DEFAULT_GEMINI_BASE_URL.to_string()),
            },
            wikipedia_api_url: var("WIKIPEDIA_API_URL")
                .unwrap_or_else(|| Self::DEFAULT_WIKIPEDIA_API_URL.to_string()),
            user_agent: var("GENIE_USER_AGENT")
                .unwrap_or_else(|| Self::DEFAULT_USER_AGENT.to_string()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    pub fn sled_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join("genie.sled")
    }

    /// True when any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}
