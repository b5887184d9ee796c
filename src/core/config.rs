use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub openai_api_hostname: String,
    // `None` means no model is configured and every reply comes from
    // the deterministic fallback templates
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub serpapi_api_hostname: String,
    pub serpapi_api_key: Option<String>,
    pub search_location: String,
    pub request_timeout: Duration,
}

/// Read an optional credential. Unset and blank values are both
/// treated as "not configured".
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn model_configured(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn search_configured(&self) -> bool {
        self.serpapi_api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("WAYFARER_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/wayfarer.db", storage_path.trim_end_matches('/'));
        let openai_api_hostname = env::var("WAYFARER_LLM_HOST")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_api_key = optional_var("OPENAI_API_KEY");
        let openai_model =
            env::var("WAYFARER_LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let serpapi_api_hostname = env::var("WAYFARER_SERPAPI_HOST")
            .unwrap_or_else(|_| "https://serpapi.com".to_string());
        let serpapi_api_key = optional_var("SERPAPI_KEY");
        let search_location = env::var("WAYFARER_SEARCH_LOCATION")
            .unwrap_or_else(|_| "United States".to_string());
        let request_timeout_secs = env::var("WAYFARER_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Self {
            storage_path,
            db_path,
            openai_api_hostname,
            openai_api_key,
            openai_model,
            serpapi_api_hostname,
            serpapi_api_key,
            search_location,
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_blank_credentials_are_unconfigured() {
        unsafe {
            env::set_var("OPENAI_API_KEY", "   ");
            env::remove_var("SERPAPI_KEY");
        }

        let config = AppConfig::default();
        assert!(config.openai_api_key.is_none());
        assert!(!config.model_configured());
        assert!(!config.search_configured());

        unsafe {
            env::remove_var("OPENAI_API_KEY");
        }
    }

    #[test]
    #[serial]
    fn test_reads_credentials_and_timeout() {
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-test");
            env::set_var("SERPAPI_KEY", "serp-test");
            env::set_var("WAYFARER_REQUEST_TIMEOUT_SECS", "5");
            env::set_var("WAYFARER_STORAGE_PATH", "/tmp/wayfarer/");
        }

        let config = AppConfig::default();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert!(config.search_configured());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.db_path, "/tmp/wayfarer/wayfarer.db");

        unsafe {
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("SERPAPI_KEY");
            env::remove_var("WAYFARER_REQUEST_TIMEOUT_SECS");
            env::remove_var("WAYFARER_STORAGE_PATH");
        }
    }
}
