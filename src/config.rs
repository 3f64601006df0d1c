//! Process-wide site configuration
//!
//! The CMS base URL, API token and email endpoint are installed once at
//! startup through [`init`] and read through [`get`]; nothing mutates them
//! afterwards.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Endpoints and credentials the site talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Headless CMS root, e.g. `https://cms.example.org`
    pub cms_base_url: String,
    /// Bearer token for CMS reads, if the instance requires one
    pub cms_token: Option<String>,
    /// Serverless email function accepting the contact-form JSON body
    pub email_endpoint: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            cms_base_url: "http://localhost:1337".to_string(),
            cms_token: None,
            email_endpoint: "/.netlify/functions/send-email".to_string(),
        }
    }
}

impl SiteConfig {
    /// Read configuration from the environment (native builds)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cms_base_url: std::env::var("CMS_BASE_URL").unwrap_or(defaults.cms_base_url),
            cms_token: std::env::var("CMS_TOKEN").ok(),
            email_endpoint: std::env::var("EMAIL_ENDPOINT").unwrap_or(defaults.email_endpoint),
        }
    }
}

static CONFIG: OnceLock<SiteConfig> = OnceLock::new();

/// Install the configuration. A second call is ignored with a warning.
pub fn init(config: SiteConfig) {
    if CONFIG.set(config).is_err() {
        log::warn!("site config already initialized; ignoring re-init");
    }
}

/// The installed configuration, or defaults if `init` was never called
pub fn get() -> &'static SiteConfig {
    CONFIG.get_or_init(|| {
        log::info!("site config not initialized, using defaults");
        SiteConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_dev() {
        let config = SiteConfig::default();
        assert_eq!(config.cms_base_url, "http://localhost:1337");
        assert!(config.cms_token.is_none());
        assert_eq!(config.email_endpoint, "/.netlify/functions/send-email");
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = SiteConfig {
            cms_base_url: "https://cms.example.org".into(),
            cms_token: Some("secret".into()),
            email_endpoint: "https://fns.example.org/send-email".into(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SiteConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cms_base_url, config.cms_base_url);
        assert_eq!(back.cms_token, config.cms_token);
        assert_eq!(back.email_endpoint, config.email_endpoint);
    }
}
