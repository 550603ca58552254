//! Configuration for connecting a client.
//!
//! # Example
//!
//! ```
//! use sync_objects::SyncConfig;
//!
//! // Minimal config (uses defaults)
//! let config = SyncConfig::default();
//! assert!(config.sync_url.starts_with("https://"));
//!
//! // Full config
//! let config = SyncConfig {
//!     sync_url: "https://aiyuke-t.wilddogio.com".into(),
//!     auth_domain: Some("aiyuke-t.wilddogio.com".into()),
//! };
//! ```

use serde::Deserialize;

/// Connection settings for a sync database.
///
/// The `sync_url` doubles as the origin prefix of every reference URL the
/// store hands back; paths are recovered from those URLs by stripping it.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Sync endpoint (e.g. `https://<app>.wilddogio.com`)
    #[serde(default = "default_sync_url")]
    pub sync_url: String,

    /// Auth domain, when the deployment separates it from the endpoint
    #[serde(default)]
    pub auth_domain: Option<String>,
}

fn default_sync_url() -> String {
    "https://demo.wilddogio.com".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_url: default_sync_url(),
            auth_domain: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.sync_url, "https://demo.wilddogio.com");
        assert!(config.auth_domain.is_none());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: SyncConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.sync_url, "https://demo.wilddogio.com");
    }

    #[test]
    fn test_deserialize_full() {
        let config: SyncConfig = serde_json::from_str(
            r#"{"sync_url": "https://app.wilddogio.com", "auth_domain": "app.wilddogio.com"}"#,
        )
        .unwrap();
        assert_eq!(config.sync_url, "https://app.wilddogio.com");
        assert_eq!(config.auth_domain.as_deref(), Some("app.wilddogio.com"));
    }
}
