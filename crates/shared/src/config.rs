//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Soft-delete retention configuration.
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Purge sweep configuration.
    pub purge: PurgeConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Soft-delete retention configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Days a soft-deleted invoice stays recoverable before the purge
    /// sweep may remove it. Accepted range is 1-365.
    #[serde(default = "default_retention_days")]
    pub soft_delete_days: i64,
}

fn default_retention_days() -> i64 {
    30
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            soft_delete_days: default_retention_days(),
        }
    }
}

impl RetentionConfig {
    /// Returns the retention window clamped into the accepted 1-365 range.
    #[must_use]
    pub fn effective_days(&self) -> i64 {
        self.soft_delete_days.clamp(1, 365)
    }
}

/// Purge sweep configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PurgeConfig {
    /// Shared secret expected in the purge trigger header.
    pub shared_secret: String,
    /// Maximum invoices removed per sweep run.
    #[serde(default = "default_purge_batch")]
    pub batch_size: u64,
}

fn default_purge_batch() -> u64 {
    50
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("REMIT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_defaults_to_thirty_days() {
        let retention = RetentionConfig::default();
        assert_eq!(retention.effective_days(), 30);
    }

    #[test]
    fn test_retention_clamps_to_range() {
        let retention = RetentionConfig { soft_delete_days: 0 };
        assert_eq!(retention.effective_days(), 1);

        let retention = RetentionConfig {
            soft_delete_days: 400,
        };
        assert_eq!(retention.effective_days(), 365);

        let retention = RetentionConfig {
            soft_delete_days: 90,
        };
        assert_eq!(retention.effective_days(), 90);
    }
}
