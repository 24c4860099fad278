//! Newsletter configuration: where the archive lives, how politely to crawl
//! it, and which [`Layout`] describes its markup.
//!
//! The file is optional. Every key falls back to the Data Elixir defaults, so
//! a config only needs the fields that differ.

use crate::error::ConfigError;
use crate::layout::Layout;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "Chrome66.0";

/// Bounds of the uniformly random pause taken after every issue fetch.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            min_delay_secs: 0.5,
            max_delay_secs: 2.0,
        }
    }
}

impl Pacing {
    /// No pause at all.
    #[cfg(test)]
    pub fn none() -> Self {
        Self {
            min_delay_secs: 0.0,
            max_delay_secs: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsletterConfig {
    /// Display label; used for output file names.
    pub name: String,
    /// Issue URLs are this string with the issue suffix appended.
    pub archive_url: String,
    /// Page listing issues, newest first.
    pub archive_front_page: String,
    pub user_agent: String,
    /// Unset means requests never time out.
    pub request_timeout_secs: Option<u64>,
    pub pacing: Pacing,
    pub layout: Layout,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            name: "Data Elixir".to_string(),
            archive_url: "https://dataelixir.com/issues/".to_string(),
            archive_front_page: "https://dataelixir.com/issues".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: None,
            pacing: Pacing::default(),
            layout: Layout::default(),
        }
    }
}

impl NewsletterConfig {
    /// Load and validate a YAML config file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: NewsletterConfig = serde_yaml::from_str(&raw)?;
        config.validate()?;
        info!(name = %config.name, archive_url = %config.archive_url, "Loaded newsletter config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.archive_url.trim().is_empty() {
            return Err(ConfigError::Invalid("archive_url must not be empty".into()));
        }
        let Pacing {
            min_delay_secs: min,
            max_delay_secs: max,
        } = self.pacing;
        if !(min.is_finite() && max.is_finite()) || min < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "delays must be finite and non-negative, got {min}..{max}"
            )));
        }
        if min > max {
            return Err(ConfigError::Invalid(format!(
                "min_delay_secs ({min}) exceeds max_delay_secs ({max})"
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NewsletterConfig::default();
        assert_eq!(config.user_agent, "Chrome66.0");
        assert!(config.request_timeout().is_none());
        assert_eq!(config.pacing.min_delay_secs, 0.5);
        assert_eq!(config.pacing.max_delay_secs, 2.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "name: Weekly Bits\narchive_url: https://example.com/issue/\nrequest_timeout_secs: 15\npacing:\n  max_delay_secs: 3.0"
        )
        .unwrap();

        let config = NewsletterConfig::load(file.path()).unwrap();
        assert_eq!(config.name, "Weekly Bits");
        assert_eq!(config.archive_url, "https://example.com/issue/");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.pacing.min_delay_secs, 0.5);
        assert_eq!(config.pacing.max_delay_secs, 3.0);
        assert_eq!(config.layout.item_summary.tag, "span");
    }

    #[test]
    fn test_inverted_pacing_rejected() {
        let config = NewsletterConfig {
            pacing: Pacing {
                min_delay_secs: 3.0,
                max_delay_secs: 1.0,
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_negative_delay_rejected() {
        let config = NewsletterConfig {
            pacing: Pacing {
                min_delay_secs: -1.0,
                max_delay_secs: 1.0,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = NewsletterConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
