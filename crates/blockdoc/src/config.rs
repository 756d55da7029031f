//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default quiet interval before a change notification is delivered.
pub const DEFAULT_DEBOUNCE_MS: u64 = 600;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Quiet interval after the last edit before `on_change` fires (default: 600ms).
    pub debounce: Duration,

    /// URL schemes the sanitizer keeps on `href`/`src` (default: http, https, mailto).
    pub url_schemes: Vec<String>,

    /// `rel` forced onto links; `None` leaves links untouched (default: "noopener noreferrer").
    pub link_rel: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            url_schemes: vec![
                "http".to_string(),
                "https".to_string(),
                "mailto".to_string(),
            ],
            link_rel: Some("noopener noreferrer".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let debounce = match lookup("BLOCKDOC_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .context("BLOCKDOC_DEBOUNCE_MS must be a valid u64")?,
            ),
            None => defaults.debounce,
        };

        let url_schemes = lookup("BLOCKDOC_URL_SCHEMES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.url_schemes);

        // An empty value switches the rel override off.
        let link_rel = match lookup("BLOCKDOC_LINK_REL") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim().to_string()),
            None => defaults.link_rel,
        };

        Ok(Self {
            debounce,
            url_schemes,
            link_rel,
        })
    }
}
