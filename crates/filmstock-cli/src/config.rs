//! Environment-driven settings for the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use filmstock_core::RenderConfig;

/// Default log filter when neither `RUST_LOG` nor `FILMSTOCK_LOG` is set.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Fallback `EnvFilter` directive (`FILMSTOCK_LOG`).
    pub log_level: String,
    /// Render config file (`FILMSTOCK_CONFIG`).
    pub render_config: Option<PathBuf>,
}

impl AppConfig {
    /// Read `FILMSTOCK_LOG` and `FILMSTOCK_CONFIG`.
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("FILMSTOCK_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
            render_config: std::env::var_os("FILMSTOCK_CONFIG").map(PathBuf::from),
        }
    }

    /// Load the render config, preferring `override_path` over the environment.
    pub fn load_render_config(&self, override_path: Option<&PathBuf>) -> Result<RenderConfig> {
        match override_path.or(self.render_config.as_ref()) {
            Some(path) => RenderConfig::load(path)
                .with_context(|| format!("failed to load render config {}", path.display())),
            None => Ok(RenderConfig::default()),
        }
    }
}
