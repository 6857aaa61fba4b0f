//! Loading authoring configuration (capacity limits) from TOML.
//!
//! The file is optional: without it, product defaults apply (3 groups per
//! lesson, 10 questions per group).

use serde::Deserialize;
use tracing::{error, info};

use crate::form::Limits;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AuthoringConfig {
  #[serde(default)]
  pub limits: Option<Limits>,
}

impl AuthoringConfig {
  pub fn limits(&self) -> Limits {
    self.limits.unwrap_or_default()
  }
}

/// Attempt to load `AuthoringConfig` from AUTHORING_CONFIG_PATH. On any
/// parsing/IO error, returns None and the defaults apply.
pub fn load_authoring_config_from_env() -> Option<AuthoringConfig> {
  let path = std::env::var("AUTHORING_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AuthoringConfig>(&s) {
      Ok(cfg) => {
        info!(target: "bigkas_backend", %path, "Loaded authoring config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "bigkas_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "bigkas_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
