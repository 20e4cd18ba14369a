//! Small persisted UI preferences: the backend's base path and the active locale.

use std::path::Path;
use std::time::Duration;

use hostagent_api::RequestContext;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Errors from loading or saving the preferences file.
#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("failed to access preferences file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse preferences file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to write preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Values every request reads at call time, persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub base_path: String,
    pub locale: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            locale: "en".to_string(),
        }
    }
}

impl Preferences {
    /// Loads preferences from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, PreferencesError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No preferences at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes preferences to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), PreferencesError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Builds the request context for a backend at `origin`.
    pub fn context(&self, origin: Url, api_key: Option<String>, timeout: Duration) -> RequestContext {
        RequestContext::new(origin)
            .with_base_path(self.base_path.clone())
            .with_locale(self.locale.clone())
            .with_api_key(api_key)
            .with_timeout(timeout)
    }
}
