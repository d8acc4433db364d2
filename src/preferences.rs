use common::{Preferences, Theme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("preferences file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("preferences file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Partial update of the display preferences.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct PreferencesUpdate {
    pub sidebar_collapsed: Option<bool>,
    pub theme: Option<Theme>,
}

/// Display preferences persisted as a flat JSON key/value file.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    current: Arc<RwLock<Preferences>>,
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, PreferencesError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

impl PreferenceStore {
    /// Reads the file at `path`. A missing file yields the defaults.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        if entries.is_empty() {
            debug!("No stored preferences at {}, using defaults", path.display());
        }
        let preferences = Preferences::from_entries(&entries);
        info!("Loaded preferences from {}: {:?}", path.display(), preferences);

        Ok(Self {
            path,
            current: Arc::new(RwLock::new(preferences)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> Preferences {
        *self.current.read().await
    }

    /// Applies `update` and writes the result back to disk.
    ///
    /// The in-memory value only changes once the file was written.
    pub async fn update(&self, update: PreferencesUpdate) -> Result<Preferences, PreferencesError> {
        let mut guard = self.current.write().await;
        let mut next = *guard;
        if let Some(collapsed) = update.sidebar_collapsed {
            next.sidebar_collapsed = collapsed;
        }
        if let Some(theme) = update.theme {
            next.theme = theme;
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string_pretty(&next.to_entries())?;
        if let Err(e) = tokio::fs::write(&self.path, body).await {
            warn!("Failed to write preferences to {}: {}", self.path.display(), e);
            return Err(e.into());
        }

        *guard = next;
        debug!("Preferences updated: {:?}", next);
        Ok(next)
    }
}
