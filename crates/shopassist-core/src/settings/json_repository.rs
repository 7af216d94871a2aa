use std::path::PathBuf;

use futures::future::BoxFuture;
use tracing::debug;

use super::app_settings::AppSettings;
use super::error::{SettingsError, SettingsResult};
use super::repository::SettingsRepository;

pub struct SettingsJsonRepository {
    file_path: PathBuf,
}

impl SettingsJsonRepository {
    /// Create repository with XDG-compliant path
    pub fn new() -> SettingsResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::PathError("Cannot determine config directory".into())
        })?;

        let file_path = config_dir.join("shopassist").join("settings.json");

        Ok(Self { file_path })
    }

    /// Create repository with custom path (for testing)
    pub fn with_path(file_path: PathBuf) -> Self {
        Self { file_path }
    }
}

impl SettingsRepository for SettingsJsonRepository {
    fn load(&self) -> BoxFuture<'static, SettingsResult<AppSettings>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            // First run: nothing stored yet
            if !tokio::fs::try_exists(&path).await? {
                debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(AppSettings::default());
            }

            let contents = tokio::fs::read_to_string(&path).await?;
            let settings: AppSettings = serde_json::from_str(&contents)?;

            Ok(settings)
        })
    }

    fn save(&self, settings: AppSettings) -> BoxFuture<'static, SettingsResult<()>> {
        let path = self.file_path.clone();

        Box::pin(async move {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let json = serde_json::to_string_pretty(&settings)?;

            // Write atomically using temp file + rename
            let temp_path = path.with_extension("json.tmp");
            tokio::fs::write(&temp_path, json).await?;
            tokio::fs::rename(&temp_path, &path).await?;

            Ok(())
        })
    }
}
