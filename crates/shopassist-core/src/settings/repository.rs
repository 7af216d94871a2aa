use futures::future::BoxFuture;

use super::app_settings::AppSettings;
use super::error::SettingsResult;

pub trait SettingsRepository: Send + Sync + 'static {
    /// Load settings from storage, defaults when nothing is stored yet
    fn load(&self) -> BoxFuture<'static, SettingsResult<AppSettings>>;

    /// Save settings to storage
    fn save(&self, settings: AppSettings) -> BoxFuture<'static, SettingsResult<()>>;
}
