pub mod app_settings;
pub mod error;
pub mod json_repository;
pub mod repository;

pub use app_settings::AppSettings;
pub use error::{SettingsError, SettingsResult};
pub use json_repository::SettingsJsonRepository;
pub use repository::SettingsRepository;
