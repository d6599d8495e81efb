//! Settings use-case service.

use crate::model::settings::{Settings, SettingsField};
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::RepoResult;

pub struct SettingsService<R: SettingsRepository> {
    repo: R,
}

impl<R: SettingsRepository> SettingsService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get_settings(&self) -> RepoResult<Settings> {
        self.repo.load_settings()
    }

    pub fn save_settings(&self, settings: &Settings) -> RepoResult<Settings> {
        self.repo.save_settings(settings)?;
        self.repo.load_settings()
    }

    pub fn set_field_visible(&self, field: SettingsField, visible: bool) -> RepoResult<Settings> {
        let mut settings = self.repo.load_settings()?;
        settings.set_visible(field, visible);
        self.save_settings(&settings)
    }

    pub fn toggle_field(&self, field: SettingsField) -> RepoResult<Settings> {
        let settings = self.repo.load_settings()?;
        self.set_field_visible(field, !settings.is_visible(field))
    }

    pub fn reset_settings(&self) -> RepoResult<Settings> {
        self.save_settings(&Settings::default())
    }
}
