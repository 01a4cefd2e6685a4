use serde::{Deserialize, Serialize};

use crate::coach::VoiceKind;
use crate::store::keys;
use crate::store::{Store, StoreError};

pub const MIN_UPDATE_INTERVAL: u32 = 1;
pub const MAX_UPDATE_INTERVAL: u32 = 60;

/// User preferences shared by both runtime surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub voice_enabled: bool,
    pub voice_type: VoiceKind,
    pub notifications: bool,
    pub auto_start: bool,
    /// Seconds between status refreshes in the popup.
    pub update_interval: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            voice_enabled: true,
            voice_type: VoiceKind::Female,
            notifications: true,
            auto_start: true,
            update_interval: 5,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), StoreError> {
        if !(MIN_UPDATE_INTERVAL..=MAX_UPDATE_INTERVAL).contains(&self.update_interval) {
            return Err(StoreError::Validation(format!(
                "updateInterval must be between {MIN_UPDATE_INTERVAL} and {MAX_UPDATE_INTERVAL}"
            )));
        }
        Ok(())
    }
}

impl Store {
    pub fn get_settings(&self) -> Result<Settings, StoreError> {
        match Self::get_json::<Settings>(&self.settings, keys::SETTINGS) {
            Ok(Some(settings)) => Ok(settings),
            Ok(None) => Ok(Settings::default()),
            Err(error) => {
                tracing::error!(error = %error, "Failed to read settings");
                Err(error)
            }
        }
    }

    pub fn has_settings(&self) -> Result<bool, StoreError> {
        Ok(self.settings.contains_key(keys::SETTINGS.as_bytes())?)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        settings.validate()?;
        Self::put_json(&self.settings, keys::SETTINGS, settings)
    }
}
