//! Mutable capture settings shared between handlers and the inference client.

use std::sync::{Mutex, PoisonError};

use tracing::info;

use crate::models::settings::{CaptureSettings, CaptureSettingsPatch};

/// Last-writer-wins holder for [`CaptureSettings`].
#[derive(Debug, Default)]
pub struct SettingsStore {
    inner: Mutex<CaptureSettings>,
}

impl SettingsStore {
    /// Wrap the initial settings.
    #[must_use]
    pub fn new(initial: CaptureSettings) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    /// Copy of the current settings.
    #[must_use]
    pub fn current(&self) -> CaptureSettings {
        *self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge `patch` and return the resulting settings.
    pub fn update(&self, patch: &CaptureSettingsPatch) -> CaptureSettings {
        let mut settings = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        settings.apply(patch);
        if !patch.is_empty() {
            info!(?settings, "capture settings updated");
        }
        *settings
    }
}
