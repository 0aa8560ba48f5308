//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::reload::ReloadTrigger;
use crate::settings::Settings;
use crate::store::ConfigStore;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    store: ConfigStore,
    reloader: ReloadTrigger,
    /// Held for the whole load / apply / save / reload sequence so two
    /// submissions to this process cannot overwrite each other.
    update_lock: Mutex<()>,
}

impl AppState {
    pub fn new(store: ConfigStore, reloader: ReloadTrigger) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                reloader,
                update_lock: Mutex::new(()),
            }),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            ConfigStore::new(&settings.config_path),
            ReloadTrigger::new(&settings.control_command, settings.reload_timeout()),
        )
    }

    pub fn store(&self) -> &ConfigStore {
        &self.inner.store
    }

    pub fn reloader(&self) -> &ReloadTrigger {
        &self.inner.reloader
    }

    pub fn update_lock(&self) -> &Mutex<()> {
        &self.inner.update_lock
    }
}
