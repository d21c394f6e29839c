//! CLI command handlers.

/// Pattern listing.
pub mod patterns;
/// Document redaction.
pub mod scan;
/// Settings inspection and editing.
pub mod settings;

use std::path::Path;

use shroud_core::prelude::*;

use crate::ui::print_warning;

/// Convenience alias for command return types.
pub type Result<T = ()> = anyhow::Result<T>;

/// Opens the settings store rooted at `dir`.
pub fn open_store(dir: &Path) -> SettingsStore<FileStore> {
    SettingsStore::new(FileStore::new(dir))
}

/// Loads the saved settings, warning and falling back to the defaults if the
/// blob is unreadable.
pub fn load_or_default(store: &SettingsStore<FileStore>) -> RedactionSettings {
    match store.try_load() {
        Ok(settings) => settings,
        Err(e) => {
            print_warning(&format!("{e}; using default settings"));
            RedactionSettings::default()
        }
    }
}
