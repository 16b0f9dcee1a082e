//! Preference command handlers.

use anyhow::{Context, Result, bail};
use byte_core::config::paths;
use byte_core::prefs::{self, FilePreferences, Preferences};

pub fn path() {
    println!("{}", paths::preferences_path().display());
}

/// Prints the stored value, or the default when unset.
pub fn get(key: &str) -> Result<()> {
    let store = open()?;
    let value = match key {
        prefs::VIEW_MODE_KEY => prefs::view_mode(&store).to_string(),
        prefs::LAST_SECTION_KEY => prefs::last_section(&store).to_string(),
        other => bail!(
            "Unknown preference '{other}' (expected {} or {})",
            prefs::VIEW_MODE_KEY,
            prefs::LAST_SECTION_KEY
        ),
    };
    println!("{value}");
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let canonical = prefs::normalize(key, value)?;
    let mut store = open()?;
    store.set(key, &canonical)?;
    println!("{key} = {canonical}");
    Ok(())
}

fn open() -> Result<FilePreferences> {
    let path = paths::preferences_path();
    FilePreferences::open(&path).with_context(|| format!("open preferences at {}", path.display()))
}
