//! UI preferences behind an injected get/set store.
//!
//! Components receive a `&dyn Preferences` (or `&mut`) instead of reaching
//! for ambient global state. The file-backed store edits the TOML in place,
//! so comments and unknown keys survive a `set`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};

use crate::item::BucketKind;

pub const VIEW_MODE_KEY: &str = "view_mode";
pub const LAST_SECTION_KEY: &str = "last_section";

pub trait Preferences {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// How item cards are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// One line per item.
    #[default]
    Overlay,
    /// Multi-line cards with every field.
    Structured,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Overlay => "overlay",
            ViewMode::Structured => "structured",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "overlay" => Ok(ViewMode::Overlay),
            "structured" => Ok(ViewMode::Structured),
            other => bail!("Unknown view mode '{other}' (expected overlay or structured)"),
        }
    }
}

/// Navigation section last opened by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Posts,
    Events,
    ExternalEvents,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Posts => "posts",
            Section::Events => "events",
            Section::ExternalEvents => "external-events",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "posts" => Ok(Section::Posts),
            "events" => Ok(Section::Events),
            "external-events" | "external_events" => Ok(Section::ExternalEvents),
            other => bail!("Unknown section '{other}' (expected posts, events or external-events)"),
        }
    }
}

impl From<BucketKind> for Section {
    fn from(kind: BucketKind) -> Self {
        match kind {
            BucketKind::Posts => Section::Posts,
            BucketKind::Events => Section::Events,
            BucketKind::ExternalEvents => Section::ExternalEvents,
        }
    }
}

/// Stored view mode; unknown or missing values fall back to the default.
pub fn view_mode(prefs: &dyn Preferences) -> ViewMode {
    prefs
        .get(VIEW_MODE_KEY)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

pub fn set_view_mode(prefs: &mut dyn Preferences, mode: ViewMode) -> Result<()> {
    prefs.set(VIEW_MODE_KEY, mode.as_str())
}

pub fn last_section(prefs: &dyn Preferences) -> Section {
    prefs
        .get(LAST_SECTION_KEY)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

pub fn set_last_section(prefs: &mut dyn Preferences, section: Section) -> Result<()> {
    prefs.set(LAST_SECTION_KEY, section.as_str())
}

/// Validates a value for a known key, returning its canonical form.
pub fn normalize(key: &str, value: &str) -> Result<String> {
    match key {
        VIEW_MODE_KEY => Ok(value.parse::<ViewMode>()?.as_str().to_string()),
        LAST_SECTION_KEY => Ok(value.parse::<Section>()?.as_str().to_string()),
        other => bail!("Unknown preference '{other}' (expected {VIEW_MODE_KEY} or {LAST_SECTION_KEY})"),
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl Preferences for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// TOML-file store, written through on every `set`.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Opens the store at `path`; a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read preferences from {}", path.display()))?;
            let table: toml::Table = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse preferences from {}", path.display()))?;
            table
                .into_iter()
                .filter_map(|(key, value)| match value {
                    toml::Value::String(s) => Some((key, s)),
                    _ => None,
                })
                .collect()
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Preferences for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value as toml_value};

        let contents = if self.path.exists() {
            fs::read_to_string(&self.path).with_context(|| {
                format!("Failed to read preferences from {}", self.path.display())
            })?
        } else {
            String::new()
        };
        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse preferences from {}", self.path.display()))?;
        doc[key] = toml_value(value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.path, doc.to_string())
            .with_context(|| format!("Failed to write preferences to {}", self.path.display()))?;

        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
