//! Configuration loading and parsing.
//!
//! Parses `keyweave.toml` (or an override path provided by the binary):
//! `[input]` timing and leader settings, `[plugins]` toggles and the eight
//! `[[remap.*]]` tables. Unknown fields are ignored so older binaries accept
//! newer files. A file that fails to parse falls back to defaults with a
//! warning; a bad remap entry only drops that entry.

pub mod remap;

use anyhow::Result;
use core_keymap::normalize_key;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub use remap::{
    CommandSpec, ConfigIssue, IssueLevel, KeySpec, ModeGroup, RemapCommand, RemapConfig,
    RemapEntry, RemapTableKey, Remapping, command_warnings,
};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    #[serde(default = "InputConfig::default_timeout")] // Vim default: enabled
    pub timeout: bool,
    #[serde(default = "InputConfig::default_timeoutlen")] // Vim default usually 1000ms
    pub timeoutlen: u32,
    #[serde(default = "InputConfig::default_leader")]
    pub leader: String,
    /// Nested remap expansions allowed before the chain is aborted.
    #[serde(default = "InputConfig::default_max_map_depth")]
    pub max_map_depth: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timeout: Self::default_timeout(),
            timeoutlen: Self::default_timeoutlen(),
            leader: Self::default_leader(),
            max_map_depth: Self::default_max_map_depth(),
        }
    }
}

impl InputConfig {
    const fn default_timeout() -> bool {
        true
    }
    const fn default_timeoutlen() -> u32 {
        1000
    }
    fn default_leader() -> String {
        "\\".to_string()
    }
    const fn default_max_map_depth() -> u32 {
        1000
    }

    /// Leader as a canonical key (`<space>` → `" "`).
    pub fn leader_key(&self) -> String {
        normalize_key(&self.leader)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PluginsConfig {
    #[serde(default = "PluginsConfig::default_replace_with_register")]
    pub replace_with_register: bool,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            replace_with_register: Self::default_replace_with_register(),
        }
    }
}

impl PluginsConfig {
    const fn default_replace_with_register() -> bool {
        false
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub plugins: PluginsConfig,
    #[serde(default)]
    pub remap: RemapConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub path: Option<PathBuf>,
}

/// One loaded remap table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTable {
    pub key: RemapTableKey,
    pub remappings: Vec<Remapping>,
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("keyweave.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("keyweave").join("keyweave.toml");
    }
    PathBuf::from("keyweave.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                file,
                path: Some(path),
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config {
                raw: Some(content),
                file: ConfigFile::default(),
                path: Some(path),
            })
        }
    }
}

impl Config {
    pub fn from_file(file: ConfigFile) -> Self {
        Self {
            raw: None,
            file,
            path: None,
        }
    }

    pub fn input(&self) -> &InputConfig {
        &self.file.input
    }

    /// Validate every remap table with the configured leader substituted.
    /// Issues are reported through tracing and also returned; tables come
    /// back in `RemapTableKey::all` order, empty ones included.
    pub fn remap_tables(&self) -> (Vec<LoadedTable>, Vec<ConfigIssue>) {
        let leader = self.file.input.leader_key();
        let mut tables = Vec::new();
        let mut issues = Vec::new();
        for key in RemapTableKey::all() {
            let (remappings, found) = key.load(&self.file.remap, &leader);
            for issue in &found {
                issue.report();
            }
            issues.extend(found);
            tables.push(LoadedTable { key, remappings });
        }
        (tables, issues)
    }
}
