use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Category;
use crate::persistence::DEFAULT_STORAGE_KEY;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default)]
    pub default_category: Category,
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width_percent: u16,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_new_task")]
    pub new_task: String,
    #[serde(default = "default_new_subtask")]
    pub new_subtask: String,
    #[serde(default = "default_new_list")]
    pub new_list: String,
    #[serde(default = "default_rename_list")]
    pub rename_list: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_delete_list")]
    pub delete_list: String,
    #[serde(default = "default_toggle_task")]
    pub toggle_task: String,
    #[serde(default = "default_expand")]
    pub expand: String,
    #[serde(default = "default_search")]
    pub search: String,
    #[serde(default = "default_next_list")]
    pub next_list: String,
    #[serde(default = "default_prev_list")]
    pub prev_list: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_help")]
    pub help: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_personal")]
    pub personal: String,
    #[serde(default = "default_freelance")]
    pub freelance: String,
    #[serde(default = "default_work")]
    pub work: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            storage_key: default_storage_key(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            default_category: Category::default(),
            sidebar_width_percent: default_sidebar_width(),
            key_bindings: KeyBindings::default(),
            theme: Theme::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            new_task: default_new_task(),
            new_subtask: default_new_subtask(),
            new_list: default_new_list(),
            rename_list: default_rename_list(),
            delete: default_delete(),
            delete_list: default_delete_list(),
            toggle_task: default_toggle_task(),
            expand: default_expand(),
            search: default_search(),
            next_list: default_next_list(),
            prev_list: default_prev_list(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            help: default_help(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            personal: default_personal(),
            freelance: default_freelance(),
            work: default_work(),
        }
    }
}

impl Theme {
    /// Color name for a category dot
    pub fn category_color(&self, category: Category) -> &str {
        match category {
            Category::Personal => &self.personal,
            Category::Freelance => &self.freelance,
            Category::Work => &self.work,
        }
    }
}

// Default value functions
fn default_storage_path() -> String {
    // Fallback only; the profile-specific path is set at load time
    data_file_for_profile(utils::Profile::Prod, "tdl.db")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    data_file_for_profile(utils::Profile::Prod, "logs")
}

fn default_sidebar_width() -> u16 {
    30
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_new_task() -> String {
    "n".to_string()
}

fn default_new_subtask() -> String {
    "s".to_string()
}

fn default_new_list() -> String {
    "L".to_string()
}

fn default_rename_list() -> String {
    "r".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_delete_list() -> String {
    "D".to_string()
}

fn default_toggle_task() -> String {
    "Space".to_string()
}

fn default_expand() -> String {
    "Enter".to_string()
}

fn default_search() -> String {
    "/".to_string()
}

fn default_next_list() -> String {
    "Tab".to_string()
}

fn default_prev_list() -> String {
    "BackTab".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_personal() -> String {
    "lightblue".to_string()
}

fn default_freelance() -> String {
    "lightmagenta".to_string()
}

fn default_work() -> String {
    "lightgreen".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

fn data_file_for_profile(profile: utils::Profile, name: &str) -> String {
    if let Some(data_dir) = utils::get_data_dir(profile) {
        data_dir.join(name).to_string_lossy().to_string()
    } else {
        match profile {
            utils::Profile::Dev => format!("~/.local/share/tdl-dev/{}", name),
            utils::Profile::Prod => format!("~/.local/share/tdl/{}", name),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config file, creating it with defaults if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        let mut config = Self::load_from_path(&config_path, profile)?;
        if config.storage_path == default_storage_path() {
            config.storage_path = data_file_for_profile(profile, "tdl.db");
        }
        if config.log_dir == default_log_dir() {
            config.log_dir = data_file_for_profile(profile, "logs");
        }
        Ok(config)
    }

    /// Load configuration from an explicit file path, creating it with defaults if missing
    pub fn load_from_path(path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        if path.exists() {
            let contents =
                fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;
            Self::from_toml(&contents)
        } else {
            let mut config = Config::default();
            config.storage_path = data_file_for_profile(profile, "tdl.db");
            config.log_dir = data_file_for_profile(profile, "logs");
            let save_result = config.save_to_path(path);
            if let Err(ref e) = save_result {
                eprintln!("ERROR: Failed to save config file: {}", e);
                eprintln!("Config path: {:?}", path);
            }
            save_result?;
            Ok(config)
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Save configuration to an explicit file path
    pub fn save_to_path(&mut self, path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the expanded storage path (with ~ expansion)
    pub fn get_storage_path(&self) -> PathBuf {
        utils::expand_path(&self.storage_path)
    }

    /// Get the expanded log directory (with ~ expansion)
    pub fn get_log_dir(&self) -> PathBuf {
        utils::expand_path(&self.log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config = Config::from_toml(
            r#"
            storage_key = "custom"
            default_category = "work"

            [key_bindings]
            quit = "x"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage_key, "custom");
        assert_eq!(config.default_category, Category::Work);
        assert_eq!(config.key_bindings.quit, "x");
        assert_eq!(config.key_bindings.new_task, "n");
        assert_eq!(config.theme.category_color(Category::Work), "lightgreen");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from_path(&path, utils::Profile::Dev).unwrap();
        assert!(path.exists());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);

        let reloaded = Config::load_from_path(&path, utils::Profile::Dev).unwrap();
        assert_eq!(reloaded.storage_path, config.storage_path);
    }
}
