use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::InsertPosition;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Overrides the per-profile database location when set
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default)]
    pub insert_position: InsertPosition,
    #[serde(default)]
    pub time_format: TimeFormat,
    /// Set once the tutorial tasks have been added on first launch
    #[serde(default)]
    pub prepopulated: bool,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    /// Follow the terminal's own colors
    #[default]
    System,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::System];

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Light => "Light",
            ThemeMode::Dark => "Dark",
            ThemeMode::System => "System",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeFormat {
    #[serde(rename = "12h")]
    H12,
    #[default]
    #[serde(rename = "24h")]
    H24,
}

impl TimeFormat {
    pub fn label(self) -> &'static str {
        match self {
            TimeFormat::H12 => "12-hour",
            TimeFormat::H24 => "24-hour",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_save")]
    pub save: String,
    #[serde(default = "default_toggle_done")]
    pub toggle_done: String,
    #[serde(default = "default_archive")]
    pub archive: String,
    #[serde(default = "default_move_task")]
    pub move_task: String,
    #[serde(default = "default_clear_all")]
    pub clear_all: String,
    #[serde(default = "default_restore")]
    pub restore: String,
    #[serde(default = "default_copy")]
    pub copy: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_search")]
    pub search: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_tab_left")]
    pub tab_left: String,
    #[serde(default = "default_tab_right")]
    pub tab_right: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_settings")]
    pub settings: String,
}

/// Colors for one theme; values are parsed by `tui::widgets::color::parse_color`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub fg: String,
    pub bg: String,
    pub highlight_bg: String,
    pub highlight_fg: String,
    pub muted: String,
    pub accent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            theme: ThemeMode::default(),
            insert_position: InsertPosition::default(),
            time_format: TimeFormat::default(),
            prepopulated: false,
            key_bindings: KeyBindings::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            new: default_new(),
            edit: default_edit(),
            save: default_save(),
            toggle_done: default_toggle_done(),
            archive: default_archive(),
            move_task: default_move_task(),
            clear_all: default_clear_all(),
            restore: default_restore(),
            copy: default_copy(),
            delete: default_delete(),
            search: default_search(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            tab_left: default_tab_left(),
            tab_right: default_tab_right(),
            help: default_help(),
            settings: default_settings(),
        }
    }
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Theme {
        match mode {
            ThemeMode::Light => Theme {
                fg: "black".to_string(),
                bg: "white".to_string(),
                highlight_bg: "#e8e8e8".to_string(),
                highlight_fg: "black".to_string(),
                muted: "darkgray".to_string(),
                accent: "#d03a2f".to_string(),
            },
            ThemeMode::Dark => Theme {
                fg: "#e6e6e6".to_string(),
                bg: "#161616".to_string(),
                highlight_bg: "#303030".to_string(),
                highlight_fg: "white".to_string(),
                muted: "gray".to_string(),
                accent: "#ef5a4c".to_string(),
            },
            ThemeMode::System => Theme {
                fg: "reset".to_string(),
                bg: "reset".to_string(),
                highlight_bg: "darkgray".to_string(),
                highlight_fg: String::new(),
                muted: "gray".to_string(),
                accent: "red".to_string(),
            },
        }
    }
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_toggle_done() -> String {
    "Space".to_string()
}

fn default_archive() -> String {
    "a".to_string()
}

fn default_move_task() -> String {
    "m".to_string()
}

fn default_clear_all() -> String {
    "X".to_string()
}

fn default_restore() -> String {
    "r".to_string()
}

fn default_copy() -> String {
    "c".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_search() -> String {
    "/".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_tab_left() -> String {
    "Left".to_string()
}

fn default_tab_right() -> String {
    "Right".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_settings() -> String {
    "F2".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
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
    /// Load configuration from an explicit file, creating it with defaults if missing
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let mut config = Config::default();
            if let Err(ref e) = config.save_to(config_path) {
                tracing::error!(path = %config_path.display(), error = %e, "failed to write default config");
            }
            Ok(config)
        }
    }

    /// Save configuration to `config_path`
    pub fn save_to(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Database location: the configured override, or the profile's data directory
    pub fn get_database_path(&self, profile: utils::Profile) -> PathBuf {
        match &self.database_path {
            Some(path) => utils::expand_path(path),
            None => utils::get_data_dir(profile)
                .map(|dir| dir.join("tasks.db"))
                .unwrap_or_else(|| utils::expand_path(match profile {
                    utils::Profile::Dev => "~/.local/share/doneward-dev/tasks.db",
                    utils::Profile::Prod => "~/.local/share/doneward/tasks.db",
                })),
        }
    }

    /// Colors for the configured theme mode
    /// If highlight_fg is empty, the renderer derives it from highlight_bg
    pub fn get_active_theme(&self) -> Theme {
        Theme::for_mode(self.theme)
    }
}
