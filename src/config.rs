use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::path::{Path, PathBuf};
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MenuAction {
    #[strum(to_string = "audio", serialize = "sound", serialize = "🔊")]
    Audio,
    #[strum(to_string = "walk", serialize = "walkmode", serialize = "🚶")]
    Walk,
    #[strum(to_string = "fullscreen", serialize = "fs", serialize = "⛶")]
    Fullscreen,
    #[strum(to_string = "vr", serialize = "vr-toggle", serialize = "🥽")]
    Vr,
    #[strum(to_string = "about", serialize = "info", serialize = "ℹ️")]
    About,
}

impl MenuAction {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Audio => "🔊",
            Self::Walk => "🚶",
            Self::Fullscreen => "⛶",
            Self::Vr => "🥽",
            Self::About => "ℹ️",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Audio => "Toggle audio",
            Self::Walk => "Walk mode",
            Self::Fullscreen => "Fullscreen",
            Self::Vr => "Toggle VR",
            Self::About => "About",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AboutSettings {
    pub title: String,
    pub body: String,
    pub attribution: String,
    pub close_label: String,
}

impl Default for AboutSettings {
    fn default() -> Self {
        Self {
            title: "About".into(),
            body: "Interactive virtual tour.".into(),
            attribution: "Gustavo Sánchez".into(),
            close_label: "Close".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MenuSettings {
    /// Action buttons in ring order, starting north and going clockwise.
    pub actions: Vec<MenuAction>,
    pub radius: f64,
    pub toggle_radius: f64,
    pub slot_radius: f64,
    pub animation_ms: u64,
    pub offset_y: f64,
    pub background: String,
    pub highlight: String,
    pub highlight_scale: f64,
    pub toggle_glyph: String,
    pub toggle_label: String,
    pub about: AboutSettings,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            actions: MenuAction::all(),
            radius: 96.0,
            toggle_radius: 30.0,
            slot_radius: 26.0,
            animation_ms: 250,
            offset_y: 20.0,
            background: "rgba(20, 24, 32, 0.72)".into(),
            highlight: "rgba(0, 255, 247, 0.25)".into(),
            highlight_scale: 1.1,
            toggle_glyph: "⚙️".into(),
            toggle_label: "Toggle menu".into(),
            about: AboutSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HudSettings {
    pub points_label: String,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            points_label: "points".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub menu: MenuSettings,
    #[serde(default)]
    pub hud: HudSettings,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "vista", "vista").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Resolves the CLI override, falling back to the per-user config path.
pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => get_config_path(),
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("VISTA")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("menu.actions")
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(environment())
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default(path: Option<&Path>) -> Config {
    let path = match resolve_path(path) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("{}, using defaults", e);
            return Config::default();
        }
    };

    match load_config(&path) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Failed to load {}: {}, using defaults", path.display(), e);
            Config::default()
        }
    }
}

pub fn write_default_config(path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path =
        resolve_path(path).map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", ConfigError::from(e));
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}
