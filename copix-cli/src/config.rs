use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Get the copix config directory path (~/.copix)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".copix"))
}

/// Get the global config file path (~/.copix/config.toml)
pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Project-local config, takes priority over the global file
pub const LOCAL_CONFIG_FILE: &str = "copix.toml";

// ============================================================================
// TOML Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CopixConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub photos: PhotosConfig,

    #[serde(default)]
    pub copy: CopyConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => bail!("unknown theme '{}' (expected dark or light)", other),
        }
    }
}

/// How the photo library answers permission requests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhotoPermission {
    /// Prompt once per session
    #[default]
    Ask,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GeneralConfig {
    #[serde(default)]
    pub theme: Theme,

    /// Ask before deleting an entry (off: delete is immediate)
    #[serde(default)]
    pub confirm_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotosConfig {
    /// Photo library root. Defaults to ~/Pictures
    #[serde(default)]
    pub dir: Option<String>,

    #[serde(default)]
    pub permission: PhotoPermission,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            dir: None,
            permission: PhotoPermission::default(),
            extensions: default_extensions(),
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CopyConfig {
    /// How long the "copied" notice stays up
    #[serde(default = "default_notice_ms")]
    pub notice_ms: u64,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            notice_ms: default_notice_ms(),
        }
    }
}

// Default value functions for serde
fn default_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif", "webp", "heic"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_max_depth() -> usize {
    3
}

fn default_notice_ms() -> u64 {
    2000
}

impl CopixConfig {
    /// Load config from TOML files
    ///
    /// Priority order (highest to lowest):
    /// 1. ./copix.toml (project-specific)
    /// 2. ~/.copix/config.toml (user defaults)
    /// 3. Built-in defaults
    ///
    /// `COPIX_PHOTOS_DIR` and `COPIX_THEME` override whatever was loaded.
    pub fn load() -> Self {
        let mut config = CopixConfig::default();

        for path in global_config_path()
            .into_iter()
            .chain(std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)))
        {
            if let Some(loaded) = Self::read_file(&path) {
                config = loaded;
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn read_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<CopixConfig>(&contents) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                debug!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("COPIX_PHOTOS_DIR").filter(|d| !d.trim().is_empty()) {
            self.photos.dir = Some(dir);
        }
        if let Some(theme) = lookup("COPIX_THEME") {
            match theme.parse() {
                Ok(theme) => self.general.theme = theme,
                Err(e) => warn!("Ignoring COPIX_THEME: {}", e),
            }
        }
    }

    /// Photo library root with `~` expanded
    pub fn photos_dir(&self) -> PathBuf {
        match &self.photos.dir {
            Some(dir) => expand_home(dir),
            None => dirs::picture_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.copy.notice_ms)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

// ============================================================================
// `copix config` subcommand
// ============================================================================

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a default config to ~/.copix/config.toml
    Init(InitArgs),
    /// Print the effective config as TOML
    Show,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Path => run_path(),
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let path = global_config_path().context("Could not determine home directory")?;

    if path.exists() && !args.force {
        bail!(
            "Config already exists at {}\n\nUse --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create config directory: {}", parent.display()))?;
    }

    let contents = toml::to_string_pretty(&CopixConfig::default())
        .context("Failed to serialize default config")?;
    std::fs::write(&path, contents)
        .context(format!("Failed to write config file: {}", path.display()))?;

    println!("✅ Wrote {}", path.display());
    Ok(())
}

fn run_show() -> Result<()> {
    let config = CopixConfig::load();
    let rendered = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    print!("{}", rendered);
    Ok(())
}

fn run_path() -> Result<()> {
    let path = global_config_path().context("Could not determine home directory")?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CopixConfig::default();
        assert_eq!(config.general.theme, Theme::Dark);
        assert!(!config.general.confirm_delete);
        assert_eq!(config.photos.permission, PhotoPermission::Ask);
        assert!(config.photos.extensions.contains(&"png".to_string()));
        assert_eq!(config.notice_ttl(), Duration::from_millis(2000));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: CopixConfig = toml::from_str(
            r#"
            [general]
            theme = "light"

            [photos]
            permission = "denied"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.theme, Theme::Light);
        assert_eq!(config.photos.permission, PhotoPermission::Denied);
        assert_eq!(config.photos.max_depth, 3);
        assert_eq!(config.copy.notice_ms, 2000);
    }

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let rendered = toml::to_string_pretty(&CopixConfig::default()).unwrap();
        let parsed: CopixConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, CopixConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CopixConfig::default();
        config.apply_overrides(|key| match key {
            "COPIX_PHOTOS_DIR" => Some("/srv/photos".to_string()),
            "COPIX_THEME" => Some("Light".to_string()),
            _ => None,
        });

        assert_eq!(config.photos_dir(), PathBuf::from("/srv/photos"));
        assert_eq!(config.general.theme, Theme::Light);
    }

    #[test]
    fn test_bad_theme_override_is_ignored() {
        let mut config = CopixConfig::default();
        config.apply_overrides(|key| (key == "COPIX_THEME").then(|| "neon".to_string()));
        assert_eq!(config.general.theme, Theme::Dark);
    }

    #[test]
    fn test_read_file_skips_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copix.toml");
        std::fs::write(&path, "[general\ntheme = ").unwrap();
        assert!(CopixConfig::read_file(&path).is_none());

        std::fs::write(&path, "[copy]\nnotice_ms = 750\n").unwrap();
        let config = CopixConfig::read_file(&path).unwrap();
        assert_eq!(config.notice_ttl(), Duration::from_millis(750));
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/Pictures"), home.join("Pictures"));
            assert_eq!(expand_home("~"), home);
        }
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
    }
}
