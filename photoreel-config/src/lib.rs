use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use photoreel_common::{GalleryError, GalleryOptions, PlaybackSettings, error::ConfigError, Result};

// Custom deserialization for Duration from human-readable strings
fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let duration_str = String::deserialize(deserializer)?;
    photoreel_common::duration::parse_duration(&duration_str)
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub folders: FolderConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub video: VideoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_interval", deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    #[serde(default)]
    pub random: bool,
    #[serde(default = "default_true")]
    pub sponsors: bool,
    #[serde(default = "default_true")]
    pub watch: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderConfig {
    pub photos: Option<PathBuf>,
    pub sponsors: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Index into the `swww query` output list
    pub monitor: Option<usize>,
    /// Output name, takes precedence over `monitor`
    pub output: Option<String>,
    #[serde(default = "default_resize")]
    pub resize: String,
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    #[serde(default = "default_transition_type")]
    pub transition_type: String,
    #[serde(default = "default_transition_step")]
    pub transition_step: u8,
    #[serde(default = "default_transition_fps")]
    pub transition_fps: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "default_player")]
    pub player: String,
}

// Default values
fn default_interval() -> Duration {
    photoreel_common::settings::DEFAULT_INTERVAL
}

fn default_true() -> bool {
    true
}

fn default_resize() -> String {
    "fit".to_string()
}

fn default_fill_color() -> String {
    "000000".to_string()
}

fn default_transition_type() -> String {
    "fade".to_string()
}

fn default_transition_step() -> u8 {
    90
}

fn default_transition_fps() -> u8 {
    30
}

fn default_player() -> String {
    "mpv".to_string()
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            random: false,
            sponsors: default_true(),
            watch: default_true(),
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            monitor: None,
            output: None,
            resize: default_resize(),
            fill_color: default_fill_color(),
            transition_type: default_transition_type(),
            transition_step: default_transition_step(),
            transition_fps: default_transition_fps(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self { player: default_player() }
    }
}

impl Config {
    /// Loads the user configuration. A missing file yields the defaults.
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            log::warn!("No configuration at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GalleryError::Config(ConfigError::NoConfigDir))?
            .join("photoreel");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GalleryError::Config(ConfigError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| GalleryError::Config(ConfigError::TomlParse {
                message: e.to_string(),
            }))?;

        config.validate()?;
        log::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.playback.validate()?;
        self.gallery.validate()?;

        if self.video.player.trim().is_empty() {
            return Err(GalleryError::Config(ConfigError::InvalidValue {
                field: "video.player".to_string(),
                value: self.video.player.clone(),
            }));
        }

        Ok(())
    }

    pub fn playback_settings(&self) -> PlaybackSettings {
        PlaybackSettings {
            interval: self.playback.interval,
            random: self.playback.random,
            // Only takes effect once a sponsor folder actually holds photos
            sponsors_enabled: self.playback.sponsors,
            watch_new_files: self.playback.watch,
        }
    }
}

impl PlaybackConfig {
    fn validate(&self) -> Result<()> {
        if photoreel_common::duration::check_interval(self.interval).is_err() {
            return Err(GalleryError::Config(ConfigError::InvalidValue {
                field: "playback.interval".to_string(),
                value: format!("{:?}", self.interval),
            }));
        }
        Ok(())
    }
}

impl GalleryConfig {
    fn validate(&self) -> Result<()> {
        if self.transition_step == 0 {
            return Err(GalleryError::Config(ConfigError::InvalidValue {
                field: "gallery.transition_step".to_string(),
                value: self.transition_step.to_string(),
            }));
        }

        if self.transition_fps == 0 {
            return Err(GalleryError::Config(ConfigError::InvalidValue {
                field: "gallery.transition_fps".to_string(),
                value: self.transition_fps.to_string(),
            }));
        }

        Ok(())
    }

    pub fn options(&self) -> GalleryOptions {
        GalleryOptions {
            resize: Some(self.resize.clone()),
            fill_color: Some(self.fill_color.clone()),
            transition_type: Some(self.transition_type.clone()),
            transition_step: Some(self.transition_step),
            transition_fps: Some(self.transition_fps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.playback.interval, Duration::from_secs(10));
        assert!(!config.playback.random);
        assert!(config.playback.watch);
        assert!(config.gallery.enabled);
        assert_eq!(config.gallery.monitor, None);
        assert_eq!(config.video.player, "mpv");
        assert!(config.validate().is_ok());

        let settings = config.playback_settings();
        assert_eq!(settings.interval, Duration::from_secs(10));
        assert!(settings.watch_new_files);
    }

    #[test]
    fn test_duration_deserialization() {
        let toml_str = r#"
            [playback]
            interval = "1m 30s"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.playback.interval, Duration::from_secs(90));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.playback.interval = Duration::from_secs(0);
        assert!(config.validate().is_err());

        config.playback.interval = Duration::from_millis(2500);
        assert!(config.validate().is_err());

        config.playback.interval = Duration::from_secs(u64::MAX);
        assert!(config.validate().is_err());

        config.playback.interval = Duration::from_secs(5);
        config.gallery.transition_step = 0;
        assert!(config.validate().is_err());

        config.gallery.transition_step = 10;
        config.gallery.transition_fps = 0;
        assert!(config.validate().is_err());

        config.gallery.transition_fps = 60;
        config.video.player = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gallery_options() {
        let toml_str = r#"
            [gallery]
            output = "DP-2"
            resize = "crop"
            transition_type = "wipe"
            transition_fps = 60
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gallery.output.as_deref(), Some("DP-2"));

        let options = config.gallery.options();
        assert_eq!(options.resize.as_deref(), Some("crop"));
        assert_eq!(options.fill_color.as_deref(), Some("000000"));
        assert_eq!(options.transition_type.as_deref(), Some("wipe"));
        assert_eq!(options.transition_step, Some(90));
        assert_eq!(options.transition_fps, Some(60));
    }

    #[test]
    fn test_config_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config_content = r#"
            [playback]
            interval = "15s"
            random = true
            sponsors = false

            [folders]
            photos = "/srv/photos"
            sponsors = "/srv/sponsors"

            [gallery]
            monitor = 1

            [video]
            player = "vlc"
        "#;

        fs::write(&config_path, config_content).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.playback.interval, Duration::from_secs(15));
        assert!(config.playback.random);
        assert!(!config.playback_settings().sponsors_enabled);
        assert_eq!(config.folders.photos, Some(PathBuf::from("/srv/photos")));
        assert_eq!(config.folders.sponsors, Some(PathBuf::from("/srv/sponsors")));
        assert_eq!(config.gallery.monitor, Some(1));
        assert_eq!(config.video.player, "vlc");
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        match Config::load_from_path(&config_path).unwrap_err() {
            GalleryError::Config(ConfigError::FileRead { .. }) => {},
            _ => panic!("Expected ConfigError::FileRead"),
        }
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");

        let invalid_content = r#"
            [playback]
            interval = "invalid"
        "#;

        fs::write(&config_path, invalid_content).unwrap();

        match Config::load_from_path(&config_path).unwrap_err() {
            GalleryError::Config(ConfigError::TomlParse { .. }) => {},
            _ => panic!("Expected ConfigError::TomlParse"),
        }
    }

    #[test]
    fn test_config_load_rejects_invalid_values() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[playback]\ninterval = \"0s\"\n").unwrap();

        match Config::load_from_path(&config_path).unwrap_err() {
            GalleryError::Config(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "playback.interval");
            }
            _ => panic!("Expected ConfigError::InvalidValue"),
        }
    }
}
