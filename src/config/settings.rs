//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Missing keys fall back to their defaults, so a partial `settings.toml`
//! is valid.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Connection settings for the chandas identification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Whether `--analyze` may contact the service at all.
    pub enabled: bool,
    /// Base URL; the client appends `/chandas/identify`.
    pub base_url: String,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8000".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Start playing as soon as the audio is loaded.
    pub autoplay: bool,
    /// How often the engine position is polled, in milliseconds.
    pub tick_interval_ms: u64,
    /// Clock multiplier for the silent engine (1.0 = real time).
    pub playback_rate: f64,
    /// Directory used to resolve a verse's relative `audio` reference.
    /// `None` means relative to the verse file.
    pub audio_dir: Option<PathBuf>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            tick_interval_ms: 50,
            playback_rate: 1.0,
            audio_dir: None,
        }
    }
}

impl PlaybackConfig {
    /// Resolve a verse's audio reference against `audio_dir`, or against the
    /// directory holding the verse file when none is configured.
    pub fn resolve_audio(&self, verse_path: &Path, audio: &str) -> PathBuf {
        let audio = Path::new(audio);
        if audio.is_absolute() {
            return audio.to_path_buf();
        }
        match &self.audio_dir {
            Some(dir) => dir.join(audio),
            None => verse_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(audio),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

/// Terminal presentation settings.  Colours are ANSI SGR parameter strings
/// such as `"1;33"` (bold yellow).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Syllables per pattern group (8 = one anuṣṭubh quarter).
    pub group_size: usize,
    /// Emit ANSI colour escapes.
    pub colour: bool,
    pub heavy_colour: String,
    pub light_colour: String,
    pub unclassified_colour: String,
    /// Style of the highlighted word during playback.
    pub active_colour: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            group_size: 8,
            colour: true,
            heavy_colour: "1;33".into(),
            light_colour: "36".into(),
            unclassified_colour: "2".into(),
            active_colour: "7".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use chandas_karaoke::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub playback: PlaybackConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let mut original = AppConfig::default();
        original.playback.audio_dir = Some(PathBuf::from("/srv/recitations"));
        original.render.colour = false;
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("deeper").join("settings.toml");
        AppConfig::default().save_to(&path).expect("save");
        assert!(path.exists());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[analysis]\nbase_url = \"http://chandas.local\"\n").unwrap();

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.analysis.base_url, "http://chandas.local");
        assert_eq!(config.analysis.timeout_secs, 30);
        assert_eq!(config.playback, PlaybackConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[render\ngroup_size = ").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert!(cfg.analysis.enabled);
        assert_eq!(cfg.analysis.base_url, "http://localhost:8000");
        assert_eq!(cfg.playback.tick_interval_ms, 50);
        assert_eq!(cfg.playback.playback_rate, 1.0);
        assert!(cfg.playback.audio_dir.is_none());
        assert_eq!(cfg.render.group_size, 8);
        assert!(cfg.render.colour);
    }

    #[test]
    fn audio_resolves_next_to_verse() {
        let cfg = PlaybackConfig::default();
        let resolved = cfg.resolve_audio(Path::new("verses/gayatri.json"), "gayatri.mp3");
        assert_eq!(resolved, Path::new("verses").join("gayatri.mp3"));
    }

    #[test]
    fn audio_resolves_against_audio_dir() {
        let cfg = PlaybackConfig {
            audio_dir: Some(PathBuf::from("/srv/audio")),
            ..PlaybackConfig::default()
        };
        let resolved = cfg.resolve_audio(Path::new("verses/gayatri.json"), "gayatri.mp3");
        assert_eq!(resolved, PathBuf::from("/srv/audio/gayatri.mp3"));
    }

    #[test]
    fn absolute_audio_is_kept() {
        let cfg = PlaybackConfig {
            audio_dir: Some(PathBuf::from("/srv/audio")),
            ..PlaybackConfig::default()
        };
        let resolved = cfg.resolve_audio(Path::new("v.json"), "/tmp/x.mp3");
        assert_eq!(resolved, PathBuf::from("/tmp/x.mp3"));
    }
}
