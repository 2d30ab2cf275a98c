use crate::error::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;
pub const DEFAULT_CHANNELS: u16 = 1;
/// Floor weight added to every line so short or empty lines still get reading time.
pub const DEFAULT_BASE_WEIGHT: f64 = 5.0;
pub const DEFAULT_RATE_STEPS: [f64; 5] = [0.8, 1.0, 1.15, 1.25, 1.5];

/// Tunables for the player. Every field has a default, so a settings file only needs
/// to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Sample rate of the incoming PCM waveform, in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count of the incoming PCM waveform.
    pub channels: u16,
    pub base_weight: f64,
    /// Ordered playback rates cycled by `cycle_rate`.
    pub rate_steps: Vec<f64>,
    pub initial_rate: f64,
    /// Step used by the skip back / skip forward controls.
    pub skip_seconds: f64,
    /// A resume request this close to the end restarts the track from zero.
    pub restart_threshold: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            base_weight: DEFAULT_BASE_WEIGHT,
            rate_steps: DEFAULT_RATE_STEPS.to_vec(),
            initial_rate: 1.0,
            skip_seconds: 5.0,
            restart_threshold: 0.1,
        }
    }
}

impl PlayerSettings {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 || self.channels == 0 {
            return Err(PlayerError::InvalidSettings(format!(
                "PCM format must be non-zero, got {} Hz / {} channels",
                self.sample_rate, self.channels
            )));
        }
        if self.rate_steps.is_empty() {
            return Err(PlayerError::InvalidSettings(
                "rate_steps must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .rate_steps
            .iter()
            .chain(std::iter::once(&self.initial_rate))
            .find(|rate| !rate.is_finite() || **rate <= 0.0)
        {
            return Err(PlayerError::InvalidSettings(format!(
                "playback rates must be positive, got {bad}"
            )));
        }
        if self.base_weight.is_nan() || self.base_weight < 0.0 {
            return Err(PlayerError::InvalidSettings(format!(
                "base_weight must be non-negative, got {}",
                self.base_weight
            )));
        }
        Ok(())
    }

    /// Save the settings to a JSON file at the given path.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| PlayerError::io(path, e))
    }

    /// Load and validate settings from a JSON file at the given path.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<PlayerSettings> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| PlayerError::io(path, e))?;
        let settings: PlayerSettings = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = PlayerSettings {
            skip_seconds: 10.0,
            ..PlayerSettings::default()
        };
        settings.save_to_file(&path).unwrap();

        let loaded = PlayerSettings::load_from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: PlayerSettings = serde_json::from_str(r#"{ "sample_rate": 16000 }"#).unwrap();
        assert_eq!(settings.sample_rate, 16000);
        assert_eq!(settings.channels, 1);
        assert_eq!(settings.rate_steps, DEFAULT_RATE_STEPS.to_vec());
        assert_eq!(settings.base_weight, 5.0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "rate_steps": [] }"#).unwrap();
        assert!(matches!(
            PlayerSettings::load_from_file(&path),
            Err(PlayerError::InvalidSettings(_))
        ));

        let settings = PlayerSettings {
            rate_steps: vec![1.0, -0.5],
            ..PlayerSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = PlayerSettings {
            channels: 0,
            ..PlayerSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = PlayerSettings::load_from_file("/definitely/not/here.json");
        assert!(matches!(result, Err(PlayerError::Io { .. })));
    }
}
