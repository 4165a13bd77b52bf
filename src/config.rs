//! Runtime configuration, loadable from JSON

use crate::driver::{ColorDepth, DEFAULT_BRIGHTNESS, MAX_BRIGHTNESS};
use crate::expression::presets::PresetOptions;
use crate::expression::{EyelidPreset, HighlightStyle};
use crate::particles::DEFAULT_PARTICLE_COUNT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeConfig {
    pub color_depth: ColorDepth,
    /// 0..=10
    pub brightness: u8,
    pub highlight: HighlightStyle,
    pub particle_count: usize,
    pub seed: u64,
    /// Full expression cycles to play; 0 loops until stopped
    pub cycles: u32,
    pub stage_pause_ms: u64,
    pub blink_eyelid: EyelidPreset,
    pub squint_eyelid: EyelidPreset,
}

impl Default for EyeConfig {
    fn default() -> Self {
        Self {
            color_depth: ColorDepth::Rgb444,
            brightness: DEFAULT_BRIGHTNESS,
            highlight: HighlightStyle::Star,
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed: 0x1CD_E7E5,
            cycles: 0,
            stage_pause_ms: 1000,
            blink_eyelid: EyelidPreset::BLINK,
            squint_eyelid: EyelidPreset::SQUINT,
        }
    }
}

impl EyeConfig {
    /// Save config to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: EyeConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.brightness > MAX_BRIGHTNESS {
            return Err(ConfigError::Invalid(format!(
                "brightness {} exceeds {}",
                self.brightness, MAX_BRIGHTNESS
            )));
        }
        if self.particle_count == 0 {
            return Err(ConfigError::Invalid("particle_count must be at least 1".into()));
        }
        for (name, lid) in [("blink_eyelid", &self.blink_eyelid), ("squint_eyelid", &self.squint_eyelid)] {
            if !(0.0..1.0).contains(&lid.bridge_threshold) {
                return Err(ConfigError::Invalid(format!(
                    "{name}.bridge_threshold must be in [0, 1)"
                )));
            }
            if lid.height_scale <= 0.0 || lid.curve_weight <= 0.0 || lid.x_weight <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name}: height_scale, curve_weight and x_weight must be positive"
                )));
            }
        }
        Ok(())
    }

    pub fn preset_options(&self) -> PresetOptions {
        PresetOptions {
            highlight: self.highlight,
            blink: self.blink_eyelid,
            squint: self.squint_eyelid,
            stage_pause_ms: self.stage_pause_ms,
        }
    }
}
