use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("detector block length is zero at {sample_rate} Hz")]
    ZeroBlockLength { sample_rate: u32 },
    #[error("debounce run length must be at least 1")]
    ZeroRunLength,
    #[error("framer blank limit must be at least 1")]
    ZeroBlankLimit,
}

/// Thresholds and timing for the tone classifier.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum relative magnitude for a low-group bucket.
    pub low_threshold: f64,
    /// Minimum relative magnitude for a high-group bucket.
    pub high_threshold: f64,
    /// A bucket must exceed its group average by this factor.
    pub detect_factor: f64,
    /// Nominal tone duration, in seconds.
    pub tone_duration: f64,
    /// Blocks per nominal tone duration.
    pub splits: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            low_threshold: 1.0,
            high_threshold: 0.1,
            detect_factor: 2.5,
            tone_duration: 0.10,
            splits: 4,
        }
    }
}

impl DetectorConfig {
    pub fn block_length(&self, sample_rate: u32) -> Result<usize, ConfigError> {
        if self.splits == 0 {
            return Err(ConfigError::ZeroBlockLength { sample_rate });
        }

        // Integer division first, then scale by the tone duration and truncate.
        let block_length = ((sample_rate / self.splits) as f64 * self.tone_duration) as usize;
        if block_length == 0 {
            return Err(ConfigError::ZeroBlockLength { sample_rate });
        }

        Ok(block_length)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    pub run_length: usize,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            run_length: 3,
        }
    }
}

impl DebounceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.run_length == 0 {
            return Err(ConfigError::ZeroRunLength);
        }
        Ok(())
    }
}

/// How the message framer counts blank symbols towards the end of a message.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlankPolicy {
    /// Blanks accumulate over the whole message.
    Cumulative,
    /// Any key resets the blank count, so only trailing blanks end a message.
    Trailing,
}

impl Default for BlankPolicy {
    fn default() -> Self {
        BlankPolicy::Cumulative
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FramerConfig {
    pub blank_limit: usize,
    pub blank_policy: BlankPolicy,
}

impl Default for FramerConfig {
    fn default() -> Self {
        Self {
            blank_limit: 5,
            blank_policy: BlankPolicy::default(),
        }
    }
}

impl FramerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blank_limit == 0 {
            return Err(ConfigError::ZeroBlankLimit);
        }
        Ok(())
    }
}

/// Timing for rendering a message as audio. Durations are in seconds.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub sample_rate: u32,
    pub amplitude: f32,
    pub tone_duration: f64,
    pub gap_duration: f64,
    pub silence_duration: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 8000,
            amplitude: 0.5,
            tone_duration: 0.10,
            gap_duration: 0.05,
            silence_duration: 0.5,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub debounce: DebounceConfig,
    pub framer: FramerConfig,
    pub generator: GeneratorConfig,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would stall the decoder. The detector block
    /// length depends on the input sample rate, so it is checked when the
    /// classifier is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.debounce.validate()?;
        self.framer.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_length_is_a_quarter_tone() {
        let config = DetectorConfig::default();
        assert_eq!(config.block_length(8000).unwrap(), 200);
        assert_eq!(config.block_length(44100).unwrap(), 1102);
        assert_eq!(config.block_length(48000).unwrap(), 1200);
    }

    #[test]
    fn zero_block_length_rejected() {
        let config = DetectorConfig::default();
        assert!(matches!(config.block_length(30), Err(ConfigError::ZeroBlockLength { sample_rate: 30 })));

        let config = DetectorConfig { splits: 0, ..DetectorConfig::default() };
        assert!(config.block_length(8000).is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(r#"
            [detector]
            detect_factor = 3.0

            [framer]
            blank_policy = "trailing"
        "#).unwrap();

        assert_eq!(config.detector.detect_factor, 3.0);
        assert_eq!(config.detector.low_threshold, 1.0);
        assert_eq!(config.framer.blank_policy, BlankPolicy::Trailing);
        assert_eq!(config.framer.blank_limit, 5);
        assert_eq!(config.debounce.run_length, 3);
        assert_eq!(config.generator.sample_rate, 8000);
    }

    #[test]
    fn empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.framer.blank_policy, BlankPolicy::Cumulative);
        assert_eq!(config.detector.splits, 4);
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r2d2.toml");
        fs::write(&path, "[debounce]\nrun_length = 2\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.debounce.run_length, 2);

        assert!(matches!(Config::from_file(dir.path().join("missing.toml")), Err(ConfigError::Io(_))));
    }

    #[test]
    fn zero_counts_rejected() {
        assert!(matches!(Config::from_toml("[debounce]\nrun_length = 0\n"), Err(ConfigError::ZeroRunLength)));
        assert!(matches!(Config::from_toml("[framer]\nblank_limit = 0\n"), Err(ConfigError::ZeroBlankLimit)));
        assert!(Config::from_toml("[debounce]\nrun_length = 1\n[framer]\nblank_limit = 1\n").is_ok());
    }
}
