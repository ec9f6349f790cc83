//! Runtime configuration

use std::path::Path;

use ocula_core::{OculaError, OculaResult};
use ocula_face::{BlinkConfig, JitterConfig};
use serde::{Deserialize, Serialize};

use crate::LogFormat;

/// Which external tracker feeds [`ocula_face::TrackerSample`]s.
/// Chosen once here; the frame loop only ever sees plain samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerBackend {
    #[default]
    None,
    IFacialMocap,
    Waidayo,
}

impl TrackerBackend {
    pub fn is_enabled(self) -> bool {
        self != TrackerBackend::None
    }
}

/// OCULA session configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub blink: BlinkConfig,
    pub jitter: JitterConfig,
    /// Upper bound on one frame's delta time (seconds)
    pub max_frame_delta: f32,
    pub tracker_backend: TrackerBackend,
    /// Capacity of the inbound command channel
    pub command_queue_size: usize,
    pub log_format: LogFormat,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            blink: BlinkConfig::default(),
            jitter: JitterConfig::default(),
            max_frame_delta: 0.1,
            tracker_backend: TrackerBackend::None,
            command_queue_size: 64,
            log_format: LogFormat::Pretty,
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> OculaResult<()> {
        self.blink.validate()?;
        self.jitter.validate()?;
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(OculaError::InvalidConfig(format!(
                "max_frame_delta must be positive, got {}",
                self.max_frame_delta
            )));
        }
        if self.command_queue_size == 0 {
            return Err(OculaError::InvalidConfig(
                "command_queue_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> OculaResult<Self> {
        let config: RuntimeConfig = serde_json::from_str(json)
            .map_err(|e| OculaError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> OculaResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Clamp a measured frame delta into `[0, max_frame_delta]`
    pub fn clamp_frame_delta(&self, dt: f32) -> f32 {
        if dt.is_nan() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_frame_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RuntimeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = RuntimeConfig::from_json_str(
            r#"{ "blink": { "eye_map_min": 0.1 }, "tracker_backend": "i_facial_mocap" }"#,
        )
        .unwrap();
        assert_eq!(config.blink.eye_map_min, 0.1);
        assert_eq!(config.blink.eye_map_max, 0.8);
        assert_eq!(config.jitter, JitterConfig::default());
        assert_eq!(config.tracker_backend, TrackerBackend::IFacialMocap);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            RuntimeConfig::from_json_str(r#"{ "blink": { "eye_map_min": 0.9 } }"#),
            Err(OculaError::InvalidConfig(_))
        ));
        assert!(RuntimeConfig::from_json_str("{ nope").is_err());
        assert!(RuntimeConfig::from_json_str(r#"{ "max_frame_delta": 0 }"#).is_err());
    }

    #[test]
    fn test_oversized_jitter_range_rejected() {
        let json = r#"{ "jitter": { "range_y_deg": 3.4e38 } }"#;
        assert!(matches!(
            RuntimeConfig::from_json_str(json),
            Err(OculaError::InvalidConfig(_))
        ));
        assert!(RuntimeConfig::from_json_str(r#"{ "jitter": { "range_x_deg": 45.0 } }"#).is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = RuntimeConfig::load("/nonexistent/ocula.json").unwrap_err();
        assert!(matches!(err, OculaError::Io(_)));
    }

    #[test]
    fn test_clamp_frame_delta() {
        let config = RuntimeConfig::default();
        assert_eq!(config.clamp_frame_delta(2.0), 0.1);
        assert_eq!(config.clamp_frame_delta(-0.5), 0.0);
        assert_eq!(config.clamp_frame_delta(f32::NAN), 0.0);
        assert_eq!(config.clamp_frame_delta(0.016), 0.016);
    }
}
