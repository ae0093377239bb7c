//! Driver configuration.

use crate::error::ConfigError;
use crate::{DEFAULT_BIT_DEPTH, DEFAULT_SAMPLE_RATE};

/// Output bit depths the driver can convert to.
pub const SUPPORTED_BIT_DEPTHS: [u16; 2] = [16, 32];

/// How the driver should open the output device.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverConfig {
    /// Preferred sample rate in Hz. The device may override it.
    pub sample_rate: u32,
    /// Interleaved output channels.
    pub channels: usize,
    /// 16 for integer output, 32 for float output.
    pub bit_depth: u16,
    /// Output device name. `None` selects the host default.
    pub device: Option<String>,
    /// Master volume in `[0, 1]` applied when the stream starts. `None`
    /// keeps the volume already set on the context.
    pub volume: Option<f32>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 2,
            bit_depth: DEFAULT_BIT_DEPTH,
            device: None,
            volume: None,
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.channels == 0 {
            return Err(ConfigError::InvalidChannelCount(self.channels));
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&self.bit_depth) {
            return Err(ConfigError::UnsupportedBitDepth(self.bit_depth));
        }
        if let Some(volume) = self.volume {
            if !(0.0..=1.0).contains(&volume) {
                return Err(ConfigError::InvalidVolume(volume));
            }
        }
        Ok(())
    }

    /// [`validate`](Self::validate), plus a check that the channel count
    /// matches a processor built for `channels`.
    pub fn validate_for(&self, channels: usize) -> Result<(), ConfigError> {
        self.validate()?;
        if self.channels != channels {
            return Err(ConfigError::ChannelMismatch {
                expected: channels,
                actual: self.channels,
            });
        }
        Ok(())
    }
}
