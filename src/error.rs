//! Error types for rtblock.
//!
//! Errors are split by the context they surface in:
//! - **Control-rate errors** ([`ConfigError`], [`ControlError`], [`DriverError`]):
//!   returned to the caller that configures or drives the core.
//! - **Audio-rate faults** ([`ProcessFault`](crate::ProcessFault)): plain `Copy`
//!   values resolved inside the processor by substituting silence. They never
//!   reach a caller as an [`Error`].
//!
//! [`BufferError`] sits in between: it is returned by bounds-checked buffer
//! accessors and is cheap enough to inspect on the audio thread.

/// Bounds violations on an [`AudioBuffer`](crate::AudioBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The channel index is not below the channel count.
    #[error("channel {channel} out of range (buffer has {channels} channels)")]
    OutOfRange {
        /// Requested channel.
        channel: usize,
        /// Channel count of the buffer.
        channels: usize,
    },

    /// A block write did not carry exactly one block of samples.
    #[error("block length mismatch: expected {expected} samples, got {actual}")]
    LengthMismatch {
        /// Block length of the buffer.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },
}

/// Invalid configuration detected while building the processing graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A parameter was declared without a name.
    #[error("parameter name must not be empty")]
    EmptyName,

    /// `min` is greater than `max`.
    #[error("parameter '{name}': min {min} is greater than max {max}")]
    InvalidRange { name: String, min: f64, max: f64 },

    /// The default value lies outside `[min, max]`.
    #[error("parameter '{name}': default {default} outside [{min}, {max}]")]
    DefaultOutOfRange {
        name: String,
        default: f64,
        min: f64,
        max: f64,
    },

    /// Smoothing time is negative or not finite.
    #[error("parameter '{name}': invalid smoothing time {smoothing_ms} ms")]
    InvalidSmoothing { name: String, smoothing_ms: f32 },

    /// Two parameters on one module share a name.
    #[error("module '{module}' already has a parameter named '{name}'")]
    DuplicateParameter { module: String, name: String },

    /// Two modules in one processor share a name.
    #[error("processor already has a module named '{0}'")]
    DuplicateModule(String),

    /// A lookup table was asked to cover an empty or inverted range.
    #[error("lookup table range [{min}, {max}) is empty")]
    InvalidTableRange { min: f32, max: f32 },

    /// Sample rate must be positive.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// A device needs at least one channel.
    #[error("invalid channel count: {0}")]
    InvalidChannelCount(usize),

    /// Channel count does not match what the processor was built for.
    #[error("channel count mismatch: processor has {expected}, device has {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    /// Only 16-bit integer and 32-bit float output are supported.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    /// Master volume must lie in `[0, 1]`.
    #[error("volume {0} outside [0, 1]")]
    InvalidVolume(f32),
}

/// Failures of the control surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControlError {
    /// No parameter is registered under this identifier.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
}

/// Failures of the hardware boundary.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// No output device could be opened.
    #[error("no audio output device found")]
    NoDevice,

    /// The requested device name is not present.
    #[error("audio device not found: {0}")]
    DeviceNotFound(String),

    /// Querying the device configuration failed.
    #[error("failed to get device config: {0}")]
    ConfigQuery(String),

    /// Building the output stream failed.
    #[error("failed to build audio stream: {0}")]
    StreamBuild(String),

    /// Starting the output stream failed.
    #[error("failed to start audio stream: {0}")]
    StreamPlay(String),

    /// The device's native sample format is not handled.
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Top-level error for control-rate operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Result type for control-rate operations.
pub type Result<T> = std::result::Result<T, Error>;
