use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, StreamConfig};
use log::{error, info, warn};

use super::{AudioContext, AudioDriver, DriverHandle};
use crate::config::DriverConfig;
use crate::error::{DriverError, Result};

/// Output driver on top of the host's default audio API.
#[derive(Debug, Clone, Default)]
pub struct CpalDriver {
    config: DriverConfig,
}

impl CpalDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn open_device(&self, host: &cpal::Host) -> Result<cpal::Device, DriverError> {
        match &self.config.device {
            Some(wanted) => host
                .output_devices()
                .map_err(|e| DriverError::DeviceNotFound(e.to_string()))?
                .find(|device| device.name().map(|name| name == *wanted).unwrap_or(false))
                .ok_or_else(|| DriverError::DeviceNotFound(wanted.clone())),
            None => host.default_output_device().ok_or(DriverError::NoDevice),
        }
    }
}

impl AudioDriver for CpalDriver {
    fn start<const CHANNELS: usize, const LEN: usize>(
        self,
        mut context: AudioContext<CHANNELS, LEN>,
    ) -> Result<DriverHandle> {
        self.config.validate_for(CHANNELS)?;

        let host = cpal::default_host();
        let device = self.open_device(&host)?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".into());
        info!("using audio device: {device_name}");

        let supported = device
            .default_output_config()
            .map_err(|e| DriverError::ConfigQuery(e.to_string()))?;
        let sample_rate = supported.sample_rate();
        if sample_rate.0 != self.config.sample_rate {
            info!(
                "device runs at {} Hz, requested {} Hz",
                sample_rate.0, self.config.sample_rate
            );
        }
        context.configure(&self.config, sample_rate.0);

        let format = supported.sample_format();
        let native_depth = match format {
            SampleFormat::F32 => 32,
            SampleFormat::I16 => 16,
            other => return Err(DriverError::UnsupportedFormat(format!("{other:?}")).into()),
        };
        if native_depth != self.config.bit_depth {
            warn!(
                "requested {}-bit output, device format is {format:?}",
                self.config.bit_depth
            );
        }

        let stream_config = StreamConfig {
            channels: CHANNELS as u16,
            sample_rate,
            buffer_size: BufferSize::Default,
        };

        let volume = context.volume_handle();
        let status = context.status();
        let on_error = |err: cpal::StreamError| error!("audio stream error: {err}");

        let stream = if format == SampleFormat::I16 {
            device.build_output_stream(
                &stream_config,
                move |data: &mut [i16], _| context.render_interleaved_i16(data),
                on_error,
                None,
            )
        } else {
            device.build_output_stream(
                &stream_config,
                move |data: &mut [f32], _| context.render_interleaved(None, data),
                on_error,
                None,
            )
        }
        .map_err(|e| DriverError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| DriverError::StreamPlay(e.to_string()))?;

        info!(
            "audio stream started: {CHANNELS} channels at {} Hz, {LEN}-frame blocks, {format:?}",
            sample_rate.0
        );

        Ok(DriverHandle::new(
            Box::new(stream),
            sample_rate.0,
            CHANNELS,
            volume,
            status,
        ))
    }
}
