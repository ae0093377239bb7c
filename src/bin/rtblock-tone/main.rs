//! rtblock-tone - plays a saturated sine through the default output device
//!
//! Run with: RUST_LOG=info cargo run --features cpal-backend -- [frequency]

use std::thread;
use std::time::Duration;

use color_eyre::eyre::{eyre, WrapErr};
use log::info;

use rtblock::{
    AudioContext, AudioDriver, AudioModule, AudioProcessor, CpalDriver, DriverConfig, Gain,
    Shaper, SineOscillator, DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_RATE,
};

const CHANNELS: usize = 2;
const SECONDS: u64 = 6;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let frequency: f32 = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .wrap_err_with(|| format!("invalid frequency: {arg}"))?,
        None => 220.0,
    };

    let processor = AudioProcessor::<f32, CHANNELS, DEFAULT_BLOCK_SIZE>::new(DEFAULT_SAMPLE_RATE as f32)
        .with_module(
            AudioModule::new("osc", SineOscillator::new(frequency))
                .with_parameter(SineOscillator::frequency_parameter(frequency))?
                .with_parameter(SineOscillator::amplitude_parameter(0.5))?,
        )?
        .with_module(
            AudioModule::new("drive", Shaper::tanh())
                .with_parameter(Shaper::drive_parameter(1.0))?,
        )?
        .with_module(AudioModule::new("out", Gain).with_parameter(Gain::parameter(0.0))?)?;

    let controls = processor.control_surface();
    let context = AudioContext::new(processor);

    let config = DriverConfig {
        volume: Some(0.8),
        ..Default::default()
    };
    let handle = CpalDriver::new(config).start(context)?;
    info!(
        "playing {frequency} Hz for {SECONDS}s at {} Hz",
        handle.sample_rate()
    );

    // Fade in, then push the drive up once per second.
    controls.set("out.gain", 1.0)?;
    let mut faults = 0;
    for second in 0..SECONDS {
        thread::sleep(Duration::from_secs(1));
        let drive = 1.0 + second as f32 * 3.0;
        controls.set("drive.drive", drive)?;
        info!(
            "drive {drive:.1}, blocks {}",
            handle.status().blocks_processed()
        );
        faults += handle.status().log_faults();
    }

    controls.set("out.gain", 0.0)?;
    thread::sleep(Duration::from_millis(200));

    faults += handle.status().log_faults();
    handle.stop();

    if faults > 0 {
        return Err(eyre!("{faults} processing faults during playback"));
    }
    Ok(())
}
