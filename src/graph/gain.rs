use crate::buffer::audio::{AudioBuffer, ChannelStore};
use crate::buffer::sample::Sample;
use crate::dsp::amplify::{apply_gain, apply_gain_ramp};
use crate::graph::processable::{AudioProcessable, ProcessCtx, ProcessFault};
use crate::param::ParamSpec;

/// Multiplies every channel by the module's parameter 0.
///
/// While the parameter is ramping the gain is interpolated per sample, so a
/// volume change never steps mid-block. Without a parameter the gain is 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gain;

impl Gain {
    pub const PARAM: &'static str = "gain";

    /// Linear gain in `[0, 2]`.
    pub fn parameter(default: f32) -> ParamSpec {
        ParamSpec::new(Self::PARAM, 0.0, 2.0, default)
    }
}

impl<T, const CHANNELS: usize, const LEN: usize, S> AudioProcessable<T, CHANNELS, LEN, S> for Gain
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    fn process(
        &mut self,
        buffer: &mut AudioBuffer<T, CHANNELS, LEN, S>,
        ctx: &ProcessCtx<'_>,
    ) -> Result<(), ProcessFault> {
        let Some(gain) = ctx.param(0) else {
            return Ok(());
        };

        if gain.is_constant_over_block() {
            let value = gain.get();
            for channel in buffer.channels_mut() {
                apply_gain(channel, value);
            }
        } else {
            for channel in buffer.channels_mut() {
                apply_gain_ramp(channel, |i| gain.interpolated_at(i + 1));
            }
        }
        Ok(())
    }
}
