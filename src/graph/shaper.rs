use std::sync::Arc;

use crate::buffer::audio::{AudioBuffer, ChannelStore};
use crate::buffer::sample::Sample;
use crate::dsp::distortion::{hard_clip, soft_clip, tanh_table, TANH_TABLE_SIZE};
use crate::dsp::lookup::LookupTable;
use crate::graph::processable::{AudioProcessable, ProcessCtx, ProcessFault};
use crate::param::ParamSpec;

/*
Shaper
======

Saturation stage. Each sample is pushed through a transfer curve after being
multiplied by the drive parameter:

    output = curve(input × drive)

Curves
------

Tanh:  Smooth analog-style saturation, read from a lookup table.
Soft:  x / (1 + |x|). Cheaper, gentler shoulder.
Hard:  Clamp at ±1. Buzzy, odd harmonics.

Drive (parameter 0, [1, 20]):
  1     = nearly clean for quiet input
  3-5   = warm
  10+   = heavy
*/

/// Transfer curve of a [`Shaper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaperCurve {
    #[default]
    Tanh,
    Soft,
    Hard,
}

pub struct Shaper {
    curve: ShaperCurve,
    table: Arc<LookupTable<TANH_TABLE_SIZE>>,
}

impl Shaper {
    pub const DRIVE: &'static str = "drive";

    /// Builds the tanh table; control rate only.
    pub fn new(curve: ShaperCurve) -> Self {
        Self::with_table(curve, Arc::new(tanh_table()))
    }

    pub fn tanh() -> Self {
        Self::new(ShaperCurve::Tanh)
    }

    pub fn with_table(curve: ShaperCurve, table: Arc<LookupTable<TANH_TABLE_SIZE>>) -> Self {
        Self { curve, table }
    }

    pub fn drive_parameter(default: f32) -> ParamSpec {
        ParamSpec::new(Self::DRIVE, 1.0, 20.0, default)
    }

    pub fn curve(&self) -> ShaperCurve {
        self.curve
    }

    #[inline]
    fn shape(&self, x: f32, drive: f32) -> f32 {
        match self.curve {
            ShaperCurve::Tanh => self.table.eval(x * drive),
            ShaperCurve::Soft => soft_clip(x, drive),
            ShaperCurve::Hard => hard_clip(x, drive, 1.0),
        }
    }
}

impl<T, const CHANNELS: usize, const LEN: usize, S> AudioProcessable<T, CHANNELS, LEN, S> for Shaper
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    fn process(
        &mut self,
        buffer: &mut AudioBuffer<T, CHANNELS, LEN, S>,
        ctx: &ProcessCtx<'_>,
    ) -> Result<(), ProcessFault> {
        let drive = ctx.param(0);
        for channel in buffer.channels_mut() {
            for (i, sample) in channel.iter_mut().enumerate() {
                let d = drive.map_or(1.0, |p| p.interpolated_at(i + 1));
                *sample = T::from_f32(self.shape(sample.to_f32(), d));
            }
        }
        Ok(())
    }
}
