use log::{debug, warn};

use crate::buffer::audio::{AudioBuffer, ChannelStore};
use crate::buffer::sample::Sample;
use crate::error::ConfigError;
use crate::graph::processable::{AudioProcessable, ProcessCtx, ProcessFault};
use crate::param::{AudioParameter, ParamSpec, ParameterHandle};

/*
Audio Module
============

A module is a named processing step: one processable plus the parameters
that drive it.

    AudioModule "filter"
      ├─ params:  [cutoff, resonance]      (declaration order = index order)
      └─ inner:   Box<dyn AudioProcessable>

Per block:

  1. Each parameter picks up any new target and steps its ramp by LEN samples
     (or jumps straight to the target when ramping is off).
  2. The processable runs with a context whose `params` slice is this module's
     parameters, so it reads `ctx.value_or(0, ..)` or per-sample
     `ctx.param(0)?.interpolated_at(i)`.

Parameters are declared up front with `with_parameter`; the list is never
resized once the module is registered with a processor.
*/

pub struct AudioModule<T, const CHANNELS: usize, const LEN: usize, S = [T; LEN]>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    name: String,
    params: Vec<AudioParameter<f32>>,
    inner: Box<dyn AudioProcessable<T, CHANNELS, LEN, S>>,
    ramping: bool,
}

impl<T, const CHANNELS: usize, const LEN: usize, S> AudioModule<T, CHANNELS, LEN, S>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    pub fn new(
        name: impl Into<String>,
        processable: impl AudioProcessable<T, CHANNELS, LEN, S> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            inner: Box::new(processable),
            ramping: true,
        }
    }

    /// Declare a parameter. Its index is the number of parameters declared
    /// before it.
    pub fn with_parameter(mut self, spec: ParamSpec<f32>) -> Result<Self, ConfigError> {
        if let Err(err) = spec.validate() {
            warn!("module '{}': rejected parameter spec: {err}", self.name);
            return Err(err);
        }
        if self.params.iter().any(|p| p.name() == spec.name) {
            return Err(ConfigError::DuplicateParameter {
                module: self.name.clone(),
                name: spec.name,
            });
        }
        debug!(
            "module '{}': parameter '{}' [{}, {}] default {}",
            self.name, spec.name, spec.min, spec.max, spec.default
        );
        self.params.push(AudioParameter::new(&spec));
        Ok(self)
    }

    /// Ramp parameters across each block (default) or jump to new targets.
    #[must_use]
    pub fn with_ramping(mut self, ramping: bool) -> Self {
        self.ramping = ramping;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ramping(&self) -> bool {
        self.ramping
    }

    /// Control-side handle for the named parameter.
    pub fn get_parameter(&self, name: &str) -> Option<ParameterHandle> {
        self.parameter(name).map(AudioParameter::handle)
    }

    pub fn parameter(&self, name: &str) -> Option<&AudioParameter<f32>> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn parameters(&self) -> &[AudioParameter<f32>] {
        &self.params
    }

    pub(crate) fn handles(&self) -> impl Iterator<Item = ParameterHandle> + '_ {
        self.params.iter().map(AudioParameter::handle)
    }

    /// Propagate the sample rate to parameter ramps and the processable.
    pub fn prepare(&mut self, sample_rate: f32) {
        for param in &mut self.params {
            param.prepare(sample_rate);
        }
        self.inner.prepare(sample_rate);
    }

    pub fn reset(&mut self) {
        for param in &mut self.params {
            param.jump();
        }
        self.inner.reset();
    }

    /// Advance parameters by one block, then run the processable.
    pub fn process(
        &mut self,
        buffer: &mut AudioBuffer<T, CHANNELS, LEN, S>,
        ctx: &ProcessCtx<'_>,
    ) -> Result<(), ProcessFault> {
        for param in &mut self.params {
            if self.ramping {
                param.advance(LEN);
            } else {
                param.jump();
            }
        }
        let ctx = ctx.with_params(&self.params);
        self.inner.process(buffer, &ctx)
    }
}

impl<T, const CHANNELS: usize, const LEN: usize, S> std::fmt::Debug
    for AudioModule<T, CHANNELS, LEN, S>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioModule")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("ramping", &self.ramping)
            .finish_non_exhaustive()
    }
}
