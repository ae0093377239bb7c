use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::buffer::audio::{AudioBuffer, ChannelMask, ChannelStore};
use crate::buffer::sample::Sample;
use crate::error::{ConfigError, ControlError};
use crate::graph::module::AudioModule;
use crate::graph::processable::{AudioProcessable, ProcessCtx, ProcessFault};
use crate::param::ParameterHandle;

/*
Audio Processor
===============

The processor owns a chain of modules and runs them in series over one
working buffer, like a row of effects pedals:

  [module 0] ──→ [module 1] ──→ ... ──→ [module n-1] ──→ output

Each module processes the buffer in place; what it leaves behind is what the
next one sees. Registration order is processing order.

Fault Recovery
--------------

A block always completes. After every module:

  1. A returned ProcessFault zero-fills the channels it names.
  2. Any channel still holding NaN or infinity is zero-filled too, so one
     bad module cannot poison the rest of the chain (or the speakers).

Both are counted in ProcessorStatus, a set of atomics the control side can
poll without ever blocking the audio thread.

Control Surface
---------------

Every parameter of every module is reachable by the key "module.param".
The surface holds cloned handles only; setting a value is one atomic store.
*/

const NO_MODULE: usize = usize::MAX;

/// Fault and progress counters written by the audio thread.
///
/// All fields are atomics with relaxed ordering. Read them from any thread.
#[derive(Debug)]
pub struct ProcessorStatus {
    faults: AtomicU64,
    last_module: AtomicUsize,
    last_mask: AtomicU64,
    non_finite: AtomicU64,
    blocks: AtomicU64,
}

/// Plain copy of [`ProcessorStatus`] at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Faults returned by modules.
    pub faults: u64,
    /// Index of the module that faulted most recently.
    pub last_module: Option<usize>,
    /// Channels silenced by the most recent fault or non-finite check.
    pub last_mask: ChannelMask,
    /// Channels silenced because they held NaN or infinity.
    pub non_finite: u64,
    pub blocks: u64,
}

impl ProcessorStatus {
    fn new() -> Self {
        Self {
            faults: AtomicU64::new(0),
            last_module: AtomicUsize::new(NO_MODULE),
            last_mask: AtomicU64::new(0),
            non_finite: AtomicU64::new(0),
            blocks: AtomicU64::new(0),
        }
    }

    #[inline]
    fn record_fault(&self, module: usize, channels: ChannelMask) {
        self.faults.fetch_add(1, Ordering::Relaxed);
        self.mark(module, channels);
    }

    #[inline]
    fn record_non_finite(&self, module: usize, channels: ChannelMask) {
        self.non_finite
            .fetch_add(channels.count() as u64, Ordering::Relaxed);
        self.mark(module, channels);
    }

    #[inline]
    fn mark(&self, module: usize, channels: ChannelMask) {
        self.last_module.store(module, Ordering::Relaxed);
        self.last_mask.store(channels.bits(), Ordering::Relaxed);
    }

    #[inline]
    fn finish_block(&self) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    /// Read and reset the fault counter.
    pub fn take_faults(&self) -> u64 {
        self.faults.swap(0, Ordering::Relaxed)
    }

    pub fn blocks_processed(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let last_module = self.last_module.load(Ordering::Relaxed);
        StatusSnapshot {
            faults: self.faults.load(Ordering::Relaxed),
            last_module: (last_module != NO_MODULE).then_some(last_module),
            last_mask: ChannelMask::from_bits(self.last_mask.load(Ordering::Relaxed)),
            non_finite: self.non_finite.load(Ordering::Relaxed),
            blocks: self.blocks.load(Ordering::Relaxed),
        }
    }

    /// Drain the fault counter and log a warning if anything went wrong since
    /// the previous call. For the control thread; returns the drained count.
    pub fn log_faults(&self) -> u64 {
        let faults = self.take_faults();
        if faults > 0 {
            let snapshot = self.snapshot();
            warn!(
                "{faults} processing fault(s); last in module {:?} on channels {:#x}",
                snapshot.last_module,
                snapshot.last_mask.bits()
            );
        }
        faults
    }
}

/// Parameter handles of a processor, keyed `"module.param"`.
#[derive(Debug, Clone, Default)]
pub struct ControlSurface {
    handles: BTreeMap<String, ParameterHandle>,
}

impl ControlSurface {
    /// Request a new value for the named parameter.
    pub fn set(&self, name: &str, value: f32) -> Result<(), ControlError> {
        self.handle(name)
            .map(|handle| handle.set(value))
            .ok_or_else(|| ControlError::UnknownParameter(name.to_string()))
    }

    /// Value the audio thread last published for the named parameter.
    pub fn current(&self, name: &str) -> Option<f32> {
        self.handle(name).map(ParameterHandle::current)
    }

    pub fn handle(&self, name: &str) -> Option<&ParameterHandle> {
        self.handles.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.handles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Ordered module chain with its own working buffer.
pub struct AudioProcessor<T, const CHANNELS: usize, const LEN: usize, S = [T; LEN]>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    modules: Vec<AudioModule<T, CHANNELS, LEN, S>>,
    buffer: AudioBuffer<T, CHANNELS, LEN, S>,
    sample_rate: f32,
    block_index: u64,
    status: Arc<ProcessorStatus>,
}

impl<T, const CHANNELS: usize, const LEN: usize, S> AudioProcessor<T, CHANNELS, LEN, S>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    pub fn new(sample_rate: f32) -> Self {
        Self {
            modules: Vec::new(),
            buffer: AudioBuffer::new(),
            sample_rate,
            block_index: 0,
            status: Arc::new(ProcessorStatus::new()),
        }
    }

    /// Append a module to the end of the chain.
    pub fn add_module(&mut self, mut module: AudioModule<T, CHANNELS, LEN, S>) -> Result<(), ConfigError> {
        if self.module(module.name()).is_some() {
            return Err(ConfigError::DuplicateModule(module.name().to_string()));
        }
        module.prepare(self.sample_rate);
        debug!(
            "registered module '{}' at position {} ({} parameters)",
            module.name(),
            self.modules.len(),
            module.parameters().len()
        );
        self.modules.push(module);
        Ok(())
    }

    pub fn with_module(mut self, module: AudioModule<T, CHANNELS, LEN, S>) -> Result<Self, ConfigError> {
        self.add_module(module)?;
        Ok(self)
    }

    pub fn module(&self, name: &str) -> Option<&AudioModule<T, CHANNELS, LEN, S>> {
        self.modules.iter().find(|m| m.name() == name)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Change the sample rate and re-prepare every module. Control rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        for module in &mut self.modules {
            module.prepare(sample_rate);
        }
    }

    /// The working buffer: input before [`process`](Self::process), output
    /// after.
    pub fn buffer(&self) -> &AudioBuffer<T, CHANNELS, LEN, S> {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut AudioBuffer<T, CHANNELS, LEN, S> {
        &mut self.buffer
    }

    pub fn status(&self) -> Arc<ProcessorStatus> {
        Arc::clone(&self.status)
    }

    /// Handles for every registered parameter. Build after registration;
    /// modules added later are not included.
    pub fn control_surface(&self) -> ControlSurface {
        let mut handles = BTreeMap::new();
        for module in &self.modules {
            for handle in module.handles() {
                handles.insert(format!("{}.{}", module.name(), handle.name()), handle);
            }
        }
        ControlSurface { handles }
    }

    /// Run the chain over the working buffer.
    pub fn process(&mut self) {
        Self::run_chain(
            &mut self.modules,
            &mut self.buffer,
            self.sample_rate,
            self.block_index,
            &self.status,
        );
        self.block_index = self.block_index.wrapping_add(1);
    }

    /// Run the chain over an external buffer.
    pub fn process_block(&mut self, buffer: &mut AudioBuffer<T, CHANNELS, LEN, S>) {
        Self::run_chain(
            &mut self.modules,
            buffer,
            self.sample_rate,
            self.block_index,
            &self.status,
        );
        self.block_index = self.block_index.wrapping_add(1);
    }

    /// Drop module state and snap parameters to their targets.
    pub fn reset(&mut self) {
        for module in &mut self.modules {
            module.reset();
        }
        self.buffer.clear();
    }

    fn run_chain(
        modules: &mut [AudioModule<T, CHANNELS, LEN, S>],
        buffer: &mut AudioBuffer<T, CHANNELS, LEN, S>,
        sample_rate: f32,
        block_index: u64,
        status: &ProcessorStatus,
    ) {
        let ctx = ProcessCtx::new(sample_rate, block_index);
        for (index, module) in modules.iter_mut().enumerate() {
            if let Err(fault) = module.process(buffer, &ctx) {
                buffer.silence_mask(fault.channels);
                status.record_fault(index, fault.channels);
            }
            let poisoned = buffer.non_finite_mask();
            if !poisoned.is_empty() {
                buffer.silence_mask(poisoned);
                status.record_non_finite(index, poisoned);
            }
        }
        status.finish_block();
    }
}

impl<T, const CHANNELS: usize, const LEN: usize, S> AudioProcessable<T, CHANNELS, LEN, S>
    for AudioProcessor<T, CHANNELS, LEN, S>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    fn process(
        &mut self,
        buffer: &mut AudioBuffer<T, CHANNELS, LEN, S>,
        _ctx: &ProcessCtx<'_>,
    ) -> Result<(), ProcessFault> {
        self.process_block(buffer);
        Ok(())
    }

    fn prepare(&mut self, sample_rate: f32) {
        self.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        AudioProcessor::reset(self);
    }
}

impl<T, const CHANNELS: usize, const LEN: usize, S> std::fmt::Debug
    for AudioProcessor<T, CHANNELS, LEN, S>
where
    T: Sample,
    S: ChannelStore<T, LEN>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioProcessor")
            .field("modules", &self.modules)
            .field("sample_rate", &self.sample_rate)
            .field("block_index", &self.block_index)
            .finish_non_exhaustive()
    }
}
