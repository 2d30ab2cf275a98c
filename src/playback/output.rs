use crate::error::Result;
use crate::types::sample_buffer::SampleBuffer;
use std::sync::Arc;

/// An audio output that can only start one-shot runs from an offset.
///
/// There is no pause or seek on a run: the engine stops the run and starts a new one.
/// The output may come up suspended; `ensure_ready` must succeed before `start`.
pub trait AudioOutput {
    type Run: OutputRun;

    /// Resumes the output if it is suspended. Idempotent.
    fn ensure_ready(&mut self) -> Result<()>;

    fn is_ready(&self) -> bool;

    /// Starts playing `buffer` from `offset` seconds at `rate`.
    fn start(&mut self, buffer: Arc<SampleBuffer>, offset: f64, rate: f64) -> Result<Self::Run>;
}

/// A live one-shot playback run.
pub trait OutputRun {
    /// Changes the rate of the running playback in place.
    fn set_rate(&mut self, rate: f64) -> Result<()>;

    /// Stops the run. Calling it again is a no-op.
    fn stop(&mut self);

    /// Surfaces a failure the backend raised while the run was playing.
    fn check(&mut self) -> Result<()> {
        Ok(())
    }
}
