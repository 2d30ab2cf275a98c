/// Decoded, normalized audio for one track.
///
/// Samples are interleaved when `channels > 1`. A buffer is never mutated after
/// decoding; loading a new track replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl SampleBuffer {
    /// Callers guarantee `samples.len()` is a multiple of `channels` and both format values are non-zero.
    pub(crate) fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        debug_assert!(sample_rate > 0 && channels > 0);
        debug_assert_eq!(samples.len() % channels as usize, 0);
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// All samples from `time` (seconds) to the end, snapped down to a frame boundary.
    pub fn samples_from(&self, time: f64) -> &[f32] {
        let frame = (time.max(0.0) * self.sample_rate as f64) as usize;
        let start = frame.min(self.frame_count()) * self.channels as usize;
        &self.samples[start..]
    }

    /// Samples of one channel, de-interleaved.
    pub fn channel(&self, index: u16) -> impl Iterator<Item = f32> + '_ {
        self.samples
            .iter()
            .skip(index as usize)
            .step_by(self.channels as usize)
            .copied()
    }
}
