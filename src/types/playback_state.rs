/// Clock-visible playback state. `playhead` stays within `[0, duration]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub playhead: f64,
    pub is_playing: bool,
    pub playback_rate: f64,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self {
            playhead: 0.0,
            is_playing: false,
            playback_rate: 1.0,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

/// Position within the fixed, ordered set of playback rates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRate {
    steps: Vec<f64>,
    index: usize,
}

impl PlaybackRate {
    /// Starts at `initial` if it is one of `steps`, otherwise at the step closest to 1.0.
    pub fn new(steps: Vec<f64>, initial: f64) -> Self {
        let steps = if steps.is_empty() { vec![1.0] } else { steps };
        let index = steps
            .iter()
            .position(|step| (step - initial).abs() < f64::EPSILON)
            .unwrap_or_else(|| closest_index(&steps, 1.0));
        Self { steps, index }
    }

    pub fn value(&self) -> f64 {
        self.steps[self.index]
    }

    /// Advances to the next step, wrapping from the last back to the first.
    pub fn cycle(&mut self) -> f64 {
        self.index = (self.index + 1) % self.steps.len();
        self.value()
    }

    pub fn steps(&self) -> &[f64] {
        &self.steps
    }
}

fn closest_index(steps: &[f64], target: f64) -> usize {
    steps
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
