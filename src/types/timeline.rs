use crate::types::script::ScriptLine;
use serde::{Deserialize, Serialize};

/// The `[start, end)` interval, in seconds, attributed to one dialogue line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineWindow {
    pub start: f64,
    pub end: f64,
}

impl LineWindow {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Start-inclusive, end-exclusive.
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end
    }
}

/// Per-line windows estimated from text length alone.
///
/// The synthesizer returns one waveform with no per-line timestamps, so each line gets
/// a share of the total duration proportional to `chars + base_weight`. This is an
/// approximation with no acoustic signal behind it: lines with long pauses or unusual
/// pacing will drift. It is not forced alignment.
///
/// Windows are contiguous (`end[i] == start[i + 1]`), start at zero and end at the
/// total duration up to floating point rounding on the last `end`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineTimeline {
    windows: Vec<LineWindow>,
    duration: f64,
}

impl LineTimeline {
    pub fn new() -> Self {
        LineTimeline {
            windows: Vec::new(),
            duration: 0.0,
        }
    }

    /// Rebuilds every window from scratch. Empty when there are no lines or the
    /// duration is not yet known (zero, negative or non-finite).
    pub fn estimate<L: ScriptLine>(lines: &[L], total_duration: f64, base_weight: f64) -> Self {
        if lines.is_empty() || !total_duration.is_finite() || total_duration <= 0.0 {
            return LineTimeline::new();
        }

        let weights: Vec<f64> = lines
            .iter()
            .map(|line| line.spoken_len() as f64 + base_weight)
            .collect();
        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 {
            // Only reachable with base_weight == 0 and all-empty text.
            return LineTimeline::new();
        }

        let mut cursor = 0.0;
        let windows = weights
            .iter()
            .map(|weight| {
                let start = cursor;
                let end = start + (weight / total_weight) * total_duration;
                cursor = end;
                LineWindow { start, end }
            })
            .collect();

        LineTimeline {
            windows,
            duration: total_duration,
        }
    }

    pub fn windows(&self) -> &[LineWindow] {
        &self.windows
    }

    pub fn window(&self, index: usize) -> Option<&LineWindow> {
        self.windows.get(index)
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// The line being spoken at `time`, if any.
    ///
    /// `time == 0` means "not started / just reset" and yields `None`, not line 0.
    /// A time past the last window's `end` (including exactly `duration`) also yields
    /// `None`; callers decide whether to keep the previous highlight.
    pub fn active_line_at(&self, time: f64) -> Option<usize> {
        if time == 0.0 || !time.is_finite() {
            return None;
        }
        let index = self.windows.partition_point(|window| window.end <= time);
        self.windows
            .get(index)
            .filter(|window| window.contains(time))
            .map(|_| index)
    }
}
