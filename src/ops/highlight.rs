use crate::types::timeline::LineTimeline;

/// Tracks which line the host should show as active.
///
/// Time zero clears the highlight. A time inside a window selects that line. A time
/// that falls in no window (past the last rounded `end`, or exactly at the end of the
/// track) keeps whatever was highlighted before, so the final line stays lit when
/// playback finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightTracker {
    current: Option<usize>,
}

impl HighlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Feeds a time update. Returns `true` when the highlighted line changed.
    pub fn update(&mut self, timeline: &LineTimeline, time: f64) -> bool {
        let next = if time == 0.0 {
            None
        } else {
            match timeline.active_line_at(time) {
                Some(index) => Some(index),
                None => self.current,
            }
        };
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> LineTimeline {
        let lines = vec!["a".repeat(10), "a".repeat(20), "a".repeat(5)];
        LineTimeline::estimate(&lines, 60.0, 5.0)
    }

    #[test]
    fn test_follows_time_and_reports_changes() {
        let timeline = timeline();
        let mut tracker = HighlightTracker::new();

        assert!(!tracker.update(&timeline, 0.0));
        assert!(tracker.update(&timeline, 1.0));
        assert_eq!(tracker.current(), Some(0));
        assert!(!tracker.update(&timeline, 10.0));
        assert!(tracker.update(&timeline, 18.0));
        assert_eq!(tracker.current(), Some(1));
    }

    #[test]
    fn test_end_of_track_keeps_last_line() {
        let timeline = timeline();
        let mut tracker = HighlightTracker::new();
        tracker.update(&timeline, 59.9);
        assert!(!tracker.update(&timeline, 60.0));
        assert_eq!(tracker.current(), Some(2));
    }

    #[test]
    fn test_reset_to_zero_clears() {
        let timeline = timeline();
        let mut tracker = HighlightTracker::new();
        tracker.update(&timeline, 30.0);
        assert!(tracker.update(&timeline, 0.0));
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn test_no_windows_keeps_nothing_highlighted() {
        let mut tracker = HighlightTracker::new();
        assert!(!tracker.update(&LineTimeline::new(), 5.0));
        assert_eq!(tracker.current(), None);
    }
}
