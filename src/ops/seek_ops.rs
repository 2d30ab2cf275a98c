use crate::error::Result;
use crate::playback::engine::PlaybackEngine;
use crate::playback::output::AudioOutput;
use crate::types::timeline::LineTimeline;

/// Seeks to the start of line `index`.
///
/// Returns the new offset, or `None` when the line has no window (unknown duration
/// or index out of range), in which case nothing happens. While playing the session
/// restarts at the line; while paused only the offset moves.
pub fn seek_to_line<O: AudioOutput>(
    engine: &mut PlaybackEngine<O>,
    timeline: &LineTimeline,
    index: usize,
) -> Result<Option<f64>> {
    let Some(window) = timeline.window(index) else {
        return Ok(None);
    };
    engine.seek(window.start).map(Some)
}

/// Seeks to a fraction of the track, as reported by a scrub bar. Clamped to `[0, 1]`.
pub fn scrub_to<O: AudioOutput>(engine: &mut PlaybackEngine<O>, fraction: f64) -> Result<f64> {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    engine.seek(fraction * engine.duration())
}

/// Skips back by the configured step.
pub fn skip_back<O: AudioOutput>(engine: &mut PlaybackEngine<O>) -> Result<f64> {
    let step = engine.settings().skip_seconds;
    engine.skip(-step)
}

/// Skips forward by the configured step.
pub fn skip_forward<O: AudioOutput>(engine: &mut PlaybackEngine<O>) -> Result<f64> {
    let step = engine.settings().skip_seconds;
    engine.skip(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::engine::testing::{ready_engine, silence};

    fn timeline() -> LineTimeline {
        // Weights 15, 25, 10 over 60s: [0,18) [18,48) [48,60)
        let lines = vec!["a".repeat(10), "a".repeat(20), "a".repeat(5)];
        LineTimeline::estimate(&lines, 60.0, 5.0)
    }

    #[test]
    fn test_seek_to_line_while_paused() {
        let (mut engine, log) = ready_engine();
        engine.load(&silence(60.0)).unwrap();
        let timeline = timeline();

        assert_eq!(seek_to_line(&mut engine, &timeline, 1).unwrap(), Some(18.0));
        assert_eq!(engine.current_time(), 18.0);
        assert!(!engine.is_playing());
        assert!(log.borrow().started.is_empty());
    }

    #[test]
    fn test_seek_to_line_while_playing_restarts_session() {
        let (mut engine, log) = ready_engine();
        engine.load(&silence(60.0)).unwrap();
        let timeline = timeline();
        engine.play(None).unwrap();

        assert_eq!(seek_to_line(&mut engine, &timeline, 2).unwrap(), Some(48.0));
        assert!(engine.is_playing());
        let log = log.borrow();
        assert_eq!(log.started.len(), 2);
        assert_eq!(log.started[1].offset, 48.0);
        assert_eq!(log.live_runs, 1);
    }

    #[test]
    fn test_seek_to_missing_line_is_noop() {
        let (mut engine, _) = ready_engine();
        engine.load(&silence(60.0)).unwrap();
        engine.seek(7.0).unwrap();

        assert_eq!(seek_to_line(&mut engine, &timeline(), 3).unwrap(), None);
        assert_eq!(seek_to_line(&mut engine, &LineTimeline::new(), 0).unwrap(), None);
        assert_eq!(engine.current_time(), 7.0);
    }

    #[test]
    fn test_scrub_and_skip() {
        let (mut engine, _) = ready_engine();
        engine.load(&silence(20.0)).unwrap();

        assert_eq!(scrub_to(&mut engine, 0.5).unwrap(), 10.0);
        assert_eq!(skip_forward(&mut engine).unwrap(), 15.0);
        assert_eq!(skip_forward(&mut engine).unwrap(), 20.0);
        assert_eq!(skip_back(&mut engine).unwrap(), 15.0);
        assert_eq!(scrub_to(&mut engine, -1.0).unwrap(), 0.0);
        assert_eq!(scrub_to(&mut engine, 4.0).unwrap(), 20.0);
    }
}
