use crate::error::{PlayerError, Result};
use crate::ops::highlight::HighlightTracker;
use crate::ops::seek_ops;
use crate::playback::clock::TickOutcome;
use crate::playback::engine::PlaybackEngine;
use crate::playback::events::PlayerEvent;
use crate::playback::output::AudioOutput;
use crate::types::script::{DialogueLine, ScriptBundle};
use crate::types::settings::PlayerSettings;
use crate::types::timeline::LineTimeline;
use log::debug;
use std::time::Instant;

/// What a host drives: one engine, the script being played, its estimated line
/// windows and the current highlight.
///
/// Windows are rebuilt in full whenever the duration becomes known or the script
/// changes. Every engine event passes through here before the host sees it.
pub struct DialoguePlayer<O: AudioOutput> {
    engine: PlaybackEngine<O>,
    lines: Vec<DialogueLine>,
    timeline: LineTimeline,
    highlight: HighlightTracker,
    events: Vec<PlayerEvent>,
}

impl<O: AudioOutput> DialoguePlayer<O> {
    pub fn new(output: O, settings: PlayerSettings) -> Self {
        Self {
            engine: PlaybackEngine::new(output, settings),
            lines: Vec::new(),
            timeline: LineTimeline::new(),
            highlight: HighlightTracker::new(),
            events: Vec::new(),
        }
    }

    pub fn engine(&self) -> &PlaybackEngine<O> {
        &self.engine
    }

    pub fn lines(&self) -> &[DialogueLine] {
        &self.lines
    }

    pub fn timeline(&self) -> &LineTimeline {
        &self.timeline
    }

    pub fn highlighted_line(&self) -> Option<usize> {
        self.highlight.current()
    }

    pub fn ensure_ready(&mut self) -> Result<()> {
        self.engine.ensure_ready()
    }

    /// Replaces the script and rebuilds the line windows.
    pub fn set_script(&mut self, lines: Vec<DialogueLine>) {
        self.lines = lines;
        self.rebuild_timeline();
        self.highlight.clear();
        self.highlight.update(&self.timeline, self.engine.current_time());
    }

    pub fn load_audio(&mut self, bytes: &[u8]) -> Result<f64> {
        let result = self.engine.load(bytes);
        self.sync();
        result
    }

    /// Loads a generated dialogue: script first, then its waveform.
    pub fn load_bundle(&mut self, bundle: ScriptBundle) -> Result<f64> {
        self.set_script(bundle.lines);
        let result = self.engine.load_base64(&bundle.audio_base64);
        self.sync();
        result
    }

    pub fn play(&mut self, from: Option<f64>) -> Result<()> {
        let result = self.engine.play(from);
        self.sync();
        result
    }

    pub fn toggle_play(&mut self) -> Result<()> {
        let result = self.engine.toggle_play();
        self.sync();
        result
    }

    pub fn stop(&mut self, to_zero: bool) {
        self.engine.stop(to_zero);
        self.sync();
    }

    pub fn seek(&mut self, time: f64) -> Result<f64> {
        let result = self.engine.seek(time);
        self.sync();
        result
    }

    pub fn scrub_to(&mut self, fraction: f64) -> Result<f64> {
        let result = seek_ops::scrub_to(&mut self.engine, fraction);
        self.sync();
        result
    }

    pub fn skip_back(&mut self) -> Result<f64> {
        let result = seek_ops::skip_back(&mut self.engine);
        self.sync();
        result
    }

    pub fn skip_forward(&mut self) -> Result<f64> {
        let result = seek_ops::skip_forward(&mut self.engine);
        self.sync();
        result
    }

    /// Jumps to the estimated start of a clicked line.
    pub fn click_line(&mut self, index: usize) -> Result<Option<f64>> {
        let result = seek_ops::seek_to_line(&mut self.engine, &self.timeline, index);
        self.sync();
        result
    }

    pub fn cycle_rate(&mut self) -> f64 {
        self.engine.cycle_rate()
    }

    /// Per-frame hook: delivers the pending clock tick, if any.
    pub fn tick(&mut self, now: Instant) -> Option<TickOutcome> {
        let outcome = self.engine.tick_pending(now);
        self.sync();
        outcome
    }

    /// The output failure that stopped playback, if one is waiting to be shown.
    pub fn take_output_error(&mut self) -> Option<PlayerError> {
        self.engine.take_output_error()
    }

    /// Events observed since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    fn rebuild_timeline(&mut self) {
        self.timeline = LineTimeline::estimate(
            &self.lines,
            self.engine.duration(),
            self.engine.settings().base_weight,
        );
        debug!(
            "Estimated {} line windows over {:.2}s",
            self.timeline.len(),
            self.timeline.duration()
        );
    }

    fn sync(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                PlayerEvent::DurationReady(_) => {
                    self.rebuild_timeline();
                    self.highlight.clear();
                }
                PlayerEvent::TimeUpdate(time) => {
                    self.highlight.update(&self.timeline, time);
                }
                PlayerEvent::PlayStart | PlayerEvent::PlayEnd => {}
            }
            self.events.push(event);
        }
        if !self.engine.has_track() && !self.timeline.is_empty() {
            self.timeline = LineTimeline::new();
            self.highlight.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::engine::testing::{RecordingOutput, silence};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use std::time::Duration;

    fn script() -> Vec<DialogueLine> {
        vec![
            DialogueLine::new("A", "a".repeat(10)),
            DialogueLine::new("B", "a".repeat(20)),
            DialogueLine::new("A", "a".repeat(5)),
        ]
    }

    fn player() -> DialoguePlayer<RecordingOutput> {
        let (output, _) = RecordingOutput::new();
        let mut player = DialoguePlayer::new(output, PlayerSettings::default());
        player.ensure_ready().unwrap();
        player
    }

    #[test]
    fn test_windows_appear_once_duration_is_known() {
        let mut player = player();
        player.set_script(script());
        assert!(player.timeline().is_empty());

        player.load_audio(&silence(60.0)).unwrap();
        let starts: Vec<f64> = player.timeline().windows().iter().map(|w| w.start).collect();
        assert_eq!(starts, vec![0.0, 18.0, 48.0]);
    }

    #[test]
    fn test_script_change_rebuilds_windows() {
        let mut player = player();
        player.load_audio(&silence(60.0)).unwrap();
        assert!(player.timeline().is_empty());

        player.set_script(script());
        assert_eq!(player.timeline().len(), 3);
        player.set_script(vec![DialogueLine::new("A", "x")]);
        assert_eq!(player.timeline().len(), 1);
        assert_eq!(player.timeline().windows()[0].end, 60.0);
    }

    #[test]
    fn test_highlight_follows_playback() {
        let mut player = player();
        player.set_script(script());
        player.load_audio(&silence(60.0)).unwrap();

        let t0 = Instant::now();
        player.play(None).unwrap();
        player.tick(t0);
        assert_eq!(player.highlighted_line(), None);
        player.tick(t0 + Duration::from_secs(20));
        assert_eq!(player.highlighted_line(), Some(1));

        player.click_line(2).unwrap();
        assert_eq!(player.highlighted_line(), Some(2));

        player.stop(true);
        assert_eq!(player.highlighted_line(), None);
    }

    #[test]
    fn test_bundle_load_and_events() {
        let mut player = player();
        let bundle = ScriptBundle {
            title: "test".to_string(),
            lines: script(),
            audio_base64: BASE64.encode(silence(6.0)),
        };
        assert_eq!(player.load_bundle(bundle).unwrap(), 6.0);
        assert_eq!(player.drain_events(), vec![PlayerEvent::DurationReady(6.0)]);
        assert_eq!(player.timeline().len(), 3);
        assert!(player.drain_events().is_empty());
    }

    #[test]
    fn test_failed_load_clears_windows() {
        let mut player = player();
        player.set_script(script());
        player.load_audio(&silence(60.0)).unwrap();
        assert!(!player.timeline().is_empty());

        assert!(matches!(player.load_audio(&[]), Err(PlayerError::Decode(_))));
        assert!(player.timeline().is_empty());
        assert_eq!(player.click_line(0).unwrap(), None);
    }
}
