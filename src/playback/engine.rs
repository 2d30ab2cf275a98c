use crate::error::{NotReadyReason, PlayerError, Result};
use crate::playback::clock::{PlaybackClock, TickOutcome, TickToken};
use crate::playback::decoder::{decode_base64, decode_pcm_s16le};
use crate::playback::events::{EventBus, PlayerEvent};
use crate::playback::output::{AudioOutput, OutputRun};
use crate::types::playback_state::PlaybackRate;
use crate::types::sample_buffer::SampleBuffer;
use crate::types::session::PlaybackSession;
use crate::types::settings::PlayerSettings;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// No buffer: nothing loaded yet, or the last load failed.
    Idle,
    /// Buffer loaded, not playing.
    Ready,
    Playing,
    /// Stopped at the end of the track after playing through.
    Ended,
}

struct LiveSession<R> {
    session: PlaybackSession,
    run: R,
}

/// Owns one decoded track and drives playback through an injected `AudioOutput`.
///
/// The output only supports one-shot runs, so play and seek-while-playing always tear
/// down the current run before starting a new one. Rate changes are the one mutation
/// applied to a live run in place.
pub struct PlaybackEngine<O: AudioOutput> {
    output: O,
    settings: PlayerSettings,
    buffer: Option<Arc<SampleBuffer>>,
    live: Option<LiveSession<O::Run>>,
    clock: PlaybackClock,
    rate: PlaybackRate,
    status: EngineStatus,
    load_failed: bool,
    output_error: Option<PlayerError>,
    events: EventBus,
}

impl<O: AudioOutput> PlaybackEngine<O> {
    pub fn new(output: O, settings: PlayerSettings) -> Self {
        let rate = PlaybackRate::new(settings.rate_steps.clone(), settings.initial_rate);
        Self {
            output,
            clock: PlaybackClock::new(rate.value()),
            rate,
            settings,
            buffer: None,
            live: None,
            status: EngineStatus::Idle,
            load_failed: false,
            output_error: None,
            events: EventBus::new(),
        }
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == EngineStatus::Playing
    }

    pub fn has_track(&self) -> bool {
        self.buffer.is_some()
    }

    /// Whether the most recent `load` failed.
    pub fn has_error(&self) -> bool {
        self.load_failed
    }

    pub fn duration(&self) -> f64 {
        self.clock.duration()
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn rate(&self) -> f64 {
        self.rate.value()
    }

    /// Takes the error that stopped the last session mid-run, if any.
    pub fn take_output_error(&mut self) -> Option<PlayerError> {
        self.output_error.take()
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.live.as_ref().map(|live| &live.session)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&PlayerEvent) + 'static) {
        self.events.subscribe(listener);
    }

    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.events.drain()
    }

    /// Resumes the audio output. Must succeed before the first `play`.
    pub fn ensure_ready(&mut self) -> Result<()> {
        self.output.ensure_ready()
    }

    /// Decodes `bytes` as the new track, replacing the old one.
    ///
    /// Any live session and pending tick are torn down first. On failure the engine is
    /// left without a track until the next successful load.
    pub fn load(&mut self, bytes: &[u8]) -> Result<f64> {
        self.teardown_session();
        self.buffer = None;
        self.clock.reset(0.0);
        self.status = EngineStatus::Idle;

        match decode_pcm_s16le(bytes, self.settings.sample_rate, self.settings.channels) {
            Ok(buffer) => {
                let duration = buffer.duration();
                info!(
                    "Loaded track: {} frames, {} Hz, {} ch, {duration:.2}s",
                    buffer.frame_count(),
                    buffer.sample_rate(),
                    buffer.channels()
                );
                self.buffer = Some(Arc::new(buffer));
                self.clock.reset(duration);
                self.status = EngineStatus::Ready;
                self.load_failed = false;
                self.events.emit(PlayerEvent::DurationReady(duration));
                Ok(duration)
            }
            Err(e) => {
                warn!("Audio decoding failed: {e}");
                self.load_failed = true;
                Err(e.into())
            }
        }
    }

    /// Decodes a base64 transport payload and loads it.
    pub fn load_base64(&mut self, payload: &str) -> Result<f64> {
        match decode_base64(payload) {
            Ok(bytes) => self.load(&bytes),
            Err(e) => {
                self.teardown_session();
                self.buffer = None;
                self.clock.reset(0.0);
                self.status = EngineStatus::Idle;
                self.load_failed = true;
                warn!("Audio payload rejected: {e}");
                Err(e.into())
            }
        }
    }

    /// Starts a new session from `from` seconds, or from the current offset when `None`.
    pub fn play(&mut self, from: Option<f64>) -> Result<()> {
        self.play_at(from, Instant::now())
    }

    pub fn play_at(&mut self, from: Option<f64>, now: Instant) -> Result<()> {
        let Some(buffer) = self.buffer.clone() else {
            return Err(PlayerError::NotReady(NotReadyReason::NoTrack));
        };
        if !self.output.is_ready() {
            return Err(PlayerError::NotReady(NotReadyReason::OutputSuspended));
        }

        self.teardown_session();

        let duration = self.clock.duration();
        let offset = clamp_time(from.unwrap_or(self.clock.current_time()), duration);
        let rate = self.rate.value();

        let run = match self.output.start(buffer, offset, rate) {
            Ok(run) => run,
            Err(e) => {
                error!("Failed to start playback at {offset:.3}s: {e}");
                self.clock.set_playhead(offset);
                self.status = EngineStatus::Ready;
                return Err(e);
            }
        };
        let session = PlaybackSession::new(offset, rate, now);
        debug!("Session {} started at {offset:.3}s, rate {rate}", session.id);
        self.clock.start(session.id, offset);
        self.live = Some(LiveSession { session, run });
        self.status = EngineStatus::Playing;
        self.events.emit(PlayerEvent::PlayStart);
        Ok(())
    }

    /// Stops playback. With `to_zero` the offset rewinds to zero and a `TimeUpdate(0)`
    /// is emitted; otherwise the offset is kept so a later `play(None)` resumes there.
    /// Stopping when nothing is playing only applies the rewind.
    pub fn stop(&mut self, to_zero: bool) {
        self.teardown_session();
        if self.buffer.is_some() && self.status != EngineStatus::Ended {
            self.status = EngineStatus::Ready;
        }
        if to_zero {
            self.clock.set_playhead(0.0);
            if self.buffer.is_some() {
                self.status = EngineStatus::Ready;
            }
            self.events.emit(PlayerEvent::TimeUpdate(0.0));
        }
    }

    /// Stops when playing, otherwise resumes. A resume from within `restart_threshold`
    /// of the end restarts from zero.
    pub fn toggle_play(&mut self) -> Result<()> {
        if self.is_playing() {
            self.stop(false);
            return Ok(());
        }
        let current = self.clock.current_time();
        if self.has_track() && current >= self.clock.duration() - self.settings.restart_threshold {
            self.play(Some(0.0))
        } else {
            self.play(None)
        }
    }

    /// Jumps to `time`, clamped to `[0, duration]`. While playing this restarts the
    /// session at the new offset; while paused it only moves the displayed offset.
    pub fn seek(&mut self, time: f64) -> Result<f64> {
        self.seek_at(time, Instant::now())
    }

    pub fn seek_at(&mut self, time: f64, now: Instant) -> Result<f64> {
        if self.buffer.is_none() {
            return Ok(self.clock.current_time());
        }
        self.clock.cancel();
        let target = self.clock.set_playhead(clamp_time(time, self.clock.duration()));
        self.events.emit(PlayerEvent::TimeUpdate(target));

        if self.is_playing() {
            self.play_at(Some(target), now)?;
        } else if self.status == EngineStatus::Ended && target < self.clock.duration() {
            self.status = EngineStatus::Ready;
        }
        Ok(target)
    }

    /// Seeks relative to the current offset.
    pub fn skip(&mut self, seconds: f64) -> Result<f64> {
        self.seek(self.clock.current_time() + seconds)
    }

    /// Advances to the next playback rate, applying it to the live run in place.
    pub fn cycle_rate(&mut self) -> f64 {
        self.cycle_rate_at(Instant::now())
    }

    /// Time elapsed up to `now` is committed at the old rate before the switch.
    pub fn cycle_rate_at(&mut self, now: Instant) -> f64 {
        let rate = self.rate.cycle();
        self.clock.commit(now);
        self.clock.set_rate(rate);
        if let Some(live) = self.live.as_mut() {
            live.session.rate = rate;
            if let Err(e) = live.run.set_rate(rate) {
                warn!("Rate change on session {} failed: {e}", live.session.id);
            }
        }
        debug!("Playback rate set to {rate}");
        rate
    }

    /// The tick the host should deliver next, if playback is running.
    pub fn pending_tick(&self) -> Option<TickToken> {
        self.clock.pending()
    }

    /// Delivers one scheduled tick. Ticks for a torn-down session are discarded.
    pub fn tick(&mut self, token: TickToken, now: Instant) -> TickOutcome {
        let live_matches = self
            .live
            .as_ref()
            .is_some_and(|live| live.session.id == token.session());
        if !live_matches {
            warn!("Discarded stale tick for session {}", token.session());
            return TickOutcome::Discarded;
        }

        if self.pending_tick() == Some(token) {
            let fault = self.live.as_mut().and_then(|live| live.run.check().err());
            if let Some(e) = fault {
                error!("Output failed during session {}: {e}", token.session());
                self.stop(false);
                self.output_error = Some(e);
                return TickOutcome::Faulted(self.clock.current_time());
            }
        }

        let outcome = self.clock.tick(token, now);
        match outcome {
            TickOutcome::Advanced(time) => self.events.emit(PlayerEvent::TimeUpdate(time)),
            TickOutcome::Ended(_) => {
                self.stop(false);
                self.status = EngineStatus::Ended;
                self.events.emit(PlayerEvent::PlayEnd);
            }
            TickOutcome::Discarded | TickOutcome::Faulted(_) => {}
        }
        outcome
    }

    /// Delivers the pending tick, if any.
    pub fn tick_pending(&mut self, now: Instant) -> Option<TickOutcome> {
        let token = self.pending_tick()?;
        Some(self.tick(token, now))
    }

    /// Stops the live run and cancels the pending tick. Safe to call repeatedly.
    fn teardown_session(&mut self) {
        self.clock.halt();
        if let Some(mut live) = self.live.take() {
            live.run.stop();
            debug!("Session {} torn down", live.session.id);
        }
    }
}

impl<O: AudioOutput> Drop for PlaybackEngine<O> {
    fn drop(&mut self) {
        self.teardown_session();
    }
}

fn clamp_time(time: f64, duration: f64) -> f64 {
    if time.is_nan() {
        return 0.0;
    }
    time.clamp(0.0, duration)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub struct StartedRun {
        pub offset: f64,
        pub rate: f64,
    }

    #[derive(Debug, Default)]
    pub struct OutputLog {
        pub started: Vec<StartedRun>,
        pub live_runs: usize,
        pub stops: usize,
        pub rate_changes: Vec<f64>,
        /// Raised by the next `check` on a live run.
        pub fault: Option<String>,
    }

    /// Records what the engine asks of the output instead of making sound.
    pub struct RecordingOutput {
        pub log: Rc<RefCell<OutputLog>>,
        pub ready: bool,
        pub block: bool,
    }

    impl RecordingOutput {
        pub fn new() -> (Self, Rc<RefCell<OutputLog>>) {
            let log = Rc::new(RefCell::new(OutputLog::default()));
            let output = RecordingOutput {
                log: log.clone(),
                ready: false,
                block: false,
            };
            (output, log)
        }
    }

    pub struct RecordingRun {
        log: Rc<RefCell<OutputLog>>,
        stopped: bool,
    }

    impl AudioOutput for RecordingOutput {
        type Run = RecordingRun;

        fn ensure_ready(&mut self) -> Result<()> {
            if self.block {
                return Err(PlayerError::PlaybackBlocked("autoplay policy".to_string()));
            }
            self.ready = true;
            Ok(())
        }

        fn is_ready(&self) -> bool {
            self.ready
        }

        fn start(&mut self, _buffer: Arc<SampleBuffer>, offset: f64, rate: f64) -> Result<RecordingRun> {
            let mut log = self.log.borrow_mut();
            log.started.push(StartedRun { offset, rate });
            log.live_runs += 1;
            Ok(RecordingRun {
                log: self.log.clone(),
                stopped: false,
            })
        }
    }

    impl OutputRun for RecordingRun {
        fn set_rate(&mut self, rate: f64) -> Result<()> {
            self.log.borrow_mut().rate_changes.push(rate);
            Ok(())
        }

        fn stop(&mut self) {
            if self.stopped {
                return;
            }
            self.stopped = true;
            let mut log = self.log.borrow_mut();
            log.live_runs -= 1;
            log.stops += 1;
        }

        fn check(&mut self) -> Result<()> {
            match self.log.borrow_mut().fault.take() {
                Some(message) => Err(PlayerError::Output(message)),
                None => Ok(()),
            }
        }
    }

    /// `seconds` of silent mono PCM at 24 kHz.
    pub fn silence(seconds: f64) -> Vec<u8> {
        vec![0u8; (seconds * 24_000.0) as usize * 2]
    }

    pub fn ready_engine() -> (PlaybackEngine<RecordingOutput>, Rc<RefCell<OutputLog>>) {
        let (output, log) = RecordingOutput::new();
        let mut engine = PlaybackEngine::new(output, PlayerSettings::default());
        engine.ensure_ready().unwrap();
        (engine, log)
    }
}
