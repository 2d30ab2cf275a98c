use crate::types::playback_state::PlaybackState;
use crate::types::session::SessionId;
use log::debug;
use std::time::Instant;

/// Handle for one scheduled tick. Only the most recently scheduled token is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    session: SessionId,
    seq: u64,
}

impl TickToken {
    pub fn session(&self) -> SessionId {
        self.session
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Time advanced and another tick is scheduled.
    Advanced(f64),
    /// Time reached the end of the track and was clamped to `duration`.
    Ended(f64),
    /// The token was cancelled or superseded; nothing changed.
    Discarded,
    /// The output failed mid-run and the session was stopped at this time. Produced by
    /// the engine, never by the clock itself.
    Faulted(f64),
}

/// Cooperative per-frame playback clock.
///
/// Elapsed time is derived from wall-clock deltas between ticks scaled by the current
/// rate. There is no thread here: the host calls `tick` once per frame with the token
/// returned by `pending`.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    state: PlaybackState,
    duration: f64,
    last_tick: Option<Instant>,
    pending: Option<TickToken>,
    seq: u64,
}

impl PlaybackClock {
    pub fn new(rate: f64) -> Self {
        Self {
            state: PlaybackState {
                playback_rate: rate,
                ..PlaybackState::new()
            },
            duration: 0.0,
            last_tick: None,
            pending: None,
            seq: 0,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_time(&self) -> f64 {
        self.state.playhead
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn rate(&self) -> f64 {
        self.state.playback_rate
    }

    pub fn pending(&self) -> Option<TickToken> {
        self.pending
    }

    /// New track: halts the clock and rewinds to zero.
    pub fn reset(&mut self, duration: f64) {
        self.halt();
        self.duration = duration.max(0.0);
        self.state.playhead = 0.0;
    }

    /// Begins accumulating from `offset` for `session`. The first tick after a start
    /// has no previous timestamp and advances by zero.
    pub fn start(&mut self, session: SessionId, offset: f64) {
        self.cancel();
        self.state.playhead = offset.clamp(0.0, self.duration);
        self.state.is_playing = true;
        self.last_tick = None;
        self.schedule(session);
    }

    /// Stops accumulating and cancels any pending tick.
    pub fn halt(&mut self) {
        self.cancel();
        self.state.is_playing = false;
        self.last_tick = None;
    }

    /// Cancels the pending tick without touching the playing flag.
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            debug!("Cancelled tick {} of session {}", token.seq, token.session);
        }
    }

    /// Accumulates the time elapsed since the last tick at the current rate, without
    /// consuming the pending token. No-op before the first tick of a session.
    pub fn commit(&mut self, now: Instant) {
        if !self.state.is_playing {
            return;
        }
        let Some(last) = self.last_tick else {
            return;
        };
        let delta = now.saturating_duration_since(last).as_secs_f64();
        self.state.playhead = (self.state.playhead + delta * self.state.playback_rate).min(self.duration);
        self.last_tick = Some(now);
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.state.playback_rate = rate;
    }

    /// Moves the playhead without changing the playing flag. Clamped to `[0, duration]`.
    pub fn set_playhead(&mut self, time: f64) -> f64 {
        self.state.playhead = time.clamp(0.0, self.duration);
        self.state.playhead
    }

    pub fn tick(&mut self, token: TickToken, now: Instant) -> TickOutcome {
        if self.pending != Some(token) || !self.state.is_playing {
            return TickOutcome::Discarded;
        }
        self.pending = None;

        let delta = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f64(),
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.state.playhead += delta * self.state.playback_rate;

        if self.state.playhead >= self.duration {
            self.state.playhead = self.duration;
            return TickOutcome::Ended(self.duration);
        }

        self.schedule(token.session);
        TickOutcome::Advanced(self.state.playhead)
    }

    fn schedule(&mut self, session: SessionId) {
        if !self.state.is_playing {
            return;
        }
        self.seq += 1;
        self.pending = Some(TickToken {
            session,
            seq: self.seq,
        });
    }
}
