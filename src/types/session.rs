use std::fmt;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One live one-shot playback run.
///
/// Sessions are never resumed: any play or seek while playing destroys the current
/// session and creates a new one. Only `rate` may change during the run's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub id: SessionId,
    pub start_offset: f64,
    pub rate: f64,
    pub started_at: Instant,
}

impl PlaybackSession {
    pub fn new(start_offset: f64, rate: f64, started_at: Instant) -> Self {
        PlaybackSession {
            id: SessionId::new(),
            start_offset,
            rate,
            started_at,
        }
    }
}
