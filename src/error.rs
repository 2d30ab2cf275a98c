use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a raw waveform into a `SampleBuffer`.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The byte buffer was empty.
    #[error("audio buffer is empty")]
    Empty,

    /// The buffer held bytes but not a single complete frame.
    #[error("audio buffer of {bytes} bytes holds no complete {channels}-channel frame")]
    NoFrames { bytes: usize, channels: u16 },

    /// Sample rate or channel count was zero.
    #[error("invalid PCM format: {sample_rate} Hz, {channels} channels")]
    InvalidFormat { sample_rate: u32, channels: u16 },

    /// The base64 payload could not be decoded.
    #[error("invalid base64 audio payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Why a `play` request could not start a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotReadyReason {
    /// No track has been loaded, or the last load failed.
    NoTrack,
    /// The audio output has not been resumed with `ensure_ready`.
    OutputSuspended,
}

impl fmt::Display for NotReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotReadyReason::NoTrack => write!(f, "no track loaded"),
            NotReadyReason::OutputSuspended => write!(f, "audio output is suspended"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The platform refused to resume audio output. The host should offer a manual
    /// "enable audio" action; this is never retried automatically.
    #[error("audio playback blocked: {0}")]
    PlaybackBlocked(String),

    #[error("player not ready: {0}")]
    NotReady(NotReadyReason),

    /// The output backend failed while building or driving a playback run.
    #[error("audio output error: {0}")]
    Output(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlayerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlayerError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
