//! Playback and line-timeline synchronization for synthesized dialogue audio.
//!
//! A speech synthesizer hands back one waveform for a whole dialogue with no per-line
//! timestamps. This crate decodes that waveform, plays it through an output that only
//! supports one-shot runs from an offset, keeps its own playback clock, and estimates
//! which line is being spoken from text length alone.

pub mod error;
pub mod ops;
pub mod playback;
pub mod player;
pub mod types;
pub mod ui;
