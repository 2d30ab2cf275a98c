use crate::error::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What the timeline estimator needs from a dialogue line: its spoken text.
pub trait ScriptLine {
    fn text(&self) -> &str;

    /// Length used for weighting, in Unicode scalar values.
    fn spoken_len(&self) -> usize {
        self.text().chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl DialogueLine {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        DialogueLine {
            speaker: speaker.into(),
            text: text.into(),
            translation: None,
        }
    }
}

impl ScriptLine for DialogueLine {
    fn text(&self) -> &str {
        &self.text
    }
}

impl ScriptLine for String {
    fn text(&self) -> &str {
        self
    }
}

impl ScriptLine for &str {
    fn text(&self) -> &str {
        self
    }
}

/// A generated dialogue as handed to the host: the script plus its single
/// base64-encoded PCM waveform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptBundle {
    #[serde(default)]
    pub title: String,
    pub lines: Vec<DialogueLine>,
    pub audio_base64: String,
}

impl ScriptBundle {
    /// Save the bundle to a JSON file at the given path.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| PlayerError::io(path, e))
    }

    /// Load a bundle from a JSON file at the given path.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<ScriptBundle> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| PlayerError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}
