pub mod playback_state;
pub mod sample_buffer;
pub mod script;
pub mod session;
pub mod settings;
pub mod timeline;
