pub mod clock;
pub mod decoder;
pub mod engine;
pub mod events;
pub mod gst_output;
pub mod output;
