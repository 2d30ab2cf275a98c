pub mod app;
pub mod script_view;
pub mod transport;
