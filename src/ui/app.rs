use crate::error::PlayerError;
use crate::playback::events::PlayerEvent;
use crate::playback::gst_output::GstAudioOutput;
use crate::player::DialoguePlayer;
use crate::types::script::ScriptBundle;
use crate::ui::script_view::script_panel;
use crate::ui::transport::{TransportBar, TransportEvent};
use eframe::egui;
use log::{error, info};
use std::path::Path;
use std::time::Instant;

pub struct AppState {
    pub player: DialoguePlayer<GstAudioOutput>,
    pub title: String,
    /// The platform refused to start audio; show the manual enable button.
    pub audio_blocked: bool,
    pub status_message: Option<String>,
}

pub struct RehearApp {
    pub state: AppState,
}

impl RehearApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn open_bundle(&mut self, path: &Path) {
        match ScriptBundle::load_from_file(path) {
            Ok(bundle) => {
                info!("Opened {}", path.display());
                self.state.title = bundle.title.clone();
                let result = self.state.player.load_bundle(bundle);
                self.report(result);
            }
            Err(e) => {
                error!("Failed to open {}: {e}", path.display());
                self.state.status_message = Some(e.to_string());
            }
        }
    }

    fn enable_audio(&mut self) {
        let result = self.state.player.ensure_ready();
        self.state.audio_blocked = result.is_err();
        self.report(result);
    }

    fn report<T>(&mut self, result: Result<T, PlayerError>) {
        match result {
            Ok(_) => self.state.status_message = None,
            Err(PlayerError::PlaybackBlocked(reason)) => {
                self.state.audio_blocked = true;
                self.state.status_message = Some(format!("Audio is blocked: {reason}"));
            }
            Err(e) => {
                error!("{e}");
                self.state.status_message = Some(e.to_string());
            }
        }
    }

    fn handle_transport(&mut self, event: TransportEvent) {
        let player = &mut self.state.player;
        let result = match event {
            TransportEvent::TogglePlay => player.toggle_play().map(|_| ()),
            TransportEvent::SkipBack => player.skip_back().map(|_| ()),
            TransportEvent::SkipForward => player.skip_forward().map(|_| ()),
            TransportEvent::CycleRate => {
                player.cycle_rate();
                Ok(())
            }
            TransportEvent::Scrubbed(time) => player.seek(time).map(|_| ()),
        };
        self.report(result);
    }
}

impl eframe::App for RehearApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // One clock tick per rendered frame while playing.
        self.state.player.tick(Instant::now());
        if let Some(e) = self.state.player.take_output_error() {
            self.report(Err::<(), _>(e));
        }
        let highlight_moved = self
            .state
            .player
            .drain_events()
            .iter()
            .any(|event| matches!(event, PlayerEvent::TimeUpdate(_) | PlayerEvent::PlayStart));
        if self.state.player.engine().is_playing() {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("transport_panel").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading(if self.state.title.is_empty() {
                    "Rehear"
                } else {
                    self.state.title.as_str()
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Open…").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Dialogue bundle", &["json"])
                            .pick_file()
                        {
                            self.open_bundle(&path);
                        }
                    }
                    if self.state.audio_blocked && ui.button("🔊 Enable audio").clicked() {
                        self.enable_audio();
                    }
                });
            });

            let engine = self.state.player.engine();
            if engine.has_error() {
                ui.colored_label(egui::Color32::LIGHT_RED, "Error decoding audio.");
            } else {
                let events = TransportBar::new(
                    engine.current_time(),
                    engine.duration(),
                    engine.rate(),
                    engine.is_playing(),
                )
                .skip_seconds(engine.settings().skip_seconds)
                .enabled(engine.has_track())
                .show(ui);
                for event in events {
                    self.handle_transport(event);
                }
            }

            if let Some(message) = &self.state.status_message {
                ui.colored_label(egui::Color32::YELLOW, message);
            }
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut clicked = None;
            script_panel(
                ui,
                self.state.player.lines(),
                self.state.player.highlighted_line(),
                highlight_moved,
                |idx| clicked = Some(idx),
            );
            if let Some(idx) = clicked {
                let result = self.state.player.click_line(idx);
                self.report(result);
            }
        });
    }
}
