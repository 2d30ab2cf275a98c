use eframe::egui;

/// User intents raised by the transport bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    TogglePlay,
    SkipBack,
    SkipForward,
    CycleRate,
    /// The scrubber was moved to this time, in seconds.
    Scrubbed(f64),
}

/// Playback controls: elapsed / total time, rate button, scrubber and skip buttons.
pub struct TransportBar {
    current_time: f64,
    duration: f64,
    rate: f64,
    is_playing: bool,
    skip_seconds: f64,
    enabled: bool,
}

impl TransportBar {
    pub fn new(current_time: f64, duration: f64, rate: f64, is_playing: bool) -> Self {
        Self {
            current_time,
            duration,
            rate,
            is_playing,
            skip_seconds: 5.0,
            enabled: true,
        }
    }

    pub fn skip_seconds(mut self, seconds: f64) -> Self {
        self.skip_seconds = seconds;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn show(&self, ui: &mut egui::Ui) -> Vec<TransportEvent> {
        let mut events = Vec::new();

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!(
                    "{} / {}",
                    format_time(self.current_time),
                    format_time(self.duration)
                ))
                .monospace(),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button(format!("{}x", self.rate)).clicked() {
                    events.push(TransportEvent::CycleRate);
                }
            });
        });

        ui.add_enabled_ui(self.enabled, |ui| {
            let mut scrub = self.current_time;
            let max = if self.duration > 0.0 { self.duration } else { 1.0 };
            ui.spacing_mut().slider_width = ui.available_width();
            let slider = egui::Slider::new(&mut scrub, 0.0..=max)
                .show_value(false)
                .step_by(0.01);
            if ui.add(slider).changed() {
                events.push(TransportEvent::Scrubbed(scrub.min(self.duration)));
            }

            ui.horizontal(|ui| {
                let skip = self.skip_seconds;
                if ui
                    .button(format!("⏪ -{skip}s"))
                    .on_hover_text(format!("-{skip} seconds"))
                    .clicked()
                {
                    events.push(TransportEvent::SkipBack);
                }
                let label = if self.is_playing { "⏸" } else { "▶" };
                if ui
                    .add(egui::Button::new(egui::RichText::new(label).size(22.0)))
                    .clicked()
                {
                    events.push(TransportEvent::TogglePlay);
                }
                if ui
                    .button(format!("+{skip}s ⏩"))
                    .on_hover_text(format!("+{skip} seconds"))
                    .clicked()
                {
                    events.push(TransportEvent::SkipForward);
                }
            });
        });

        events
    }
}

/// Formats seconds as `m:ss`. Negative or non-finite input shows `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{minutes}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.99), "0:09");
        assert_eq!(format_time(65.4), "1:05");
        assert_eq!(format_time(600.0), "10:00");
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }
}
