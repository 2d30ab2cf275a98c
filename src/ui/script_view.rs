use crate::types::script::DialogueLine;
use eframe::egui;

const HIGHLIGHT: egui::Color32 = egui::Color32::from_rgb(255, 214, 102);

/// Draws the dialogue, one clickable row per line.
/// - `highlighted`: the line being spoken, drawn with an accent background.
/// - `scroll_to_highlight`: scroll the highlighted row into view this frame.
/// - `on_line_clicked`: invoked with the index of a clicked line.
pub fn script_panel(
    ui: &mut egui::Ui,
    lines: &[DialogueLine],
    highlighted: Option<usize>,
    scroll_to_highlight: bool,
    mut on_line_clicked: impl FnMut(usize),
) {
    if lines.is_empty() {
        ui.label("No dialogue loaded");
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for (idx, line) in lines.iter().enumerate() {
                let is_active = highlighted == Some(idx);
                let fill = if is_active {
                    HIGHLIGHT.gamma_multiply(0.35)
                } else {
                    egui::Color32::TRANSPARENT
                };

                let frame = egui::Frame::default()
                    .fill(fill)
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(8, 6))
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.horizontal_wrapped(|ui| {
                            ui.label(
                                egui::RichText::new(&line.speaker)
                                    .strong()
                                    .color(egui::Color32::GRAY),
                            );
                            let text = egui::RichText::new(&line.text).size(18.0);
                            ui.label(if is_active { text.strong() } else { text });
                        });
                        if let Some(translation) = &line.translation {
                            ui.label(
                                egui::RichText::new(translation)
                                    .small()
                                    .color(egui::Color32::GRAY),
                            );
                        }
                    });

                let response = frame
                    .response
                    .interact(egui::Sense::click())
                    .on_hover_cursor(egui::CursorIcon::PointingHand);
                if response.clicked() {
                    on_line_clicked(idx);
                }
                if is_active && scroll_to_highlight {
                    response.scroll_to_me(Some(egui::Align::Center));
                }
                ui.add_space(2.0);
            }
        });
}
