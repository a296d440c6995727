use eframe::egui;

/// Returns the text to send when the user submits a non-blank line.
pub fn render(ui: &mut egui::Ui, input_text: &mut String, enabled: bool) -> Option<String> {
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(input_text).hint_text("Type your question..."),
        );
        if ui.add_enabled(enabled, egui::Button::new("Send")).clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    if send && enabled && !input_text.trim().is_empty() {
        let message = input_text.clone();
        input_text.clear();
        return Some(message);
    }

    None
}
