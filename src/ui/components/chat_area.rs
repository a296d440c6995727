use eframe::egui;

use crate::common::ChatMessage;

pub fn render(ui: &mut egui::Ui, messages: &[ChatMessage]) {
    // Follows new messages unless the user has scrolled up.
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for message in messages {
                render_message(ui, message);
                ui.add_space(6.0);
            }
        });
}

fn render_message(ui: &mut egui::Ui, message: &ChatMessage) {
    let time = message.timestamp.format("%H:%M");
    if message.is_user {
        ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
            ui.label(egui::RichText::new(format!("You · {time}")).weak().small());
            ui.label(egui::RichText::new(&message.content).color(egui::Color32::LIGHT_BLUE));
        });
    } else {
        ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
            ui.label(egui::RichText::new(format!("Bot · {time}")).weak().small());
            ui.label(&message.content);
        });
    }
}
