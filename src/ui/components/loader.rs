use eframe::egui;

use crate::common::LoaderState;

const STEP_LABELS: [&str; 5] = [
    "Reading your question",
    "Searching programme information",
    "Checking application guidance",
    "Drafting a reply",
    "Almost there",
];

pub fn render(ui: &mut egui::Ui, typing: bool, loader: LoaderState) {
    if !typing && loader.is_cleared() {
        return;
    }

    ui.horizontal(|ui| {
        ui.spinner();
        if loader.detailed {
            let index = usize::from(loader.step).min(STEP_LABELS.len() - 1);
            ui.label(format!("{}...", STEP_LABELS[index]));
        } else {
            ui.label(egui::RichText::new("Bot is typing...").weak());
        }
    });
}
