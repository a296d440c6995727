use eframe::egui;

use crate::ui::state::AppState;

#[derive(Default)]
pub struct SidebarActions {
    pub sign_out: bool,
    pub reset_chat: bool,
}

pub fn render(ui: &mut egui::Ui, state: &AppState) -> SidebarActions {
    let mut actions = SidebarActions::default();

    ui.heading("Account");
    ui.separator();

    let email = state.auth.email.as_deref().unwrap_or("Signed in");
    ui.horizontal(|ui| {
        let color = if state.chat_ready {
            egui::Color32::GREEN
        } else {
            egui::Color32::YELLOW
        };
        ui.colored_label(color, "●");
        ui.label(email);
    });

    ui.add_space(8.0);
    if ui
        .add_enabled(!state.typing, egui::Button::new("New chat"))
        .clicked()
    {
        actions.reset_chat = true;
    }
    if ui.button("Sign out").clicked() {
        actions.sign_out = true;
    }

    if let Some(error) = &state.error {
        ui.separator();
        ui.colored_label(egui::Color32::RED, error.as_str());
    }

    actions
}
