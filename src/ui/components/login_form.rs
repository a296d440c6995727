use eframe::egui;

use crate::common::ChatCommand;
use crate::ui::state::LoginForm;

/// Draws the sign-in (or new-password) form and returns the command to issue.
pub fn render(ui: &mut egui::Ui, form: &mut LoginForm) -> Option<ChatCommand> {
    let mut command = None;

    ui.vertical_centered(|ui| {
        ui.heading(if form.awaiting_new_password {
            "Set a new password"
        } else {
            "Sign in"
        });
        ui.add_space(12.0);

        if form.awaiting_new_password {
            ui.add(
                egui::TextEdit::singleline(&mut form.new_password)
                    .password(true)
                    .hint_text("New password"),
            );
            let ready = !form.submitting && !form.new_password.is_empty();
            if ui.add_enabled(ready, egui::Button::new("Set password")).clicked() {
                form.submitting = true;
                command = Some(ChatCommand::CompleteNewPassword {
                    new_password: std::mem::take(&mut form.new_password),
                });
            }
        } else {
            ui.add(egui::TextEdit::singleline(&mut form.email).hint_text("Email"));
            ui.add(
                egui::TextEdit::singleline(&mut form.password)
                    .password(true)
                    .hint_text("Password"),
            );
            let ready = !form.submitting && !form.email.trim().is_empty() && !form.password.is_empty();
            if ui.add_enabled(ready, egui::Button::new("Sign in")).clicked() {
                form.submitting = true;
                command = Some(ChatCommand::SignIn {
                    email: form.email.trim().to_string(),
                    password: std::mem::take(&mut form.password),
                });
            }
        }

        if form.submitting {
            ui.spinner();
        }
        if let Some(message) = &form.message {
            ui.add_space(8.0);
            ui.label(message);
        }
    });

    command
}
