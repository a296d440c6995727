use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{ChatCommand, ChatEvent};

use super::components::{
    chat_area, input_bar, loader, login_form,
    sidebar::{self, SidebarActions},
};
use super::state::AppState;

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<ChatCommand>,
    event_receiver: mpsc::UnboundedReceiver<ChatEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        command_sender: mpsc::Sender<ChatCommand>,
        event_receiver: mpsc::UnboundedReceiver<ChatEvent>,
    ) -> Self {
        Self {
            state: AppState::new(),
            command_sender,
            event_receiver,
        }
    }

    fn handle_service_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.state.apply(event);
        }
    }

    fn send_command(&mut self, command: ChatCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to chat service: {err}");
        }
    }

    fn show_login(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(48.0);
            if self.state.auth.loading {
                ui.vertical_centered(|ui| {
                    ui.spinner();
                    ui.label("Checking authentication...");
                });
                return;
            }
            if let Some(command) = login_form::render(ui, &mut self.state.login) {
                self.send_command(command);
            }
        });
    }

    fn show_chat(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("account_sidebar")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                let actions: SidebarActions = sidebar::render(ui, &self.state);
                if actions.reset_chat {
                    self.send_command(ChatCommand::ResetChat);
                }
                if actions.sign_out {
                    self.send_command(ChatCommand::SignOut);
                }
            });

        egui::TopBottomPanel::bottom("input_panel").show(ctx, |ui| {
            loader::render(ui, self.state.typing, self.state.loader);
            let enabled = self.state.can_send();
            if let Some(content) = input_bar::render(ui, &mut self.state.input_text, enabled) {
                self.send_command(ChatCommand::SendMessage(content));
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("MCPP Bot");
            ui.separator();
            chat_area::render(ui, &self.state.messages);
        });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_service_events();

        if self.state.auth.authenticated {
            self.show_chat(ctx);
        } else {
            self.show_login(ctx);
        }

        ctx.request_repaint();
    }
}
