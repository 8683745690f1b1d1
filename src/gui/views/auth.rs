//! Sign-in and registration form, the only view available without a session.

use crate::gui::app::{AuthMode, GuiApp};
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn view_auth(&mut self, ui: &mut egui::Ui) {
        let title = match self.auth.mode {
            AuthMode::Login => "SIGN IN",
            AuthMode::Register => "CREATE ACCOUNT",
        };
        self.render_section_header(ui, "[>]", title);
        ui.add_space(self.theme.spacing_md);

        if self.auth.resume_job.is_some() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Checking saved session...").color(self.theme.text_secondary));
            });
            ui.add_space(self.theme.spacing_sm);
        }

        let mut submit = false;
        self.theme.frame_panel().show(ui, |ui| {
            ui.set_max_width(420.0);
            egui::Grid::new("auth_grid")
                .num_columns(2)
                .spacing([self.theme.spacing_md, self.theme.spacing_sm])
                .show(ui, |ui| {
                    ui.label(RichText::new("Email:").color(self.theme.text_secondary));
                    ui.add(egui::TextEdit::singleline(&mut self.auth.email).hint_text("you@example.com"));
                    ui.end_row();

                    ui.label(RichText::new("Password:").color(self.theme.text_secondary));
                    let response = ui.add(egui::TextEdit::singleline(&mut self.auth.password).password(true));
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submit = true;
                    }
                    ui.end_row();
                });

            ui.add_space(self.theme.spacing_md);
            let mode = self.auth.mode;
            ui.horizontal(|ui| match mode {
                AuthMode::Login => {
                    if self.theme.control_button(ui, &self.auth.login) {
                        submit = true;
                    }
                    if ui.link("Need an account? Register").clicked() {
                        self.auth.mode = AuthMode::Register;
                    }
                }
                AuthMode::Register => {
                    if self.theme.control_button(ui, &self.auth.register) {
                        submit = true;
                    }
                    if ui.link("Have an account? Log in").clicked() {
                        self.auth.mode = AuthMode::Login;
                    }
                }
            });
        });

        if submit {
            match self.auth.mode {
                AuthMode::Login => self.start_login(),
                AuthMode::Register => self.start_register(),
            }
        }
    }
}
