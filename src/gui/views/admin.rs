//! Admin tools: admin login, freeze/unfreeze and the audit trail.
//!
//! Every call here uses the admin token only; the user's bearer token is
//! never attached.

use crate::credential_store::CredentialScope;
use crate::gui::app::GuiApp;
use crate::gui::helpers::admin_token_hint;
use crate::gui::widgets::audit_table;
use eframe::egui::{self, RichText};

#[derive(Clone, Copy)]
enum AdminAction {
    Login,
    Freeze,
    Unfreeze,
    Audit,
    DropToken,
}

impl GuiApp {
    pub(crate) fn view_admin(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "[*]", "ADMIN");
        ui.add_space(self.theme.spacing_md);

        let token = self.shell.credentials().get(CredentialScope::Admin);
        let hint = admin_token_hint(&self.admin_header, &token);
        let has_token = !token.is_empty();

        let mut requested = None;
        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Admin session").size(16.0).strong());
            ui.add_space(self.theme.spacing_sm);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Password:").color(self.theme.text_secondary));
                ui.add(egui::TextEdit::singleline(&mut self.admin.password).password(true));
                if self.theme.control_button(ui, &self.admin.login) {
                    requested = Some(AdminAction::Login);
                }
                if has_token && ui.add(self.theme.button_secondary("Drop admin token")).clicked() {
                    requested = Some(AdminAction::DropToken);
                }
            });
            ui.horizontal(|ui| {
                ui.label(RichText::new("Token:").color(self.theme.text_secondary));
                ui.monospace(RichText::new(&hint).color(self.theme.accent_blue));
            });
        });

        ui.add_space(self.theme.spacing_md);
        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Accounts").size(16.0).strong());
            ui.add_space(self.theme.spacing_sm);
            if !has_token {
                ui.label(RichText::new("Sign in as admin first").color(self.theme.warning));
            }
            ui.horizontal(|ui| {
                ui.label(RichText::new("Email:").color(self.theme.text_secondary));
                ui.add(egui::TextEdit::singleline(&mut self.admin.email).hint_text("user@example.com"));
                if self.theme.control_button(ui, &self.admin.freeze) {
                    requested = Some(AdminAction::Freeze);
                }
                if self.theme.control_button(ui, &self.admin.unfreeze) {
                    requested = Some(AdminAction::Unfreeze);
                }
            });
            ui.add_space(self.theme.spacing_sm);
            if self.theme.control_button(ui, &self.admin.load_audit) {
                requested = Some(AdminAction::Audit);
            }
        });

        if let Some(action) = requested {
            self.start_admin_action(action);
        }

        if let Some(output) = &self.admin.output {
            ui.add_space(self.theme.spacing_md);
            ui.add(
                egui::TextEdit::multiline(&mut output.as_str())
                    .code_editor()
                    .desired_rows(6)
                    .desired_width(f32::INFINITY),
            );
        }

        ui.add_space(self.theme.spacing_md);
        audit_table(ui, &self.theme, &self.admin.audit);
    }

    fn start_admin_action(&mut self, action: AdminAction) {
        let api = self.api();
        match action {
            AdminAction::Login => {
                if !self.admin.login.begin() {
                    return;
                }
                let password = self.admin.password.clone();
                self.admin.login_job = Some(self.spawn_job(move || async move {
                    crate::session::admin_sign_in(&api, &password).await
                }));
            }
            AdminAction::Freeze => {
                if !self.admin.freeze.begin() {
                    return;
                }
                let email = self.admin.email.clone();
                self.admin.freeze_job = Some(self.spawn_job(move || async move { api.freeze(&email).await }));
            }
            AdminAction::Unfreeze => {
                if !self.admin.unfreeze.begin() {
                    return;
                }
                let email = self.admin.email.clone();
                self.admin.unfreeze_job = Some(self.spawn_job(move || async move { api.unfreeze(&email).await }));
            }
            AdminAction::Audit => {
                if !self.admin.load_audit.begin() {
                    return;
                }
                self.admin.audit_job = Some(self.spawn_job(move || async move { api.audit().await }));
            }
            AdminAction::DropToken => {
                self.shell.drop_admin();
                self.admin.audit.clear();
                self.admin.output = None;
            }
        }
    }
}
