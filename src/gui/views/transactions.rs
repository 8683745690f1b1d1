//! Transfer form and ledger history.

use crate::gui::app::GuiApp;
use crate::gui::widgets::history_table;
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn view_transactions(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "[$]", "TRANSACTIONS");
        ui.add_space(self.theme.spacing_md);

        let mut send = false;
        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("New transfer").size(16.0).strong());
            ui.add_space(self.theme.spacing_sm);
            egui::Grid::new("transfer_grid")
                .num_columns(2)
                .spacing([self.theme.spacing_md, self.theme.spacing_sm])
                .show(ui, |ui| {
                    ui.label(RichText::new("To address:").color(self.theme.text_secondary));
                    ui.add(egui::TextEdit::singleline(&mut self.transactions.to_address).desired_width(360.0));
                    ui.end_row();

                    ui.label(RichText::new("Amount:").color(self.theme.text_secondary));
                    ui.add(egui::TextEdit::singleline(&mut self.transactions.amount).hint_text("0.00"));
                    ui.end_row();
                });
            ui.add_space(self.theme.spacing_sm);
            send = self.theme.control_button(ui, &self.transactions.send);
        });
        if send {
            let api = self.api();
            let (to, amount) = (self.transactions.to_address.clone(), self.transactions.amount.clone());
            if self.transactions.send.begin() {
                self.transactions.send_job = Some(self.spawn_job(move || async move {
                    api.create_transfer(&to, &amount).await
                }));
            }
        }

        if let Some(record) = &self.transactions.last_created {
            ui.add_space(self.theme.spacing_md);
            ui.label(RichText::new("Created").color(self.theme.text_secondary));
            ui.add(
                egui::TextEdit::multiline(&mut record.as_str())
                    .code_editor()
                    .desired_width(f32::INFINITY),
            );
        }

        ui.add_space(self.theme.spacing_lg);
        let mut load = false;
        ui.horizontal(|ui| {
            ui.label(RichText::new("History").size(16.0).strong());
            ui.add_space(self.theme.spacing_sm);
            load = self.theme.control_button(ui, &self.transactions.load);
        });
        if load {
            self.start_history_load();
        }
        ui.add_space(self.theme.spacing_sm);
        history_table(ui, &self.theme, &self.transactions.history);
    }
}
