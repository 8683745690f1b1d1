//! Block explorer lookups and chain verification.

use crate::gui::app::GuiApp;
use eframe::egui::{self, RichText};

#[derive(Clone, Copy)]
enum Lookup {
    Transaction,
    Address,
    Verify,
}

impl GuiApp {
    pub(crate) fn view_explorer(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "[?]", "EXPLORER");
        ui.add_space(self.theme.spacing_md);

        let mut requested = None;
        self.theme.frame_panel().show(ui, |ui| {
            egui::Grid::new("explorer_grid")
                .num_columns(3)
                .spacing([self.theme.spacing_md, self.theme.spacing_sm])
                .show(ui, |ui| {
                    ui.label(RichText::new("Block hash:").color(self.theme.text_secondary));
                    ui.add(egui::TextEdit::singleline(&mut self.explorer.block_hash).desired_width(360.0));
                    if self.theme.control_button(ui, &self.explorer.lookup_tx) {
                        requested = Some(Lookup::Transaction);
                    }
                    ui.end_row();

                    ui.label(RichText::new("Address:").color(self.theme.text_secondary));
                    ui.add(egui::TextEdit::singleline(&mut self.explorer.address).desired_width(360.0));
                    if self.theme.control_button(ui, &self.explorer.lookup_address) {
                        requested = Some(Lookup::Address);
                    }
                    ui.end_row();
                });

            ui.add_space(self.theme.spacing_sm);
            if self.theme.control_button(ui, &self.explorer.verify) {
                requested = Some(Lookup::Verify);
            }
        });

        if let Some(lookup) = requested {
            self.start_lookup(lookup);
        }

        if let Some(output) = &self.explorer.output {
            ui.add_space(self.theme.spacing_md);
            ui.add(
                egui::TextEdit::multiline(&mut output.as_str())
                    .code_editor()
                    .desired_width(f32::INFINITY),
            );
        }
    }

    fn start_lookup(&mut self, lookup: Lookup) {
        let api = self.api();
        match lookup {
            Lookup::Transaction => {
                if !self.explorer.lookup_tx.begin() {
                    return;
                }
                let hash = self.explorer.block_hash.clone();
                self.explorer.tx_job = Some(self.spawn_job(move || async move { api.explorer_tx(&hash).await }));
            }
            Lookup::Address => {
                if !self.explorer.lookup_address.begin() {
                    return;
                }
                let address = self.explorer.address.clone();
                self.explorer.address_job = Some(self.spawn_job(move || async move {
                    api.explorer_address(&address).await
                }));
            }
            Lookup::Verify => {
                if !self.explorer.verify.begin() {
                    return;
                }
                self.explorer.verify_job = Some(self.spawn_job(move || async move { api.verify_chain().await }));
            }
        }
    }
}
