//! Dashboard view: profile, balance and chain status.

use crate::gui::app::GuiApp;
use crate::gui::helpers::or_dash;
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn view_dashboard(&mut self, ui: &mut egui::Ui) {
        self.render_section_header(ui, "[H]", "DASHBOARD");
        ui.add_space(self.theme.spacing_md);

        let profile = self.shell.profile().cloned().unwrap_or_default();
        let chain = self.shell.chain();

        self.theme.frame_panel().show(ui, |ui| {
            ui.label(RichText::new("Account").size(16.0).strong().color(self.theme.text_primary));
            ui.add_space(self.theme.spacing_sm);

            egui::Grid::new("profile_grid")
                .num_columns(2)
                .spacing([self.theme.spacing_md, self.theme.spacing_xs])
                .show(ui, |ui| {
                    ui.label(RichText::new("Email:").color(self.theme.text_secondary));
                    ui.label(RichText::new(or_dash(profile.email.as_deref())).strong());
                    ui.end_row();

                    ui.label(RichText::new("Address:").color(self.theme.text_secondary));
                    let address = or_dash(profile.address.as_deref()).to_string();
                    ui.horizontal(|ui| {
                        ui.monospace(&address);
                        if profile.address.is_some()
                            && ui.add(egui::Button::new("📋").small()).on_hover_text("Copy address").clicked()
                        {
                            ui.output_mut(|o| o.copied_text = address.clone());
                        }
                    });
                    ui.end_row();

                    ui.label(RichText::new("Balance:").color(self.theme.text_secondary));
                    ui.label(
                        RichText::new(or_dash(profile.balance.as_deref()))
                            .strong()
                            .color(self.theme.accent_orange),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Chain:").color(self.theme.text_secondary));
                    let label = chain.map(|c| c.label()).unwrap_or(crate::gui::helpers::PLACEHOLDER);
                    ui.label(RichText::new(label).strong().color(self.theme.chain_color(chain)));
                    ui.end_row();
                });
        });

        ui.add_space(self.theme.spacing_md);
        if self.theme.control_button(ui, &self.dashboard.refresh) {
            self.start_refresh();
        }
    }
}
