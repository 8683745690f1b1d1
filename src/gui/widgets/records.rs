//! Read-only tables for ledger history and the admin audit trail.

use crate::gui::helpers::{format_audit_time, or_dash, short_hash};
use crate::gui::theme::AppTheme;
use crate::types::{AuditEntry, TxRecord};
use eframe::egui::{self, RichText};

/// Rows beyond this are only counted, not drawn.
const MAX_ROWS: usize = 200;

pub fn history_table(ui: &mut egui::Ui, theme: &AppTheme, rows: &[TxRecord]) {
    if rows.is_empty() {
        ui.label(RichText::new("No transactions yet.").color(theme.text_secondary));
        return;
    }

    egui::ScrollArea::horizontal().id_source("history_scroll").show(ui, |ui| {
        egui::Grid::new("history_grid")
            .striped(true)
            .num_columns(5)
            .spacing([theme.spacing_md, theme.spacing_xs])
            .show(ui, |ui| {
                for title in ["#", "From", "To", "Amount", "Block hash"] {
                    ui.label(RichText::new(title).strong().color(theme.text_secondary));
                }
                ui.end_row();

                for row in rows.iter().take(MAX_ROWS) {
                    ui.label(row.block_index.map(|i| i.to_string()).unwrap_or_else(|| "-".into()));
                    ui.monospace(or_dash(Some(&row.from_address)));
                    ui.monospace(or_dash(Some(&row.to_address)));
                    ui.label(RichText::new(or_dash(row.amount.as_deref())).color(theme.accent_orange));
                    ui.monospace(short_hash(&row.block_hash)).on_hover_text(&row.block_hash);
                    ui.end_row();
                }
            });
    });
    if rows.len() > MAX_ROWS {
        ui.label(RichText::new(format!("… {} more", rows.len() - MAX_ROWS)).color(theme.text_secondary));
    }
}

pub fn audit_table(ui: &mut egui::Ui, theme: &AppTheme, rows: &[AuditEntry]) {
    if rows.is_empty() {
        ui.label(RichText::new("No audit entries loaded.").color(theme.text_secondary));
        return;
    }

    egui::ScrollArea::horizontal().id_source("audit_scroll").show(ui, |ui| {
        egui::Grid::new("audit_grid")
            .striped(true)
            .num_columns(5)
            .spacing([theme.spacing_md, theme.spacing_xs])
            .show(ui, |ui| {
                for title in ["Time", "Actor", "Action", "Entity", "Id"] {
                    ui.label(RichText::new(title).strong().color(theme.text_secondary));
                }
                ui.end_row();

                for row in rows.iter().take(MAX_ROWS) {
                    ui.monospace(format_audit_time(row.created_at.as_deref()));
                    ui.label(or_dash(Some(&row.actor)));
                    ui.label(RichText::new(&row.action).strong());
                    ui.label(or_dash(Some(&row.entity)));
                    ui.label(or_dash(row.entity_id.as_deref()));
                    ui.end_row();
                }
            });
    });
}
