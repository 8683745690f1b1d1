//! Theme and styling for the GUI
//!
//! Provides the AppTheme struct with colors, spacing, and styled widget factories.

use crate::busy_guard::Control;
use crate::notifications::NotificationKind;
use crate::types::ChainStatus;
use eframe::egui;

#[derive(Clone, Copy)]
pub struct AppTheme {
    // Base colors
    pub background: egui::Color32,
    pub surface: egui::Color32,
    pub surface_hover: egui::Color32,
    pub surface_active: egui::Color32,
    pub panel_fill: egui::Color32,
    pub text_primary: egui::Color32,
    pub text_secondary: egui::Color32,

    // Semantic colors
    pub primary: egui::Color32,
    pub secondary: egui::Color32,
    pub success: egui::Color32,
    pub warning: egui::Color32,
    pub error: egui::Color32,
    pub info: egui::Color32,

    pub accent_blue: egui::Color32,
    pub accent_orange: egui::Color32,

    // Spacing
    pub spacing_xs: f32,
    pub spacing_sm: f32,
    pub spacing_md: f32,
    pub spacing_lg: f32,

    pub button_small: egui::Vec2,
    pub button_medium: egui::Vec2,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self {
            // Dark background with green accents
            background: egui::Color32::from_rgb(8, 8, 8),
            surface: egui::Color32::from_rgb(15, 15, 15),
            surface_hover: egui::Color32::from_rgb(25, 25, 25),
            surface_active: egui::Color32::from_rgb(35, 35, 35),
            panel_fill: egui::Color32::from_rgb(12, 12, 12),
            text_primary: egui::Color32::from_rgb(0, 221, 119),
            text_secondary: egui::Color32::from_rgb(170, 170, 170),

            primary: egui::Color32::from_rgb(0, 221, 119),
            secondary: egui::Color32::from_rgb(80, 80, 80),
            success: egui::Color32::from_rgb(0, 221, 119),
            warning: egui::Color32::from_rgb(255, 170, 0),
            error: egui::Color32::from_rgb(255, 85, 85),
            info: egui::Color32::from_rgb(0, 170, 170),

            accent_blue: egui::Color32::from_rgb(0, 170, 170),
            accent_orange: egui::Color32::from_rgb(255, 170, 0),

            spacing_xs: 6.0,
            spacing_sm: 12.0,
            spacing_md: 20.0,
            spacing_lg: 28.0,

            button_small: egui::vec2(100.0, 28.0),
            button_medium: egui::vec2(140.0, 36.0),
        }
    }
}

impl AppTheme {
    pub fn button_primary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary).strong())
            .fill(self.surface)
            .stroke(egui::Stroke::new(3.0, self.primary))
            .min_size(self.button_medium)
    }

    /// Outlined button for actions that destroy state (logout, freeze)
    pub fn button_warning(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.warning).strong())
            .fill(self.surface)
            .stroke(egui::Stroke::new(3.0, self.warning))
            .min_size(self.button_medium)
    }

    pub fn button_secondary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary))
            .fill(self.surface)
            .stroke(egui::Stroke::new(2.0, self.secondary))
            .min_size(self.button_medium)
    }

    pub fn button_small(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary))
            .fill(self.secondary)
            .stroke(egui::Stroke::new(1.0, self.surface_active))
            .min_size(self.button_small)
    }

    /// Primary button bound to a busy-guard control; disabled while it runs.
    pub fn control_button(&self, ui: &mut egui::Ui, control: &Control) -> bool {
        ui.add_enabled(control.is_enabled(), self.button_primary(control.label()))
            .clicked()
    }

    pub fn frame_panel(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(self.panel_fill)
            .rounding(2.0)
            .inner_margin(self.spacing_md)
            .stroke(egui::Stroke::new(2.0, self.primary))
    }

    pub fn section_header_text(&self, icon: &str, title: &str) -> String {
        format!("  {} {}", icon, title)
    }

    /// Border and text color of a toast.
    pub fn notification_color(&self, kind: NotificationKind) -> egui::Color32 {
        match kind {
            NotificationKind::Ok => self.success,
            NotificationKind::Err => self.error,
            NotificationKind::Info => self.info,
        }
    }

    pub fn chain_color(&self, status: Option<ChainStatus>) -> egui::Color32 {
        match status {
            Some(ChainStatus::Valid) => self.success,
            Some(ChainStatus::Invalid) => self.error,
            Some(ChainStatus::Indeterminate) => self.warning,
            None => self.text_secondary,
        }
    }
}

/// Configure the egui context style with the given theme
pub fn configure_style(ctx: &egui::Context, theme: &AppTheme) {
    let mut visuals = egui::Visuals::dark();
    visuals.window_fill = theme.background;
    visuals.panel_fill = theme.panel_fill;
    visuals.override_text_color = Some(theme.text_primary);

    visuals.widgets.noninteractive.bg_fill = theme.surface;
    visuals.widgets.inactive.bg_fill = theme.surface;
    visuals.widgets.hovered.bg_fill = theme.surface_hover;
    visuals.widgets.active.bg_fill = theme.surface_active;
    visuals.widgets.open.bg_fill = theme.surface_active;

    // Text inputs need a visible border on the dark surface
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(2.0, theme.primary);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(2.0, theme.primary);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(3.0, theme.primary);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(12.0, 8.0);
    style.spacing.menu_margin = egui::Margin::same(8.0);

    style.text_styles.insert(
        egui::TextStyle::Heading,
        egui::FontId::new(20.0, egui::FontFamily::Monospace),
    );
    style.text_styles.insert(
        egui::TextStyle::Body,
        egui::FontId::new(14.0, egui::FontFamily::Monospace),
    );
    style.text_styles.insert(
        egui::TextStyle::Button,
        egui::FontId::new(14.0, egui::FontFamily::Monospace),
    );
    style.text_styles.insert(
        egui::TextStyle::Monospace,
        egui::FontId::new(12.0, egui::FontFamily::Monospace),
    );

    ctx.set_style(style);
}
