//! Main GUI application module
//!
//! Contains the GuiApp struct, per-view state and the frame loop.

use crate::{
    api::Api,
    busy_guard::Control,
    config::Config,
    credential_store::CredentialStore,
    error::ShellError,
    gateway::{Gateway, HttpTransport},
    router::View,
    session::{self, LogoutScope, Overview, Resume, Shell, SignUp},
    types::{AuditEntry, ChainStatus, TxRecord},
};
use anyhow::{anyhow, Result};
use eframe::{egui, egui::RichText, App, Frame, NativeOptions};
use serde_json::Value;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;
use tokio::runtime::Builder;

use super::async_job::AsyncJob;
use super::helpers::{truncate_chars, TOAST_MAX_CHARS};
use super::theme::{configure_style, AppTheme};

pub(crate) type AppApi = Api<HttpTransport>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AuthMode {
    Login,
    Register,
}

pub(crate) struct AuthState {
    pub(crate) mode: AuthMode,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) login: Control,
    pub(crate) register: Control,
    pub(crate) login_job: Option<AsyncJob<Overview>>,
    pub(crate) register_job: Option<AsyncJob<SignUp>>,
    pub(crate) resume_job: Option<AsyncJob<Resume>>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            mode: AuthMode::Login,
            email: String::new(),
            password: String::new(),
            login: Control::new("Log in"),
            register: Control::new("Create account"),
            login_job: None,
            register_job: None,
            resume_job: None,
        }
    }
}

pub(crate) struct DashboardState {
    pub(crate) refresh: Control,
    pub(crate) job: Option<AsyncJob<Overview>>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            refresh: Control::new("Refresh"),
            job: None,
        }
    }
}

pub(crate) struct TransactionsState {
    pub(crate) to_address: String,
    pub(crate) amount: String,
    pub(crate) send: Control,
    pub(crate) load: Control,
    pub(crate) send_job: Option<AsyncJob<Value>>,
    pub(crate) history_job: Option<AsyncJob<Vec<TxRecord>>>,
    pub(crate) history: Vec<TxRecord>,
    pub(crate) last_created: Option<String>,
}

impl Default for TransactionsState {
    fn default() -> Self {
        Self {
            to_address: String::new(),
            amount: String::new(),
            send: Control::new("Send"),
            load: Control::new("Load history"),
            send_job: None,
            history_job: None,
            history: Vec::new(),
            last_created: None,
        }
    }
}

pub(crate) struct ExplorerState {
    pub(crate) block_hash: String,
    pub(crate) address: String,
    pub(crate) lookup_tx: Control,
    pub(crate) lookup_address: Control,
    pub(crate) verify: Control,
    pub(crate) tx_job: Option<AsyncJob<Value>>,
    pub(crate) address_job: Option<AsyncJob<Value>>,
    pub(crate) verify_job: Option<AsyncJob<ChainStatus>>,
    pub(crate) output: Option<String>,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self {
            block_hash: String::new(),
            address: String::new(),
            lookup_tx: Control::new("Look up"),
            lookup_address: Control::new("Look up"),
            verify: Control::new("Verify chain"),
            tx_job: None,
            address_job: None,
            verify_job: None,
            output: None,
        }
    }
}

pub(crate) struct AdminState {
    pub(crate) password: String,
    pub(crate) email: String,
    pub(crate) login: Control,
    pub(crate) freeze: Control,
    pub(crate) unfreeze: Control,
    pub(crate) load_audit: Control,
    pub(crate) login_job: Option<AsyncJob<String>>,
    pub(crate) freeze_job: Option<AsyncJob<Value>>,
    pub(crate) unfreeze_job: Option<AsyncJob<Value>>,
    pub(crate) audit_job: Option<AsyncJob<Vec<AuditEntry>>>,
    pub(crate) audit: Vec<AuditEntry>,
    pub(crate) output: Option<String>,
}

impl Default for AdminState {
    fn default() -> Self {
        Self {
            password: String::new(),
            email: String::new(),
            login: Control::new("Admin login"),
            freeze: Control::new("Freeze"),
            unfreeze: Control::new("Unfreeze"),
            load_audit: Control::new("Load audit"),
            login_job: None,
            freeze_job: None,
            unfreeze_job: None,
            audit_job: None,
            audit: Vec::new(),
            output: None,
        }
    }
}

pub struct GuiApp {
    pub(crate) shell: Shell<HttpTransport>,
    pub(crate) theme: AppTheme,
    pub(crate) admin_header: String,
    pub(crate) api_root: String,
    pub(crate) auth: AuthState,
    pub(crate) dashboard: DashboardState,
    pub(crate) transactions: TransactionsState,
    pub(crate) explorer: ExplorerState,
    pub(crate) admin: AdminState,
    pub(crate) show_notifications_popup: bool,
    /// Epoch the per-view state was last reset for.
    seen_epoch: u64,
}

impl GuiApp {
    fn new(api: AppApi, config: &Config, ctx: &egui::Context) -> Self {
        let theme = AppTheme::default();
        configure_style(ctx, &theme);

        let mut app = Self {
            shell: Shell::new(api, config.toast_duration),
            theme,
            admin_header: config.admin_header.clone(),
            api_root: config.api_root(),
            auth: AuthState::default(),
            dashboard: DashboardState::default(),
            transactions: TransactionsState::default(),
            explorer: ExplorerState::default(),
            admin: AdminState::default(),
            show_notifications_popup: false,
            seen_epoch: 0,
        };
        app.start_resume();
        app
    }

    /// Clone of the API handle for a worker thread.
    pub(crate) fn api(&self) -> AppApi {
        self.shell.api().clone()
    }

    /// Run `builder`'s future on its own thread, tagged with the current epoch.
    pub(crate) fn spawn_job<T, FutBuilder, Fut>(&self, builder: FutBuilder) -> AsyncJob<T>
    where
        T: Send + 'static,
        FutBuilder: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<T, ShellError>> + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(builder()),
                Err(e) => Err(ShellError::Aborted(format!("Failed to create async runtime: {}", e))),
            };
            let _ = tx.send(result);
        });
        AsyncJob::new(rx, self.shell.epoch())
    }

    fn start_resume(&mut self) {
        // Keeps the login button disabled until the stored token has been checked.
        if !self.auth.login.begin() {
            return;
        }
        let api = self.api();
        self.auth.resume_job = Some(self.spawn_job(move || async move { Ok(session::resume(&api).await) }));
    }

    pub(crate) fn start_login(&mut self) {
        if !self.auth.login.begin() {
            return;
        }
        let api = self.api();
        let (email, password) = (self.auth.email.clone(), self.auth.password.clone());
        self.auth.login_job = Some(self.spawn_job(move || async move {
            session::sign_in(&api, &email, &password).await
        }));
    }

    pub(crate) fn start_register(&mut self) {
        if !self.auth.register.begin() {
            return;
        }
        let api = self.api();
        let (email, password) = (self.auth.email.clone(), self.auth.password.clone());
        self.auth.register_job = Some(self.spawn_job(move || async move {
            session::sign_up(&api, &email, &password).await
        }));
    }

    pub(crate) fn start_refresh(&mut self) {
        if !self.dashboard.refresh.begin() {
            return;
        }
        let api = self.api();
        self.dashboard.job = Some(self.spawn_job(move || async move { session::refresh(&api).await }));
    }

    pub(crate) fn start_history_load(&mut self) {
        if !self.transactions.load.begin() {
            return;
        }
        let api = self.api();
        self.transactions.history_job = Some(self.spawn_job(move || async move { api.history().await }));
    }

    pub(crate) fn logout(&mut self) {
        self.shell.logout(LogoutScope::Everything);
        self.auth.password.clear();
    }

    fn reset_session_views(&mut self) {
        self.dashboard = DashboardState::default();
        self.transactions = TransactionsState::default();
        self.explorer = ExplorerState::default();
        self.admin = AdminState::default();
    }

    fn poll_jobs(&mut self) {
        self.shell.tick(Instant::now());

        // ----- auth -----
        if let Some((epoch, result)) = finished(&mut self.auth.resume_job, &mut self.auth.login) {
            self.shell.finish_resume(epoch, result);
        }
        if let Some((epoch, result)) = finished(&mut self.auth.login_job, &mut self.auth.login) {
            let ok = result.is_ok();
            self.shell.finish_sign_in(epoch, result);
            if ok {
                self.auth.password.clear();
            }
        }
        if let Some((epoch, result)) = finished(&mut self.auth.register_job, &mut self.auth.register) {
            match self.shell.finish_sign_up(epoch, result) {
                Some(SignUp::NeedsLogin) => self.auth.mode = AuthMode::Login,
                Some(SignUp::SignedIn(_)) => self.auth.password.clear(),
                None => {}
            }
        }

        // ----- dashboard -----
        if let Some((epoch, result)) = finished(&mut self.dashboard.job, &mut self.dashboard.refresh) {
            self.shell.finish_refresh(epoch, result);
        }

        // ----- transactions -----
        if let Some((epoch, result)) = finished(&mut self.transactions.send_job, &mut self.transactions.send) {
            if let Some(record) = self.shell.finish_action(epoch, result, "Transaction created") {
                self.transactions.last_created = Some(super::helpers::pretty_json(&record));
                self.transactions.amount.clear();
                self.start_history_load();
            }
        }
        if let Some((epoch, result)) = finished(&mut self.transactions.history_job, &mut self.transactions.load) {
            if let Some(rows) = self.shell.finish_action(epoch, result, "History loaded") {
                self.transactions.history = rows;
            }
        }

        // ----- explorer -----
        if let Some((epoch, result)) = finished(&mut self.explorer.tx_job, &mut self.explorer.lookup_tx) {
            if let Some(data) = self.shell.finish_action(epoch, result, "Transaction found") {
                self.explorer.output = Some(super::helpers::pretty_json(&data));
            }
        }
        if let Some((epoch, result)) = finished(&mut self.explorer.address_job, &mut self.explorer.lookup_address) {
            if let Some(data) = self.shell.finish_action(epoch, result, "Address loaded") {
                self.explorer.output = Some(super::helpers::pretty_json(&data));
            }
        }
        if let Some((epoch, result)) = finished(&mut self.explorer.verify_job, &mut self.explorer.verify) {
            if let Some(status) = self.shell.finish_action(epoch, result, "Chain verified") {
                self.shell.record_chain(status);
                self.explorer.output = Some(format!("Chain: {}", status.label()));
            }
        }

        // ----- admin -----
        if let Some((epoch, result)) = finished(&mut self.admin.login_job, &mut self.admin.login) {
            self.shell.finish_admin_sign_in(epoch, result);
            self.admin.password.clear();
        }
        if let Some((epoch, result)) = finished(&mut self.admin.freeze_job, &mut self.admin.freeze) {
            if let Some(data) = self.shell.finish_action(epoch, result, "User frozen") {
                self.admin.output = Some(super::helpers::pretty_json(&data));
            }
        }
        if let Some((epoch, result)) = finished(&mut self.admin.unfreeze_job, &mut self.admin.unfreeze) {
            if let Some(data) = self.shell.finish_action(epoch, result, "User unfrozen") {
                self.admin.output = Some(super::helpers::pretty_json(&data));
            }
        }
        if let Some((epoch, result)) = finished(&mut self.admin.audit_job, &mut self.admin.load_audit) {
            if let Some(rows) = self.shell.finish_action(epoch, result, "Audit loaded") {
                let preview: Vec<&AuditEntry> = rows.iter().take(5).collect();
                self.admin.output = Some(super::helpers::pretty_json(&preview));
                self.admin.audit = rows;
            }
        }

        // Session ended (logout, refused probe, missing token): forget view data.
        if self.shell.epoch() != self.seen_epoch {
            self.seen_epoch = self.shell.epoch();
            if self.shell.view() == View::Unauthenticated {
                self.reset_session_views();
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(10.0);
            ui.horizontal_wrapped(|ui| {
                ui.heading(RichText::new("Wallet Shell").size(24.0).strong().color(self.theme.text_primary));
                ui.label(
                    RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                        .size(12.0)
                        .color(self.theme.text_secondary),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.shell.router().is_authenticated() {
                        if ui.add(self.theme.button_warning("Log out")).clicked() {
                            self.logout();
                        }
                        ui.add_space(self.theme.spacing_sm);
                        let who = self
                            .shell
                            .profile()
                            .and_then(|p| p.email.clone())
                            .unwrap_or_else(|| super::helpers::PLACEHOLDER.to_string());
                        ui.label(RichText::new(who).color(self.theme.text_secondary));
                    }
                    ui.add_space(self.theme.spacing_sm);
                    ui.monospace(RichText::new(&self.api_root).size(12.0).color(self.theme.accent_blue));
                });
            });
            ui.add_space(6.0);
        });
    }

    fn render_notifications(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let toast = self
            .shell
            .notifications()
            .visible(now)
            .map(|t| (t.message.clone(), t.kind));
        let history_len = self.shell.notifications().history_len();

        egui::Area::new(egui::Id::new("notification_overlay"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let border = toast
                    .as_ref()
                    .map(|(_, kind)| self.theme.notification_color(*kind))
                    .unwrap_or(self.theme.secondary);
                egui::Frame::none()
                    .fill(egui::Color32::from_rgb(35, 45, 60))
                    .rounding(6.0)
                    .stroke(egui::Stroke::new(1.0, border))
                    .inner_margin(egui::Margin::symmetric(8.0, 6.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if ui
                                .add(
                                    egui::Button::new(RichText::new("[!]").size(14.0).color(border).strong())
                                        .fill(egui::Color32::TRANSPARENT)
                                        .stroke(egui::Stroke::NONE),
                                )
                                .on_hover_text("Click to view notification history")
                                .clicked()
                            {
                                self.show_notifications_popup = !self.show_notifications_popup;
                            }

                            match &toast {
                                Some((message, kind)) => {
                                    ui.add_space(4.0);
                                    ui.label(
                                        RichText::new(truncate_chars(message, TOAST_MAX_CHARS))
                                            .size(12.0)
                                            .color(self.theme.notification_color(*kind)),
                                    )
                                    .on_hover_text(message);
                                }
                                None if history_len > 0 => {
                                    ui.add_space(2.0);
                                    ui.label(
                                        RichText::new(history_len.to_string())
                                            .size(10.0)
                                            .color(self.theme.accent_orange),
                                    );
                                }
                                None => {}
                            }
                        });
                    });
            });

        if self.show_notifications_popup {
            egui::Window::new("[#] Notification History")
                .collapsible(false)
                .resizable(true)
                .default_width(450.0)
                .default_height(350.0)
                .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -50.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(format!("{} notifications", history_len)).color(self.theme.text_secondary),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.add(self.theme.button_small("[X] Close")).clicked() {
                                self.show_notifications_popup = false;
                            }
                            if ui.add(self.theme.button_small("[C] Clear")).clicked() {
                                self.shell.notifications_mut().clear_history();
                            }
                        });
                    });
                    ui.add_space(self.theme.spacing_xs);

                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .max_height(280.0)
                        .show(ui, |ui| {
                            if self.shell.notifications().history_len() == 0 {
                                ui.label(RichText::new("No notifications yet.").color(self.theme.text_secondary));
                            }
                            for entry in self.shell.notifications().history().rev() {
                                ui.horizontal(|ui| {
                                    ui.label(
                                        RichText::new(format!("[{}]", entry.time_ago()))
                                            .size(11.0)
                                            .color(self.theme.text_secondary),
                                    );
                                    ui.label(
                                        RichText::new(&entry.message)
                                            .size(12.0)
                                            .color(self.theme.notification_color(entry.kind)),
                                    );
                                });
                                ui.add_space(3.0);
                            }
                        });
                });
        }
    }

    fn render_nav(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("nav")
            .resizable(false)
            .default_width(180.0)
            .frame(
                egui::Frame::none()
                    .fill(self.theme.surface)
                    .stroke(egui::Stroke::new(1.0, self.theme.primary)),
            )
            .show(ctx, |ui| {
                ui.add_space(self.theme.spacing_md);
                for view in View::AUTHENTICATED {
                    let selected = self.shell.view() == view;
                    ui.horizontal(|ui| {
                        if selected {
                            ui.add_space(2.0);
                            let (rect, _) = ui.allocate_exact_size(egui::vec2(3.0, 20.0), egui::Sense::hover());
                            ui.painter().rect_filled(rect, 0.0, self.theme.primary);
                            ui.add_space(4.0);
                        } else {
                            ui.add_space(9.0);
                        }

                        let text_color = if selected { self.theme.text_primary } else { self.theme.text_secondary };
                        let response = ui.add(
                            egui::Button::new(RichText::new(nav_label(view)).size(13.0).color(text_color))
                                .fill(egui::Color32::TRANSPARENT)
                                .stroke(egui::Stroke::NONE),
                        );
                        if response.clicked() {
                            self.shell.navigate(view);
                        }
                    });
                    ui.add_space(self.theme.spacing_xs);
                }
            });
    }

    /// Render a consistent section header
    pub(crate) fn render_section_header(&self, ui: &mut egui::Ui, icon: &str, title: &str) {
        let separator = "=".repeat(40);
        ui.label(RichText::new(&separator).size(14.0).color(self.theme.primary));
        ui.label(
            RichText::new(self.theme.section_header_text(icon, title))
                .size(24.0)
                .strong()
                .color(self.theme.text_primary),
        );
        ui.label(RichText::new(&separator).size(14.0).color(self.theme.primary));
    }
}

/// Take a completed job out of `slot`, restoring its control.
fn finished<T>(slot: &mut Option<AsyncJob<T>>, control: &mut Control) -> Option<(u64, Result<T, ShellError>)> {
    let job = slot.as_mut()?;
    let result = job.poll()?;
    let epoch = job.epoch();
    *slot = None;
    control.restore();
    Some((epoch, result))
}

fn nav_label(view: View) -> String {
    let icon = match view {
        View::Dashboard => "[H]",
        View::Transactions => "[$]",
        View::Explorer => "[?]",
        View::Admin => "[*]",
        View::Unauthenticated => "[>]",
    };
    format!("{} {}", icon, view.title())
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_jobs();

        self.render_top_bar(ctx);
        self.render_notifications(ctx);

        if self.shell.router().is_authenticated() {
            self.render_nav(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(self.theme.spacing_md);
            egui::ScrollArea::vertical().show(ui, |ui| match self.shell.view() {
                View::Unauthenticated => self.view_auth(ui),
                View::Dashboard => self.view_dashboard(ui),
                View::Transactions => self.view_transactions(ui),
                View::Explorer => self.view_explorer(ui),
                View::Admin => self.view_admin(ui),
            });
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

pub fn launch(config: Config) -> Result<()> {
    let transport = HttpTransport::new(config.request_timeout)?;
    let credentials = CredentialStore::load();
    if let Some(path) = credentials.path() {
        tracing::info!("Credential store at {}", path.display());
    }

    let ui_config = config.clone();
    let api = Api::new(Gateway::new(transport, config, credentials));

    let app_creator = move |cc: &eframe::CreationContext<'_>| {
        Box::new(GuiApp::new(api, &ui_config, &cc.egui_ctx)) as Box<dyn App>
    };

    let viewport = egui::ViewportBuilder::default().with_inner_size([1100.0, 720.0]);
    let native_options = NativeOptions {
        viewport,
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native("Wallet Shell", native_options, Box::new(app_creator))
        .map_err(|e| anyhow!("Failed to start GUI: {}", e))
}
