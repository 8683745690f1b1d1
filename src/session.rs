//! Session lifecycle: sign-in, sign-up, resume, refresh and logout.
//!
//! Work is split in two halves. The async flows (`sign_in`, `refresh`, ...)
//! talk to the backend and can run on a worker with a cloned [`Api`]. The
//! `finish_*` methods on [`Shell`] merge a flow's result into the router, the
//! notification queue, the cached profile and the credential store. Each
//! result is tagged with the epoch it started under and is dropped if the
//! session changed in the meantime.
//!
//! The only store write a flow makes itself is the new user token during
//! sign-in, which the identity probe needs to read. Every other write waits
//! for `finish_*`, so a dropped result leaves the store alone.

use crate::api::Api;
use crate::credential_store::{CredentialScope, CredentialStore};
use crate::error::ShellError;
use crate::gateway::Transport;
use crate::notifications::{NotificationKind, NotificationQueue};
use crate::router::{NavigationError, View, ViewRouter};
use crate::types::{ChainStatus, Profile};
use std::time::{Duration, Instant};

/// Stored user tokens no longer than this are not worth a probe.
pub const MIN_TOKEN_LEN: usize = 10;

pub fn is_plausible_token(token: &str) -> bool {
    token.trim().len() > MIN_TOKEN_LEN
}

/// Which credential slots a logout clears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoutScope {
    UserOnly,
    Everything,
}

/// Profile plus chain verdict, loaded whenever a session is (re)validated.
/// A failing chain check does not invalidate the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub profile: Profile,
    pub chain: Result<ChainStatus, ShellError>,
}

/// Boot-time probe of a token left over from a previous run.
#[derive(Debug, Clone, PartialEq)]
pub struct Resume {
    /// Token that was found in the store, empty if there was none.
    pub token: String,
    /// `Ok(None)` when the token was not worth probing.
    pub outcome: Result<Option<Overview>, ShellError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignUp {
    /// Registration returned a token and it passed the identity probe.
    SignedIn(Overview),
    /// Account created without a token; the user has to log in.
    NeedsLogin,
}

// ----- flows -----

/// Identity probe followed by chain verification.
pub async fn load_overview<T: Transport>(api: &Api<T>) -> Result<Overview, ShellError> {
    let profile = api.me().await?;
    let chain = api.verify_chain().await;
    if let Err(e) = &chain {
        tracing::warn!("Chain verification failed: {}", e);
    }
    Ok(Overview { profile, chain })
}

/// Log in, store the token and validate it. The token is cleared again if
/// validation fails, so nothing unvalidated is left behind.
pub async fn sign_in<T: Transport>(api: &Api<T>, email: &str, password: &str) -> Result<Overview, ShellError> {
    let token = api.login(email, password).await?;
    validate_new_token(api, token).await
}

pub async fn sign_up<T: Transport>(api: &Api<T>, email: &str, password: &str) -> Result<SignUp, ShellError> {
    match api.register(email, password).await? {
        Some(token) => validate_new_token(api, token).await.map(SignUp::SignedIn),
        None => Ok(SignUp::NeedsLogin),
    }
}

async fn validate_new_token<T: Transport>(api: &Api<T>, token: String) -> Result<Overview, ShellError> {
    let store = api.credentials();
    store.set(CredentialScope::User, token.as_str());
    match load_overview(api).await {
        Ok(overview) => Ok(overview),
        Err(e) => {
            tracing::warn!("New token failed validation: {}", e);
            store.clear_if(CredentialScope::User, &token);
            Err(e)
        }
    }
}

/// Validate a token left over from a previous run. Read-only: whether the
/// token is discarded is decided by [`Shell::finish_resume`].
pub async fn resume<T: Transport>(api: &Api<T>) -> Resume {
    let token = api.credentials().get(CredentialScope::User);
    if !is_plausible_token(&token) {
        return Resume { token, outcome: Ok(None) };
    }
    let outcome = load_overview(api).await.map(Some);
    Resume { token, outcome }
}

/// Re-run the probe and chain check for the current session.
pub async fn refresh<T: Transport>(api: &Api<T>) -> Result<Overview, ShellError> {
    if !api.credentials().has(CredentialScope::User) {
        return Err(ShellError::validation("Sign in first"));
    }
    load_overview(api).await
}

/// Obtain an admin token. It is stored by [`Shell::finish_admin_sign_in`].
pub async fn admin_sign_in<T: Transport>(api: &Api<T>, password: &str) -> Result<String, ShellError> {
    api.admin_login(password).await
}

// ----- shell state -----

/// Everything the UI thread owns about the current session.
pub struct Shell<T> {
    api: Api<T>,
    router: ViewRouter,
    notifications: NotificationQueue,
    profile: Option<Profile>,
    chain: Option<ChainStatus>,
}

impl<T: Transport> Shell<T> {
    pub fn new(api: Api<T>, toast_duration: Duration) -> Self {
        Self {
            api,
            router: ViewRouter::new(),
            notifications: NotificationQueue::new(toast_duration),
            profile: None,
            chain: None,
        }
    }

    /// Handle for background work. Clones share the credential store.
    pub fn api(&self) -> &Api<T> {
        &self.api
    }

    pub fn credentials(&self) -> &CredentialStore {
        self.api.credentials()
    }

    pub fn view(&self) -> View {
        self.router.current()
    }

    pub fn router(&self) -> &ViewRouter {
        &self.router
    }

    pub fn epoch(&self) -> u64 {
        self.router.epoch()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn chain(&self) -> Option<ChainStatus> {
        self.chain
    }

    /// Latest verdict from an explicit chain verification.
    pub fn record_chain(&mut self, status: ChainStatus) {
        self.chain = Some(status);
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        self.notifications.show(message, kind);
    }

    pub fn tick(&mut self, now: Instant) {
        self.notifications.tick(now);
    }

    /// Whether the admin view can issue calls right now.
    pub fn has_admin_token(&self) -> bool {
        self.credentials().has(CredentialScope::Admin)
    }

    fn is_stale(&self, epoch: u64, what: &str) -> bool {
        if self.router.is_current(epoch) {
            return false;
        }
        tracing::debug!("Ignoring stale {} result from epoch {}", what, epoch);
        true
    }

    fn apply_overview(&mut self, overview: Overview) {
        self.profile = Some(overview.profile);
        match overview.chain {
            Ok(status) => self.chain = Some(status),
            Err(e) => {
                self.chain = None;
                self.notify(format!("Chain check failed: {}", e), NotificationKind::Info);
            }
        }
    }

    fn enter_dashboard(&mut self, overview: Overview, message: &str) {
        self.router.session_validated();
        self.notify(message, NotificationKind::Ok);
        // Chain notice, if any, replaces the success toast.
        self.apply_overview(overview);
    }

    fn drop_session(&mut self) {
        self.profile = None;
        self.chain = None;
        self.router.end_session();
    }

    pub fn finish_sign_in(&mut self, epoch: u64, result: Result<Overview, ShellError>) {
        if self.is_stale(epoch, "sign-in") {
            return;
        }
        match result {
            Ok(overview) => self.enter_dashboard(overview, "Login successful"),
            Err(e) => {
                self.drop_session();
                self.notify(e.to_string(), NotificationKind::Err);
            }
        }
    }

    /// `Some(SignUp::NeedsLogin)` tells the caller to switch the form to login.
    pub fn finish_sign_up(&mut self, epoch: u64, result: Result<SignUp, ShellError>) -> Option<SignUp> {
        if self.is_stale(epoch, "sign-up") {
            return None;
        }
        match result {
            Ok(SignUp::SignedIn(overview)) => {
                self.enter_dashboard(overview.clone(), "Account created");
                Some(SignUp::SignedIn(overview))
            }
            Ok(SignUp::NeedsLogin) => {
                self.notify("Account created. Please log in.", NotificationKind::Ok);
                Some(SignUp::NeedsLogin)
            }
            Err(e) => {
                self.notify(e.to_string(), NotificationKind::Err);
                None
            }
        }
    }

    /// An implausible leftover token and one the server refuses are cleared;
    /// a connectivity failure keeps the token for the next attempt. Only the
    /// probed token is ever cleared.
    pub fn finish_resume(&mut self, epoch: u64, result: Result<Resume, ShellError>) {
        if self.is_stale(epoch, "resume") {
            return;
        }
        let (token, outcome) = match result {
            Ok(resume) => (resume.token, resume.outcome),
            Err(e) => (String::new(), Err(e)),
        };
        match outcome {
            Ok(Some(overview)) => self.enter_dashboard(overview, "Welcome back"),
            Ok(None) => {
                if !token.is_empty() {
                    tracing::info!("Discarding implausible stored token");
                    self.credentials().clear_if(CredentialScope::User, &token);
                }
            }
            Err(e) => {
                if matches!(e, ShellError::Rejected { .. }) && !token.is_empty() {
                    self.credentials().clear_if(CredentialScope::User, &token);
                }
                self.drop_session();
                self.notify(format!("Please sign in again: {}", e), NotificationKind::Info);
            }
        }
    }

    /// A refused probe ends the session; other failures only raise a notice.
    pub fn finish_refresh(&mut self, epoch: u64, result: Result<Overview, ShellError>) {
        if self.is_stale(epoch, "refresh") {
            return;
        }
        match result {
            Ok(overview) => {
                self.notify("Profile loaded", NotificationKind::Ok);
                self.apply_overview(overview);
            }
            Err(e) if e.is_auth_failure() => {
                self.credentials().clear(CredentialScope::User);
                self.drop_session();
                self.notify(format!("Session expired: {}", e), NotificationKind::Err);
            }
            Err(e) => self.notify(e.to_string(), NotificationKind::Err),
        }
    }

    /// Stores the admin token only if no logout happened since the login started.
    pub fn finish_admin_sign_in(&mut self, epoch: u64, result: Result<String, ShellError>) {
        if let Some(token) = self.finish_action(epoch, result, "Admin login successful") {
            self.credentials().set(CredentialScope::Admin, token);
        }
    }

    /// Merge the result of an ordinary action. Returns the value only if the
    /// action succeeded and is still current.
    pub fn finish_action<V>(&mut self, epoch: u64, result: Result<V, ShellError>, success: &str) -> Option<V> {
        if self.is_stale(epoch, "action") {
            return None;
        }
        match result {
            Ok(value) => {
                self.notify(success, NotificationKind::Ok);
                Some(value)
            }
            Err(e) => {
                self.notify(e.to_string(), NotificationKind::Err);
                None
            }
        }
    }

    /// Switch between authenticated views. A missing credential ends the session.
    pub fn navigate(&mut self, target: View) -> bool {
        let session_present = self.credentials().has(CredentialScope::User);
        match self.router.navigate(target, session_present) {
            Ok(_) => true,
            Err(NavigationError::SessionMissing) => {
                self.drop_session();
                self.notify(NavigationError::SessionMissing.to_string(), NotificationKind::Err);
                false
            }
            Err(e) => {
                self.notify(e.to_string(), NotificationKind::Info);
                false
            }
        }
    }

    pub fn logout(&mut self, scope: LogoutScope) {
        let store = self.credentials();
        match scope {
            LogoutScope::UserOnly => store.clear(CredentialScope::User),
            LogoutScope::Everything => store.clear_all(),
        }
        self.drop_session();
        self.notify("Logged out", NotificationKind::Info);
    }

    /// Forget the admin token; the user session is untouched.
    pub fn drop_admin(&mut self) {
        self.credentials().clear(CredentialScope::Admin);
        self.notify("Admin token cleared", NotificationKind::Info);
    }

    // ----- inline drivers -----

    pub async fn login(&mut self, email: &str, password: &str) {
        let epoch = self.epoch();
        let result = sign_in(&self.api, email, password).await;
        self.finish_sign_in(epoch, result);
    }

    pub async fn register(&mut self, email: &str, password: &str) -> Option<SignUp> {
        let epoch = self.epoch();
        let result = sign_up(&self.api, email, password).await;
        self.finish_sign_up(epoch, result)
    }

    pub async fn resume(&mut self) {
        let epoch = self.epoch();
        let result = resume(&self.api).await;
        self.finish_resume(epoch, Ok(result));
    }

    pub async fn refresh(&mut self) {
        let epoch = self.epoch();
        let result = refresh(&self.api).await;
        self.finish_refresh(epoch, result);
    }

    pub async fn admin_login(&mut self, password: &str) {
        let epoch = self.epoch();
        let result = admin_sign_in(&self.api, password).await;
        self.finish_admin_sign_in(epoch, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedTransport;
    use tokio_test::block_on;

    const TOKEN: &str = "abc123456789";
    const PROFILE: &str = r#"{"email":"a@b.c","address":"LORD_x","balance":"1000.00000000"}"#;

    fn setup() -> (ScriptedTransport, CredentialStore, Shell<ScriptedTransport>) {
        let transport = ScriptedTransport::new();
        let store = CredentialStore::in_memory();
        let shell = Shell::new(transport.api(store.clone()), Duration::from_millis(3200));
        (transport, store, shell)
    }

    fn toast(shell: &Shell<ScriptedTransport>) -> (String, NotificationKind) {
        let toast = shell.notifications().current().expect("a toast should be showing");
        (toast.message.clone(), toast.kind)
    }

    fn signed_in() -> (ScriptedTransport, CredentialStore, Shell<ScriptedTransport>) {
        let (transport, store, mut shell) = setup();
        transport.reply(200, &format!(r#"{{"access_token":"{}"}}"#, TOKEN));
        transport.reply(200, PROFILE);
        transport.reply(200, r#"{"ok":true}"#);
        block_on(shell.login("a@b.c", "secret"));
        assert_eq!(shell.view(), View::Dashboard);
        (transport, store, shell)
    }

    // ==================== sign-in tests ====================

    #[test]
    fn test_login_then_probe_enters_dashboard() {
        let (transport, store, shell) = signed_in();

        assert_eq!(store.get(CredentialScope::User), TOKEN);
        assert_eq!(shell.profile().unwrap().email.as_deref(), Some("a@b.c"));
        assert_eq!(shell.chain(), Some(ChainStatus::Valid));
        assert_eq!(toast(&shell), ("Login successful".to_string(), NotificationKind::Ok));
        assert_eq!(transport.paths(), vec!["/auth/login", "/users/me", "/explorer/verify-chain"]);
    }

    #[test]
    fn test_login_with_failing_probe_clears_token() {
        let (transport, store, mut shell) = setup();
        transport.reply(200, &format!(r#"{{"access_token":"{}"}}"#, TOKEN));
        transport.reply(401, r#"{"detail":"Invalid token"}"#);

        block_on(shell.login("a@b.c", "secret"));

        assert_eq!(shell.view(), View::Unauthenticated);
        assert_eq!(store.get(CredentialScope::User), "");
        assert!(shell.profile().is_none());
        assert_eq!(toast(&shell), ("Invalid token".to_string(), NotificationKind::Err));
    }

    #[test]
    fn test_login_rejected_stays_unauthenticated() {
        let (transport, store, mut shell) = setup();
        transport.reply(401, r#"{"detail":"Invalid credentials"}"#);

        block_on(shell.login("a@b.c", "wrong"));

        assert_eq!(shell.view(), View::Unauthenticated);
        assert!(!store.has(CredentialScope::User));
        assert_eq!(toast(&shell).0, "Invalid credentials");
        assert_eq!(transport.paths(), vec!["/auth/login"]);
    }

    #[test]
    fn test_chain_failure_is_not_fatal() {
        let (transport, _, mut shell) = setup();
        transport.reply(200, &format!(r#"{{"token":"{}"}}"#, TOKEN));
        transport.reply(200, PROFILE);
        transport.reply(500, "");

        block_on(shell.login("a@b.c", "secret"));

        assert_eq!(shell.view(), View::Dashboard);
        assert_eq!(shell.chain(), None);
        assert_eq!(toast(&shell), ("Chain check failed: Error (500)".to_string(), NotificationKind::Info));
    }

    // ==================== sign-up tests ====================

    #[test]
    fn test_register_without_token_asks_for_login() {
        let (transport, store, mut shell) = setup();
        transport.reply(200, r#"{"id":3,"email":"a@b.c"}"#);

        let outcome = block_on(shell.register("a@b.c", "secret"));

        assert_eq!(outcome, Some(SignUp::NeedsLogin));
        assert_eq!(shell.view(), View::Unauthenticated);
        assert!(!store.has(CredentialScope::User));
    }

    #[test]
    fn test_register_with_token_signs_in() {
        let (transport, _, mut shell) = setup();
        transport.reply(200, &format!(r#"{{"access_token":"{}"}}"#, TOKEN));
        transport.reply(200, PROFILE);
        transport.reply(200, r#"{"valid":true}"#);

        let outcome = block_on(shell.register("a@b.c", "secret"));

        assert!(matches!(outcome, Some(SignUp::SignedIn(_))));
        assert_eq!(shell.view(), View::Dashboard);
    }

    #[test]
    fn test_register_validation_error() {
        let (transport, _, mut shell) = setup();

        assert_eq!(block_on(shell.register("", "secret")), None);
        assert_eq!(toast(&shell).1, NotificationKind::Err);
        assert!(transport.requests().is_empty());
    }

    // ==================== resume tests ====================

    #[test]
    fn test_resume_implausible_token_is_cleared() {
        let (transport, store, mut shell) = setup();
        store.set(CredentialScope::User, "short");

        block_on(shell.resume());

        assert_eq!(shell.view(), View::Unauthenticated);
        assert!(!store.has(CredentialScope::User));
        assert!(transport.requests().is_empty());
        assert!(shell.notifications().current().is_none());
    }

    #[test]
    fn test_resume_valid_token_enters_dashboard() {
        let (transport, store, mut shell) = setup();
        store.set(CredentialScope::User, TOKEN);
        transport.reply(200, PROFILE);
        transport.reply(200, r#"{"ok":false}"#);

        block_on(shell.resume());

        assert_eq!(shell.view(), View::Dashboard);
        assert_eq!(shell.chain(), Some(ChainStatus::Invalid));
    }

    #[test]
    fn test_resume_refused_token_is_cleared() {
        let (transport, store, mut shell) = setup();
        store.set(CredentialScope::User, TOKEN);
        transport.reply(401, r#"{"detail":"Token expired"}"#);

        block_on(shell.resume());

        assert_eq!(shell.view(), View::Unauthenticated);
        assert!(!store.has(CredentialScope::User));
    }

    #[test]
    fn test_resume_offline_keeps_token() {
        let (transport, store, mut shell) = setup();
        store.set(CredentialScope::User, TOKEN);
        transport.fail_unreachable();

        block_on(shell.resume());

        assert_eq!(shell.view(), View::Unauthenticated);
        assert_eq!(store.get(CredentialScope::User), TOKEN);
    }

    #[test]
    fn test_late_resume_refusal_keeps_newer_token() {
        let (transport, store, mut shell) = setup();
        store.set(CredentialScope::User, TOKEN);
        transport.reply(401, r#"{"detail":"Token expired"}"#);
        let epoch = shell.epoch();

        let attempt = block_on(resume(shell.api()));
        assert_eq!(store.get(CredentialScope::User), TOKEN);
        // A registration stored a fresh token while the probe was in flight.
        store.set(CredentialScope::User, "fresh-token-0000");
        shell.finish_resume(epoch, Ok(attempt));

        assert_eq!(shell.view(), View::Unauthenticated);
        assert_eq!(store.get(CredentialScope::User), "fresh-token-0000");
    }

    // ==================== refresh tests ====================

    #[test]
    fn test_refresh_auth_failure_logs_out() {
        let (transport, store, mut shell) = signed_in();
        transport.reply(403, r#"{"detail":"Forbidden"}"#);

        block_on(shell.refresh());

        assert_eq!(shell.view(), View::Unauthenticated);
        assert!(!store.has(CredentialScope::User));
        assert_eq!(toast(&shell).0, "Session expired: Forbidden");
    }

    #[test]
    fn test_refresh_server_error_keeps_session() {
        let (transport, store, mut shell) = signed_in();
        transport.reply(500, r#"{"message":"db down"}"#);

        block_on(shell.refresh());

        assert_eq!(shell.view(), View::Dashboard);
        assert!(store.has(CredentialScope::User));
        assert_eq!(toast(&shell), ("db down".to_string(), NotificationKind::Err));
    }

    #[test]
    fn test_stale_refresh_is_ignored() {
        let (_, store, mut shell) = signed_in();
        let epoch = shell.epoch();
        shell.logout(LogoutScope::UserOnly);

        shell.finish_refresh(
            epoch,
            Err(ShellError::Rejected { status: 401, message: "expired".into() }),
        );

        assert_eq!(toast(&shell).0, "Logged out");
        assert!(!store.has(CredentialScope::User));
    }

    #[test]
    fn test_stale_action_result_is_dropped() {
        let (_, _, mut shell) = signed_in();
        let epoch = shell.epoch();
        shell.logout(LogoutScope::Everything);

        assert_eq!(shell.finish_action(epoch, Ok(5), "done"), None);
        assert_eq!(toast(&shell).0, "Logged out");
    }

    // ==================== navigation / logout tests ====================

    #[test]
    fn test_navigate_with_session() {
        let (_, _, mut shell) = signed_in();
        assert!(shell.navigate(View::Explorer));
        assert_eq!(shell.view(), View::Explorer);
    }

    #[test]
    fn test_navigate_after_token_vanished_ends_session() {
        let (_, store, mut shell) = signed_in();
        store.clear(CredentialScope::User);

        assert!(!shell.navigate(View::Transactions));
        assert_eq!(shell.view(), View::Unauthenticated);
        assert_eq!(toast(&shell).1, NotificationKind::Err);
    }

    #[test]
    fn test_logout_user_only_keeps_admin_token() {
        let (_, store, mut shell) = signed_in();
        store.set(CredentialScope::Admin, "adm-1");

        shell.logout(LogoutScope::UserOnly);

        assert_eq!(shell.view(), View::Unauthenticated);
        assert!(!store.has(CredentialScope::User));
        assert_eq!(store.get(CredentialScope::Admin), "adm-1");
    }

    #[test]
    fn test_logout_everything() {
        let (_, store, mut shell) = signed_in();
        store.set(CredentialScope::Admin, "adm-1");

        shell.logout(LogoutScope::Everything);

        assert!(!store.has(CredentialScope::User));
        assert!(!store.has(CredentialScope::Admin));
        assert!(shell.profile().is_none());
    }

    // ==================== admin tests ====================

    #[test]
    fn test_admin_login_then_drop() {
        let (transport, store, mut shell) = signed_in();
        transport.reply(200, r#"{"admin_token":"adm-1"}"#);

        block_on(shell.admin_login("pw"));
        assert!(shell.has_admin_token());
        assert_eq!(toast(&shell).0, "Admin login successful");

        shell.drop_admin();
        assert!(!shell.has_admin_token());
        assert_eq!(store.get(CredentialScope::User), TOKEN);
        assert_eq!(shell.view(), View::Dashboard);
    }

    #[test]
    fn test_admin_login_after_logout_is_not_stored() {
        let (transport, store, mut shell) = signed_in();
        transport.reply(200, r#"{"admin_token":"adm-secret"}"#);
        let epoch = shell.epoch();
        let worker_api = shell.api().clone();

        shell.logout(LogoutScope::Everything);
        let result = block_on(admin_sign_in(&worker_api, "pw"));
        assert_eq!(result.as_deref(), Ok("adm-secret"));
        shell.finish_admin_sign_in(epoch, result);

        assert_eq!(shell.view(), View::Unauthenticated);
        assert!(!store.has(CredentialScope::Admin));
        assert_eq!(toast(&shell).0, "Logged out");
    }

    #[test]
    fn test_admin_login_rejected_stores_nothing() {
        let (transport, store, mut shell) = signed_in();
        transport.reply(401, r#"{"detail":"Invalid admin password"}"#);

        block_on(shell.admin_login("wrong"));

        assert!(!store.has(CredentialScope::Admin));
        assert_eq!(toast(&shell), ("Invalid admin password".to_string(), NotificationKind::Err));
    }

    #[test]
    fn test_plausible_token_length() {
        assert!(!is_plausible_token("0123456789"));
        assert!(!is_plausible_token("  0123456789  "));
        assert!(is_plausible_token("0123456789a"));
    }
}
