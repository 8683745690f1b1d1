//! Which view is active, and when it may change.
//!
//! The router always starts at [`View::Unauthenticated`], whatever the
//! credential store holds. Authenticated views are entered only through
//! [`ViewRouter::session_validated`], i.e. after the identity probe succeeded.
//!
//! Each session change bumps an epoch. Work started under an older epoch is
//! stale: its outcome must not be merged into the current state.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Unauthenticated,
    Dashboard,
    Transactions,
    Explorer,
    Admin,
}

impl View {
    /// Views reachable by navigation once signed in.
    pub const AUTHENTICATED: [View; 4] = [View::Dashboard, View::Transactions, View::Explorer, View::Admin];

    pub fn title(&self) -> &'static str {
        match self {
            View::Unauthenticated => "Sign in",
            View::Dashboard => "Dashboard",
            View::Transactions => "Transactions",
            View::Explorer => "Explorer",
            View::Admin => "Admin",
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, View::Unauthenticated)
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Sign in first")]
    NotSignedIn,
    #[error("Your session has ended. Please sign in again.")]
    SessionMissing,
    #[error("Use log out to leave the app")]
    UseLogout,
}

#[derive(Debug, Clone)]
pub struct ViewRouter {
    current: View,
    epoch: u64,
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRouter {
    pub fn new() -> Self {
        Self {
            current: View::Unauthenticated,
            epoch: 0,
        }
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.requires_session()
    }

    /// Current session epoch; tag async work with it.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether work tagged with `epoch` may still update state.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Move between authenticated views.
    ///
    /// `session_present` is whether a user credential is stored at the time of
    /// the request. Navigating to the current view is allowed and changes nothing.
    pub fn navigate(&mut self, target: View, session_present: bool) -> Result<View, NavigationError> {
        if !target.requires_session() {
            return Err(NavigationError::UseLogout);
        }
        if !self.is_authenticated() {
            return Err(NavigationError::NotSignedIn);
        }
        if !session_present {
            return Err(NavigationError::SessionMissing);
        }
        if self.current != target {
            tracing::debug!("View {:?} -> {:?}", self.current, target);
            self.current = target;
        }
        Ok(self.current)
    }

    /// Identity probe succeeded: open the dashboard and start a new epoch.
    pub fn session_validated(&mut self) {
        tracing::info!("Session validated, entering dashboard");
        self.current = View::Dashboard;
        self.epoch += 1;
    }

    /// Logout or failed identity probe. Always lands on `Unauthenticated`.
    pub fn end_session(&mut self) {
        if self.is_authenticated() {
            tracing::info!("Session ended from {:?}", self.current);
        }
        self.current = View::Unauthenticated;
        self.epoch += 1;
    }
}
