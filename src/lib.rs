//! Session and API gateway layer of the wallet desktop shell.
//!
//! The core (`credential_store` through `session`) has no UI dependency; the
//! `gui` module renders it with egui.

pub mod api;
pub mod busy_guard;
pub mod config;
pub mod credential_store;
pub mod error;
pub mod gateway;
pub mod gui;
pub mod notifications;
pub mod router;
pub mod session;
pub mod types;

#[cfg(test)]
mod test_support;

pub use api::Api;
pub use config::Config;
pub use credential_store::{CredentialScope, CredentialStore};
pub use error::{normalize_error, ShellError};
pub use gateway::{AuthScope, Gateway, HttpTransport, Outcome, RequestDescriptor, Transport};
pub use notifications::{NotificationKind, NotificationQueue};
pub use router::{View, ViewRouter};
pub use session::{LogoutScope, Shell};
