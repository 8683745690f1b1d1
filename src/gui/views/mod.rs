//! View modules for the GUI
//!
//! Each submodule adds one `view_*` method to `GuiApp`, called from
//! `App::update` according to the router's current view.
//!
//! - `auth` - sign in / register (the only unauthenticated view)
//! - `dashboard` - profile, balance and chain status
//! - `transactions` - transfer form and history
//! - `explorer` - block and address lookups, chain verification
//! - `admin` - admin login, freeze/unfreeze, audit trail

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod explorer;
pub mod transactions;
