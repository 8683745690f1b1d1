//! Desktop GUI built with egui/eframe.
//!
//! ## Module Structure
//!
//! - `app` - GuiApp, per-view state, job polling and the frame loop
//! - `async_job` - polling of background jobs from the GUI thread
//! - `theme` - colors, spacing and styled widget factories (AppTheme)
//! - `helpers` - display formatting
//! - `views` - one rendering module per router view
//! - `widgets` - history and audit tables
//!
//! Network calls never run on the GUI thread: each action spawns a worker
//! with its own current-thread tokio runtime and the frame loop polls it.

mod app;
pub mod async_job;
pub mod helpers;
pub mod theme;
pub mod views;
pub mod widgets;

pub use app::{launch, GuiApp};
pub use async_job::AsyncJob;
pub use theme::{configure_style, AppTheme};
