//! Reusable UI widgets embedded in the views.

mod records;

pub use records::{audit_table, history_table};
