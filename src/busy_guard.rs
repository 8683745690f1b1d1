//! Re-entrancy lock for user-triggered actions.
//!
//! A [`Control`] is the state behind one button: while its action runs it is
//! disabled and shows [`BUSY_LABEL`]; afterwards the original label comes back.
//! Restoration runs on every exit path, including panics inside the action.
//!
//! Two ways to drive it:
//!
//! - [`run`] / [`run_async`] for callers that wait for the action inline.
//! - [`Control::begin`] / [`Control::restore`] when the action outlives the
//!   call that starts it. The GUI takes this path: `begin` when a worker job
//!   is spawned, `restore` when the frame loop collects the job's result
//!   (success, failure or a vanished worker alike).

use std::future::Future;

pub const BUSY_LABEL: &str = "Please wait...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    label: String,
    /// Captured the first time the control goes busy, then reused.
    original: Option<String>,
    busy: bool,
}

impl Control {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            original: None,
            busy: false,
        }
    }

    /// Text to render on the control right now.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_enabled(&self) -> bool {
        !self.busy
    }

    /// Disable the control and show the busy label.
    ///
    /// Returns `false` without touching anything if it is already busy, so a
    /// second click cannot start a second action.
    pub fn begin(&mut self) -> bool {
        if self.busy {
            return false;
        }
        if self.original.is_none() {
            self.original = Some(self.label.clone());
        }
        self.busy = true;
        self.label = BUSY_LABEL.to_string();
        true
    }

    /// Re-enable the control with its original label. Restoring an idle control is a no-op.
    pub fn restore(&mut self) {
        if !self.busy {
            return;
        }
        self.busy = false;
        if let Some(original) = &self.original {
            self.label = original.clone();
        }
    }
}

/// Restores the control when dropped, whichever way the action ends.
struct Restore<'a>(&'a mut Control);

impl Drop for Restore<'_> {
    fn drop(&mut self) {
        self.0.restore();
    }
}

/// Run `action` with `control` locked. `None` means the control was already busy
/// and the action was not started.
pub fn run<T>(control: &mut Control, action: impl FnOnce() -> T) -> Option<T> {
    if !control.begin() {
        return None;
    }
    let _restore = Restore(control);
    Some(action())
}

/// Async form of [`run`]; the lock is held across every await in `action`.
pub async fn run_async<T, F>(control: &mut Control, action: F) -> Option<T>
where
    F: Future<Output = T>,
{
    if !control.begin() {
        return None;
    }
    let _restore = Restore(control);
    Some(action.await)
}
