//! Background jobs polled from the GUI thread
//!
//! Every job remembers the session epoch it was started under so the caller
//! can drop its result if the session changed while it ran.

use crate::error::ShellError;
use std::sync::mpsc::{Receiver, TryRecvError};

pub struct AsyncJob<T> {
    receiver: Option<Receiver<Result<T, ShellError>>>,
    epoch: u64,
}

impl<T> AsyncJob<T> {
    pub fn new(receiver: Receiver<Result<T, ShellError>>, epoch: u64) -> Self {
        Self {
            receiver: Some(receiver),
            epoch,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns Some(result) once the job has completed, None while it is still running
    pub fn poll(&mut self) -> Option<Result<T, ShellError>> {
        if let Some(rx) = &self.receiver {
            match rx.try_recv() {
                Ok(res) => {
                    self.receiver = None;
                    return Some(res);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.receiver = None;
                    return Some(Err(ShellError::Aborted("Worker task disconnected".into())));
                }
            }
        }
        None
    }

    pub fn is_running(&self) -> bool {
        self.receiver.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    // ==================== AsyncJob tests ====================

    #[test]
    fn test_poll_pending_then_done() {
        let (tx, rx) = mpsc::channel();
        let mut job = AsyncJob::new(rx, 3);
        assert!(job.poll().is_none());
        assert!(job.is_running());

        tx.send(Ok(7)).unwrap();
        assert_eq!(job.poll(), Some(Ok(7)));
        assert!(!job.is_running());
        assert_eq!(job.epoch(), 3);
        assert_eq!(job.poll(), None);
    }

    #[test]
    fn test_poll_disconnected_worker() {
        let (tx, rx) = mpsc::channel::<Result<(), ShellError>>();
        drop(tx);
        let mut job = AsyncJob::new(rx, 0);
        assert!(matches!(job.poll(), Some(Err(ShellError::Aborted(_)))));
        assert!(!job.is_running());
    }
}
