// src/pipeline/shutdown.rs

//! Cooperative cancellation for the scheduler and its cycles.

use std::future::Future;

use tokio::sync::watch;

use crate::error::{AppError, Result};

/// Sending half; flips every [`Shutdown`] to cancelled.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half, cheap to clone.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Create a connected trigger/shutdown pair.
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl Shutdown {
    /// A shutdown that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Trigger dropped without firing.
            std::future::pending::<()>().await;
        }
    }

    /// Run `fut` unless shutdown is requested first.
    pub async fn run_until<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(AppError::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_cancels() {
        let (trigger, shutdown) = shutdown_channel();
        assert!(!shutdown.is_cancelled());

        trigger.trigger();
        assert!(shutdown.is_cancelled());
        shutdown.cancelled().await;
    }

    #[tokio::test]
    async fn test_run_until_aborts_pending_work() {
        let (trigger, shutdown) = shutdown_channel();
        let work = shutdown.run_until(async {
            std::future::pending::<()>().await;
            Ok(())
        });
        let (result, ()) = tokio::join!(work, async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        });
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_never_lets_work_finish() {
        let shutdown = Shutdown::never();
        let value = shutdown.run_until(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert!(!shutdown.is_cancelled());
    }
}
