//! "Copied!" notice with a single re-armable auto-clear timer.
//!
//! The current receipt is published on a `watch` channel. Each `show`
//! aborts the previous clear task and bumps a generation counter; a clear
//! task only removes the receipt it was spawned for.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// How long a copy notice stays visible unless configured otherwise
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_millis(2000);

/// A shown copy notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReceipt {
    pub text: String,
    pub copied_at: DateTime<Utc>,
    /// When the notice disappears
    pub clears_at: Instant,
    pub ttl: Duration,
    generation: u64,
}

pub struct CopyNotice {
    ttl: Duration,
    tx: Arc<watch::Sender<Option<CopyReceipt>>>,
    generation: u64,
    clear_task: Option<JoinHandle<()>>,
}

impl CopyNotice {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            ttl,
            tx: Arc::new(tx),
            generation: 0,
            clear_task: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Publish a receipt for `text` and (re)arm the clear timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn show(&mut self, text: impl Into<String>, copied_at: DateTime<Utc>) -> CopyReceipt {
        self.cancel_timer();

        self.generation += 1;
        let generation = self.generation;
        let receipt = CopyReceipt {
            text: text.into(),
            copied_at,
            clears_at: Instant::now() + self.ttl,
            ttl: self.ttl,
            generation,
        };
        self.tx.send_replace(Some(receipt.clone()));

        let tx = Arc::clone(&self.tx);
        let clears_at = receipt.clears_at;
        self.clear_task = Some(tokio::spawn(async move {
            tokio::time::sleep_until(clears_at).await;
            let cleared = tx.send_if_modified(|current| match current {
                Some(shown) if shown.generation == generation => {
                    *current = None;
                    true
                }
                _ => false,
            });
            if cleared {
                debug!(generation, "copy notice cleared");
            }
        }));

        receipt
    }

    /// Clear immediately (user closed the notice).
    pub fn dismiss(&mut self) {
        self.cancel_timer();
        self.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<CopyReceipt> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<CopyReceipt>> {
        self.tx.subscribe()
    }

    fn cancel_timer(&mut self) {
        if let Some(task) = self.clear_task.take() {
            task.abort();
        }
    }
}

impl Default for CopyNotice {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl Drop for CopyNotice {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
