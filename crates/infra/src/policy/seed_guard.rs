use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

/// Seeds the default matrix at most once per guard, retrying after failure.
///
/// The first caller that finds the flag unset runs the seed while holding the
/// lock; concurrent callers wait on the lock instead of seeding again. The
/// flag is set only when the seed succeeds, so a failed seed is retried by
/// the next caller. There is no teardown: a fresh guard means a fresh process.
#[derive(Debug, Default)]
pub struct SeedGuard {
    seeded: Mutex<bool>,
    ready: AtomicBool,
}

impl SeedGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seeded(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Run `seed` unless a previous call already succeeded.
    pub async fn ensure<F, Fut, E>(&self, seed: F) -> Result<(), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        if self.is_seeded() {
            return Ok(());
        }

        let mut seeded = self.seeded.lock().await;
        if *seeded {
            return Ok(());
        }

        seed().await?;
        *seeded = true;
        self.ready.store(true, Ordering::Release);
        Ok(())
    }
}
