//! Suspension points: let the host page settle, poll until a condition holds
//! or a time budget runs out, and honour cancellation.

use super::Page;
use crate::errors::{AppError, AppResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub const DEFAULT_SETTLE_MS: u64 = 50;
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Shared flag checked at every suspension point.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that flips on SIGINT (Ctrl+C).
    pub fn from_ctrlc() -> AppResult<Self> {
        let token = Self::new();
        let flag = Arc::clone(&token.flag);

        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })
        .map_err(|e| AppError::Other(format!("cannot install Ctrl+C handler: {}", e)))?;

        Ok(token)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> AppResult<()> {
        if self.is_cancelled() {
            Err(AppError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
pub struct Waiter {
    step: Duration,
    timeout: Duration,
    cancel: CancelToken,
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_SETTLE_MS),
            Duration::from_millis(DEFAULT_TIMEOUT_MS),
        )
    }
}

impl Waiter {
    pub fn new(step: Duration, timeout: Duration) -> Self {
        Self {
            step: step.max(Duration::from_millis(1)),
            timeout,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// How many settle steps fit in the budget (at least one).
    pub fn max_polls(&self) -> u32 {
        let polls = self.timeout.as_millis() / self.step.as_millis().max(1);
        polls.clamp(1, u32::MAX as u128) as u32
    }

    /// One settle step after a state-changing action.
    pub fn pause<P: Page + ?Sized>(&self, page: &mut P) -> AppResult<()> {
        self.cancel.check()?;
        page.settle(self.step);
        Ok(())
    }

    /// Settle, then check `condition`, until it yields a value.
    ///
    /// `Ok(None)` from `condition` means "not yet"; errors abort immediately.
    /// Runs out with `AppError::Timeout` naming `what`.
    pub fn wait_until<P, T, F>(&self, page: &mut P, what: &str, mut condition: F) -> AppResult<T>
    where
        P: Page + ?Sized,
        F: FnMut(&P) -> AppResult<Option<T>>,
    {
        for _ in 0..self.max_polls() {
            self.pause(page)?;
            if let Some(found) = condition(page)? {
                return Ok(found);
            }
        }
        Err(AppError::Timeout(what.to_string()))
    }
}
