//! Execution Context
//!
//! Cancellation and deadline shared by every check in one execution round.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::CheckError;

/// Cancellable, deadline-bearing context handed to probe checks.
///
/// Cloning shares the same cancellation token, so cancelling any clone
/// cancels them all. Use [`ProbeContext::child`] to derive a context that can
/// be cancelled (or given a shorter deadline) without affecting its parent.
#[derive(Debug, Clone, Default)]
pub struct ProbeContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ProbeContext {
    /// Create a context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing cancellation token (e.g. a server shutdown token).
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set a deadline. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    /// Set a deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a child context. Cancelling the parent cancels the child, not the reverse.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and every child derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<CheckError> {
        if self.token.is_cancelled() {
            return Some(CheckError::Cancelled);
        }

        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CheckError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolve once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> CheckError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.token.cancelled() => CheckError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => CheckError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                CheckError::Cancelled
            }
        }
    }

    /// Run `fut` until it completes or the context ends, whichever comes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, CheckError>
    where
        F: Future<Output = Result<T, CheckError>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        tokio::select! {
            biased;
            err = self.done() => Err(err),
            res = fut => res,
        }
    }
}
