//! Built-in Check Functions
//!
//! Ready-made [`ProbeCheck`] implementations for common dependencies. Each
//! network check runs under a child context carrying its own timeout, so it
//! gives up on its own but still stops early when the round is cancelled.

mod http;
mod net;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::context::ProbeContext;
use crate::domain::probe::ProbeCheck;
use crate::error::CheckError;

pub use http::{http_get, HttpGetCheck};
pub use net::{dns_resolve, tcp_dial, DnsResolveCheck, TcpDialCheck};

/// Timeout applied to built-in checks when none is configured.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `fut` under a child of `ctx` limited to `timeout`.
///
/// Expiry of the local timeout is reported as [`CheckError::Timeout`]; the
/// parent's own cancellation or deadline is passed through unchanged.
pub(crate) async fn run_with_timeout<F, T>(
    ctx: &ProbeContext,
    timeout: Duration,
    fut: F,
) -> Result<T, CheckError>
where
    F: Future<Output = Result<T, CheckError>>,
{
    let local = ctx.child().with_timeout(timeout);
    match local.run(fut).await {
        Err(CheckError::DeadlineExceeded) if ctx.err().is_none() => {
            Err(CheckError::Timeout(timeout))
        }
        other => other,
    }
}

/// Check that always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOk;

#[async_trait]
impl ProbeCheck for AlwaysOk {
    async fn check(&self, _ctx: ProbeContext) -> Result<(), CheckError> {
        Ok(())
    }
}

pub fn always_ok() -> AlwaysOk {
    AlwaysOk
}

/// Check that always fails with a fixed reason.
#[derive(Debug, Clone)]
pub struct AlwaysFail {
    reason: String,
}

#[async_trait]
impl ProbeCheck for AlwaysFail {
    async fn check(&self, _ctx: ProbeContext) -> Result<(), CheckError> {
        Err(CheckError::Failed(self.reason.clone()))
    }
}

pub fn always_fail(reason: impl Into<String>) -> AlwaysFail {
    AlwaysFail {
        reason: reason.into(),
    }
}

/// Check reporting that a probe was built without a check function.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NotConfigured;

#[async_trait]
impl ProbeCheck for NotConfigured {
    async fn check(&self, _ctx: ProbeContext) -> Result<(), CheckError> {
        Err(CheckError::NotConfigured)
    }
}
