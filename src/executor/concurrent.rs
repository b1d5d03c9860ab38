//! Concurrent Executor
//!
//! Runs every probe of a round in its own task and waits for all of them.
//! A panicking check is caught inside its task and reported as a failure for
//! that probe only.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::domain::context::ProbeContext;
use crate::domain::ports::Executor;
use crate::domain::probe::{ExecutionResult, Probe};
use crate::error::CheckError;

/// Fan-out/fan-in executor backed by a tokio `JoinSet`.
///
/// Imposes no timeout or retry of its own; the caller's [`ProbeContext`] is
/// the only deadline. Dropping the returned future aborts the round's tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcurrentExecutor;

impl ConcurrentExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for ConcurrentExecutor {
    #[instrument(skip_all, fields(probes = probes.len()))]
    async fn execute(&self, ctx: &ProbeContext, probes: Vec<Probe>) -> Vec<ExecutionResult> {
        if probes.is_empty() {
            return Vec::new();
        }

        let mut tasks = JoinSet::new();
        for (idx, probe) in probes.iter().enumerate() {
            let probe = probe.clone();
            // A check may cancel its own context but never its siblings
            let ctx = ctx.child();
            tasks.spawn(async move {
                let start = Instant::now();
                let outcome = match AssertUnwindSafe(probe.execute(ctx)).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(payload) => Err(CheckError::Panicked(panic_message(payload.as_ref()))),
                };
                (idx, outcome, start.elapsed())
            });
        }

        let mut outcomes: Vec<Option<(Result<(), CheckError>, Duration)>> =
            (0..probes.len()).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, outcome, elapsed)) => outcomes[idx] = Some((outcome, elapsed)),
                Err(e) => warn!(error = %e, "Probe task ended without reporting"),
            }
        }

        probes
            .into_iter()
            .zip(outcomes)
            .map(|(probe, outcome)| {
                let (outcome, elapsed) =
                    outcome.unwrap_or((Err(CheckError::Aborted), Duration::ZERO));

                match &outcome {
                    Ok(()) => debug!(
                        probe = %probe.name(),
                        kind = %probe.category(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Probe check passed"
                    ),
                    Err(e) => warn!(
                        probe = %probe.name(),
                        kind = %probe.category(),
                        informational = probe.is_informational(),
                        error = %e,
                        "Probe check failed"
                    ),
                }

                ExecutionResult::new(probe, outcome, elapsed)
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::probe::{ProbeCategory, ProbeHealth};
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn ok(name: &str) -> Probe {
        Probe::from_fn(name, ProbeCategory::Liveness, |_ctx| async { Ok(()) })
    }

    fn fail(name: &str) -> Probe {
        Probe::from_fn(name, ProbeCategory::Liveness, |_ctx| async {
            Err(CheckError::failed("always fails"))
        })
    }

    fn find<'a>(results: &'a [ExecutionResult], name: &str) -> &'a ExecutionResult {
        results
            .iter()
            .find(|r| r.probe().name() == name)
            .expect("result for probe")
    }

    #[tokio::test]
    async fn test_empty_round() {
        let results = ConcurrentExecutor::new()
            .execute(&ProbeContext::new(), Vec::new())
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_one_result_per_probe() {
        let probes = vec![ok("a"), fail("b"), ok("c")];
        let results = ConcurrentExecutor::new()
            .execute(&ProbeContext::new(), probes)
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(find(&results, "a").probe().health(), ProbeHealth::Healthy);
        assert_eq!(find(&results, "b").probe().health(), ProbeHealth::Unhealthy);
        assert_eq!(
            find(&results, "b").err(),
            Some(&CheckError::failed("always fails"))
        );
        assert!(find(&results, "c").err().is_none());
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let panicking = Probe::from_fn("panics", ProbeCategory::Readiness, |_ctx| async {
            if true {
                panic!("check exploded");
            }
            Ok(())
        });

        let results = ConcurrentExecutor::new()
            .execute(&ProbeContext::new(), vec![ok("a"), panicking, ok("b")])
            .await;

        assert_eq!(results.len(), 3);
        assert_matches!(
            find(&results, "panics").err(),
            Some(CheckError::Panicked(msg)) if msg == "check exploded"
        );
        assert!(find(&results, "a").err().is_none());
        assert!(find(&results, "b").err().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_probes_run_concurrently() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let probes = (0..4)
            .map(|i| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                Probe::from_fn(format!("p{}", i), ProbeCategory::Readiness, move |_ctx| {
                    let in_flight = Arc::clone(&in_flight);
                    let peak = Arc::clone(&peak);
                    async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    }
                })
            })
            .collect();

        let results = ConcurrentExecutor::new()
            .execute(&ProbeContext::new(), probes)
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(peak.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_cancelled_context_still_attempts_checks() {
        let attempts = Arc::new(AtomicUsize::new(0));

        let probes: Vec<Probe> = (0..3)
            .map(|i| {
                let attempts = Arc::clone(&attempts);
                Probe::from_fn(format!("p{}", i), ProbeCategory::Liveness, move |ctx| {
                    let attempts = Arc::clone(&attempts);
                    async move {
                        attempts.fetch_add(1, Ordering::SeqCst);
                        ctx.run(async {
                            tokio::time::sleep(Duration::from_secs(3600)).await;
                            Ok(())
                        })
                        .await
                    }
                })
            })
            .collect();

        let ctx = ProbeContext::new();
        ctx.cancel();

        let results = ConcurrentExecutor::new().execute(&ctx, probes).await;

        assert_eq!(results.len(), 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(results
            .iter()
            .all(|r| r.err() == Some(&CheckError::Cancelled)));
    }

    #[tokio::test]
    async fn test_check_cannot_cancel_siblings() {
        let caller = ProbeContext::new();

        let cancels_itself =
            Probe::from_fn("self-cancel", ProbeCategory::Liveness, |ctx| async move {
                ctx.cancel();
                Ok(())
            });
        let sibling = Probe::from_fn("sibling", ProbeCategory::Liveness, |ctx| async move {
            ctx.run(async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(())
            })
            .await
        });

        let results = ConcurrentExecutor::new()
            .execute(&caller, vec![cancels_itself, sibling])
            .await;

        assert_eq!(results.len(), 2);
        assert!(find(&results, "self-cancel").err().is_none());
        assert!(find(&results, "sibling").err().is_none());
        assert!(!caller.is_done());
    }

    #[tokio::test]
    async fn test_cancel_mid_round() {
        let ctx = ProbeContext::new();

        let slow = Probe::from_fn("slow", ProbeCategory::Readiness, |ctx| async move {
            ctx.run(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            })
            .await
        });

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let results = ConcurrentExecutor::new()
            .execute(&ctx, vec![slow, ok("fast")])
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(find(&results, "slow").err(), Some(&CheckError::Cancelled));
        assert!(find(&results, "fast").err().is_none());
    }
}
