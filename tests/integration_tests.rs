//! Healthcheck Integration Tests
//!
//! End-to-end behavior across the registry, executor, aggregation policy,
//! metrics sinks and HTTP surface:
//! - Registry semantics
//! - Execution rounds and cancellation
//! - Category aggregation and informational probes
//! - Prometheus exposition
//! - HTTP endpoints

use std::sync::Arc;
use std::time::Duration;

use healthcheck::checks::{always_fail, always_ok};
use healthcheck::domain::ports::{Executor, MetricsSink, ProbeStore};
use healthcheck::{
    CheckError, ConcurrentExecutor, HealthService, InMemoryMetricsSink, InMemoryProbeStore,
    Outcome, Probe, ProbeCategory, ProbeContext, ProbeHealth, PrometheusMetricsSink,
};

fn ok(name: &str, category: ProbeCategory) -> Probe {
    Probe::new(name, category, always_ok())
}

fn fail(name: &str, category: ProbeCategory) -> Probe {
    Probe::new(name, category, always_fail("always fails"))
}

fn service_with_sink() -> (HealthService, Arc<InMemoryMetricsSink>) {
    let sink = Arc::new(InMemoryMetricsSink::new());
    (HealthService::with_metrics(sink.clone()), sink)
}

// =============================================================================
// Registry
// =============================================================================

mod registry_tests {
    use super::*;

    #[test]
    fn test_same_name_replaces() {
        let store = InMemoryProbeStore::new();
        store.add(vec![fail("db", ProbeCategory::Readiness)]).unwrap();
        store.add(vec![ok("db", ProbeCategory::Liveness)]).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("db").unwrap().category(), ProbeCategory::Liveness);
    }

    #[test]
    fn test_delete_and_lookup() {
        let store = InMemoryProbeStore::new();
        store
            .add(vec![
                ok("a", ProbeCategory::Liveness),
                ok("b", ProbeCategory::Readiness),
            ])
            .unwrap();

        store.delete(&["a", "missing"]);

        assert!(store.get("a").is_none());
        assert!(store.get("b").is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_on_demand_selects_everything() {
        let store = InMemoryProbeStore::new();
        store
            .add(vec![
                ok("a", ProbeCategory::Liveness),
                ok("b", ProbeCategory::Startup),
                ok("c", ProbeCategory::OnDemand),
            ])
            .unwrap();

        assert_eq!(store.get_by_category(ProbeCategory::OnDemand).len(), 3);
        assert_eq!(store.get_by_category(ProbeCategory::Startup).len(), 1);
        assert!(store.get_by_category(ProbeCategory::Readiness).is_empty());
    }
}

// =============================================================================
// Execution Engine
// =============================================================================

mod executor_tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_cancel_before_completion() {
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
            .execute(&ctx, vec![slow, ok("fast", ProbeCategory::Readiness)])
            .await;

        assert_eq!(results.len(), 2);
        let slow = results.iter().find(|r| r.probe().name() == "slow").unwrap();
        assert_eq!(slow.err(), Some(&CheckError::Cancelled));
        assert!(slow.err().unwrap().is_context_error());
    }

    #[tokio::test]
    async fn test_deadline_bounds_round() {
        let ctx = ProbeContext::new().with_timeout(Duration::from_millis(50));

        let stuck = Probe::from_fn("stuck", ProbeCategory::Liveness, |ctx| async move {
            ctx.run(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            })
            .await
        });

        let results = ConcurrentExecutor::new().execute(&ctx, vec![stuck]).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].err(), Some(&CheckError::DeadlineExceeded));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: one result per input probe, whatever the checks do.
        #[test]
        fn prop_cardinality(outcomes in prop::collection::vec(0u8..3, 0..24)) {
            let probes: Vec<Probe> = outcomes
                .iter()
                .enumerate()
                .map(|(i, outcome)| {
                    let name = format!("p{}", i);
                    match outcome {
                        0 => ok(&name, ProbeCategory::Readiness),
                        1 => fail(&name, ProbeCategory::Readiness),
                        _ => Probe::from_fn(name, ProbeCategory::Readiness, |_ctx| async {
                            if true {
                                panic!("boom");
                            }
                            Ok(())
                        }),
                    }
                })
                .collect();

            let results = tokio_test::block_on(
                ConcurrentExecutor::new().execute(&ProbeContext::new(), probes),
            );

            prop_assert_eq!(results.len(), outcomes.len());
            for (i, outcome) in outcomes.iter().enumerate() {
                let name = format!("p{}", i);
                let result = results.iter().find(|r| r.probe().name() == name).unwrap();
                prop_assert_eq!(result.is_failure(), *outcome != 0);
            }
        }
    }
}

// =============================================================================
// Aggregation
// =============================================================================

mod aggregation_tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_probe_fails_category() {
        let (service, _) = service_with_sink();
        service
            .store()
            .add(vec![
                ok("A", ProbeCategory::Liveness),
                fail("B", ProbeCategory::Liveness),
            ])
            .unwrap();

        let report = service
            .execute_category(&ProbeContext::new(), ProbeCategory::Liveness)
            .await;

        assert_eq!(report.outcome, Outcome::Unhealthy);
        assert_eq!(report.results.len(), 2);
    }

    #[tokio::test]
    async fn test_informational_failure() {
        let (service, sink) = service_with_sink();
        service
            .store()
            .add(vec![
                ok("A", ProbeCategory::Liveness),
                fail("B", ProbeCategory::Liveness).with_informational(true),
            ])
            .unwrap();

        let report = service
            .execute_category(&ProbeContext::new(), ProbeCategory::Liveness)
            .await;

        assert_eq!(report.outcome, Outcome::Healthy);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(
            sink.status(ProbeCategory::Liveness, "B"),
            Some(ProbeHealth::Unhealthy)
        );
    }

    #[tokio::test]
    async fn test_empty_readiness() {
        let (service, _) = service_with_sink();

        let report = service
            .execute_category(&ProbeContext::new(), ProbeCategory::Readiness)
            .await;

        assert_eq!(report.outcome, Outcome::Healthy);
        assert!(report.results.is_empty());
    }

    #[tokio::test]
    async fn test_on_demand_includes_startup() {
        let (service, _) = service_with_sink();
        service
            .store()
            .add(vec![fail("C", ProbeCategory::Startup)])
            .unwrap();

        let report = service
            .execute_category(&ProbeContext::new(), ProbeCategory::OnDemand)
            .await;

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].probe().name(), "C");
        assert_eq!(report.results[0].probe().category(), ProbeCategory::Startup);
    }

    #[tokio::test]
    async fn test_registry_keeps_no_health() {
        let (service, _) = service_with_sink();
        service
            .store()
            .add(vec![fail("x", ProbeCategory::Liveness)])
            .unwrap();

        service.execute_all(&ProbeContext::new()).await;

        let stored = service.store().get("x").unwrap();
        assert_eq!(stored.health(), ProbeHealth::Unknown);
    }
}

// =============================================================================
// Metrics
// =============================================================================

mod metrics_tests {
    use super::*;

    #[tokio::test]
    async fn test_prometheus_exposition_after_round() {
        let sink = Arc::new(PrometheusMetricsSink::new("my_namespace").unwrap());
        let service = HealthService::with_metrics(sink.clone());
        service
            .store()
            .add(vec![
                ok("liveness", ProbeCategory::Liveness),
                fail("component bar", ProbeCategory::Readiness),
            ])
            .unwrap();

        service.execute_all(&ProbeContext::new()).await;

        let body = sink.exposition().unwrap().body;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains(
            "# HELP my_namespace_healthcheck_status Current probe check status (0=healthy, 1=unhealthy)"
        ));
        assert!(body.contains(
            r#"my_namespace_healthcheck_status{kind="liveness",probe="liveness"} 0"#
        ));
        assert!(body.contains(
            r#"my_namespace_healthcheck_status{kind="readiness",probe="component bar"} 1"#
        ));
    }

    #[tokio::test]
    async fn test_component_flip_updates_gauge() {
        use healthcheck::builder::for_components;
        use healthcheck::ComponentStatusBoard;

        let sink = Arc::new(PrometheusMetricsSink::new("app").unwrap());
        let service = HealthService::with_metrics(sink.clone());

        let board: ComponentStatusBoard = [("foo", true)].into_iter().collect();
        service
            .store()
            .add(for_components(ProbeCategory::Readiness, &board))
            .unwrap();

        let ctx = ProbeContext::new();
        assert_eq!(
            service.evaluate(&ctx, ProbeCategory::Readiness).await,
            Outcome::Healthy
        );
        assert_eq!(sink.status(ProbeCategory::Readiness, "component foo"), Some(0.0));

        board.set("foo", false);
        assert_eq!(
            service.evaluate(&ctx, ProbeCategory::Readiness).await,
            Outcome::Unhealthy
        );
        assert_eq!(sink.status(ProbeCategory::Readiness, "component foo"), Some(1.0));
    }
}

// =============================================================================
// HTTP Surface
// =============================================================================

mod http_tests {
    use super::*;
    use healthcheck::{HealthServer, ServerConfig};
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    async fn start(service: HealthService) -> (String, CancellationToken) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let shutdown = CancellationToken::new();

        let config = ServerConfig {
            request_timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let server = HealthServer::new(config, Arc::new(service));
        let token = shutdown.clone();
        tokio::spawn(async move { server.serve(listener, token).await });

        (base, shutdown)
    }

    #[tokio::test]
    async fn test_endpoints_end_to_end() {
        let sink = Arc::new(PrometheusMetricsSink::new("e2e").unwrap());
        let service = HealthService::with_metrics(sink);
        service
            .store()
            .add(vec![
                ok("liveness", ProbeCategory::Liveness),
                fail("db", ProbeCategory::Readiness),
                ok("migrations", ProbeCategory::Startup),
            ])
            .unwrap();

        let (base, shutdown) = start(service).await;
        let client = reqwest::Client::new();

        let status = |path: &'static str| {
            let client = client.clone();
            let url = format!("{}{}", base, path);
            async move { client.get(url).send().await.unwrap().status().as_u16() }
        };

        assert_eq!(status("/live").await, 204);
        assert_eq!(status("/ready").await, 503);
        assert_eq!(status("/startup").await, 204);
        assert_eq!(status("/missing").await, 404);

        let health: serde_json::Value = client
            .get(format!("{}/health", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health.as_array().unwrap().len(), 3);

        let metrics = client
            .get(format!("{}/metrics", base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(metrics.contains(r#"e2e_healthcheck_status{kind="readiness",probe="db"} 1"#));

        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_request_timeout_bounds_probe() {
        let service = HealthService::in_memory();
        service
            .store()
            .add(vec![Probe::from_fn(
                "hangs",
                ProbeCategory::Readiness,
                |ctx| async move {
                    ctx.run(async {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok(())
                    })
                    .await
                },
            )])
            .unwrap();

        let (base, shutdown) = start(service).await;

        let response = reqwest::get(format!("{}/ready", base)).await.unwrap();
        assert_eq!(response.status().as_u16(), 503);

        shutdown.cancel();
    }
}
