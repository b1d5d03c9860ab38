//! Probe Builder
//!
//! Validated construction of [`Probe`]s, including the built-in network
//! checks and a few presets.
//!
//! # Example
//!
//! ```ignore
//! use healthcheck::builder::ProbeBuilder;
//! use healthcheck::domain::ProbeCategory;
//!
//! let probe = ProbeBuilder::new()
//!     .with_category(ProbeCategory::Readiness)
//!     .with_tcp_dial_check("db:5432")
//!     .build()?;
//! assert_eq!(probe.name(), "tcp dial");
//! ```

mod components;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::checks::{self, NotConfigured, DEFAULT_CHECK_TIMEOUT};
use crate::domain::context::ProbeContext;
use crate::domain::probe::{Probe, ProbeCategory, ProbeCheck};
use crate::error::{CheckError, Error, Result};

pub use components::{for_components, ComponentStatusBoard};

/// Consuming builder for [`Probe`].
///
/// Built-in checks capture the default timeout at the moment they are
/// added, so call [`ProbeBuilder::with_default_timeout`] first.
pub struct ProbeBuilder {
    name: Option<String>,
    category: Option<ProbeCategory>,
    informational: bool,
    check: Option<Arc<dyn ProbeCheck>>,
    default_timeout: Duration,
    check_error: Option<Error>,
}

impl Default for ProbeBuilder {
    fn default() -> Self {
        Self {
            name: None,
            category: None,
            informational: false,
            check: None,
            default_timeout: DEFAULT_CHECK_TIMEOUT,
            check_error: None,
        }
    }
}

impl ProbeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_category(mut self, category: ProbeCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn informational(mut self, informational: bool) -> Self {
        self.informational = informational;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_check(mut self, check: impl ProbeCheck + 'static) -> Self {
        self.check = Some(Arc::new(check));
        self.check_error = None;
        self
    }

    /// Use an async closure as the check.
    pub fn with_custom_check<F, Fut>(self, f: F) -> Self
    where
        F: Fn(ProbeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), CheckError>> + Send + 'static,
    {
        self.with_check(f)
    }

    /// Open a TCP connection to `address`. Default name: "tcp dial".
    pub fn with_tcp_dial_check(self, address: impl Into<String>) -> Self {
        let check = checks::tcp_dial(address, self.default_timeout);
        self.with_check(check).with_default_name("tcp dial")
    }

    /// Resolve `host` to at least one address. Default name: "dns resolve".
    pub fn with_dns_resolve_check(self, host: impl Into<String>) -> Self {
        let check = checks::dns_resolve(host, self.default_timeout);
        self.with_check(check).with_default_name("dns resolve")
    }

    /// GET `url` expecting a status below 400. Default name: "http get".
    pub fn with_http_get_check(self, url: impl Into<String>) -> Self {
        match checks::http_get(url, self.default_timeout) {
            Ok(check) => self.with_check(check).with_default_name("http get"),
            Err(e) => {
                let mut builder = self.with_default_name("http get");
                builder.check = None;
                builder.check_error = Some(e);
                builder
            }
        }
    }

    fn with_default_name(mut self, name: &str) -> Self {
        let unnamed = self
            .name
            .as_deref()
            .map_or(true, |n| n.trim().is_empty());
        if unnamed {
            self.name = Some(name.to_string());
        }
        self
    }

    fn trimmed_name(&self) -> String {
        self.name.as_deref().unwrap_or_default().trim().to_string()
    }

    /// Build the probe, rejecting a missing name, category or check.
    pub fn build(self) -> Result<Probe> {
        let name = self.trimmed_name();
        if name.is_empty() {
            return Err(Error::invalid_probe("name", "no probe name"));
        }

        let category = self
            .category
            .ok_or_else(|| Error::invalid_probe("category", "no probe kind"))?;

        if let Some(e) = self.check_error {
            return Err(e);
        }

        let check = self
            .check
            .ok_or_else(|| Error::invalid_probe("check", "no probe check function"))?;

        Ok(Probe::from_shared(name, category, check).with_informational(self.informational))
    }

    /// Like [`ProbeBuilder::build`], but panics on invalid input.
    ///
    /// # Panics
    ///
    /// When the name, category or check is missing.
    pub fn must_build(self) -> Probe {
        match self.build() {
            Ok(probe) => probe,
            Err(e) => panic!("{}", e),
        }
    }

    /// Build without validation.
    ///
    /// The category defaults to `OnDemand` and a missing check becomes one
    /// that always fails. The name may end up empty, which the registry
    /// refuses.
    pub fn build_lenient(self) -> Probe {
        let name = self.trimmed_name();
        let category = self.category.unwrap_or(ProbeCategory::OnDemand);

        let check: Arc<dyn ProbeCheck> = match (self.check, self.check_error) {
            (Some(check), _) => check,
            (None, Some(e)) => Arc::new(checks::always_fail(e.to_string())),
            (None, None) => Arc::new(NotConfigured),
        };

        Probe::from_shared(name, category, check).with_informational(self.informational)
    }
}

impl std::fmt::Debug for ProbeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeBuilder")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("informational", &self.informational)
            .field("has_check", &self.check.is_some())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

// =============================================================================
// Presets
// =============================================================================

/// Liveness probe that always succeeds; proves the process can serve requests.
pub fn liveness_probe() -> Probe {
    Probe::new("liveness", ProbeCategory::Liveness, checks::always_ok())
}

/// Liveness probe that always succeeds.
///
/// Alert on the absence of its series rather than on its value.
pub fn deadmans_snitch() -> Probe {
    Probe::new("dead man's snitch", ProbeCategory::Liveness, checks::always_ok())
}
