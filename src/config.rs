//! Service Configuration
//!
//! Runtime settings for the HTTP surface plus the `category:kind:target`
//! probe definitions accepted on the command line.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::builder::ProbeBuilder;
use crate::checks::DEFAULT_CHECK_TIMEOUT;
use crate::domain::probe::{Probe, ProbeCategory};
use crate::error::{Error, Result};

/// Default port of the health endpoints.
pub const DEFAULT_PORT: u16 = 5090;

/// Default metric namespace.
pub const DEFAULT_NAMESPACE: &str = "healthcheck";

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the health server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,

    /// Metric namespace prefix
    pub namespace: String,

    /// Deadline for one request's probe round
    pub request_timeout: Duration,

    /// Serve Prometheus metrics on `/metrics`
    pub metrics_enabled: bool,

    /// Timeout for each built-in check
    pub check_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            namespace: DEFAULT_NAMESPACE.to_string(),
            request_timeout: Duration::from_secs(10),
            metrics_enabled: true,
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::Config("request timeout must be positive".to_string()));
        }
        if self.check_timeout.is_zero() {
            return Err(Error::Config("check timeout must be positive".to_string()));
        }
        if self
            .namespace
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '_'))
        {
            return Err(Error::Config(format!(
                "invalid metric namespace '{}'",
                self.namespace
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Probe Definitions
// =============================================================================

/// Built-in check kind selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Tcp,
    Dns,
    Http,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::Tcp => write!(f, "tcp"),
            CheckKind::Dns => write!(f, "dns"),
            CheckKind::Http => write!(f, "http"),
        }
    }
}

impl FromStr for CheckKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(CheckKind::Tcp),
            "dns" => Ok(CheckKind::Dns),
            "http" => Ok(CheckKind::Http),
            other => Err(Error::Config(format!("unknown check kind '{}'", other))),
        }
    }
}

/// A probe declared as `category:kind:target`, e.g. `readiness:tcp:db:5432`.
///
/// The target is everything after the second colon, so it may itself
/// contain colons (ports, URLs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeDefinition {
    pub category: ProbeCategory,
    pub kind: CheckKind,
    pub target: String,
}

impl ProbeDefinition {
    /// Probe name derived from the definition, e.g. `tcp dial db:5432`.
    pub fn name(&self) -> String {
        let prefix = match self.kind {
            CheckKind::Tcp => "tcp dial",
            CheckKind::Dns => "dns resolve",
            CheckKind::Http => "http get",
        };
        format!("{} {}", prefix, self.target)
    }

    pub fn into_probe(self, timeout: Duration) -> Result<Probe> {
        let builder = ProbeBuilder::new()
            .with_name(self.name())
            .with_category(self.category)
            .with_default_timeout(timeout);

        let builder = match self.kind {
            CheckKind::Tcp => builder.with_tcp_dial_check(self.target),
            CheckKind::Dns => builder.with_dns_resolve_check(self.target),
            CheckKind::Http => builder.with_http_get_check(self.target),
        };

        builder.build()
    }
}

impl FromStr for ProbeDefinition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let (category, kind, target) = match (parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(k), Some(t)) if !t.trim().is_empty() => (c, k, t.trim()),
            _ => {
                return Err(Error::Config(format!(
                    "probe definition '{}' must look like category:kind:target",
                    s
                )))
            }
        };

        Ok(Self {
            category: category.parse()?,
            kind: kind.parse()?,
            target: target.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 5090);
        assert_eq!(config.namespace, "healthcheck");
        assert!(config.metrics_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ServerConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert_matches!(config.validate(), Err(Error::Config(_)));

        let config = ServerConfig {
            namespace: "my-app".to_string(),
            ..Default::default()
        };
        assert_matches!(config.validate(), Err(Error::Config(_)));
    }

    #[test]
    fn test_parse_definition() {
        let def: ProbeDefinition = "readiness:tcp:db:5432".parse().unwrap();
        assert_eq!(def.category, ProbeCategory::Readiness);
        assert_eq!(def.kind, CheckKind::Tcp);
        assert_eq!(def.target, "db:5432");
        assert_eq!(def.name(), "tcp dial db:5432");

        let def: ProbeDefinition = "health:http:http://localhost:8080/ping".parse().unwrap();
        assert_eq!(def.category, ProbeCategory::OnDemand);
        assert_eq!(def.kind, CheckKind::Http);
        assert_eq!(def.target, "http://localhost:8080/ping");
    }

    #[test]
    fn test_parse_definition_errors() {
        assert_matches!(
            "readiness:tcp".parse::<ProbeDefinition>(),
            Err(Error::Config(_))
        );
        assert_matches!(
            "readiness:tcp:  ".parse::<ProbeDefinition>(),
            Err(Error::Config(_))
        );
        assert_matches!(
            "readiness:smtp:mail:25".parse::<ProbeDefinition>(),
            Err(Error::Config(_))
        );
        assert_matches!(
            "sometimes:tcp:db:5432".parse::<ProbeDefinition>(),
            Err(Error::InvalidProbe { field: "category", .. })
        );
    }

    #[test]
    fn test_into_probe() {
        let probe = "startup:dns:localhost"
            .parse::<ProbeDefinition>()
            .unwrap()
            .into_probe(Duration::from_secs(1))
            .unwrap();
        assert_eq!(probe.name(), "dns resolve localhost");
        assert_eq!(probe.category(), ProbeCategory::Startup);
    }
}
