//! TCP and DNS checks

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

use super::run_with_timeout;
use crate::domain::context::ProbeContext;
use crate::domain::probe::ProbeCheck;
use crate::error::CheckError;

/// Succeeds when a TCP connection to `address` can be opened.
#[derive(Debug, Clone)]
pub struct TcpDialCheck {
    address: String,
    timeout: Duration,
}

pub fn tcp_dial(address: impl Into<String>, timeout: Duration) -> TcpDialCheck {
    TcpDialCheck {
        address: address.into(),
        timeout,
    }
}

#[async_trait]
impl ProbeCheck for TcpDialCheck {
    async fn check(&self, ctx: ProbeContext) -> Result<(), CheckError> {
        let stream = run_with_timeout(&ctx, self.timeout, async {
            TcpStream::connect(self.address.as_str())
                .await
                .map_err(|e| CheckError::Connect {
                    address: self.address.clone(),
                    reason: e.to_string(),
                })
        })
        .await?;

        drop(stream);
        Ok(())
    }
}

/// Succeeds when `host` resolves to at least one address.
#[derive(Debug, Clone)]
pub struct DnsResolveCheck {
    host: String,
    timeout: Duration,
}

pub fn dns_resolve(host: impl Into<String>, timeout: Duration) -> DnsResolveCheck {
    DnsResolveCheck {
        host: host.into(),
        timeout,
    }
}

#[async_trait]
impl ProbeCheck for DnsResolveCheck {
    async fn check(&self, ctx: ProbeContext) -> Result<(), CheckError> {
        let resolved = run_with_timeout(&ctx, self.timeout, async {
            tokio::net::lookup_host((self.host.as_str(), 0))
                .await
                .map(|addrs| addrs.count())
                .map_err(|e| CheckError::Resolve {
                    host: self.host.clone(),
                    reason: e.to_string(),
                })
        })
        .await?;

        if resolved == 0 {
            return Err(CheckError::Resolve {
                host: self.host.clone(),
                reason: "no addresses".to_string(),
            });
        }

        Ok(())
    }
}
