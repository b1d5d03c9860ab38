//! HTTP GET check

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client};

use super::run_with_timeout;
use crate::domain::context::ProbeContext;
use crate::domain::probe::ProbeCheck;
use crate::error::{CheckError, Error, Result};

/// Succeeds when a GET on `url` answers with a status below 400.
///
/// Redirects are not followed, so a 3xx counts as success.
#[derive(Debug, Clone)]
pub struct HttpGetCheck {
    client: Client,
    url: String,
    timeout: Duration,
}

/// Build an HTTP GET check. Fails only if the HTTP client cannot be created.
pub fn http_get(url: impl Into<String>, timeout: Duration) -> Result<HttpGetCheck> {
    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(HttpGetCheck {
        client,
        url: url.into(),
        timeout,
    })
}

impl HttpGetCheck {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ProbeCheck for HttpGetCheck {
    async fn check(&self, ctx: ProbeContext) -> std::result::Result<(), CheckError> {
        let status = run_with_timeout(&ctx, self.timeout, async {
            let response = self.client.get(&self.url).send().await.map_err(|e| {
                if e.is_timeout() {
                    CheckError::Timeout(self.timeout)
                } else {
                    CheckError::Http(e.to_string())
                }
            })?;
            Ok::<_, CheckError>(response.status())
        })
        .await?;

        if status.as_u16() >= 400 {
            return Err(CheckError::HttpStatus(status.as_u16()));
        }

        Ok(())
    }
}
