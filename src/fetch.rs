//! Blocking HTTP fetching with bounded retry.
//!
//! One client per [`Fetcher`]; pages come back as decoded text. Transport
//! failures are retried, an unexpected status is not — the server answered,
//! it just said no.

use std::io::Read;
use std::time::Duration;

use reqwest::StatusCode;

use crate::encoding;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("newsgrab/", env!("CARGO_PKG_VERSION"));

/// Upper bound on a response body; anything longer is truncated.
const MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;

/// HTTP GET client with a fixed retry budget.
#[derive(Debug)]
pub struct Fetcher {
    client: reqwest::blocking::Client,
    retries: u32,
}

impl Fetcher {
    /// Build a client. `retries` is the total number of attempts per
    /// request (minimum 1); `timeout` caps connect-plus-read per attempt,
    /// `None` keeps the client default.
    pub fn new(retries: u32, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            retries: retries.max(1),
        })
    }

    /// GET `url` and decode the body per its charset declaration.
    ///
    /// Transport errors are retried up to the budget and then surface as
    /// [`Error::RetryExhausted`]; a non-200 status fails immediately with
    /// [`Error::UnexpectedStatus`].
    pub fn get(&self, url: &str) -> Result<String> {
        for attempt in 1..self.retries {
            match self.try_get(url) {
                Err(Error::Http(source)) => {
                    tracing::warn!(url, attempt, error = %source, "request failed, retrying");
                }
                other => return other,
            }
        }
        match self.try_get(url) {
            Err(Error::Http(source)) => Err(Error::RetryExhausted {
                retries: self.retries,
                source,
            }),
            other => other,
        }
    }

    fn try_get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus(status.as_u16()));
        }
        let mut body = Vec::new();
        response.take(MAX_BODY_BYTES).read_to_end(&mut body)?;
        Ok(encoding::decode_html(&body))
    }
}
