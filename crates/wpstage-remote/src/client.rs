//! HTTP client wrapper with rate limiting

use crate::error::{Error, Result};
use governor::{Quota, RateLimiter};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Shared rate limiter for one remote service
pub type ServiceRateLimiter = Arc<
    RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
>;

/// HTTP client wrapper with an optional per-service rate limit
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    rate_limiter: Option<ServiceRateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client without rate limiting
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            rate_limiter: None,
        })
    }

    /// Create a new HTTP client allowing at most `requests_per_second`
    /// (minimum 1).
    pub fn with_rate_limit(requests_per_second: u32, timeout: Duration) -> Result<Self> {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self {
            client: build_client(timeout)?,
            rate_limiter: Some(rate_limiter),
        })
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }
    }

    /// GET and deserialize JSON; `Ok(None)` on 404.
    pub async fn get_json_opt<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>> {
        self.wait_for_rate_limit().await;

        let response = self.client.get(url.clone()).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response, url)?;
        Ok(Some(response.json().await?))
    }

    /// POST a JSON body with extra headers.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
        headers: HeaderMap,
    ) -> Result<()> {
        self.wait_for_rate_limit().await;

        let response = self
            .client
            .post(url.clone())
            .headers(headers)
            .json(body)
            .send()
            .await?;
        check_status(response, url)?;
        Ok(())
    }

    /// PUT raw bytes, optionally with a bearer token.
    pub async fn put_bytes(
        &self,
        url: &Url,
        body: Vec<u8>,
        content_type: &str,
        bearer: Option<&str>,
    ) -> Result<()> {
        self.wait_for_rate_limit().await;

        let mut request = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, content_type)
            .body(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        check_status(request.send().await?, url)?;
        Ok(())
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(format!("wpstage/{}", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}

fn check_status(response: Response, url: &Url) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(Error::RateLimitExceeded(url.to_string()));
    }
    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response)
}

/// Append `/`-separated segments to `base`, percent-encoding each one.
pub fn join_segments<'a, I>(base: &Url, segments: I) -> Result<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::CannotBeBase(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
