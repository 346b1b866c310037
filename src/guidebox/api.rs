use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::*;
use reqwest::{header, Client};
use serde_json::Value;

use super::{FetchError, RawResponse, ResponseCache, Transport};
use crate::config::{GuideboxSettings, RetryPolicy};

const APP_USER_AGENT: &str = "Catalog Stager";
const RATE_LIMIT_MESSAGE: &str = "You are sending API requests too quickly.";

/// reqwest-backed transport, paced by a client-side quota.
pub struct HttpTransport {
    client: Client,
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpTransport {
    /// Creates a single HTTP client to use for guidebox requests
    pub fn new(settings: &GuideboxSettings) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "Content-Type",
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "Authorization",
            header::HeaderValue::from_str(&settings.api_key)
                .map_err(|_| FetchError::InvalidApiKey)?,
        );

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(HttpTransport {
            client,
            limiter: RateLimiter::direct(Quota::per_second(settings.requests_per_second)),
        })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        self.limiter.until_ready().await;

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        // error pages are not always json; keep the text so the status still surfaces
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(RawResponse { status, body })
    }
}

/// Joins a path and its query parameters the way they are cached: no leading
/// `/`, parameters form-encoded (space as `+`) in the order given.
pub fn canonical_request(path: &str, params: &[(&str, &str)]) -> String {
    let path = path.strip_prefix('/').unwrap_or(path);
    if params.is_empty() {
        return path.to_string();
    }

    let query = params
        .iter()
        .map(|(key, value)| {
            format!("{}={}", form_encode(key), form_encode(value))
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

// keeps cache file names stable with caches written by the older staging scripts
fn form_encode(raw: &str) -> String {
    urlencoding::encode(raw).replace("%20", "+")
}

fn is_rate_limited(response: &RawResponse) -> bool {
    response.status == 429
        || response
            .body
            .get("error")
            .and_then(Value::as_str)
            .is_some_and(|message| message.starts_with(RATE_LIMIT_MESSAGE))
}

/// Guidebox client: cache first, then network, backing off while rate limited.
#[derive(Debug)]
pub struct GuideboxClient<T> {
    transport: T,
    cache: ResponseCache,
    base_url: String,
    retry: RetryPolicy,
}

impl<T: Transport> GuideboxClient<T> {
    pub fn new(transport: T, cache: ResponseCache, base_url: &str, retry: RetryPolicy) -> Self {
        GuideboxClient {
            transport,
            cache,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch a guidebox resource as json.
    ///
    /// A cached response is returned without touching the network. Rate-limited
    /// responses are retried after a backoff that doubles each time, up to
    /// `max_attempts` requests; the cache is checked again before every retry.
    pub async fn fetch(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, FetchError> {
        let request = canonical_request(path, params);
        let attempts = self.retry.max_attempts.max(1);
        let mut delay = self.retry.initial_backoff;

        for attempt in 1..=attempts {
            if let Some(cached) = self.cache.get(&request).await? {
                info!("Returning cached object for {}", request);
                return Ok(cached);
            }

            info!("Fetching url {}", request);
            let url = format!("{}/{}", self.base_url, request);
            let response = self.transport.get(&url).await?;

            if is_rate_limited(&response) {
                if attempt == attempts {
                    break;
                }
                warn!(
                    "Rate limited on {} (attempt {}/{}), sleeping {:?}",
                    request, attempt, attempts, delay
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                continue;
            }

            if !(200..300).contains(&response.status) {
                return Err(FetchError::Status {
                    status: response.status,
                    request,
                });
            }

            self.cache.put(&request, &response.body).await?;
            return Ok(response.body);
        }

        error!("Giving up on {} after {} attempts", request, attempts);
        Err(FetchError::RateLimited { request, attempts })
    }
}
