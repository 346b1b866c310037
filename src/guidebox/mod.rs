/// Everything needed to talk to guidebox:
/// - api mod for the cached, rate-limit aware client
/// - cache mod for the on-disk response store
/// - keys mod for translating guidebox field names
pub mod api;
pub mod cache;
pub mod keys;

use serde_json::Value;
use thiserror::Error;

pub use api::{GuideboxClient, HttpTransport};
pub use cache::ResponseCache;
pub use keys::map_keys;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Guidebox answered {status} for {request}")]
    Status { status: u16, request: String },

    #[error("Still rate limited on {request} after {attempts} attempts")]
    RateLimited { request: String, attempts: u32 },

    #[error("API key is not a valid header value")]
    InvalidApiKey,
}

/// Status and decoded body of a single GET.
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

/// The network side of the client, split out so tests can script responses.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl std::future::Future<Output = Result<RawResponse, FetchError>> + Send;
}

#[cfg(test)]
pub mod testing {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use serde_json::{json, Value};

    use super::{FetchError, RawResponse, Transport};

    pub const FAKE_BASE_URL: &str = "http://guidebox.test/v2";

    /// Scripted transport. Each url owns a queue of responses; the last one
    /// repeats once the queue is down to it. Unrouted urls answer 404.
    #[derive(Debug, Default)]
    pub struct FakeTransport {
        routes: Mutex<HashMap<String, VecDeque<RawResponse>>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Route a request (relative `path?query`) to a 200 response.
        pub fn ok(self, request: &str, body: Value) -> Self {
            self.respond(request, 200, body)
        }

        pub fn respond(self, request: &str, status: u16, body: Value) -> Self {
            self.routes
                .lock()
                .unwrap()
                .entry(format!("{FAKE_BASE_URL}/{request}"))
                .or_default()
                .push_back(RawResponse { status, body });
            self
        }

        pub fn rate_limited(self, request: &str) -> Self {
            self.respond(
                request,
                429,
                json!({"error": "You are sending API requests too quickly. Please slow down."}),
            )
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Transport for FakeTransport {
        async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            let mut routes = self.routes.lock().unwrap();
            let response = match routes.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            };
            Ok(response.unwrap_or(RawResponse {
                status: 404,
                body: json!({"error": "Not found"}),
            }))
        }
    }
}
