use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method};
use tracing::debug;

use shared_config::HarnessConfig;
use shared_models::{HarnessError, RequestOutcome};

/// Issues single HTTP requests with a bounded per-call timeout.
///
/// Success is a status code below 400. Transport errors and timeouts still
/// yield a timed outcome.
pub struct HttpRequestExecutor {
    client: Client,
    base_url: String,
}

impl HttpRequestExecutor {
    pub fn new(config: &HarnessConfig) -> Result<Self, HarnessError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(concat!("loadbench/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| HarnessError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn execute_endpoint(&self, url: &str, method: &str) -> RequestOutcome {
        let method = Method::from_bytes(method.as_bytes()).unwrap_or(Method::GET);
        let url = self.resolve(url);
        debug!(%url, "Issuing request");

        let start = Instant::now();
        let response = match self.client.request(method, &url).send().await {
            Ok(response) => response,
            Err(e) => {
                let latency_ms = elapsed_ms(start);
                let code = if e.is_timeout() { "TIMEOUT" } else { "ERROR" };
                return RequestOutcome::failed(latency_ms, code, e.to_string());
            }
        };

        let status = response.status();
        match response.bytes().await {
            Ok(body) => {
                let latency_ms = elapsed_ms(start);
                if status.as_u16() < 400 {
                    RequestOutcome::succeeded(
                        latency_ms,
                        status.as_u16().to_string(),
                        Some(body.len() as u64),
                    )
                } else {
                    RequestOutcome::failed(
                        latency_ms,
                        status.as_u16().to_string(),
                        format!("HTTP {}", status),
                    )
                }
            }
            Err(e) => {
                let latency_ms = elapsed_ms(start);
                let code = if e.is_timeout() { "TIMEOUT" } else { "ERROR" };
                RequestOutcome::failed(latency_ms, code, e.to_string())
            }
        }
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url, url)
        }
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1_000.0
}
