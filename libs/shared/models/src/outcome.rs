use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a single unit of work: one HTTP request or one database query.
///
/// Immutable once created. Failures are data, not errors — a timed-out or
/// rejected call still carries the latency measured up to the failure point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOutcome {
    pub timestamp: DateTime<Utc>,
    pub latency_ms: f64,
    pub success: bool,
    /// HTTP status code, or an error class such as "ERROR"/"TIMEOUT" for
    /// database and transport failures.
    pub code: String,
    pub error_message: Option<String>,
    /// Rows returned for a query, response body bytes for an HTTP call.
    pub rows_or_bytes: Option<u64>,
}

impl RequestOutcome {
    pub fn succeeded(latency_ms: f64, code: impl Into<String>, rows_or_bytes: Option<u64>) -> Self {
        Self {
            timestamp: Utc::now(),
            latency_ms,
            success: true,
            code: code.into(),
            error_message: None,
            rows_or_bytes,
        }
    }

    pub fn failed(
        latency_ms: f64,
        code: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            latency_ms,
            success: false,
            code: code.into(),
            error_message: Some(error_message.into()),
            rows_or_bytes: None,
        }
    }
}

/// A single load target, resolved to its kind at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    Endpoint {
        name: String,
        url: String,
        method: String,
    },
    Query {
        name: String,
        sql: String,
    },
}

impl Target {
    pub fn endpoint(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Endpoint {
            name: name.into(),
            url: url.into(),
            method: "GET".to_string(),
        }
    }

    pub fn query(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::Query {
            name: name.into(),
            sql: sql.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Endpoint { name, .. } | Self::Query { name, .. } => name,
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query { .. })
    }
}
