use std::env;
use tracing::warn;

/// Environment-driven harness configuration. Scenario parameters, target
/// lists, and threshold overrides are supplied by the caller; the harness
/// consumes them but does not own their source.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub base_url: String,
    pub database_url: Option<String>,
    pub environment: String,
    pub request_timeout_ms: u64,
    pub db_pool_max_connections: u32,
    pub db_acquire_timeout_ms: u64,
    pub recovery_pause_secs: u64,
    pub ready_max_avg_latency_ms: f64,
    pub ready_max_error_rate_percent: f64,
}

impl HarnessConfig {
    pub fn from_env() -> Self {
        let config = Self {
            base_url: env::var("TARGET_BASE_URL").unwrap_or_else(|_| {
                warn!("TARGET_BASE_URL not set, defaulting to http://localhost:3000");
                "http://localhost:3000".to_string()
            }),
            database_url: env::var("DATABASE_URL").ok(),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            request_timeout_ms: parse_env("REQUEST_TIMEOUT_MS", 10_000),
            db_pool_max_connections: parse_env("DB_POOL_MAX_CONNECTIONS", 10),
            db_acquire_timeout_ms: parse_env("DB_ACQUIRE_TIMEOUT_MS", 5_000),
            recovery_pause_secs: parse_env("RECOVERY_PAUSE_SECS", 30),
            ready_max_avg_latency_ms: parse_env("READY_MAX_AVG_LATENCY_MS", 500.0),
            ready_max_error_rate_percent: parse_env("READY_MAX_ERROR_RATE", 1.0),
        };

        if config.database_url.is_none() {
            warn!("DATABASE_URL not set - query scenarios will be skipped");
        }

        config
    }

    pub fn is_database_configured(&self) -> bool {
        self.database_url.is_some()
    }
}

fn parse_env<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value, using default", key);
            default
        }),
        Err(_) => default,
    }
}

/// One HTTP endpoint within a scenario, joined onto the base URL at run time.
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    pub name: String,
    pub path: String,
    pub method: String,
}

impl EndpointSpec {
    pub fn get(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            method: "GET".to_string(),
        }
    }
}

/// One named database query within a scenario.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub name: String,
    pub sql: String,
}

impl QuerySpec {
    pub fn new(name: &str, sql: &str) -> Self {
        Self {
            name: name.to_string(),
            sql: sql.to_string(),
        }
    }
}

/// A named, pre-configured load pattern.
#[derive(Debug, Clone)]
pub struct ScenarioSpec {
    pub name: String,
    pub concurrency: u32,
    pub requests_per_actor: u32,
    pub delay_ms: u64,
    pub endpoints: Vec<EndpointSpec>,
    pub queries: Vec<QuerySpec>,
}

/// Spike test parameters: a low-concurrency baseline and a short
/// high-concurrency burst against a single endpoint.
#[derive(Debug, Clone)]
pub struct SpikeSpec {
    pub base_users: u32,
    pub spike_users: u32,
    pub requests_per_actor: u32,
    pub delay_ms: u64,
    pub endpoint: EndpointSpec,
}

/// Endurance test parameters; the run is sized to the caller's duration.
#[derive(Debug, Clone)]
pub struct EnduranceSpec {
    pub concurrency: u32,
    pub delay_ms: u64,
    pub duration_secs: u64,
    pub endpoint: EndpointSpec,
}

/// Continuous monitoring parameters: a small fixed probe repeated at a
/// sampling interval until the total window elapses.
#[derive(Debug, Clone)]
pub struct MonitorSpec {
    pub probe_concurrency: u32,
    pub probe_requests: u32,
    pub interval_secs: u64,
    pub duration_secs: u64,
    pub endpoint: EndpointSpec,
}

/// The fixed scenario catalog, ordered lightest to heaviest.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    pub scenarios: Vec<ScenarioSpec>,
    pub spike: SpikeSpec,
    pub endurance: EnduranceSpec,
    pub monitor: MonitorSpec,
}

impl ScenarioCatalog {
    pub fn named(&self, name: &str) -> Option<&ScenarioSpec> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        let browse_endpoints = vec![
            EndpointSpec::get("health", "/api/health"),
            EndpointSpec::get("assets", "/api/assets"),
            EndpointSpec::get("courses", "/api/courses"),
            EndpointSpec::get("dashboard", "/api/dashboard"),
        ];
        let default_queries = vec![
            QuerySpec::new("db_ping", "SELECT 1"),
        ];

        Self {
            scenarios: vec![
                ScenarioSpec {
                    name: "smoke".to_string(),
                    concurrency: 2,
                    requests_per_actor: 2,
                    delay_ms: 200,
                    endpoints: vec![EndpointSpec::get("health", "/api/health")],
                    queries: Vec::new(),
                },
                ScenarioSpec {
                    name: "lightLoad".to_string(),
                    concurrency: 10,
                    requests_per_actor: 5,
                    delay_ms: 100,
                    endpoints: browse_endpoints.clone(),
                    queries: default_queries.clone(),
                },
                ScenarioSpec {
                    name: "moderateLoad".to_string(),
                    concurrency: 50,
                    requests_per_actor: 10,
                    delay_ms: 50,
                    endpoints: browse_endpoints.clone(),
                    queries: default_queries.clone(),
                },
                ScenarioSpec {
                    name: "heavyLoad".to_string(),
                    concurrency: 100,
                    requests_per_actor: 10,
                    delay_ms: 25,
                    endpoints: browse_endpoints,
                    queries: default_queries,
                },
            ],
            spike: SpikeSpec {
                base_users: 10,
                spike_users: 200,
                requests_per_actor: 5,
                delay_ms: 50,
                endpoint: EndpointSpec::get("dashboard", "/api/dashboard"),
            },
            endurance: EnduranceSpec {
                concurrency: 20,
                delay_ms: 1_000,
                duration_secs: 300,
                endpoint: EndpointSpec::get("assets", "/api/assets"),
            },
            monitor: MonitorSpec {
                probe_concurrency: 5,
                probe_requests: 2,
                interval_secs: 120,
                duration_secs: 3_600,
                endpoint: EndpointSpec::get("health", "/api/health"),
            },
        }
    }
}
