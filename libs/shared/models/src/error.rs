use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Invalid scenario configuration: {0}")]
    InvalidScenario(String),

    #[error("Database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("Pool acquisition timed out after {timeout_ms}ms")]
    PoolTimeout { timeout_ms: u64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
