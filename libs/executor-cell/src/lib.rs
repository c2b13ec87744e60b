// =====================================================================================
// EXECUTOR CELL - SINGLE REQUEST/QUERY EXECUTION
// =====================================================================================

pub mod services;

pub use services::{HarnessExecutor, HttpRequestExecutor, QueryExecutor, RequestExecutor};
