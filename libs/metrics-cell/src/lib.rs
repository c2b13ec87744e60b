// =====================================================================================
// METRICS CELL - AGGREGATION & PERCENTILES
// =====================================================================================

pub mod services;

pub use services::aggregator::*;
