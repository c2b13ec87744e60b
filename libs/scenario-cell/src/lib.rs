// =====================================================================================
// SCENARIO CELL - TEST PATTERN ORCHESTRATION
// =====================================================================================

pub mod services;

pub use services::endurance::{stability_analysis, EnduranceRunner};
pub use services::monitor::{classify_trend, ContinuousMonitor};
pub use services::orchestrator::ScenarioOrchestrator;
pub use services::spike::SpikeRunner;
