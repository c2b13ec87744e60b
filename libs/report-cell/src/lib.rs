// =====================================================================================
// REPORT CELL - GRADING, READINESS & RECOMMENDATIONS
// =====================================================================================

pub mod services;

pub use services::builder::ReportBuilder;
