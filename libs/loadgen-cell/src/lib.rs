// =====================================================================================
// LOADGEN CELL - CONCURRENT VIRTUAL-USER FAN-OUT
// =====================================================================================

pub mod services;

pub use services::generator::LoadGenerator;
