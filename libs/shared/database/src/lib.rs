// =====================================================================================
// SHARED DATABASE - BOUNDED CONNECTION POOL
// =====================================================================================

pub mod pool;

pub use pool::{DbPoolManager, PoolDiagnostics};
