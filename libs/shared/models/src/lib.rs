// =====================================================================================
// SHARED MODELS - LOAD HARNESS DATA MODEL
// =====================================================================================

pub mod batch;
pub mod error;
pub mod outcome;
pub mod report;
pub mod scenario;

pub use batch::*;
pub use error::HarnessError;
pub use outcome::*;
pub use report::*;
pub use scenario::*;
