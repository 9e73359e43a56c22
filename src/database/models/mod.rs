pub mod advance;
pub mod attendance;
pub(crate) mod macros;
pub mod payroll;
pub mod setting;
pub mod worker;

// Re-export all models for easy importing
pub use advance::*;
pub use attendance::*;
pub use payroll::*;
pub use setting::*;
pub use worker::*;
