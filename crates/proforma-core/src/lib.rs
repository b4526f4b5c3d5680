pub mod amortization;
pub mod depreciation;
pub mod error;
pub mod indicators;
pub mod projection;
pub mod scenarios;
pub mod types;
pub mod validate;

pub use error::ProformaError;
pub use types::*;

/// Standard result type for all engine operations
pub type ProformaResult<T> = Result<T, ProformaError>;
