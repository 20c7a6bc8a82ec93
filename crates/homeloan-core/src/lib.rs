pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "financing")]
pub mod financing;

#[cfg(feature = "jurisdiction")]
pub mod jurisdiction;

pub use error::HomeLoanError;
pub use types::*;

/// Standard result type for all homeloan operations
pub type HomeLoanResult<T> = Result<T, HomeLoanError>;
