pub mod errors;
pub mod http;
pub mod logger;

pub use errors::*;
pub use http::*;

/// A generic boxed error type.
pub type AnyError = Box<dyn std::error::Error + Send + Sync>;

/// A convenient Result alias returning `AnyError`.
pub type AnyResult<T> = std::result::Result<T, AnyError>;
