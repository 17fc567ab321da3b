pub mod error;
pub mod logger;
#[cfg(feature = "server")]
pub mod monitor;
pub mod validation;
