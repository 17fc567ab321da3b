pub mod dashboard;
pub mod engine;
pub mod probe;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{ProbeAttempt, ProbeResult};
pub use crate::domain::ports::{BackendClient, ConfigProvider, Diagnostics, Entity, HealthCheck};
pub use crate::utils::error::Result;
