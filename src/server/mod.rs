pub mod health;

pub use health::{build_router, serve, HealthState};
