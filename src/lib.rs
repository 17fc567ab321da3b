pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
#[cfg(feature = "server")]
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use adapters::{http::HttpHealthCheck, manifest::ManifestClient};
pub use core::{
    dashboard::Dashboard,
    engine::{AppEngine, ConnectionBanner},
    probe::{BackoffPolicy, ConnectivityProbe, ProbeSettings},
    session::{Screen, Session},
};
pub use domain::model::ProbeResult;
pub use utils::error::{AppError, Result};
