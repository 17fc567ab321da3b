// Adapters layer: concrete implementations for external systems (health endpoint, Manifest backend).

pub mod http;
pub mod manifest;
