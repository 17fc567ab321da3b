use crate::core::probe::ProbeSettings;
use crate::domain::model::{AttemptFailure, Credentials, FindQuery, MemoryUsage, Paginated, User};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn backend_url(&self) -> &str;
    fn health_url(&self) -> String;
    fn app_id(&self) -> &str;
    fn environment(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn probe_settings(&self) -> Result<ProbeSettings>;
    fn credentials(&self) -> Option<Credentials>;
}

/// 後端擁有的資料實體
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    const NAME: &'static str;
    const SLUG: &'static str;
    type Payload: Serialize + Send + Sync;
}

/// 單次健康檢查；成功代表 2xx 且 `status == "ok"`
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> std::result::Result<(), AttemptFailure>;
}

/// 後端服務（BaaS）客戶端
#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<()>;
    async fn logout(&self) -> Result<()>;
    async fn me(&self) -> Result<User>;
    async fn find<E: Entity>(&self, query: &FindQuery) -> Result<Paginated<E>>;
    async fn create<E: Entity>(&self, payload: &E::Payload) -> Result<E>;
}

/// 健康檢查所需的行程資訊
pub trait Diagnostics: Send + Sync {
    fn uptime(&self) -> Duration;
    fn memory(&self) -> Result<MemoryUsage>;
}
