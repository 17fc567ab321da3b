use crate::adapters::http::APP_ID_HEADER;
use crate::domain::model::{iso_timestamp, HealthReport};
use crate::domain::ports::Diagnostics;
use crate::utils::error::Result;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const UNKNOWN_APP_ID: &str = "Unknown";

/// 健康檢查的共享狀態；處理請求時只讀不寫
#[derive(Clone)]
pub struct HealthState {
    diagnostics: Arc<dyn Diagnostics>,
    version: String,
    environment: String,
}

impl HealthState {
    pub fn new(
        diagnostics: Arc<dyn Diagnostics>,
        version: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            diagnostics,
            version: version.into(),
            environment: environment.into(),
        }
    }
}

pub fn build_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
}

/// 啟動伺服器，直到 `shutdown` 完成
pub async fn serve<F>(listener: TcpListener, state: HealthState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("🚀 Health endpoint listening on http://{}/health", addr);
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Health endpoint stopped");
    Ok(())
}

/// 回應 `/health`；請求內容一律忽略，只讀取 `X-App-ID` 標頭
async fn health_handler(
    State(state): State<HealthState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let (status, report) = build_report(&state, app_id_from(&headers));
    (status, Json(report))
}

pub fn build_report(state: &HealthState, app_id: String) -> (StatusCode, HealthReport) {
    let now = Utc::now();
    tracing::info!(
        "🔍 [HEALTH] Health check requested at {} (App ID: {})",
        iso_timestamp(now),
        app_id
    );

    match state.diagnostics.memory() {
        Ok(memory) => {
            let report = HealthReport::ok(
                now,
                app_id,
                state.version.clone(),
                state.environment.clone(),
                state.diagnostics.uptime(),
                memory,
            );
            tracing::debug!("✅ [HEALTH] Health check successful: {:?}", report);
            (StatusCode::OK, report)
        }
        Err(e) => {
            tracing::error!("❌ [HEALTH] Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HealthReport::error(now, app_id, e.to_string()),
            )
        }
    }
}

// 缺少或空白的標頭視為 Unknown
fn app_id_from(headers: &HeaderMap) -> String {
    headers
        .get(APP_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_APP_ID)
        .to_string()
}
