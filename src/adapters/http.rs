use crate::domain::model::AttemptFailure;
use crate::domain::ports::HealthCheck;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const APP_ID_HEADER: &str = "X-App-ID";

/// 只需要 `status` 欄位；其他診斷欄位不影響判斷
#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

/// 以 HTTP GET 呼叫健康檢查端點
#[derive(Debug, Clone)]
pub struct HttpHealthCheck {
    client: Client,
    url: String,
    app_id: Option<String>,
    timeout: Duration,
}

impl HttpHealthCheck {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            app_id: None,
            timeout,
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl HealthCheck for HttpHealthCheck {
    async fn check(&self) -> Result<(), AttemptFailure> {
        let mut request = self.client.get(&self.url).timeout(self.timeout);
        if let Some(app_id) = &self.app_id {
            request = request.header(APP_ID_HEADER, app_id);
        }

        tracing::debug!("Making health request to: {}", self.url);

        let response = request.send().await.map_err(classify)?;
        let status = response.status();
        tracing::debug!("Health response status: {}", status);

        if !status.is_success() {
            return Err(AttemptFailure::HttpStatus(status.as_u16()));
        }

        let body: HealthBody = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AttemptFailure::Timeout
                } else {
                    AttemptFailure::InvalidBody(e.to_string())
                }
            })?;

        if body.status == "ok" {
            Ok(())
        } else {
            Err(AttemptFailure::Unhealthy(body.status))
        }
    }
}

fn classify(error: reqwest::Error) -> AttemptFailure {
    if error.is_timeout() {
        AttemptFailure::Timeout
    } else {
        AttemptFailure::Network(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn check_for(server: &MockServer) -> HttpHealthCheck {
        HttpHealthCheck::new(Client::new(), server.url("/health"), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_ok_body_is_success() {
        let server = MockServer::start();
        let health_mock = server.mock(|when, then| {
            when.method(GET).path("/health").header("X-App-ID", "dashboard-1");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"status": "ok", "uptime": 12.5}));
        });

        let check = check_for(&server).with_app_id("dashboard-1");
        assert!(check.check().await.is_ok());
        health_mock.assert();
    }

    #[tokio::test]
    async fn test_server_error_is_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(500)
                .json_body(serde_json::json!({"status": "error", "error": "boom"}));
        });

        let result = check_for(&server).check().await;
        assert_eq!(result, Err(AttemptFailure::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_non_ok_status_field_is_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(200)
                .json_body(serde_json::json!({"status": "degraded"}));
        });

        let result = check_for(&server).check().await;
        assert_eq!(result, Err(AttemptFailure::Unhealthy("degraded".to_string())));
    }

    #[tokio::test]
    async fn test_non_json_body_is_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(200).body("OK");
        });

        let result = check_for(&server).check().await;
        assert!(matches!(result, Err(AttemptFailure::InvalidBody(_))));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(serde_json::json!({"status": "ok"}));
        });

        let check =
            HttpHealthCheck::new(Client::new(), server.url("/health"), Duration::from_millis(50));
        assert_eq!(check.check().await, Err(AttemptFailure::Timeout));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_failure() {
        // 埠號 9 (discard) 通常沒有服務在聽
        let check = HttpHealthCheck::new(
            Client::new(),
            "http://127.0.0.1:9/health",
            Duration::from_secs(2),
        );
        assert!(matches!(
            check.check().await,
            Err(AttemptFailure::Network(_)) | Err(AttemptFailure::Timeout)
        ));
    }
}
