use crate::adapters::http::APP_ID_HEADER;
use crate::domain::model::{Credentials, FindQuery, Paginated, User};
use crate::domain::ports::{BackendClient, Entity};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;

const AUTH_ENTITY_SLUG: &str = "users";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Manifest REST API 客戶端；登入 token 只保存在記憶體中
pub struct ManifestClient {
    client: Client,
    base_url: String,
    app_id: Option<String>,
    token: RwLock<Option<String>>,
}

impl ManifestClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: None,
            token: RwLock::new(None),
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 後台管理介面網址
    pub fn admin_url(&self) -> String {
        format!("{}/admin", self.base_url)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    fn collection_url(&self, slug: &str) -> String {
        format!("{}/api/collections/{}", self.base_url, slug)
    }

    fn auth_url(&self, action: &str) -> String {
        format!("{}/api/auth/{}/{}", self.base_url, AUTH_ENTITY_SLUG, action)
    }

    async fn prepare(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(app_id) = &self.app_id {
            request = request.header(APP_ID_HEADER, app_id);
        }
        if let Some(token) = self.token.read().await.as_ref() {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn decode<T: DeserializeOwned>(entity: &str, response: Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(AppError::BackendError {
                status: status.as_u16(),
                message: error_message(&text, status),
            });
        }

        serde_json::from_str(&text).map_err(|e| AppError::DecodeError {
            entity: entity.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl BackendClient for ManifestClient {
    async fn login(&self, credentials: &Credentials) -> Result<()> {
        tracing::info!("🔐 Logging in as {}", credentials.email);

        let request = self.prepare(self.client.post(self.auth_url("login"))).await;
        let response = request.json(credentials).send().await?;

        let token: TokenResponse = match Self::decode("login", response).await {
            Ok(token) => token,
            Err(AppError::BackendError { status, message })
                if (400..500).contains(&status) =>
            {
                tracing::warn!("Login rejected (HTTP {}): {}", status, message);
                return Err(AppError::AuthenticationError { message });
            }
            Err(e) => return Err(e),
        };

        *self.token.write().await = Some(token.token);
        tracing::debug!("Login token stored");
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        // Manifest 沒有登出 API，清掉 token 即可
        *self.token.write().await = None;
        tracing::info!("👋 Logged out");
        Ok(())
    }

    async fn me(&self) -> Result<User> {
        if !self.is_authenticated().await {
            return Err(AppError::NotAuthenticated);
        }

        let request = self.prepare(self.client.get(self.auth_url("me"))).await;
        let response = request.send().await?;

        match Self::decode::<User>(User::NAME, response).await {
            Err(AppError::BackendError { status: 401, .. }) => Err(AppError::NotAuthenticated),
            other => other,
        }
    }

    async fn find<E: Entity>(&self, query: &FindQuery) -> Result<Paginated<E>> {
        let url = self.collection_url(E::SLUG);
        tracing::debug!("Fetching {} from {} with {:?}", E::NAME, url, query);

        let request = self.prepare(self.client.get(&url)).await;
        let response = request.query(&query.to_query_pairs()).send().await?;

        let page: Paginated<E> = Self::decode(E::NAME, response).await?;
        tracing::debug!("Fetched {} {} record(s)", page.data.len(), E::NAME);
        Ok(page)
    }

    async fn create<E: Entity>(&self, payload: &E::Payload) -> Result<E> {
        let url = self.collection_url(E::SLUG);
        tracing::debug!("Creating {} at {}", E::NAME, url);

        let request = self.prepare(self.client.post(&url)).await;
        let response = request.json(payload).send().await?;

        Self::decode(E::NAME, response).await
    }
}

/// 從錯誤回應中取出可讀訊息，`message` 可能是字串或字串陣列
fn error_message(body: &str, status: StatusCode) -> String {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    };

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("message") {
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(serde_json::Value::Array(messages)) => messages
                .iter()
                .filter_map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            _ => fallback(),
        },
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => fallback(),
    }
}
