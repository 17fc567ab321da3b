use crate::core::dashboard::Dashboard;
use crate::domain::model::{Credentials, User};
use crate::domain::ports::BackendClient;
use crate::utils::error::Result;
use std::sync::Arc;

pub const LOGIN_FAILED_NOTICE: &str = "Login failed. Please check your credentials.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Dashboard,
}

/// 使用者登入狀態；所有後端錯誤都轉成可恢復的畫面狀態
pub struct Session<B: BackendClient> {
    backend: Arc<B>,
    user: Option<User>,
    screen: Screen,
    notice: Option<String>,
}

impl<B: BackendClient> Session<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            user: None,
            screen: Screen::Landing,
            notice: None,
        }
    }

    /// 啟動時嘗試取得目前使用者
    pub async fn bootstrap(&mut self) -> Screen {
        match self.backend.me().await {
            Ok(user) => {
                tracing::info!("👤 Resumed session for {}", user.email);
                self.user = Some(user);
                self.screen = Screen::Dashboard;
            }
            Err(e) => {
                tracing::debug!("No active session: {}", e);
                self.user = None;
                self.screen = Screen::Landing;
            }
        }
        self.screen
    }

    /// 登入失敗時不重試、不切換畫面，只留下提示訊息
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&User> {
        match self.authenticate(credentials).await {
            Ok(user) => {
                tracing::info!("✅ Logged in as {}", user.email);
                self.screen = Screen::Dashboard;
                self.notice = None;
                let user: &User = self.user.insert(user);
                Ok(user)
            }
            Err(e) => {
                tracing::error!("❌ Login failed: {} (Category: {:?})", e, e.category());
                self.notice = Some(LOGIN_FAILED_NOTICE.to_string());
                Err(e)
            }
        }
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User> {
        self.backend.login(credentials).await?;
        self.backend.me().await
    }

    /// 不論後端是否回應成功，都回到登入前的畫面
    pub async fn logout(&mut self) {
        if let Err(e) = self.backend.logout().await {
            tracing::warn!("⚠️ Logout request failed, clearing local session anyway: {}", e);
        }
        self.user = None;
        self.screen = Screen::Landing;
    }

    /// 已登入時建立儀表板
    pub fn dashboard(&self) -> Option<Dashboard<B>> {
        self.user
            .as_ref()
            .map(|owner| Dashboard::new(Arc::clone(&self.backend), owner.clone()))
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::InMemoryBackend;
    use crate::domain::model::EntityId;
    use crate::utils::error::AppError;
    use std::sync::atomic::Ordering;

    fn owner() -> User {
        User {
            id: EntityId::Number(1),
            name: "Owner".to_string(),
            email: "owner@foodieapp.com".to_string(),
        }
    }

    fn backend() -> InMemoryBackend {
        InMemoryBackend::new().with_account("owner@foodieapp.com", "password123", owner())
    }

    #[tokio::test]
    async fn test_bootstrap_without_session_stays_on_landing() {
        let mut session = Session::new(Arc::new(backend()));

        assert_eq!(session.bootstrap().await, Screen::Landing);
        assert!(session.user().is_none());
        assert!(session.dashboard().is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_resumes_existing_session() {
        let mut session = Session::new(Arc::new(backend().signed_in_as(owner())));

        assert_eq!(session.bootstrap().await, Screen::Dashboard);
        assert_eq!(session.user(), Some(&owner()));
        assert!(session.dashboard().is_some());
    }

    #[tokio::test]
    async fn test_login_success_moves_to_dashboard() {
        let backend = Arc::new(backend());
        let mut session = Session::new(Arc::clone(&backend));

        let user = session
            .login(&Credentials::new("owner@foodieapp.com", "password123"))
            .await
            .unwrap();

        assert_eq!(user.email, "owner@foodieapp.com");
        assert_eq!(session.screen(), Screen::Dashboard);
        assert!(session.notice().is_none());
        assert_eq!(backend.calls(), vec!["login:owner@foodieapp.com", "me"]);
    }

    #[tokio::test]
    async fn test_invalid_login_keeps_landing_and_sets_notice() {
        let backend = Arc::new(backend());
        let mut session = Session::new(Arc::clone(&backend));

        let result = session
            .login(&Credentials::new("owner@foodieapp.com", "wrong"))
            .await;

        assert!(matches!(result, Err(AppError::AuthenticationError { .. })));
        assert_eq!(session.screen(), Screen::Landing);
        assert!(session.user().is_none());
        assert_eq!(session.notice(), Some(LOGIN_FAILED_NOTICE));
        // 驗證失敗不重試
        assert_eq!(backend.calls(), vec!["login:owner@foodieapp.com"]);

        assert_eq!(session.take_notice().as_deref(), Some(LOGIN_FAILED_NOTICE));
        assert!(session.notice().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_when_backend_fails() {
        let backend = Arc::new(backend().signed_in_as(owner()));
        backend.fail_logout.store(true, Ordering::SeqCst);
        let mut session = Session::new(Arc::clone(&backend));
        session.bootstrap().await;

        session.logout().await;

        assert_eq!(session.screen(), Screen::Landing);
        assert!(session.user().is_none());
    }
}
