use crate::core::probe::ConnectivityProbe;
use crate::core::session::{Screen, Session};
use crate::domain::model::ProbeResult;
use crate::domain::ports::{BackendClient, HealthCheck};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Testing,
    Connected,
    ConnectionFailed,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionStatus::Testing => "Testing...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::ConnectionFailed => "Connection Failed",
        };
        f.write_str(label)
    }
}

/// 連線狀態指示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionBanner {
    pub connected: bool,
    pub status: ConnectionStatus,
}

impl ConnectionBanner {
    pub fn testing() -> Self {
        Self {
            connected: false,
            status: ConnectionStatus::Testing,
        }
    }

    pub fn from_probe(result: &ProbeResult) -> Self {
        if result.success {
            Self {
                connected: true,
                status: ConnectionStatus::Connected,
            }
        } else {
            Self {
                connected: false,
                status: ConnectionStatus::ConnectionFailed,
            }
        }
    }

    pub fn headline(&self) -> &'static str {
        if self.connected {
            "✅ Backend Connected"
        } else {
            "❌ Backend Disconnected"
        }
    }
}

impl fmt::Display for ConnectionBanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.headline(), self.status)
    }
}

pub struct StartupReport<B: BackendClient> {
    pub probe: ProbeResult,
    pub banner: ConnectionBanner,
    pub session: Session<B>,
}

/// 啟動流程：連線探測與登入狀態還原彼此獨立，同時進行
pub struct AppEngine<H: HealthCheck, B: BackendClient> {
    probe: ConnectivityProbe<H>,
    backend: Arc<B>,
}

impl<H: HealthCheck, B: BackendClient> AppEngine<H, B> {
    pub fn new(probe: ConnectivityProbe<H>, backend: Arc<B>) -> Self {
        Self { probe, backend }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub async fn check_connection(&self) -> (ProbeResult, ConnectionBanner) {
        tracing::info!("🔍 Connection status: {}", ConnectionStatus::Testing);
        let result = self.probe.run().await;
        let banner = ConnectionBanner::from_probe(&result);

        if result.success {
            tracing::info!("✅ Backend connection successful - proceeding with app initialization");
        } else {
            tracing::error!(
                "❌ Backend connection failed - app may not work properly: {}",
                result.error.as_deref().unwrap_or("unknown error")
            );
        }

        (result, banner)
    }

    pub async fn start(&self) -> StartupReport<B> {
        let mut session = Session::new(Arc::clone(&self.backend));

        let ((probe, banner), screen) =
            tokio::join!(self.check_connection(), session.bootstrap());

        tracing::info!("{} | start screen: {:?}", banner, screen);
        if !banner.connected && screen == Screen::Dashboard {
            tracing::warn!("⚠️ Session restored but the health probe failed");
        }

        StartupReport {
            probe,
            banner,
            session,
        }
    }
}
