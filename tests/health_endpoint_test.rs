use anyhow::Result;
use foodie_app::server::{serve, HealthState};
use foodie_app::utils::monitor::SystemMonitor;
use std::sync::Arc;
use tokio::sync::oneshot;

struct RunningServer {
    base_url: String,
    shutdown: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<foodie_app::Result<()>>,
}

async fn start_server() -> Result<RunningServer> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let state = HealthState::new(Arc::new(SystemMonitor::new()?), "4.16.1", "test");

    let (shutdown, signal) = oneshot::channel::<()>();
    let handle = tokio::spawn(serve(listener, state, async move {
        let _ = signal.await;
    }));

    Ok(RunningServer {
        base_url,
        shutdown,
        handle,
    })
}

#[tokio::test]
async fn test_health_over_http() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", server.base_url))
        .header("X-App-ID", "db5abc7d")
        .send()
        .await?;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["appId"], "db5abc7d");
    assert_eq!(body["manifest"], "connected");
    assert_eq!(body["version"], "4.16.1");
    assert_eq!(body["environment"], "test");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    assert!(body["memory"]["rss"].as_u64().unwrap() > 0);
    assert_eq!(body["platform"]["arch"], std::env::consts::ARCH);
    assert_eq!(body["platform"]["platform"], std::env::consts::OS);
    chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap())?;

    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_missing_app_id_header_reports_unknown() -> Result<()> {
    let server = start_server().await?;

    let body: serde_json::Value = reqwest::get(format!("{}/health", server.base_url))
        .await?
        .json()
        .await?;

    assert_eq!(body["appId"], "Unknown");

    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}

#[tokio::test]
async fn test_repeated_calls_stay_ok_and_ignore_body() -> Result<()> {
    let server = start_server().await?;
    let client = reqwest::Client::new();

    let mut uptimes = Vec::new();
    for i in 0..3 {
        let response = client
            .get(format!("{}/health", server.base_url))
            .body(format!("ignored payload {}", i))
            .send()
            .await?;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["status"], "ok");
        uptimes.push(body["uptime"].as_f64().unwrap());
    }
    assert!(uptimes.windows(2).all(|w| w[0] <= w[1]));

    server.shutdown.send(()).ok();
    server.handle.await??;
    Ok(())
}
