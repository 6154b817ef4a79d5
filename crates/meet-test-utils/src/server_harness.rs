//! Test server harness for E2E testing
//!
//! Provides `TestMeetServer` for spawning real Meet Service instances in tests.

use meet_service::config::Config;
use meet_service::observability::HealthState;
use meet_service::routes::{self, AppState};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Test harness for spawning the Meet Service in E2E tests.
///
/// Each server has its own in-memory rooms and its own temporary transcript
/// directory, removed when the server is dropped.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_flow_e2e() -> Result<()> {
///     let server = TestMeetServer::spawn().await?;
///
///     let response = reqwest::get(&format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestMeetServer {
    addr: SocketAddr,
    config: Config,
    state: Arc<AppState>,
    health: Arc<HealthState>,
    transcripts_dir: TempDir,
    _handle: JoinHandle<()>,
}

impl TestMeetServer {
    /// Spawn a server with default configuration.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(HashMap::new()).await
    }

    /// Spawn a server with extra configuration variables.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Write transcripts to a fresh temporary directory
    /// - Report ready immediately
    /// - Start the HTTP server in the background
    pub async fn spawn_with_vars(vars: HashMap<String, String>) -> Result<Self, anyhow::Error> {
        Self::spawn_inner(vars, None).await
    }

    /// Spawn a server that also serves `/metrics` from `metrics_handle`.
    pub async fn spawn_with_metrics(
        metrics_handle: PrometheusHandle,
    ) -> Result<Self, anyhow::Error> {
        Self::spawn_inner(HashMap::new(), Some(metrics_handle)).await
    }

    async fn spawn_inner(
        mut vars: HashMap<String, String>,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Result<Self, anyhow::Error> {
        let transcripts_dir = tempfile::tempdir()
            .map_err(|e| anyhow::anyhow!("Failed to create transcript dir: {}", e))?;

        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string());
        vars.entry("TRANSCRIPTS_DIR".to_string())
            .or_insert_with(|| transcripts_dir.path().display().to_string());

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(AppState::new(config.clone()));
        let health = Arc::new(HealthState::new());

        // Build routes using meet-service's real route builder
        let app = routes::build_routes(Arc::clone(&state), Arc::clone(&health), metrics_handle);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        health.set_ready();

        // Spawn server in background
        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            state,
            health,
            transcripts_dir,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// WebSocket URL of a meeting's signaling channel.
    pub fn signaling_url(&self, meeting_id: &str, client_id: &str) -> String {
        format!(
            "ws://{}/ws/rooms/{}?clientId={}",
            self.addr, meeting_id, client_id
        )
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared application state, for asserting on room state directly.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Readiness flag served by `/ready`.
    pub fn health(&self) -> &Arc<HealthState> {
        &self.health
    }

    /// Directory the server writes transcripts to.
    pub fn transcripts_dir(&self) -> &Path {
        self.transcripts_dir.path()
    }

    /// Create a meeting through the HTTP API and return its id.
    pub async fn create_meeting(&self) -> Result<String, anyhow::Error> {
        let response = reqwest::Client::new()
            .post(format!("{}/api/meetings", self.url()))
            .send()
            .await?;
        anyhow::ensure!(
            response.status() == reqwest::StatusCode::CREATED,
            "create meeting returned {}",
            response.status()
        );

        let body: serde_json::Value = response.json().await?;
        body["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("create meeting response has no id: {}", body))
    }

    /// Ask the server to close its signaling connections, as on shutdown.
    pub fn close_signaling(&self) {
        self.state.shutdown.cancel();
    }
}

impl Drop for TestMeetServer {
    fn drop(&mut self) {
        // Close signaling sockets and abort the HTTP server task so the test
        // runtime can finish promptly.
        self.state.shutdown.cancel();
        self._handle.abort();
    }
}
