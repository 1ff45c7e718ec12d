//! Test server harness for E2E testing
//!
//! Provides `TestPortalServer` for spawning real portal instances in tests.

use common::clock::{Clock, ManualClock};
use hrm_portal::config::Config;
use hrm_portal::routes::{self, AppState};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

/// Metrics handle shared by every test server in the process.
static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// The process-wide recorder's handle, installing it on first use.
///
/// Falls back to a standalone recorder when another one is already
/// installed globally.
pub fn test_metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            routes::init_metrics_recorder()
                .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle())
        })
        .clone()
}

/// Configuration for a test portal pointed at `admin_url`.
///
/// Cookies are not marked `Secure` so they can be replayed over plain HTTP.
pub fn test_config(admin_url: &str, overrides: &[(&str, &str)]) -> Config {
    let mut vars = HashMap::from([
        ("ADMIN_API_BASE_URL".to_string(), admin_url.to_string()),
        ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ("UPSTREAM_TIMEOUT_SECONDS".to_string(), "5".to_string()),
        ("COOKIE_SECURE".to_string(), "false".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert((*key).to_string(), (*value).to_string());
    }
    Config::from_vars(&vars).expect("test config should be valid")
}

/// Test harness for spawning the portal in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health() -> Result<()> {
///     let admin = AdminApiMock::start().await;
///     let server = TestPortalServer::spawn(&admin.uri()).await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestPortalServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    clock: ManualClock,
    _handle: JoinHandle<()>,
}

impl TestPortalServer {
    /// Spawn a portal against `admin_url` with default test configuration.
    pub async fn spawn(admin_url: &str) -> Result<Self, anyhow::Error> {
        Self::spawn_with(test_config(admin_url, &[])).await
    }

    /// Spawn a portal with `config`.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Run on a [`ManualClock`] starting at the current time
    /// - Start the HTTP server in the background
    pub async fn spawn_with(config: Config) -> Result<Self, anyhow::Error> {
        let clock = ManualClock::starting_now();
        let shared: Arc<dyn Clock> = Arc::new(clock.clone());
        let state = Arc::new(
            AppState::new(config, shared)
                .map_err(|e| anyhow::anyhow!("Failed to create app state: {}", e))?,
        );

        let app = routes::build_routes(Arc::clone(&state), test_metrics_handle());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            clock,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server's state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The server's clock; advance it to age sessions.
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// A client that does not follow redirects, so route filter answers can
    /// be inspected.
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("test client should build")
    }
}

impl Drop for TestPortalServer {
    fn drop(&mut self) {
        // Abort the HTTP server task so the port is released when the test
        // completes.
        self._handle.abort();
    }
}

/// `name=value` pairs of every non-removal `Set-Cookie` on `response`,
/// joined for a `Cookie` request header.
pub fn cookie_header(response: &reqwest::Response) -> String {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter(|pair| pair.split_once('=').is_some_and(|(_, value)| !value.is_empty()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Names of the cookies `response` removes (empty value, zero max-age).
pub fn removed_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.contains("Max-Age=0"))
        .filter_map(|v| v.split_once('=').map(|(name, _)| name.to_string()))
        .collect()
}
