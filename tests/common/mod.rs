use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Email allowed to self-provision the first administrator in tests.
pub const BOOTSTRAP_EMAIL: &str = "root@example.com";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
    // Keep the storage roots alive for the lifetime of the server
    #[allow(dead_code)]
    storage: tempfile::TempDir,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let storage = tempfile::tempdir().context("failed to create storage tempdir")?;
        let hot = storage.path().join("hot");
        let cold = storage.path().join("cold");
        let staging = storage.path().join("staging");

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/coldvault");
        cmd.env("COLDVAULT_PORT", port.to_string())
            .env("PUBLIC_BASE_URL", &base_url)
            .env("STORAGE_HOT_ROOT", &hot)
            .env("STORAGE_COLD_ROOT", &cold)
            .env("STORAGE_STAGING_DIR", &staging)
            .env("JWT_SECRET", "integration-test-secret")
            .env("BOOTSTRAP_ADMIN_EMAILS", BOOTSTRAP_EMAIL)
            // Force the in-memory identity store and metadata index
            .env_remove("DATABASE_URL")
            .env_remove("APP_ENV")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child, storage })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Log in (creating the account on first authentication) and return the
/// session token.
pub async fn login(base_url: &str, email: &str, password: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/auth/login", base_url))
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    let body: serde_json::Value = res.json().await?;
    body["data"]["token"]
        .as_str()
        .map(|s| s.to_string())
        .context("login response missing token")
}
