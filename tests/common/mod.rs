use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use goalpost_api::auth::{generate_jwt, Claims};
use goalpost_api::config::{AppConfig, SecurityConfig};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Empty DATABASE_URL keeps the server on the in-memory store even if .env sets one
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_goalpost-api"));
        cmd.env("APP_ENV", "development")
            .env("GOALPOST_API_PORT", port.to_string())
            .env("DATABASE_URL", "")
            .env("JWT_SECRET", TEST_JWT_SECRET)
            .env("SECURITY_ENFORCE_CALLER_MATCH", "false")
            .env("SITE_ASSET_DIR", concat!(env!("CARGO_MANIFEST_DIR"), "/public"))
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
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
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that reports redirects instead of following them
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("reqwest client")
}

#[allow(dead_code)]
pub fn token_for(user_id: &str) -> String {
    let security = SecurityConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::development().security
    };
    generate_jwt(&Claims::new(user_id, None, 1), &security).expect("test token")
}

/// Unique user id so tests sharing one server never collide
#[allow(dead_code)]
pub fn unique_user(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}
