#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static NEXT_EMAIL: AtomicU32 = AtomicU32::new(0);

/// A running server owned by one test. Dropping it kills and reaps the process.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // In-memory store so the suite needs no database
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_course-api"));
        cmd.env("API_HOST", "127.0.0.1")
            .env("API_PORT", port.to_string())
            .env("STORE_BACKEND", "memory")
            .env("SECURITY_BCRYPT_COST", "4")
            .env("SECURITY_REQUIRE_AUTH_FOR_READS", "false")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
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
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Whether the process is still alive
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Start a fresh server for the calling test and wait until it answers /health
pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// A registered account; emails are unique per call so tests can share one server
pub struct Account {
    pub email: String,
    pub password: String,
}

pub fn unique_email(prefix: &str) -> String {
    let n = NEXT_EMAIL.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}@example.com", prefix, std::process::id(), n)
}

pub async fn register(server: &TestServer, first_name: &str) -> Result<Account> {
    let account = Account {
        email: unique_email(&first_name.to_lowercase()),
        password: format!("{}-secret", first_name.to_lowercase()),
    };

    let resp = reqwest::Client::new()
        .post(server.url("/users"))
        .json(&json!({
            "firstName": first_name,
            "lastName": "Tester",
            "emailAddress": account.email,
            "password": account.password,
        }))
        .send()
        .await?;
    anyhow::ensure!(
        resp.status() == StatusCode::CREATED,
        "register returned {}",
        resp.status()
    );
    Ok(account)
}

/// Create a course and return its Location path
pub async fn create_course(server: &TestServer, owner: &Account, title: &str) -> Result<String> {
    let resp = reqwest::Client::new()
        .post(server.url("/courses"))
        .basic_auth(&owner.email, Some(&owner.password))
        .json(&json!({ "title": title, "description": "A course for testing" }))
        .send()
        .await?;
    anyhow::ensure!(
        resp.status() == StatusCode::CREATED,
        "create course returned {}",
        resp.status()
    );
    let location = resp
        .headers()
        .get(reqwest::header::LOCATION)
        .context("missing Location header")?
        .to_str()?
        .to_string();
    Ok(location)
}

pub async fn get_json(url: &str, auth: Option<&Account>) -> Result<(StatusCode, Value)> {
    let mut req = reqwest::Client::new().get(url);
    if let Some(account) = auth {
        req = req.basic_auth(&account.email, Some(&account.password));
    }
    let resp = req.send().await?;
    let status = resp.status();
    let body = resp.json::<Value>().await.unwrap_or(Value::Null);
    Ok((status, body))
}
