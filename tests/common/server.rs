//! Test daemon management.
//!
//! Spawns and manages bmwatch instances for integration testing.

use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::Duration;
use tokio::time::sleep;

/// A running bmwatch instance.
pub struct TestServer {
    child: Child,
    port: u16,
}

impl TestServer {
    /// Write a config into `data_dir` pointing at `upstream` and spawn the daemon.
    pub async fn spawn(port: u16, data_dir: &Path, upstream: &str) -> anyhow::Result<Self> {
        let config_path = data_dir.join("config.toml");
        let config_content = format!(
            r#"
[api]
token = "test-token"
base_url = "{upstream}"
timeout_secs = 2

[webhooks]
player_alert = "{upstream}/hooks/alert"
logging = "{upstream}/hooks/logging"

[watch]
check_interval_ms = 200
watchlist_path = "{watchlist}"

[http]
address = "127.0.0.1:{port}"
"#,
            upstream = upstream,
            watchlist = data_dir.join("watchlist.json").display(),
            port = port,
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_bmwatch"))
            .arg(&config_path)
            .env_remove("BATTLEMETRICS_TOKEN")
            .env_remove("CHECK_INTERVAL")
            .env_remove("WEBHOOK_PLAYER_ALERT")
            .env_remove("WEBHOOK_LOGGING")
            .spawn()?;

        let server = Self { child, port };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the HTTP endpoint accepts connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("bmwatch failed to start within 5 seconds")
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn client(&self) -> super::client::CommandClient {
        super::client::CommandClient::new(self.base_url())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Path of the watchlist document inside a test data directory.
pub fn watchlist_path(data_dir: &Path) -> PathBuf {
    data_dir.join("watchlist.json")
}
