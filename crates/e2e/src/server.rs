//! Application handle - optionally launching the shop and waiting for it to answer

use std::collections::HashMap;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// How to reach (and optionally start) the application under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Program and arguments, e.g. `["java", "-jar", "artifacts/aqa-shop.jar"]`.
    /// Without a command the handle attaches to an already running instance.
    pub command: Option<Vec<String>>,

    /// Extra environment for the launched process
    pub env: HashMap<String, String>,

    /// URL polled until it answers
    pub base_url: String,

    pub startup_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: None,
            env: HashMap::new(),
            base_url: "http://localhost:8080".to_string(),
            startup_timeout_secs: 60,
        }
    }
}

impl ServerConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }
}

/// Handle to the application; owns the process when it launched one
pub struct ServerHandle {
    child: Option<Child>,
    base_url: String,
}

impl ServerHandle {
    /// Launch the configured command, if any, then wait until the base URL responds
    pub async fn spawn(config: ServerConfig) -> E2eResult<Self> {
        let child = match &config.command {
            Some(command) => Some(launch(command, &config.env)?),
            None => {
                info!("Attaching to running application at {}", config.base_url);
                None
            }
        };

        let handle = ServerHandle {
            child,
            base_url: config.base_url.clone(),
        };

        handle.wait_for_healthy(config.startup_timeout()).await?;

        info!("Application is up at {}", handle.base_url);
        Ok(handle)
    }

    /// Poll the base URL until any non-5xx response arrives
    async fn wait_for_healthy(&self, timeout_duration: Duration) -> E2eResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;

            match client.get(&self.base_url).send().await {
                Ok(resp) if !resp.status().is_server_error() => {
                    debug!("Health check answered {} after {} attempt(s)", resp.status(), attempts);
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for application to start...");
                    }
                    // Connection refused is expected while the JVM boots
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            if start.elapsed() >= timeout_duration {
                return Err(E2eError::ServerHealthCheck(attempts));
            }

            sleep(Duration::from_millis(250)).await;
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop the launched process; a no-op for attached handles
    pub fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        info!("Stopping application (pid: {})", child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        let _ = child.kill();
        child.wait()?;

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn launch(command: &[String], env: &HashMap<String, String>) -> E2eResult<Child> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| E2eError::Config("server.command is empty".to_string()))?;

    info!("Launching application: {}", command.join(" "));

    Command::new(program)
        .args(args)
        .envs(env)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| E2eError::ServerStartup(format!("failed to spawn {}: {}", program, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn unused_port() -> u16 {
        TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    #[test]
    fn test_config_from_toml() {
        let config: ServerConfig = toml::from_str(
            r#"
command = ["java", "-jar", "artifacts/aqa-shop.jar"]
startup_timeout_secs = 90

[env]
SPRING_DATASOURCE_URL = "jdbc:mysql://localhost:3306/app"
"#,
        )
        .unwrap();
        assert_eq!(config.command.as_ref().map(Vec::len), Some(3));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.startup_timeout(), Duration::from_secs(90));
        assert_eq!(config.env.len(), 1);
    }

    #[tokio::test]
    async fn test_attach_to_unreachable_app_fails() {
        let config = ServerConfig {
            base_url: format!("http://127.0.0.1:{}", unused_port()),
            startup_timeout_secs: 0,
            ..ServerConfig::default()
        };
        let err = ServerHandle::spawn(config).await.err().unwrap();
        assert!(matches!(err, E2eError::ServerHealthCheck(1)));
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let config = ServerConfig {
            command: Some(vec![]),
            ..ServerConfig::default()
        };
        let err = ServerHandle::spawn(config).await.err().unwrap();
        assert!(matches!(err, E2eError::Config(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_fails_startup() {
        let config = ServerConfig {
            command: Some(vec!["/nonexistent/payform-app".to_string()]),
            ..ServerConfig::default()
        };
        let err = ServerHandle::spawn(config).await.err().unwrap();
        assert!(matches!(err, E2eError::ServerStartup(_)));
    }
}
