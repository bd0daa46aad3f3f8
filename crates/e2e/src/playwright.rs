//! Playwright browser automation
//!
//! A [`PlaywrightSession`] keeps one Node.js process alive for the whole
//! run. The process loads the embedded bridge script, opens a single page,
//! and answers one JSON command per stdin line with one JSON reply per
//! stdout line.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::driver::{FormDriver, Locator};
use crate::error::{E2eError, E2eResult};

const BRIDGE_SCRIPT: &str = include_str!("bridge.js");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser: {}", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Node.js executable
    pub node_binary: String,

    /// Directory holding the `playwright` package (default: ./node_modules)
    pub node_path: Option<PathBuf>,

    /// How long to wait for the bridge to answer a single command
    pub command_timeout_ms: u64,

    /// Playwright's own timeout for clicks and fills
    pub action_timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            node_binary: "node".to_string(),
            node_path: None,
            command_timeout_ms: 30_000,
            action_timeout_ms: 5_000,
        }
    }
}

/// One command for the bridge script
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeCommand {
    Goto { url: String },
    Click { selector: String, timeout_ms: u64 },
    Fill { selector: String, value: String, timeout_ms: u64 },
    Probe { selector: String },
    Screenshot { path: String },
    Close,
}

impl BridgeCommand {
    fn describe(&self) -> String {
        match self {
            BridgeCommand::Goto { url } => format!("goto:{}", url),
            BridgeCommand::Click { selector, .. } => format!("click:{}", selector),
            BridgeCommand::Fill { selector, .. } => format!("fill:{}", selector),
            BridgeCommand::Probe { selector } => format!("probe:{}", selector),
            BridgeCommand::Screenshot { path } => format!("screenshot:{}", path),
            BridgeCommand::Close => "close".to_string(),
        }
    }
}

/// Answer to one command; `visible`/`text` are only set by probes
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BridgeReply {
    pub id: u64,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub text: Option<String>,
}

/// Serialize a command as the single line the bridge reads
pub fn encode_command(id: u64, command: &BridgeCommand) -> E2eResult<String> {
    let mut value = serde_json::to_value(command)?;
    if let Some(object) = value.as_object_mut() {
        object.insert("id".to_string(), serde_json::Value::from(id));
    }
    Ok(value.to_string())
}

/// Playwright selector for a locator
pub fn selector_for(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => selector.clone(),
        Locator::Text(text) => format!(
            "text=\"{}\"",
            text.replace('\\', "\\\\").replace('"', "\\\"")
        ),
    }
}

/// Live browser page behind a Node.js bridge process
pub struct PlaywrightSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    command_timeout: Duration,
    action_timeout_ms: u64,
    _script_dir: TempDir,
}

impl PlaywrightSession {
    /// Start the bridge and wait until the browser is up
    pub async fn launch(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_node_installed(&config.node_binary)?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        let node_path = match &config.node_path {
            Some(path) => path.clone(),
            None => std::env::current_dir()?.join("node_modules"),
        };
        let options = serde_json::json!({
            "browser": config.browser.as_str(),
            "headless": config.headless,
            "viewport_width": config.viewport_width,
            "viewport_height": config.viewport_height,
        });

        info!(
            "Launching {} (headless: {}) through Playwright bridge",
            config.browser.as_str(),
            config.headless
        );

        let mut child = TokioCommand::new(&config.node_binary)
            .arg(&script_path)
            .arg(options.to_string())
            .env("NODE_PATH", &node_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                E2eError::Playwright(format!("Failed to spawn {}: {}", config.node_binary, e))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdout not captured".to_string()))?;

        let mut session = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
            command_timeout: Duration::from_millis(config.command_timeout_ms),
            action_timeout_ms: config.action_timeout_ms,
            _script_dir: script_dir,
        };

        let ready = session.read_reply(0).await?;
        if !ready.ok {
            let reason = ready.error.unwrap_or_default();
            if reason.contains("Cannot find module") {
                return Err(E2eError::PlaywrightNotFound);
            }
            return Err(E2eError::Playwright(format!("Browser launch failed: {}", reason)));
        }

        debug!("Playwright bridge ready (pid: {:?})", session.child.id());
        Ok(session)
    }

    /// Check that Node.js can be run at all
    fn check_node_installed(node_binary: &str) -> E2eResult<()> {
        let status = Command::new(node_binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Send a command and wait for its reply
    pub async fn call(&mut self, command: BridgeCommand) -> E2eResult<BridgeReply> {
        self.next_id += 1;
        let id = self.next_id;
        let line = encode_command(id, &command)?;
        trace!("bridge <- {}", line);

        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;

        let reply = self.read_reply(id).await?;
        if reply.ok {
            Ok(reply)
        } else {
            Err(E2eError::Playwright(format!(
                "{} failed: {}",
                command.describe(),
                reply.error.as_deref().unwrap_or("unknown error")
            )))
        }
    }

    async fn read_reply(&mut self, id: u64) -> E2eResult<BridgeReply> {
        let limit = self.command_timeout;
        timeout(limit, next_reply(&mut self.stdout, id))
            .await
            .map_err(|_| {
                E2eError::Timeout(format!("bridge reply #{} ({} ms)", id, limit.as_millis()))
            })?
    }

    /// Close the browser and wait for the bridge to exit
    pub async fn close(mut self) -> E2eResult<()> {
        info!("Closing browser");
        if let Err(e) = self.call(BridgeCommand::Close).await {
            warn!("Bridge did not acknowledge close: {}", e);
        }

        match timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!("Bridge exited with {}", status);
            }
            Err(_) => {
                warn!("Bridge still running, killing it");
                self.child.kill().await?;
            }
        }
        Ok(())
    }
}

async fn next_reply(
    stdout: &mut Lines<BufReader<ChildStdout>>,
    id: u64,
) -> E2eResult<BridgeReply> {
    loop {
        let line = stdout.next_line().await?.ok_or(E2eError::BridgeClosed)?;
        match serde_json::from_str::<BridgeReply>(&line) {
            Ok(reply) if reply.id == id => return Ok(reply),
            Ok(reply) => warn!("Ignoring bridge reply #{} while waiting for #{}", reply.id, id),
            Err(_) => debug!("[bridge] {}", line),
        }
    }
}

#[async_trait]
impl FormDriver for PlaywrightSession {
    async fn goto(&mut self, url: &str) -> E2eResult<()> {
        self.call(BridgeCommand::Goto { url: url.to_string() }).await?;
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> E2eResult<()> {
        let command = BridgeCommand::Click {
            selector: selector_for(locator),
            timeout_ms: self.action_timeout_ms,
        };
        self.call(command).await?;
        Ok(())
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> E2eResult<()> {
        let command = BridgeCommand::Fill {
            selector: selector_for(locator),
            value: value.to_string(),
            timeout_ms: self.action_timeout_ms,
        };
        self.call(command).await?;
        Ok(())
    }

    async fn visible_text(&mut self, locator: &Locator) -> E2eResult<Option<String>> {
        let reply = self
            .call(BridgeCommand::Probe { selector: selector_for(locator) })
            .await?;
        Ok(reply.visible.then(|| reply.text.unwrap_or_default()))
    }

    async fn screenshot(&mut self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let command = BridgeCommand::Screenshot {
            path: path.to_string_lossy().to_string(),
        };
        self.call(command).await?;
        Ok(())
    }
}
