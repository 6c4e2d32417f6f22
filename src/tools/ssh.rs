//! Remote command execution over SSH
//!
//! One TCP + SSH session per call, torn down when the call returns. No
//! pooling, no retries: a failed attempt surfaces immediately. The
//! blocking ssh2 work runs on the tokio blocking pool.
//!
//! The extracted command is executed verbatim; there is no
//! sanitization or allow-listing at this layer.

use std::io::{ErrorKind, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use ssh2::Session;

use crate::core::{ExecutionResult, Result, SshConfig, SshPilotError, ToolDefinition, ToolResult};
use crate::tools::registry::Tool;

/// Name the SSH tool is registered under
pub const SSH_TOOL_NAME: &str = "ssh_exec";

/// Tool that runs one shell command on the configured remote host
pub struct SshExecTool {
    config: SshConfig,
}

impl SshExecTool {
    /// Create the tool with an explicit connection configuration
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    /// Run one command against the configured host
    ///
    /// Validation runs before the first connection attempt, so missing
    /// required fields surface as a typed configuration error rather
    /// than a connect failure.
    pub async fn execute(&self, command: &str) -> Result<ExecutionResult> {
        self.config.validate()?;

        let config = self.config.clone();
        let command = command.to_string();
        tokio::task::spawn_blocking(move || exec_command(&config, &command))
            .await
            .map_err(|e| SshPilotError::execution(format!("SSH exec task failed: {}", e)))?
    }
}

#[async_trait]
impl Tool for SshExecTool {
    fn name(&self) -> &str {
        SSH_TOOL_NAME
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            SSH_TOOL_NAME,
            "Execute a shell command on the remote server over SSH",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The shell command to run on the remote host"
                    }
                },
                "required": ["command"]
            }),
        )
    }

    async fn invoke(&self, arguments: &serde_json::Value) -> Result<ToolResult> {
        let command = arguments
            .get("command")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        if command.is_empty() {
            return Ok(ToolResult::failure(SSH_TOOL_NAME, "Empty command"));
        }

        let result = self.execute(command).await?;
        Ok(ToolResult::success_with_data(
            SSH_TOOL_NAME,
            result.summary(),
            serde_json::to_value(&result)?,
        ))
    }
}

/// Open a session and authenticate
///
/// Everything in here is the transport/auth handshake: any failure maps
/// to `Connection`.
fn connect_session(config: &SshConfig) -> Result<Session> {
    // Hostnames go through DNS here; resolution failure is a transport
    // failure, same as an unreachable address.
    let addr = config
        .addr()
        .to_socket_addrs()
        .map_err(|e| {
            SshPilotError::connection(format!("Failed to resolve {}: {}", config.addr(), e))
        })?
        .next()
        .ok_or_else(|| {
            SshPilotError::connection(format!("No addresses found for {}", config.addr()))
        })?;

    let timeout = Duration::from_millis(config.connect_timeout_ms);
    let tcp = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|e| SshPilotError::connection(format!("Failed to connect to {}: {}", config.addr(), e)))?;
    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session = Session::new()
        .map_err(|e| SshPilotError::connection(format!("Failed to create SSH session: {}", e)))?;
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| SshPilotError::connection(format!("SSH handshake failed: {}", e)))?;

    if let Some(key_path) = config.key_path.as_deref() {
        session
            .userauth_pubkey_file(&config.username, None, Path::new(key_path), None)
            .map_err(|e| SshPilotError::connection(format!("Key auth failed: {}", e)))?;
    } else if let Some(password) = config.password.as_deref() {
        session
            .userauth_password(&config.username, password)
            .map_err(|e| SshPilotError::connection(format!("Password auth failed: {}", e)))?;
    }

    if !session.authenticated() {
        return Err(SshPilotError::connection("SSH authentication failed"));
    }

    Ok(session)
}

/// Read one chunk from a stream into the sink
///
/// Returns whether any bytes arrived. `WouldBlock` is normal in
/// non-blocking mode and reads as no progress; any other error maps to
/// `Execution`.
fn pump(stream: &mut impl Read, sink: &mut Vec<u8>, label: &str) -> Result<bool> {
    let mut buf = [0u8; 8192];
    match stream.read(&mut buf) {
        Ok(0) => Ok(false),
        Ok(n) => {
            sink.extend_from_slice(&buf[..n]);
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(false),
        Err(e) => Err(SshPilotError::execution(format!(
            "Failed to read {}: {}",
            label, e
        ))),
    }
}

/// Run one command over a fresh session and capture its streams
///
/// Post-handshake failures map to `Execution`. A non-zero exit status
/// is returned as data, never as an error.
fn exec_command(config: &SshConfig, command: &str) -> Result<ExecutionResult> {
    let session = connect_session(config)?;

    let mut channel = session
        .channel_session()
        .map_err(|e| SshPilotError::execution(format!("Failed to open channel: {}", e)))?;
    channel
        .exec(command)
        .map_err(|e| SshPilotError::execution(format!("Failed to dispatch command: {}", e)))?;

    // Both streams are drained together in non-blocking mode. Draining
    // stdout to EOF first stalls a command that fills the stderr window
    // while stdout is still open.
    session.set_blocking(false);

    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();
    loop {
        let mut progressed = pump(&mut channel, &mut stdout_buf, "stdout")?;
        progressed |= pump(&mut channel.stderr(), &mut stderr_buf, "stderr")?;

        if channel.eof() {
            break;
        }
        if !progressed {
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    // Anything still buffered behind the EOF marker
    while pump(&mut channel, &mut stdout_buf, "stdout")? {}
    while pump(&mut channel.stderr(), &mut stderr_buf, "stderr")? {}

    session.set_blocking(true);
    channel
        .wait_close()
        .map_err(|e| SshPilotError::execution(format!("Failed to close channel: {}", e)))?;
    let exit_code = channel.exit_status().unwrap_or(-1);

    Ok(ExecutionResult {
        stdout: String::from_utf8_lossy(&stdout_buf).into_owned(),
        stderr: String::from_utf8_lossy(&stderr_buf).into_owned(),
        exit_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> SshConfig {
        SshConfig {
            host: String::new(),
            port: 22,
            username: String::new(),
            password: None,
            key_path: None,
            connect_timeout_ms: 100,
        }
    }

    #[tokio::test]
    async fn test_execute_rejects_missing_config() {
        let tool = SshExecTool::new(unconfigured());
        let err = tool.execute("uptime").await.unwrap_err();
        assert!(matches!(err, SshPilotError::Config(_)));
    }

    #[tokio::test]
    async fn test_invoke_rejects_empty_command() {
        let tool = SshExecTool::new(unconfigured());
        let result = tool
            .invoke(&serde_json::json!({"command": ""}))
            .await
            .unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_hostname_reaches_the_transport() {
        // A resolvable hostname must get past address handling; port 1
        // is refused (or times out), so the failure is a Connection
        // error, never a Config error.
        let config = SshConfig {
            host: "localhost".into(),
            port: 1,
            username: "ops".into(),
            password: Some("secret".into()),
            key_path: None,
            connect_timeout_ms: 1_000,
        };
        let err = SshExecTool::new(config).execute("uptime").await.unwrap_err();
        assert!(matches!(err, SshPilotError::Connection(_)), "{:?}", err);
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_a_connection_error() {
        let config = SshConfig {
            host: "no-such-host.invalid".into(),
            port: 22,
            username: "ops".into(),
            password: Some("secret".into()),
            key_path: None,
            connect_timeout_ms: 1_000,
        };
        let err = SshExecTool::new(config).execute("uptime").await.unwrap_err();
        assert!(matches!(err, SshPilotError::Connection(_)), "{:?}", err);
    }

    /// Read source that replays scripted results, WouldBlock included
    struct ScriptedStream {
        steps: std::collections::VecDeque<std::io::Result<Vec<u8>>>,
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.steps.pop_front() {
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(e)) => Err(e),
                None => Ok(0),
            }
        }
    }

    fn scripted(steps: Vec<std::io::Result<Vec<u8>>>) -> ScriptedStream {
        ScriptedStream {
            steps: steps.into(),
        }
    }

    #[test]
    fn test_pump_interleaves_streams_without_starving_stderr() {
        let mut stdout = scripted(vec![
            Ok(b"out-1".to_vec()),
            Err(std::io::Error::from(ErrorKind::WouldBlock)),
            Ok(b"out-2".to_vec()),
        ]);
        let mut stderr = scripted(vec![
            Err(std::io::Error::from(ErrorKind::WouldBlock)),
            Ok(b"err-1".to_vec()),
        ]);

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();
        for _ in 0..3 {
            pump(&mut stdout, &mut stdout_buf, "stdout").unwrap();
            pump(&mut stderr, &mut stderr_buf, "stderr").unwrap();
        }

        assert_eq!(stdout_buf, b"out-1out-2");
        assert_eq!(stderr_buf, b"err-1");
    }

    #[test]
    fn test_pump_would_block_is_not_an_error() {
        let mut stream = scripted(vec![Err(std::io::Error::from(ErrorKind::WouldBlock))]);
        let mut sink = Vec::new();
        assert!(!pump(&mut stream, &mut sink, "stdout").unwrap());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_pump_hard_error_maps_to_execution() {
        let mut stream = scripted(vec![Err(std::io::Error::from(ErrorKind::ConnectionReset))]);
        let mut sink = Vec::new();
        let err = pump(&mut stream, &mut sink, "stderr").unwrap_err();
        assert!(matches!(err, SshPilotError::Execution(_)));
    }

    #[test]
    fn test_definition_requires_command() {
        let tool = SshExecTool::new(unconfigured());
        let def = tool.definition();
        assert_eq!(def.function.name, SSH_TOOL_NAME);
        assert_eq!(
            def.function.parameters["required"],
            serde_json::json!(["command"])
        );
    }
}
