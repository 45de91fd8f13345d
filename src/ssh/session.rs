//! russh-based session handling.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{Handle, Handler};
use russh::ChannelMsg;
use russh_keys::key::PublicKey;
use tracing::{debug, trace};

use super::{NodeSshConnection, SshAuth, SshError, SshExecutor, SshResult};

/// Shell script that installs a public key read from stdin. Running it
/// twice with the same key leaves `authorized_keys` unchanged.
const INSTALL_KEY_SCRIPT: &str = r#"set -e
umask 077
mkdir -p "$HOME/.ssh"
chmod 700 "$HOME/.ssh"
key="$(cat)"
touch "$HOME/.ssh/authorized_keys"
chmod 600 "$HOME/.ssh/authorized_keys"
grep -qxF "$key" "$HOME/.ssh/authorized_keys" || printf '%s\n' "$key" >> "$HOME/.ssh/authorized_keys"
"#;

/// Command used by [`SshExecutor::ping`] to prove the session works.
const PING_COMMAND: &str = "true";

/// [`SshExecutor`] backed by russh.
///
/// Sessions are opened per operation and closed afterwards; the
/// provisioning workload is far too infrequent to justify pooling.
pub struct RusshExecutor {
    timeout: Duration,
}

impl RusshExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn connect(&self, conn: &NodeSshConnection) -> SshResult<Handle<AcceptingHandler>> {
        let mut config = russh::client::Config::default();
        config.inactivity_timeout = Some(self.timeout);
        let config = Arc::new(config);

        let addr = conn.address();
        let socket = tokio::time::timeout(self.timeout, tokio::net::TcpStream::connect(&addr))
            .await
            .map_err(|_| SshError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| {
                SshError::ConnectionFailed(format!("Failed to connect to {}: {}", addr, e))
            })?;

        socket.set_nodelay(true).map_err(|e| {
            SshError::ConnectionFailed(format!("Failed to set TCP_NODELAY: {}", e))
        })?;

        let mut session = russh::client::connect_stream(config, socket, AcceptingHandler)
            .await
            .map_err(|e| SshError::ConnectionFailed(format!("SSH handshake failed: {}", e)))?;

        Self::authenticate(&mut session, conn).await?;

        debug!(host = %conn.host, port = conn.port, user = %conn.user, "SSH session established");
        Ok(session)
    }

    async fn authenticate(
        session: &mut Handle<AcceptingHandler>,
        conn: &NodeSshConnection,
    ) -> SshResult<()> {
        let authenticated = match &conn.auth {
            SshAuth::Password(password) => session
                .authenticate_password(&conn.user, password)
                .await
                .map_err(|e| {
                    SshError::AuthenticationFailed(format!(
                        "Password authentication failed: {}",
                        e
                    ))
                })?,
            SshAuth::PrivateKey(pem) => {
                let pem_str = std::str::from_utf8(pem).map_err(|_| {
                    SshError::InvalidKey("private key is not valid UTF-8".to_string())
                })?;
                let key_pair = russh_keys::decode_secret_key(pem_str, None)
                    .map_err(|e| SshError::InvalidKey(format!("Failed to parse private key: {}", e)))?;
                session
                    .authenticate_publickey(&conn.user, Arc::new(key_pair))
                    .await
                    .map_err(|e| {
                        SshError::AuthenticationFailed(format!("Key authentication failed: {}", e))
                    })?
            }
        };

        if authenticated {
            Ok(())
        } else {
            Err(SshError::AuthenticationFailed(format!(
                "Credentials rejected for user '{}'",
                conn.user
            )))
        }
    }

    /// Run `command`, feeding `stdin` into it, and collect the combined
    /// output and exit status.
    async fn exec_with_stdin(
        handle: &Handle<AcceptingHandler>,
        command: &str,
        stdin: Option<&[u8]>,
    ) -> SshResult<(u32, String)> {
        let mut channel = handle
            .channel_open_session()
            .await
            .map_err(|e| SshError::ExecutionFailed(format!("Failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| SshError::ExecutionFailed(format!("Failed to execute command: {}", e)))?;

        if let Some(data) = stdin {
            let mut cursor = tokio::io::BufReader::new(data);
            channel
                .data(&mut cursor)
                .await
                .map_err(|e| SshError::ExecutionFailed(format!("Failed to write stdin: {}", e)))?;
        }
        channel
            .eof()
            .await
            .map_err(|e| SshError::ExecutionFailed(format!("Failed to send EOF: {}", e)))?;

        let mut output = Vec::new();
        let mut exit_status = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => {
                    output.extend_from_slice(data);
                }
                ChannelMsg::ExtendedData { ref data, ext } => {
                    // Extended data type 1 is stderr
                    if ext == 1 {
                        output.extend_from_slice(data);
                    }
                }
                ChannelMsg::ExitStatus { exit_status: status } => {
                    exit_status = Some(status);
                }
                ChannelMsg::Eof => {
                    // Keep reading until the channel closes
                }
                ChannelMsg::Close => {
                    break;
                }
                _ => {}
            }
        }

        let status = exit_status.ok_or_else(|| {
            SshError::ExecutionFailed("Channel closed without exit status".to_string())
        })?;
        let output = String::from_utf8_lossy(&output).trim().to_string();
        trace!(status = status, "Remote command completed");
        Ok((status, output))
    }

    /// Run a one-off command over a fresh session, returning its exit
    /// status and combined output.
    pub async fn run(&self, conn: &NodeSshConnection, command: &str) -> SshResult<(u32, String)> {
        let handle = self.connect(conn).await?;
        let result = Self::exec_with_stdin(&handle, command, None).await;
        Self::close(handle).await;
        result
    }

    async fn close(handle: Handle<AcceptingHandler>) {
        let _ = handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await;
    }
}

#[async_trait]
impl SshExecutor for RusshExecutor {
    async fn inject_public_key(&self, conn: &NodeSshConnection, public_key: &str) -> SshResult<()> {
        let handle = self.connect(conn).await?;
        // The script reads the key from stdin; a trailing newline
        // terminates the `cat`.
        let key_line = format!("{}\n", public_key.trim());
        let result =
            Self::exec_with_stdin(&handle, INSTALL_KEY_SCRIPT, Some(key_line.as_bytes())).await;
        Self::close(handle).await;

        let (status, output) = result?;
        if status != 0 {
            return Err(SshError::ScriptFailed { status, output });
        }
        debug!(host = %conn.host, user = %conn.user, "Installed public key");
        Ok(())
    }

    async fn ping(&self, conn: &NodeSshConnection) -> SshResult<()> {
        let (status, output) = self.run(conn, PING_COMMAND).await?;
        if status != 0 {
            return Err(SshError::ScriptFailed { status, output });
        }
        Ok(())
    }
}

/// Client handler that accepts any host key.
///
/// Nodes are registered by operators and frequently reinstalled, so
/// host key pinning is out of scope for now.
struct AcceptingHandler;

#[async_trait]
impl Handler for AcceptingHandler {
    type Error = SshError;

    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_script_is_idempotent_by_construction() {
        // The guard must check for the exact line before appending.
        assert!(INSTALL_KEY_SCRIPT.contains("grep -qxF"));
        assert!(INSTALL_KEY_SCRIPT.contains(r#"key="$(cat)""#));
        assert!(INSTALL_KEY_SCRIPT.contains("chmod 700"));
        assert!(INSTALL_KEY_SCRIPT.contains("chmod 600"));
        assert!(INSTALL_KEY_SCRIPT.starts_with("set -e"));
    }
}
