//! Real SSH integration tests.
//!
//! These tests require an actual SSH target with password login
//! enabled for the test account. They validate the end-to-end key
//! lifecycle against a live sshd:
//! - Public key installation via password auth
//! - Key-based login with the generated private key
//! - Idempotent re-installation of the same key
//! - Distinct keys occupying distinct `authorized_keys` lines
//!
//! Run with:
//! ```bash
//! export NODEWARDEN_TEST_SSH_ENABLED=1
//! export NODEWARDEN_TEST_SSH_HOST=192.168.178.141
//! export NODEWARDEN_TEST_SSH_USER=testuser
//! export NODEWARDEN_TEST_SSH_PASSWORD=testpass
//! cargo test --test real_ssh_tests -- --test-threads=1
//! ```

use std::env;
use std::time::Duration;

use nodewarden::keygen::Keygen;
use nodewarden::ssh::{NodeSshConnection, RusshExecutor, SshAuth, SshExecutor};

// 2048-bit keys keep the live roundtrips quick without tripping
// sshd minimum-size policies.
const TEST_BITS: usize = 2048;

/// Configuration for real SSH tests
struct SshTestConfig {
    enabled: bool,
    host: String,
    port: u16,
    user: String,
    password: String,
}

impl SshTestConfig {
    fn from_env() -> Self {
        let enabled = env::var("NODEWARDEN_TEST_SSH_ENABLED")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let host =
            env::var("NODEWARDEN_TEST_SSH_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("NODEWARDEN_TEST_SSH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(22);

        let user =
            env::var("NODEWARDEN_TEST_SSH_USER").unwrap_or_else(|_| "testuser".to_string());

        let password =
            env::var("NODEWARDEN_TEST_SSH_PASSWORD").unwrap_or_else(|_| "testpass".to_string());

        Self {
            enabled,
            host,
            port,
            user,
            password,
        }
    }

    fn skip_if_disabled(&self) -> bool {
        if !self.enabled {
            eprintln!("Skipping real SSH tests (NODEWARDEN_TEST_SSH_ENABLED not set)");
            true
        } else {
            false
        }
    }

    fn password_target(&self) -> NodeSshConnection {
        NodeSshConnection::new(
            self.host.clone(),
            self.port,
            self.user.clone(),
            SshAuth::Password(self.password.clone()),
        )
    }

    fn key_target(&self, private_pem: Vec<u8>) -> NodeSshConnection {
        NodeSshConnection::new(
            self.host.clone(),
            self.port,
            self.user.clone(),
            SshAuth::PrivateKey(private_pem),
        )
    }
}

fn executor() -> RusshExecutor {
    RusshExecutor::new(Duration::from_secs(30))
}

/// How many `authorized_keys` lines match `key_line` exactly.
async fn count_key_lines(
    executor: &RusshExecutor,
    conn: &NodeSshConnection,
    key_line: &str,
) -> u32 {
    let command = format!(
        "grep -cxF '{}' \"$HOME/.ssh/authorized_keys\" || true",
        key_line
    );
    let (status, output) = executor
        .run(conn, &command)
        .await
        .expect("Failed to count authorized_keys lines");
    assert_eq!(status, 0, "grep wrapper should not fail: {}", output);
    output.trim().parse().expect("grep -c output should be a number")
}

// =============================================================================
// Key lifecycle tests
// =============================================================================

#[tokio::test]
async fn test_forward_then_key_auth_ping() {
    let config = SshTestConfig::from_env();
    if config.skip_if_disabled() {
        return;
    }

    let executor = executor();
    let pair = Keygen::new(TEST_BITS, "", "")
        .generate_pair()
        .expect("Failed to generate key pair");

    executor
        .inject_public_key(&config.password_target(), pair.public_key())
        .await
        .expect("Failed to install public key via password auth");

    // The freshly installed key must now carry a full session.
    executor
        .ping(&config.key_target(pair.private_pem().to_vec()))
        .await
        .expect("Key-based ping failed after key installation");
}

#[tokio::test]
async fn test_reinstalling_same_key_keeps_one_line() {
    let config = SshTestConfig::from_env();
    if config.skip_if_disabled() {
        return;
    }

    let executor = executor();
    let pair = Keygen::new(TEST_BITS, "", "")
        .generate_pair()
        .expect("Failed to generate key pair");
    let target = config.password_target();

    executor
        .inject_public_key(&target, pair.public_key())
        .await
        .expect("First installation failed");
    assert_eq!(count_key_lines(&executor, &target, pair.public_key()).await, 1);

    executor
        .inject_public_key(&target, pair.public_key())
        .await
        .expect("Second installation failed");
    assert_eq!(
        count_key_lines(&executor, &target, pair.public_key()).await,
        1,
        "Reinstalling the same key must not add a line"
    );
}

#[tokio::test]
async fn test_distinct_keys_occupy_distinct_lines() {
    let config = SshTestConfig::from_env();
    if config.skip_if_disabled() {
        return;
    }

    let executor = executor();
    let keygen = Keygen::new(TEST_BITS, "", "");
    let first = keygen.generate_pair().expect("Failed to generate key pair");
    let second = keygen.generate_pair().expect("Failed to generate key pair");
    let target = config.password_target();

    executor
        .inject_public_key(&target, first.public_key())
        .await
        .expect("First key installation failed");
    executor
        .inject_public_key(&target, second.public_key())
        .await
        .expect("Second key installation failed");

    assert_eq!(count_key_lines(&executor, &target, first.public_key()).await, 1);
    assert_eq!(count_key_lines(&executor, &target, second.public_key()).await, 1);

    // Both keys authenticate independently.
    executor
        .ping(&config.key_target(first.private_pem().to_vec()))
        .await
        .expect("First key failed to authenticate");
    executor
        .ping(&config.key_target(second.private_pem().to_vec()))
        .await
        .expect("Second key failed to authenticate");
}
