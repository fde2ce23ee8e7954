// tests/integration/binary_test.rs

//! Runs the `spinelchat` executable in client mode against a test server.

use super::test_helpers::TestServer;
use spinelchat::core::broadcast::JOIN_NOTICE;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};

const EXIT_TIMEOUT: Duration = Duration::from_secs(5);

fn spawn_client(server: &TestServer) -> Child {
    Command::new(env!("CARGO_BIN_EXE_spinelchat"))
        .args(["--client", "--host", "127.0.0.1", "--port"])
        .arg(server.addr.port().to_string())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to start client binary")
}

async fn wait_for_exit(child: &mut Child) -> ExitStatus {
    tokio::time::timeout(EXIT_TIMEOUT, child.wait())
        .await
        .expect("Client process did not exit in time")
        .expect("Failed to wait for client process")
}

async fn read_stdout(child: &mut Child) -> String {
    let mut out = String::new();
    if let Some(mut stdout) = child.stdout.take() {
        stdout.read_to_string(&mut out).await.unwrap();
    }
    out
}

#[tokio::test]
async fn test_client_exits_nonzero_after_server_shutdown_with_stdin_open() {
    let server = TestServer::start().await;
    let mut peer = server.join().await;

    let mut child = spawn_client(&server);
    // Held open for the whole test so the input side never reaches EOF.
    let _stdin = child.stdin.take().expect("stdin is piped");
    peer.expect(JOIN_NOTICE).await;

    server.stop().await;
    let status = wait_for_exit(&mut child).await;

    assert!(!status.success(), "Expected a failure status, got {status:?}");
    let out = read_stdout(&mut child).await;
    assert!(out.starts_with("Connected to the server.\n"));
    assert!(out.ends_with("Server shutdown\n"));
}

#[tokio::test]
async fn test_client_exits_zero_when_stdin_closes() {
    let server = TestServer::start().await;
    let mut peer = server.join().await;

    let mut child = spawn_client(&server);
    let mut stdin = child.stdin.take().expect("stdin is piped");
    peer.expect(JOIN_NOTICE).await;

    stdin.write_all(b"/name Dora\nbye\n").await.unwrap();
    peer.expect("bye").await;
    drop(stdin);

    let status = wait_for_exit(&mut child).await;
    assert!(status.success(), "Expected success, got {status:?}");
    peer.expect("Dora has left the chat.").await;
    assert!(read_stdout(&mut child).await.ends_with("Disconnected by user\n"));

    server.stop().await;
}

#[tokio::test]
async fn test_client_exits_nonzero_when_server_is_unreachable() {
    let server = TestServer::start().await;
    let mut child = spawn_client(&server);
    let _stdin = child.stdin.take();
    server.stop().await;

    // Either the connect is refused or the accepted socket is torn down.
    let status = wait_for_exit(&mut child).await;
    assert!(!status.success());
}
