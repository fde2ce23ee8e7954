// tests/integration/lifecycle_test.rs

//! Integration tests for startup, capacity limits and graceful shutdown.

use super::test_helpers::{TestServer, test_config};
use spinelchat::ChatServer;
use spinelchat::config::Config;
use spinelchat::core::ChatError;
use spinelchat::core::broadcast::SHUTDOWN_NOTICE;
use tokio::net::TcpStream;

#[tokio::test]
async fn test_bind_conflict_is_a_bind_error() {
    let server = TestServer::start().await;
    let config = Config {
        port: server.addr.port(),
        ..test_config()
    };

    let err = ChatServer::bind(config).await.err().unwrap();
    assert!(matches!(
        err.downcast_ref::<ChatError>(),
        Some(ChatError::Bind { .. })
    ));

    server.stop().await;
}

#[tokio::test]
async fn test_max_clients_rejects_extra_connection() {
    let config = Config {
        max_clients: 1,
        ..test_config()
    };
    let server = TestServer::with_config(config).await;
    let mut first = server.join().await;

    let mut second = server.connect_raw().await;
    let reply = second.expect_closed().await;
    assert_eq!(reply, "ERR max number of clients reached");

    first.expect_not("has joined").await;
    server.stop().await;
}

#[tokio::test]
async fn test_slot_is_freed_after_disconnect() {
    let config = Config {
        max_clients: 1,
        ..test_config()
    };
    let server = TestServer::with_config(config).await;
    let first = server.join().await;
    drop(first);

    let mut retry = None;
    for _ in 0..20 {
        let mut candidate = server.connect_raw().await;
        candidate.send("/list_clients").await;
        let text = candidate.expect_any().await;
        if !text.is_empty() && !text.starts_with("ERR") {
            retry = Some(candidate);
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert!(retry.is_some(), "Slot was never released");

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_notifies_clients_then_closes() {
    let server = TestServer::start().await;
    let mut a = server.join().await;
    let mut b = server.join().await;
    let addr = server.addr;

    server.stop().await;

    for client in [&mut a, &mut b] {
        let text = client.expect_closed().await;
        assert_eq!(text.matches(SHUTDOWN_NOTICE).count(), 1);
        assert!(text.ends_with(SHUTDOWN_NOTICE));
    }
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_shutdown_with_no_clients() {
    let server = TestServer::start().await;
    server.stop().await;
}
