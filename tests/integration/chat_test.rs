// tests/integration/chat_test.rs

//! End-to-end tests for chat relay, join and leave notices.

use super::test_helpers::{TestClient, TestServer};
use futures::future::join_all;
use spinelchat::core::broadcast::JOIN_NOTICE;

#[tokio::test]
async fn test_hello_rename_and_leave_scenario() {
    let server = TestServer::start().await;
    let mut b = server.join().await;
    let mut a = server.join().await;
    b.expect(JOIN_NOTICE).await;

    a.send("hello").await;
    b.expect("hello").await;
    a.expect("hello").await;

    a.send("/name Bob").await;
    a.expect("Name Bob applied").await;
    b.expect_not("Name Bob applied").await;

    drop(a);
    b.expect("Bob has left the chat.").await;

    server.stop().await;
}

#[tokio::test]
async fn test_joining_client_does_not_receive_own_join_notice() {
    let server = TestServer::start().await;
    let mut a = server.join().await;
    let mut b = server.join().await;

    a.expect(JOIN_NOTICE).await;
    b.expect_not(JOIN_NOTICE).await;

    server.stop().await;
}

#[tokio::test]
async fn test_message_reaches_all_clients_including_sender() {
    let server = TestServer::start().await;
    let mut clients = Vec::new();
    for _ in 0..4 {
        clients.push(server.join().await);
    }

    clients[1].send("fan out \u{1F680}").await;
    for client in &mut clients {
        client.expect("fan out \u{1F680}").await;
    }

    server.stop().await;
}

#[tokio::test]
async fn test_messages_from_one_sender_keep_their_order() {
    let server = TestServer::start().await;
    let mut a = server.join().await;
    let mut b = server.join().await;

    for i in 0..20 {
        a.send(&format!("<{i}>")).await;
        a.expect(&format!("<{i}>")).await;
    }
    let expected: String = (0..20).map(|i| format!("<{i}>")).collect();
    b.expect(&expected).await;

    server.stop().await;
}

#[tokio::test]
async fn test_disconnect_of_one_of_three_sends_exactly_one_leave_notice() {
    let server = TestServer::start().await;
    let mut a = server.join().await;
    let mut b = server.join().await;
    let mut c = server.join().await;

    b.send("/name Bea").await;
    b.expect("Name Bea applied").await;
    drop(b);

    a.expect("Bea has left the chat.").await;
    c.expect("Bea has left the chat.").await;
    a.expect_not("has left the chat.").await;
    c.expect_not("has left the chat.").await;

    a.send("still here").await;
    c.expect("still here").await;

    server.stop().await;
}

#[tokio::test]
async fn test_unnamed_client_leave_notice_is_generic() {
    let server = TestServer::start().await;
    let mut a = server.join().await;
    let b = server.join().await;

    drop(b);
    a.expect("A client has left the chat.").await;

    server.stop().await;
}

#[tokio::test]
async fn test_oversized_message_is_delivered_in_pieces_without_loss() {
    let server = TestServer::start().await;
    let mut a = server.join().await;
    let mut b = server.join().await;

    let long = "x".repeat(300);
    a.send(&long).await;
    b.expect(&long).await;

    server.stop().await;
}

#[tokio::test]
async fn test_abrupt_disconnects_do_not_stop_the_server() {
    let server = TestServer::start().await;
    let mut survivor = server.join().await;

    for _ in 0..5 {
        let flaky = server.join().await;
        drop(flaky);
        survivor.expect("A client has left the chat.").await;
    }

    let mut late = server.join().await;
    late.send("/list_clients").await;
    late.expect("Connected clients:\n").await;
    assert_eq!(late.expect_lines(2).await.len(), 2);

    server.stop().await;
}

/// Returns the roster lines from a fresh `/list_clients` issued by `client`.
async fn roster(client: &mut TestClient, expected: usize) -> Vec<String> {
    client.send("/list_clients").await;
    client.expect("Connected clients:\n").await;
    let lines = client.expect_lines(expected).await;
    client.expect_not("noname ").await;
    lines
}

#[tokio::test]
async fn test_concurrent_connects_keep_roster_equal_to_live_clients() {
    const CLIENTS: usize = 12;
    // Which connections to drop in each round, by index.
    let drop_masks: [&[usize]; 3] = [&[1, 4, 5, 9], &[0, 2, 3, 7, 8, 10, 11], &[6]];

    for dropped in drop_masks {
        let server = TestServer::start().await;
        let raw = join_all((0..CLIENTS).map(|_| server.connect_raw())).await;
        let mut clients = join_all(raw.into_iter().map(|mut client| async move {
            client.send("/list_clients").await;
            client.expect("Connected clients:\n").await;
            client
        }))
        .await;

        let survivor_idx = (0..CLIENTS).find(|i| !dropped.contains(i)).unwrap();
        assert_eq!(roster(&mut clients[survivor_idx], CLIENTS).await.len(), CLIENTS);

        let mut survivors = Vec::new();
        for (i, client) in clients.into_iter().enumerate() {
            if dropped.contains(&i) {
                drop(client);
            } else {
                survivors.push(client);
            }
        }
        for _ in 0..dropped.len() {
            survivors[0].expect("has left the chat.").await;
        }

        let live = CLIENTS - dropped.len();
        let lines = roster(&mut survivors[0], live).await;
        assert_eq!(lines.len(), live);
        for client in &survivors {
            let line = format!("noname {}", client.local_addr());
            assert!(lines.contains(&line), "{line} missing from {lines:?}");
        }

        server.stop().await;
    }
}
