// test-only module included via protocol/mod.rs
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::config::MAX_PAYLOAD_SIZE;
use crate::error::ProtocolError;
use crate::protocol::handshake::*;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn test_handshake_flow() {
    let (mut client, mut server) = duplex(256);

    let server_side = tokio::spawn(async move {
        server_handshake(&mut server, "dec", MAX_PAYLOAD_SIZE, HandshakePolicy::Strict).await
    });

    client_handshake(&mut client, "dec", 4, 6)
        .await
        .expect("Client handshake should succeed");

    let header = server_side
        .await
        .unwrap()
        .expect("Server handshake should succeed");
    assert_eq!(header.tag, "dec");
    assert_eq!(header.text_len, 4);
    assert_eq!(header.key_len, 6);
}

#[tokio::test]
async fn test_client_rejects_wrong_service() {
    let (mut client, mut server) = duplex(256);

    let server_side = tokio::spawn(async move {
        server_handshake(&mut server, "enc", MAX_PAYLOAD_SIZE, HandshakePolicy::Strict).await
    });

    let err = client_handshake(&mut client, "dec", 4, 4).await.unwrap_err();
    match err {
        ProtocolError::HandshakeMismatch { expected, received } => {
            assert_eq!(expected, "dec");
            assert_eq!(received, "enc");
        }
        other => panic!("Expected HandshakeMismatch, got {other:?}"),
    }

    let server_err = server_side.await.unwrap().unwrap_err();
    assert!(matches!(server_err, ProtocolError::HandshakeMismatch { .. }));
}

#[tokio::test]
async fn test_lenient_server_continues_after_mismatch() {
    let (mut client, mut server) = duplex(256);

    let server_side = tokio::spawn(async move {
        server_handshake(&mut server, "dec", MAX_PAYLOAD_SIZE, HandshakePolicy::Lenient).await
    });

    // The client still sees the mismatch and would abort on its own
    let err = client_handshake(&mut client, "enc", 3, 3).await.unwrap_err();
    assert!(matches!(err, ProtocolError::HandshakeMismatch { .. }));

    let header = server_side.await.unwrap().expect("Lenient server keeps going");
    assert_eq!(header.tag, "enc");
    assert_eq!(header.text_len, 3);
}

#[tokio::test]
async fn test_header_arriving_in_pieces() {
    let (mut client, mut server) = duplex(256);

    let server_side = tokio::spawn(async move {
        server_handshake(&mut server, "dec", MAX_PAYLOAD_SIZE, HandshakePolicy::Strict).await
    });

    let mut header = b"dec 10 20".to_vec();
    header.resize(26, 0);
    for chunk in header.chunks(5) {
        client.write_all(chunk).await.unwrap();
        tokio::task::yield_now().await;
    }

    let mut reply = [0u8; 3];
    client.read_exact(&mut reply).await.unwrap();
    assert_eq!(&reply, b"dec");

    let header = server_side.await.unwrap().unwrap();
    assert_eq!((header.text_len, header.key_len), (10, 20));
}

#[tokio::test]
async fn test_server_rejects_oversized_declaration() {
    let (mut client, mut server) = duplex(256);

    let server_side = tokio::spawn(async move {
        server_handshake(&mut server, "dec", MAX_PAYLOAD_SIZE, HandshakePolicy::Strict).await
    });

    let mut header = format!("dec {} {}", MAX_PAYLOAD_SIZE + 1, MAX_PAYLOAD_SIZE + 1).into_bytes();
    header.resize(26, 0);
    client.write_all(&header).await.unwrap();

    let err = server_side.await.unwrap().unwrap_err();
    assert!(matches!(err, ProtocolError::OversizedPayload(100_001)));
}

#[tokio::test]
async fn test_server_respects_configured_limit() {
    let (mut client, mut server) = duplex(256);

    let server_side =
        tokio::spawn(
            async move { server_handshake(&mut server, "dec", 8, HandshakePolicy::Strict).await },
        );

    client_handshake(&mut client, "dec", 9, 9).await.unwrap();

    let err = server_side.await.unwrap().unwrap_err();
    assert!(matches!(err, ProtocolError::OversizedPayload(9)));
}

#[tokio::test]
async fn test_server_sees_truncated_header_as_closed() {
    let (mut client, mut server) = duplex(256);

    client.write_all(b"dec 1").await.unwrap();
    drop(client);

    let err = server_handshake(&mut server, "dec", MAX_PAYLOAD_SIZE, HandshakePolicy::Strict)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn test_client_sees_silent_server_as_closed() {
    let (mut client, mut server) = duplex(256);

    let server_side = tokio::spawn(async move {
        let mut header = [0u8; 26];
        server.read_exact(&mut header).await.unwrap();
        // hang up without replying
    });

    let err = client_handshake(&mut client, "dec", 1, 1).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
    server_side.await.unwrap();
}

#[test]
fn test_policy_parsing() {
    assert_eq!("strict".parse::<HandshakePolicy>().unwrap(), HandshakePolicy::Strict);
    assert_eq!(" Lenient ".parse::<HandshakePolicy>().unwrap(), HandshakePolicy::Lenient);
    assert!("maybe".parse::<HandshakePolicy>().is_err());
    assert_eq!(HandshakePolicy::default(), HandshakePolicy::Strict);
}
