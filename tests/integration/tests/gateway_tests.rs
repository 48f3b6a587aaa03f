//! End-to-end tests against a scripted in-process gateway

use std::time::Duration;

use anyhow::Result;
use integration_tests::MockGateway;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;
use toplist_gateway::{GatewayClient, GatewayConfig, GatewayError, ReconnectPolicy, SessionState};
use toplist_protocol::EntityType;

fn no_reconnect(url: String) -> GatewayConfig {
    GatewayConfig::default()
        .with_url(url)
        .with_reconnect(ReconnectPolicy::disabled())
}

#[tokio::test]
async fn test_connect_handshake() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let url = gateway.url();

    let server = tokio::spawn(async move {
        let mut conn = gateway.accept().await?;
        let token = conn.handshake().await?;
        anyhow::Ok((conn, token))
    });

    let client = GatewayClient::with_config("integration-token", no_reconnect(url));
    client.connect_timeout(Duration::from_secs(5)).await?;
    assert_eq!(client.state(), SessionState::Ready);

    let (_conn, token) = server.await??;
    assert_eq!(token, "integration-token");
    Ok(())
}

#[tokio::test]
async fn test_vote_delivery() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let url = gateway.url();

    let server = tokio::spawn(async move {
        let mut conn = gateway.accept().await?;
        conn.handshake().await?;
        conn.send(json!({
            "op": 5,
            "event": "VOTE",
            "data": {
                "authorID": "99",
                "entityType": "bots",
                "entityID": "7",
                "date": 1_700_000_000_500_i64,
                "totalVotes": 12
            }
        }))
        .await?;
        anyhow::Ok(conn)
    });

    let client = GatewayClient::with_config("t", no_reconnect(url));
    let (vote_tx, mut vote_rx) = mpsc::unbounded_channel();
    client.on_vote(move |vote| {
        let _ = vote_tx.send(vote);
    });

    client.connect_timeout(Duration::from_secs(5)).await?;

    let vote = timeout(Duration::from_secs(5), vote_rx.recv())
        .await?
        .expect("vote delivered");
    assert_eq!(vote.author_id, "99");
    assert_eq!(vote.entity_type, EntityType::Bot);
    assert_eq!(vote.entity_id, "7");
    assert_eq!(vote.total_votes, 12);
    assert_eq!(vote.date.timestamp_millis(), 1_700_000_000_500);

    let _conn = server.await??;
    Ok(())
}

#[tokio::test]
async fn test_rate_delivery() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let url = gateway.url();

    let server = tokio::spawn(async move {
        let mut conn = gateway.accept().await?;
        conn.handshake().await?;
        conn.send(json!({
            "op": 5,
            "event": "RATE",
            "data": {
                "rating": 5,
                "details": "instant responses",
                "authorID": "501",
                "entityType": "servers",
                "entityID": "8",
                "date": 1_700_000_001_000_i64
            }
        }))
        .await?;
        anyhow::Ok(conn)
    });

    let client = GatewayClient::with_config("t", no_reconnect(url));
    let (rate_tx, mut rate_rx) = mpsc::unbounded_channel();
    client.on_rate(move |rate| {
        let _ = rate_tx.send(rate);
    });

    client.connect_timeout(Duration::from_secs(5)).await?;

    let rate = timeout(Duration::from_secs(5), rate_rx.recv())
        .await?
        .expect("rate delivered");
    assert_eq!(rate.rating, 5);
    assert_eq!(rate.details, "instant responses");
    assert_eq!(rate.author_id, "501");

    let _conn = server.await??;
    Ok(())
}

#[tokio::test]
async fn test_server_disconnect_before_ready() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let url = gateway.url();

    let server = tokio::spawn(async move {
        let mut conn = gateway.accept().await?;
        conn.send_hello().await?;
        conn.expect_identify().await?;
        conn.send_disconnect("rate limited").await?;
        anyhow::Ok(conn)
    });

    let client = GatewayClient::with_config("t", no_reconnect(url));
    let err = client
        .connect_timeout(Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Disconnected(_)));
    assert!(err.to_string().contains("rate limited"));

    let _conn = server.await??;
    Ok(())
}

#[tokio::test]
async fn test_connect_timeout_when_gateway_stalls() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let url = gateway.url();

    // Accept the connection but never speak.
    let server = tokio::spawn(async move {
        let conn = gateway.accept().await?;
        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(conn);
        anyhow::Ok(())
    });

    let client = GatewayClient::with_config("t", no_reconnect(url));
    let err = client
        .connect_timeout(Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ConnectTimeout));

    server.await??;
    Ok(())
}

#[tokio::test]
async fn test_reconnect_after_drop() -> Result<()> {
    let gateway = MockGateway::bind().await?;
    let url = gateway.url();

    let server = tokio::spawn(async move {
        // First session: handshake, then drop the connection.
        let mut conn = gateway.accept().await?;
        conn.handshake().await?;
        conn.close().await?;

        // The client comes back and the handshake runs again.
        let mut conn = gateway.accept().await?;
        let token = conn.handshake().await?;
        conn.send(json!({
            "op": 5,
            "event": "VOTE",
            "data": {
                "authorID": "after-reconnect",
                "entityType": "bots",
                "entityID": "7",
                "date": 1_700_000_003_000_i64,
                "totalVotes": 13
            }
        }))
        .await?;
        anyhow::Ok((conn, token))
    });

    let reconnect = ReconnectPolicy::default()
        .with_initial_delay(Duration::from_millis(50))
        .with_max_delay(Duration::from_millis(200));
    let config = GatewayConfig::default().with_url(url).with_reconnect(reconnect);

    let client = GatewayClient::with_config("t", config);
    let (vote_tx, mut vote_rx) = mpsc::unbounded_channel();
    client.on_vote(move |vote| {
        let _ = vote_tx.send(vote);
    });

    client.connect_timeout(Duration::from_secs(5)).await?;

    let vote = timeout(Duration::from_secs(5), vote_rx.recv())
        .await?
        .expect("vote delivered after reconnect");
    assert_eq!(vote.author_id, "after-reconnect");
    assert_eq!(client.state(), SessionState::Ready);

    let (_conn, token) = server.await??;
    assert_eq!(token, "t");
    Ok(())
}
