//! Integration tests for the WebSocket connection manager and live feed.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::ws::Message;

use envmon_dashboard::ws::{start_heartbeat, WsManager, HEARTBEAT_INTERVAL};

// ---------------------------------------------------------------------------
// Test: connection bookkeeping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_connections() {
    let manager = WsManager::new();
    let _rx_a = manager.add("a".to_string()).await;
    let _rx_b = manager.add("b".to_string()).await;

    assert_eq!(manager.connection_count().await, 2);

    manager.remove("a").await;
    assert_eq!(manager.connection_count().await, 1);
}

#[tokio::test]
async fn ping_all_reaches_every_client() {
    let manager = WsManager::new();
    let mut rx = manager.add("a".to_string()).await;

    manager.ping_all().await;

    assert_matches!(rx.recv().await, Some(Message::Ping(_)));
}

#[tokio::test(start_paused = true)]
async fn heartbeat_skips_missed_ticks_after_a_stall() {
    let manager = Arc::new(WsManager::new());
    let mut rx = manager.add("a".to_string()).await;
    let heartbeat = start_heartbeat(Arc::clone(&manager));

    settle().await;
    // Three periods pass without the heartbeat task running.
    tokio::time::advance(HEARTBEAT_INTERVAL * 3 + Duration::from_secs(5)).await;
    settle().await;
    heartbeat.abort();

    let mut pings = 0;
    while let Ok(message) = rx.try_recv() {
        assert_matches!(message, Message::Ping(_));
        pings += 1;
    }
    // The immediate first tick plus a single catch-up.
    assert_eq!(pings, 2);
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();
    let mut rx = manager.add("a".to_string()).await;

    manager.shutdown_all().await;

    assert_matches!(rx.recv().await, Some(Message::Close(None)));
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: refresher pushes each cycle to connected clients
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_broadcasts_cycle_frame() {
    let mut test = common::build_test_app();
    let mut rx = test.ws_manager.add("browser".to_string()).await;

    test.inbound.send(common::stuffy_sample()).await.unwrap();
    test.refresher.refresh().await;

    let text = match rx.recv().await {
        Some(Message::Text(text)) => text,
        other => panic!("expected a text frame, got {other:?}"),
    };
    let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();

    assert_eq!(json["type"], "cycle");
    assert_eq!(json["reading"]["smoke"], 42);
    assert_eq!(json["warnings"]["trigger"]["channel"], "gas");
    assert_eq!(json["air_quality_band"], "fair");
    assert_eq!(json["series"].as_array().unwrap().len(), 1);
}
