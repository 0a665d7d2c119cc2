// cobbler-client/tests/realtime.rs
// 推送通道集成测试

use chrono::Utc;
use cobbler_client::models::{LineItem, LineItemStatus};
use cobbler_client::realtime::{ChannelConfig, EventChannel, ReconnectPolicy, apply_change};
use cobbler_client::{ClientConfig, LineItemWatch, disconnect_shared, shared_channel};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

fn picked_up_event(id: &str) -> Value {
    json!({
        "operationType": "update",
        "documentKey": {"_id": id},
        "updateDescription": {
            "updatedFields": {"current_status": "Picked Up", "latest_update": Utc::now().to_rfc3339()},
            "removedFields": []
        }
    })
}

/// Minimal Socket.IO server: handshake, then emit `events` in order
async fn spawn_socket_server(events: Vec<(&'static str, Value)>) -> ClientConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let (mut sink, mut stream) = ws.split();

        let open = r#"0{"sid":"srv-1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
        sink.send(Message::Text(open.to_string().into())).await.unwrap();

        // wait for the socket connect request
        while let Some(Ok(msg)) = stream.next().await {
            if let Message::Text(text) = msg
                && text.as_str() == "40"
            {
                break;
            }
        }
        sink.send(Message::Text(r#"40{"sid":"sock-1"}"#.to_string().into()))
            .await
            .unwrap();

        for (name, payload) in events {
            let frame = format!("42{}", json!([name, payload]));
            sink.send(Message::Text(frame.into())).await.unwrap();
        }

        // keep the socket open until the client leaves
        while let Some(Ok(msg)) = stream.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    let channel = ChannelConfig::default().with_reconnect(ReconnectPolicy::disabled());
    ClientConfig::new(format!("http://{}", addr)).with_channel(channel)
}

#[tokio::test]
async fn test_websocket_picked_up_callback() {
    let config = spawn_socket_server(vec![
        ("appointmentUpdated", json!({"operationType": "insert", "documentKey": {"_id": "ap1"}})),
        ("lineItemUpdated", picked_up_event("li-7")),
    ])
    .await;

    let channel = EventChannel::connect(&config);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _watch = LineItemWatch::new()
        .on_picked_up(move |change| {
            let _ = tx.send(change.document_id().unwrap_or_default().to_string());
        })
        .attach(&channel);

    assert!(channel.wait_connected(WAIT).await);
    let picked = tokio::time::timeout(WAIT, rx.recv()).await.unwrap();
    assert_eq!(picked.as_deref(), Some("li-7"));

    channel.shutdown().await;
    assert!(!channel.is_connected());
}

#[tokio::test]
async fn test_shared_channel_reused_until_disconnect() {
    let config = spawn_socket_server(vec![("lineItemDelta", picked_up_event("li-1"))]).await;

    let first = shared_channel(&config);
    let second = shared_channel(&ClientConfig::new("http://127.0.0.1:9"));
    assert!(Arc::ptr_eq(&first, &second));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _watch = LineItemWatch::new()
        .on_any_change(move |event| {
            let _ = tx.send(event.name.clone());
        })
        .attach(&second);

    assert!(first.wait_connected(WAIT).await);
    let name = tokio::time::timeout(WAIT, rx.recv()).await.unwrap();
    assert_eq!(name.as_deref(), Some("lineItemDelta"));

    assert!(disconnect_shared());
    assert!(!disconnect_shared());
}

#[tokio::test]
async fn test_memory_channel_keeps_rows_in_sync() {
    let (channel, mut listener) = EventChannel::memory(ChannelConfig::default());

    let rows: Vec<LineItem> = serde_json::from_value(json!([
        {"_id": "li-1", "line_item_id": "LI-1", "transaction_id": "TX-1", "branch_id": "B1",
         "current_status": "Ready for Pickup"},
        {"_id": "li-2", "line_item_id": "LI-2", "transaction_id": "TX-1", "branch_id": "B1",
         "current_status": "To Pack"}
    ]))
    .unwrap();
    let rows = Arc::new(Mutex::new(rows));
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();

    let _watch = LineItemWatch::new()
        .on_update({
            let rows = Arc::clone(&rows);
            move |change| {
                let mut rows = rows.lock().unwrap();
                apply_change(&mut *rows, change).unwrap();
                let _ = done_tx.send(());
            }
        })
        .attach(&channel);

    let mut peer = listener.accept().await.unwrap();
    peer.accept_handshake("mem").await.unwrap();

    // duplicate delivery is harmless
    peer.emit("lineItemUpdated", picked_up_event("li-1"));
    peer.emit("lineItemUpdated", picked_up_event("li-1"));
    peer.emit(
        "lineItemDelta",
        json!({"operationType": "delete", "documentKey": {"_id": "li-2"}}),
    );
    for _ in 0..3 {
        tokio::time::timeout(WAIT, done_rx.recv()).await.unwrap();
    }

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].current_status, LineItemStatus::PickedUp);
    assert!(rows[0].latest_update.is_some());
}
