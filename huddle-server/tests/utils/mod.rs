#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use huddle_server::{RoomManager, ServerConfig, router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::Level;

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Bind the relay on an ephemeral port and serve it in the background.
pub async fn spawn_relay(config: ServerConfig) -> (SocketAddr, RoomManager) {
    let rooms = RoomManager::new(&config);
    let app = router(rooms.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, rooms)
}

pub async fn ws_join(addr: SocketAddr, room: &str) -> WsClient {
    let (ws, _response) = connect_async(format!("ws://{addr}/ws/{room}"))
        .await
        .expect("websocket connect failed");
    ws
}

pub async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("websocket send failed");
}

/// Next Text frame within `timeout_ms`, skipping control frames.
pub async fn recv_text(ws: &mut WsClient, timeout_ms: u64) -> Option<String> {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    loop {
        let frame = tokio::time::timeout_at(deadline, ws.next()).await.ok()??;
        match frame {
            Ok(Message::Text(text)) => return Some(text.to_string()),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

/// Poll until `rooms` reports `expected` live rooms or the timeout hits.
pub async fn wait_for_room_count(rooms: &RoomManager, expected: usize, timeout_ms: u64) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

    while tokio::time::Instant::now() < deadline {
        if rooms.room_count() == expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    rooms.room_count() == expected
}
