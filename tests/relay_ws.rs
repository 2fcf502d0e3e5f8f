//! End-to-end relay scenarios over real sockets.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use session_relay::app_state::AppState;
use session_relay::domain::{RoomRegistry, SessionId};
use session_relay::persistence::{InMemorySessionLookup, SessionRecord};
use session_relay::service::{AuthorizationGate, RelayService};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FRAME_WAIT: Duration = Duration::from_secs(2);
const QUIET_WAIT: Duration = Duration::from_millis(300);

async fn spawn_relay() -> SocketAddr {
    let lookup = InMemorySessionLookup::new();
    lookup
        .insert(SessionId::from("s1"), SessionRecord::new("t1", "c1"))
        .await;
    let gate = AuthorizationGate::new(Arc::new(lookup), Duration::from_secs(1));
    let state = AppState {
        relay: Arc::new(RelayService::new(Arc::new(RoomRegistry::new()), gate)),
        outbound_buffer_capacity: 32,
    };
    let app = session_relay::build_router(state, "/ws");

    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn connect(addr: SocketAddr) -> Ws {
    let Ok((ws, _)) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await else {
        panic!("websocket connect");
    };
    ws
}

async fn send(ws: &mut Ws, value: Value) {
    let sent = ws.send(Message::text(value.to_string())).await;
    assert!(sent.is_ok(), "send failed: {sent:?}");
}

async fn recv(ws: &mut Ws) -> Value {
    loop {
        let Ok(Some(Ok(frame))) = timeout(FRAME_WAIT, ws.next()).await else {
            panic!("expected a frame");
        };
        if let Message::Text(text) = frame {
            let Ok(value) = serde_json::from_str(text.as_str()) else {
                panic!("relay sent non-JSON text: {text}");
            };
            return value;
        }
    }
}

async fn assert_quiet(ws: &mut Ws) {
    if let Ok(frame) = timeout(QUIET_WAIT, ws.next()).await {
        panic!("expected no frame, got {frame:?}");
    }
}

async fn room(addr: SocketAddr, session: &str) -> (u16, Value) {
    let Ok(response) = reqwest::get(format!("http://{addr}/api/v1/rooms/{session}")).await else {
        panic!("diagnostics request");
    };
    let status = response.status().as_u16();
    let Ok(body) = response.json::<Value>().await else {
        panic!("diagnostics body");
    };
    (status, body)
}

fn join(user: &str, role: &str) -> Value {
    json!({ "type": "join", "sessionId": "s1", "userId": user, "role": role })
}

#[tokio::test]
async fn two_party_session_lifecycle() {
    let addr = spawn_relay().await;
    let mut therapist = connect(addr).await;
    let mut client = connect(addr).await;

    // Therapist joins first and sees its own announcement.
    send(&mut therapist, join("t1", "therapist")).await;
    assert_eq!(
        recv(&mut therapist).await,
        json!({
            "type": "participant_joined",
            "role": "therapist",
            "userId": "t1",
            "participants": { "therapist": true, "client": false }
        })
    );

    // Client joins; both occupants learn the room is full.
    send(&mut client, join("c1", "client")).await;
    let full = json!({
        "type": "participant_joined",
        "role": "client",
        "userId": "c1",
        "participants": { "therapist": true, "client": true }
    });
    assert_eq!(recv(&mut therapist).await, full);
    assert_eq!(recv(&mut client).await, full);

    // Impersonation attempt is refused and the therapist slot is untouched.
    let mut attacker = connect(addr).await;
    send(&mut attacker, join("x9", "therapist")).await;
    assert_eq!(
        recv(&mut attacker).await,
        json!({
            "type": "error",
            "message": "Unauthorized: You are not a participant in this session"
        })
    );
    let (status, body) = room(addr, "s1").await;
    assert_eq!(status, 200);
    assert_eq!(body.get("therapistId"), Some(&json!("t1")));
    assert_quiet(&mut therapist).await;

    // Payloads reach the peer and are not echoed.
    send(
        &mut client,
        json!({
            "type": "part_update",
            "sessionId": "s1",
            "data": { "id": "p1", "name": "Worrier" }
        }),
    )
    .await;
    assert_eq!(
        recv(&mut therapist).await,
        json!({ "type": "part_updated", "part": { "id": "p1", "name": "Worrier" } })
    );
    assert_quiet(&mut client).await;

    // Therapist drops off the network.
    drop(therapist);
    assert_eq!(
        recv(&mut client).await,
        json!({ "type": "participant_left", "role": "therapist" })
    );
    let (status, body) = room(addr, "s1").await;
    assert_eq!(status, 200);
    assert_eq!(body.get("therapistId"), Some(&Value::Null));
    assert_eq!(body.get("clientId"), Some(&json!("c1")));

    // Client leaves too; the room disappears.
    let closed = client.close(None).await;
    assert!(closed.is_ok());
    let mut removed = false;
    for _ in 0..40 {
        if room(addr, "s1").await.0 == 404 {
            removed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(removed, "room s1 should be removed once both slots are empty");
}

#[tokio::test]
async fn bad_frames_do_not_close_the_connection() {
    let addr = spawn_relay().await;
    let mut therapist = connect(addr).await;

    let garbage = therapist.send(Message::text("{definitely not json")).await;
    assert!(garbage.is_ok());
    send(&mut therapist, json!({ "type": "hologram", "sessionId": "s1" })).await;
    send(&mut therapist, json!({ "type": "join", "sessionId": "s1" })).await;
    assert_quiet(&mut therapist).await;

    send(&mut therapist, join("t1", "therapist")).await;
    let joined = recv(&mut therapist).await;
    assert_eq!(joined.get("type"), Some(&json!("participant_joined")));
}

#[tokio::test]
async fn unknown_session_is_reported_to_requester() {
    let addr = spawn_relay().await;
    let mut ws = connect(addr).await;

    send(
        &mut ws,
        json!({ "type": "join", "sessionId": "nope", "userId": "t1", "role": "therapist" }),
    )
    .await;
    assert_eq!(
        recv(&mut ws).await,
        json!({ "type": "error", "message": "Session not found" })
    );

    let Ok(response) = reqwest::get(format!("http://{addr}/api/v1/rooms")).await else {
        panic!("rooms request");
    };
    let Ok(body) = response.json::<Value>().await else {
        panic!("rooms body");
    };
    assert_eq!(body, json!({ "sessions": [], "count": 0 }));
}
