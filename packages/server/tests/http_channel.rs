//! End-to-end tests over HTTP and WebSocket against a server on an ephemeral
//! port.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use antenna_server::{
    config::ServerConfig,
    game::CardCatalog,
    ui::{AppState, build_router},
};
use antenna_shared::time::SystemClock;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message},
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server(debug: bool) -> SocketAddr {
    let config = ServerConfig {
        debug,
        ..ServerConfig::default()
    };
    let state = AppState::in_memory_seeded(
        &config,
        CardCatalog::builtin().unwrap(),
        Arc::new(SystemClock),
        Some(3),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(Arc::new(state)))
            .await
            .unwrap();
    });
    addr
}

async fn sign_up(http: &reqwest::Client, addr: SocketAddr, nickname: &str) -> (i64, String) {
    let body: Value = http
        .post(format!("http://{addr}/sign-up"))
        .json(&json!({"nickname": nickname, "password": format!("{nickname}-secret")}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    (
        body["user"]["id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_accounts_profiles_and_rooms_over_http() {
    // テスト項目: サインアップ、プロフィール、ルームの HTTP API が期待どおりのステータスを返す
    // given (前提条件):
    let addr = spawn_server(false).await;
    let http = reqwest::Client::new();
    let (alice_id, alice) = sign_up(&http, addr, "alice").await;
    let (_, bob) = sign_up(&http, addr, "bob").await;

    // when (操作) / then (期待する結果): ヘルスチェックと認証
    let health: Value = http
        .get(format!("http://{addr}/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, json!({"status": "ok"}));
    let me: Value = http
        .get(format!("http://{addr}/me"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me, json!({"id": alice_id, "nickname": "alice"}));
    let anonymous = http.get(format!("http://{addr}/me")).send().await.unwrap();
    assert_eq!(anonymous.status(), 401);
    let by_cookie = http
        .get(format!("http://{addr}/me"))
        .header("Cookie", format!("auth={bob}"))
        .send()
        .await
        .unwrap();
    assert_eq!(by_cookie.status(), 200);

    // プロフィール
    let profile: Value = http
        .post(format!("http://{addr}/profile/create"))
        .bearer_auth(&alice)
        .json(&json!({"details": {"name": "Mira"}, "stats": "50,50,40,60,30,70,20,80", "traits": ["calm"]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(profile["stats"], json!([50, 50, 40, 60, 30, 70, 20, 80]));
    assert_eq!(profile["creator"]["nickname"], "alice");
    let profile_id = profile["id"].as_i64().unwrap();

    let bad_stats = http
        .post(format!("http://{addr}/profile/create"))
        .bearer_auth(&alice)
        .json(&json!({"stats": [1, 2, 3]}))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_stats.status(), 400);

    let foreign_update = http
        .post(format!("http://{addr}/profile/{profile_id}/update"))
        .bearer_auth(&bob)
        .json(&json!({"traits": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(foreign_update.status(), 403);

    let mine: Value = http
        .get(format!("http://{addr}/profile/my"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);

    // ルーム
    let room: Value = http
        .post(format!("http://{addr}/room/create"))
        .bearer_auth(&alice)
        .json(&json!({"title": "Lighthouse", "tags": ["drama"]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(room["title"], "Lighthouse");
    let room_id = room["id"].as_i64().unwrap();

    let fetched: Value = http
        .get(format!("http://{addr}/room/{room_id}"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, room);

    let missing = http
        .get(format!("http://{addr}/room/999"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);

    let foreign_room_update = http
        .post(format!("http://{addr}/room/{room_id}/update"))
        .bearer_auth(&bob)
        .json(&json!({"title": "Mine now"}))
        .send()
        .await
        .unwrap();
    assert_eq!(foreign_room_update.status(), 403);
}

#[tokio::test]
async fn test_log_in_with_password_sets_auth_cookie() {
    // テスト項目: 正しいパスワードでログインすると新しいトークンが本文と auth クッキーで返され、誤ったパスワードは 401 になる
    // given (前提条件):
    let addr = spawn_server(false).await;
    let http = reqwest::Client::new();
    let (alice_id, _) = sign_up(&http, addr, "alice").await;

    // when (操作):
    let logged_in = http
        .post(format!("http://{addr}/log-in"))
        .json(&json!({"id": alice_id, "password": "alice-secret"}))
        .send()
        .await
        .unwrap();
    let wrong = http
        .post(format!("http://{addr}/log-in"))
        .json(&json!({"id": alice_id, "password": "bob-secret"}))
        .send()
        .await
        .unwrap();
    let unknown = http
        .post(format!("http://{addr}/log-in"))
        .json(&json!({"id": alice_id + 100, "password": "alice-secret"}))
        .send()
        .await
        .unwrap();
    let empty = http
        .post(format!("http://{addr}/log-in"))
        .json(&json!({"id": alice_id, "password": ""}))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(logged_in.status(), 200);
    let cookie = logged_in
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body: Value = logged_in.json().await.unwrap();
    let token = body["token"].as_str().unwrap();
    assert_eq!(body["user"], json!({"id": alice_id, "nickname": "alice"}));
    assert!(cookie.starts_with(&format!("auth={token};")));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Max-Age=604800"));
    let cookie_pair = cookie.split(';').next().unwrap().to_string();
    let me = http
        .get(format!("http://{addr}/me"))
        .header("Cookie", cookie_pair)
        .send()
        .await
        .unwrap();
    assert_eq!(me.status(), 200);
    assert_eq!(wrong.status(), 401);
    assert_eq!(unknown.status(), 401);
    assert_eq!(empty.status(), 400);
}

#[tokio::test]
async fn test_channel_seat_and_invalid_frames() {
    // テスト項目: WebSocket で着席でき、JSON でないフレームは無視され、未知のメッセージにはエラーが返る
    // given (前提条件):
    let addr = spawn_server(false).await;
    let http = reqwest::Client::new();
    let (_, alice) = sign_up(&http, addr, "alice").await;
    let profile: Value = http
        .post(format!("http://{addr}/profile/create"))
        .bearer_auth(&alice)
        .json(&json!({"stats": [50, 50, 50, 50, 50, 50, 50, 50]}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room: Value = http
        .post(format!("http://{addr}/room/create"))
        .bearer_auth(&alice)
        .json(&json!({"title": "Harbor"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let url = format!(
        "ws://{addr}/room/{}/channel?token={alice}",
        room["id"].as_i64().unwrap()
    );

    // when (操作):
    let (mut socket, _) = connect_async(url.as_str()).await.unwrap();
    let state = next_json(&mut socket).await;
    let log = next_json(&mut socket).await;
    socket
        .send(Message::Text("definitely not json".into()))
        .await
        .unwrap();
    send_json(&mut socket, json!({"type": "dance"})).await;
    send_json(&mut socket, json!({"type": "seat", "profile_id": profile["id"]})).await;

    // then (期待する結果):
    assert_eq!(state["type"], "room_state");
    assert_eq!(state["phase"], "assembly");
    assert_eq!(log, json!({"type": "log", "log": []}));
    assert!(
        next_json(&mut socket).await["error"]
            .as_str()
            .unwrap()
            .starts_with("Incorrect message")
    );
    let update = next_json(&mut socket).await;
    assert_eq!(update["type"], "assembly_update");
    assert_eq!(update["players"][0]["id"], profile["id"]);
    let log = next_json(&mut socket).await;
    assert_eq!(log["log"][0]["content"], "Player [alice] took a seat");
}

#[tokio::test]
async fn test_channel_admission() {
    // テスト項目: 存在しないルームと未認証の接続はハンドシェイクで拒否される
    // given (前提条件):
    let addr = spawn_server(true).await;
    let http = reqwest::Client::new();
    let (alice_id, _) = sign_up(&http, addr, "alice").await;

    // when (操作):
    let missing = connect_async(format!("ws://{addr}/room/42/channel?token=!{alice_id}")).await;
    let anonymous = connect_async(format!("ws://{addr}/room/42/channel")).await;

    // then (期待する結果):
    match missing {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 404),
        other => panic!("expected 404, got {:?}", other.map(|_| ())),
    }
    match anonymous {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("expected 401, got {:?}", other.map(|_| ())),
    }
}
