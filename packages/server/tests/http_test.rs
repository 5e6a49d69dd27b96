//! Integration tests for the HTTP API.

mod common;

use classchat_server::{
    domain::RoomKey,
    infrastructure::dto::{
        http::{DirectInboxDto, HistoryMessageDto, MessageHistoryDto, RoomSummaryDto},
        websocket::OutboundEvent,
    },
};
use common::{ALICE, BOB, MALLORY, TEACHER, TestClient, TestServer, token_for, user};
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックは 200 と status=ok を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = reqwest::get(server.http_url("/api/health")).await.unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_rooms_lists_live_rooms() {
    // テスト項目: 参加者のいるルームと人数が一覧で返る
    // given (前提条件):
    let server = TestServer::start().await;
    let empty: Vec<RoomSummaryDto> = reqwest::get(server.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let _alice = TestClient::connect(&server.material_url(ALICE)).await.unwrap();
    let _bob = TestClient::connect(&server.material_url(BOB)).await.unwrap();
    server.wait_for_members(&server.material_room(), 2).await;

    // when (操作):
    let rooms: Vec<RoomSummaryDto> = reqwest::get(server.http_url("/api/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert!(empty.is_empty());
    assert_eq!(
        rooms,
        vec![RoomSummaryDto {
            room: server.material_room().to_string(),
            members: 2,
        }]
    );
}

#[tokio::test]
async fn test_material_history_returns_recent_messages() {
    // テスト項目: 教材チャットの履歴が古い順で返り、limit で件数を絞れる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server.material_url(ALICE)).await.unwrap();
    server.wait_for_members(&server.material_room(), 1).await;
    for body in ["first", "second", "third"] {
        alice.send_json(json!({"message": body})).await;
        let _ = alice.recv_event().await;
    }
    let url = server.http_url(&format!(
        "/api/chat/material/{}/messages",
        server.material
    ));
    let client = reqwest::Client::new();

    // when (操作):
    let all: MessageHistoryDto = client
        .get(&url)
        .query(&[("token", token_for(BOB))])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let latest: MessageHistoryDto = client
        .get(&url)
        .bearer_auth(token_for(BOB))
        .query(&[("limit", "2")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(all.room, server.material_room().to_string());
    let bodies: Vec<_> = all.messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);
    assert_eq!(all.messages[0].sender, "alice");
    let bodies: Vec<_> = latest.messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(bodies, vec!["second", "third"]);
}

#[tokio::test]
async fn test_material_history_checks_access() {
    // テスト項目: 履歴の取得にも接続時と同じ認証・認可が適用される
    // given (前提条件):
    let server = TestServer::start().await;
    let url = server.http_url(&format!(
        "/api/chat/material/{}/messages",
        server.material
    ));
    let client = reqwest::Client::new();

    // when (操作):
    let anonymous = client.get(&url).send().await.unwrap();
    let outsider = client
        .get(&url)
        .bearer_auth(token_for(MALLORY))
        .send()
        .await
        .unwrap();
    let bad_id = client
        .get(server.http_url("/api/chat/material/nope/messages"))
        .bearer_auth(token_for(ALICE))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(anonymous.status(), 401);
    assert_eq!(outsider.status(), 403);
    assert_eq!(bad_id.status(), 404);
}

#[tokio::test]
async fn test_direct_history_is_shared_by_both_users() {
    // テスト項目: ダイレクトチャットの履歴はどちらの側から取得しても同じ内容になる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server.direct_url(ALICE, BOB)).await.unwrap();
    server
        .wait_for_members(&RoomKey::direct(user(ALICE), user(BOB)), 1)
        .await;
    alice.send_json(json!({"message": "secret"})).await;
    let _ = alice.recv_event().await;
    let client = reqwest::Client::new();

    // when (操作):
    let from_bob: MessageHistoryDto = client
        .get(server.http_url(&format!("/api/chat/direct/{}/messages", ALICE)))
        .bearer_auth(token_for(BOB))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let from_mallory = client
        .get(server.http_url(&format!("/api/chat/direct/{}/messages", ALICE)))
        .bearer_auth(token_for(MALLORY))
        .send()
        .await
        .unwrap()
        .json::<MessageHistoryDto>()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(from_bob.room, format!("direct_{}_{}", ALICE, BOB));
    assert_eq!(from_bob.messages.len(), 1);
    assert_eq!(from_bob.messages[0].message, "secret");
    assert_eq!(from_bob.messages[0].recipient_id, Some(BOB));
    assert!(from_mallory.messages.is_empty());
}

#[tokio::test]
async fn test_direct_inbox_spans_every_peer() {
    // テスト項目: 受信箱には自分が送受信した全ての相手とのメッセージが古い順で含まれる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut bob = TestClient::connect(&server.direct_url(BOB, ALICE)).await.unwrap();
    let mut teacher = TestClient::connect(&server.direct_url(TEACHER, ALICE))
        .await
        .unwrap();
    let mut mallory = TestClient::connect(&server.direct_url(MALLORY, BOB)).await.unwrap();
    server
        .wait_for_members(&RoomKey::direct(user(BOB), user(ALICE)), 1)
        .await;
    server
        .wait_for_members(&RoomKey::direct(user(TEACHER), user(ALICE)), 1)
        .await;
    server
        .wait_for_members(&RoomKey::direct(user(MALLORY), user(BOB)), 1)
        .await;
    bob.send_json(json!({"message": "from bob"})).await;
    let _ = bob.recv_event().await;
    teacher.send_json(json!({"message": "from teacher"})).await;
    let _ = teacher.recv_event().await;
    mallory.send_json(json!({"message": "not for alice"})).await;
    let _ = mallory.recv_event().await;
    let client = reqwest::Client::new();

    // when (操作):
    let inbox: DirectInboxDto = client
        .get(server.http_url("/api/chat/direct/messages"))
        .bearer_auth(token_for(ALICE))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let anonymous = client
        .get(server.http_url("/api/chat/direct/messages"))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(inbox.user_id, ALICE);
    let bodies: Vec<_> = inbox.messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(bodies, vec!["from bob", "from teacher"]);
    assert!(inbox.messages.iter().all(|m| m.recipient_id == Some(ALICE)));
    assert_eq!(anonymous.status(), 401);
}

#[tokio::test]
async fn test_post_message_is_stored_and_broadcast() {
    // テスト項目: HTTP で投稿したメッセージは送信者を呼び出し元として保存され、接続中の参加者に配信される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut bob = TestClient::connect(&server.material_url(BOB)).await.unwrap();
    server.wait_for_members(&server.material_room(), 1).await;
    let url = server.http_url(&format!(
        "/api/chat/material/{}/messages",
        server.material
    ));
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .post(&url)
        .bearer_auth(token_for(TEACHER))
        .json(&json!({"message": "quiz on friday"}))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), 201);
    let created: HistoryMessageDto = response.json().await.unwrap();
    assert_eq!(created.sender_id, TEACHER);
    assert_eq!(created.message, "quiz on friday");
    match bob.recv_event().await {
        OutboundEvent::Message(payload) => {
            assert_eq!(payload.message_id, created.message_id);
            assert_eq!(payload.sender_id, TEACHER);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    let history: MessageHistoryDto = client
        .get(&url)
        .bearer_auth(token_for(BOB))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.messages, vec![created]);
}

#[tokio::test]
async fn test_post_message_rejections() {
    // テスト項目: 空の本文は 400、参加者でないユーザーは 403、トークンなしは 401 になり、何も保存されない
    // given (前提条件):
    let server = TestServer::start().await;
    let url = server.http_url(&format!(
        "/api/chat/material/{}/messages",
        server.material
    ));
    let client = reqwest::Client::new();

    // when (操作):
    let empty = client
        .post(&url)
        .bearer_auth(token_for(ALICE))
        .json(&json!({"message": "   "}))
        .send()
        .await
        .unwrap();
    let outsider = client
        .post(&url)
        .bearer_auth(token_for(MALLORY))
        .json(&json!({"message": "hello?"}))
        .send()
        .await
        .unwrap();
    let anonymous = client
        .post(&url)
        .json(&json!({"message": "hello?"}))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(empty.status(), 400);
    assert_eq!(outsider.status(), 403);
    assert_eq!(anonymous.status(), 401);
    let history: MessageHistoryDto = client
        .get(&url)
        .bearer_auth(token_for(ALICE))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history.messages.is_empty());
}
