use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use coinop_core::coin::{spawn_coin_sampler, CoinParams};
use coinop_core::{Composer, Input};
use coinop_server::{SafetyNetConfig, Server, ServerConfig};
use coinop_sims::ScriptedDistance;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

type Viewer = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn server_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        static_dir: None,
        ..ServerConfig::default()
    }
}

async fn connect(addr: SocketAddr) -> Viewer {
    let url = format!("ws://127.0.0.1:{}/ws", addr.port());
    let (viewer, _) = connect_async(url).await.unwrap();
    viewer
}

async fn next_state(viewer: &mut Viewer) -> Value {
    loop {
        let message = timeout(Duration::from_secs(2), viewer.next())
            .await
            .expect("no state within 2s")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

//the safety net may repeat a state the edge relay already sent
async fn next_change(viewer: &mut Viewer, last: &mut Value) -> Value {
    loop {
        let state = next_state(viewer).await;
        if state != *last {
            *last = state.clone();
            return state;
        }
    }
}

//returns the status code and body
async fn http_get(addr: SocketAddr, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(("127.0.0.1", addr.port())).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    (status, body.to_string())
}

async fn get_state(addr: SocketAddr) -> Value {
    let (status, body) = http_get(addr, "/api/state").await;
    assert_eq!(status, 200, "{}", body);
    serde_json::from_str(&body).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn viewers_follow_button_and_coin() {
    let (button, button_tx) = Input::new(false);
    let params = CoinParams {
        pulse_ms: 150,
        cooldown_ms: 300,
        sample_period_ms: 2,
        ..CoinParams::default()
    };
    let pulse = params.build_pulse();
    let cancel_token = CancellationToken::new();
    let server = Server::try_build(
        &server_config(),
        &SafetyNetConfig::default(),
        Composer::new(button, Some(pulse.clone())),
        cancel_token.clone(),
    )
    .await
    .unwrap();

    let (sensor, feed) = ScriptedDistance::new(50);
    let sampler = spawn_coin_sampler(
        sensor,
        &params,
        pulse,
        Arc::new(server.hub.clone()),
        cancel_token.clone(),
    );

    let mut viewer = connect(server.local_addr).await;
    let mut last = next_state(&mut viewer).await;
    assert_eq!(last, json!({"pressed": false, "raw": 1, "coin": false}));

    button_tx.send(true).unwrap();
    assert_eq!(
        next_change(&mut viewer, &mut last).await,
        json!({"pressed": true, "raw": 0, "coin": false})
    );

    //a coin passes in front of the sensor
    feed.push([10, 10, 50]);
    assert_eq!(
        next_change(&mut viewer, &mut last).await,
        json!({"pressed": true, "raw": 0, "coin": true})
    );
    assert_eq!(
        next_change(&mut viewer, &mut last).await,
        json!({"pressed": true, "raw": 0, "coin": false})
    );

    //a late viewer starts from the current state
    let mut late = connect(server.local_addr).await;
    assert_eq!(
        next_state(&mut late).await,
        json!({"pressed": true, "raw": 0, "coin": false})
    );

    button_tx.send(false).unwrap();
    let released = json!({"pressed": false, "raw": 1, "coin": false});
    assert_eq!(next_change(&mut viewer, &mut last).await, released);
    let mut late_last = json!({"pressed": true, "raw": 0, "coin": false});
    assert_eq!(next_change(&mut late, &mut late_last).await, released);

    assert_eq!(get_state(server.local_addr).await, released);

    //one viewer leaving does not disturb the other
    late.close(None).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(server.hub.subscriber_count(), 1);
    button_tx.send(true).unwrap();
    assert_eq!(
        next_change(&mut viewer, &mut last).await,
        json!({"pressed": true, "raw": 0, "coin": false})
    );

    //a dead sensor stops the sampler with an error
    feed.fail();
    let result = timeout(Duration::from_secs(2), sampler).await.unwrap().unwrap();
    assert!(result.is_err());

    viewer.close(None).await.unwrap();
    cancel_token.cancel();
    timeout(Duration::from_secs(5), server.handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn button_only_state_has_no_coin_field() {
    let (button, button_tx) = Input::new(true);
    let cancel_token = CancellationToken::new();
    let server = Server::try_build(
        &server_config(),
        &SafetyNetConfig::default(),
        Composer::new(button, None),
        cancel_token.clone(),
    )
    .await
    .unwrap();

    let mut viewer = connect(server.local_addr).await;
    let mut last = next_state(&mut viewer).await;
    assert_eq!(last, json!({"pressed": true, "raw": 0}));

    button_tx.send(false).unwrap();
    assert_eq!(
        next_change(&mut viewer, &mut last).await,
        json!({"pressed": false, "raw": 1})
    );
    assert_eq!(get_state(server.local_addr).await, json!({"pressed": false, "raw": 1}));

    viewer.close(None).await.unwrap();
    cancel_token.cancel();
    timeout(Duration::from_secs(5), server.handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn port_in_use_is_a_build_error() {
    let (button, _button_tx) = Input::new(false);
    let cancel_token = CancellationToken::new();
    let first = Server::try_build(
        &server_config(),
        &SafetyNetConfig::default(),
        Composer::new(button.clone(), None),
        cancel_token.clone(),
    )
    .await
    .unwrap();

    let taken = ServerConfig {
        port: first.local_addr.port(),
        ..server_config()
    };
    let second_token = CancellationToken::new();
    let second = Server::try_build(
        &taken,
        &SafetyNetConfig::default(),
        Composer::new(button, None),
        second_token.clone(),
    )
    .await;
    assert!(second.is_err());
    assert!(second_token.is_cancelled());

    cancel_token.cancel();
    first.handle.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn press_release_then_coin_with_default_tuning() {
    let (button, button_tx) = Input::new(false);
    let params = CoinParams::default();
    let pulse = params.build_pulse();
    let cancel_token = CancellationToken::new();
    let server = Server::try_build(
        &server_config(),
        &SafetyNetConfig::default(),
        Composer::new(button, Some(pulse.clone())),
        cancel_token.clone(),
    )
    .await
    .unwrap();

    let (sensor, feed) = ScriptedDistance::new(50);
    let _sampler = spawn_coin_sampler(
        sensor,
        &params,
        pulse,
        Arc::new(server.hub.clone()),
        cancel_token.clone(),
    );

    let mut viewer = connect(server.local_addr).await;
    let mut last = next_state(&mut viewer).await;
    assert_eq!(last, json!({"pressed": false, "raw": 1, "coin": false}));

    button_tx.send(true).unwrap();
    assert_eq!(
        next_change(&mut viewer, &mut last).await,
        json!({"pressed": true, "raw": 0, "coin": false})
    );
    button_tx.send(false).unwrap();
    assert_eq!(
        next_change(&mut viewer, &mut last).await,
        json!({"pressed": false, "raw": 1, "coin": false})
    );

    feed.push([10]);
    assert_eq!(
        next_change(&mut viewer, &mut last).await,
        json!({"pressed": false, "raw": 1, "coin": true})
    );
    let coin_seen = Instant::now();
    assert_eq!(
        next_change(&mut viewer, &mut last).await,
        json!({"pressed": false, "raw": 1, "coin": false})
    );
    let held = coin_seen.elapsed();
    assert!(held >= Duration::from_millis(150), "coin cleared after {:?}", held);
    assert!(held < Duration::from_millis(1000), "coin cleared after {:?}", held);

    viewer.close(None).await.unwrap();
    cancel_token.cancel();
    timeout(Duration::from_secs(5), server.handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn viewer_front_end_is_served_beside_the_api() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("index.html"), "<h1>coinop</h1>").unwrap();
    std::fs::write(site.path().join("viewer.js"), "connect();").unwrap();

    let (button, _button_tx) = Input::new(false);
    let cancel_token = CancellationToken::new();
    let config = ServerConfig {
        static_dir: Some(site.path().to_string_lossy().into_owned()),
        ..server_config()
    };
    let server = Server::try_build(
        &config,
        &SafetyNetConfig::default(),
        Composer::new(button, None),
        cancel_token.clone(),
    )
    .await
    .unwrap();

    assert_eq!(
        http_get(server.local_addr, "/").await,
        (200, "<h1>coinop</h1>".to_string())
    );
    assert_eq!(
        http_get(server.local_addr, "/viewer.js").await,
        (200, "connect();".to_string())
    );
    assert_eq!(http_get(server.local_addr, "/missing.css").await.0, 404);
    assert_eq!(
        get_state(server.local_addr).await,
        json!({"pressed": false, "raw": 1})
    );

    cancel_token.cancel();
    timeout(Duration::from_secs(5), server.handle)
        .await
        .unwrap()
        .unwrap();
}
