//! End-to-end tests driving a game over a real WebSocket connection.

use std::{
    future::Future,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::{SinkExt, StreamExt};
use poker_league::{
    config::{AppConfig, BlindConfig},
    dao::player_store::{FileSystemPlayerStore, PlayerStore},
    routes,
    services::blind_alerter::{AlertSink, BlindAlertScheduler, ScheduledAlerts, TokioBlindAlerter},
    state::{AppState, SharedState, state_machine::GamePhase},
};
use tokio::{
    net::{TcpListener, TcpStream},
    time::{sleep, timeout},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Real scheduler that also remembers the player count of every game it armed.
struct SpyAlerter {
    inner: TokioBlindAlerter,
    started_with: Mutex<Vec<u32>>,
}

impl SpyAlerter {
    fn new(config: &AppConfig) -> Self {
        Self {
            inner: TokioBlindAlerter::new(config.blinds().clone()),
            started_with: Mutex::default(),
        }
    }
}

impl BlindAlertScheduler for SpyAlerter {
    fn schedule(&self, player_count: NonZeroU32, sink: Arc<dyn AlertSink>) -> ScheduledAlerts {
        self.started_with.lock().unwrap().push(player_count.get());
        self.inner.schedule(player_count, sink)
    }
}

struct TestServer {
    addr: SocketAddr,
    state: SharedState,
    store: Arc<FileSystemPlayerStore>,
    alerter: Arc<SpyAlerter>,
    _dir: tempfile::TempDir,
}

async fn spawn_server() -> TestServer {
    spawn_server_with(AppConfig::default()).await
}

async fn spawn_server_with(config: AppConfig) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        FileSystemPlayerStore::open(dir.path().join("game.db.json"))
            .await
            .unwrap(),
    );
    let alerter = Arc::new(SpyAlerter::new(&config));
    let state = AppState::with_alerter(store.clone(), alerter.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::router(state.clone());
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    TestServer {
        addr,
        state,
        store,
        alerter,
        _dir: dir,
    }
}

async fn connect(addr: SocketAddr) -> Socket {
    let (socket, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    socket
}

async fn send_text(socket: &mut Socket, text: &str) {
    socket.send(Message::Text(text.into())).await.unwrap();
}

/// Wait for the next text frame, failing after a generous delay.
async fn next_text(socket: &mut Socket) -> String {
    timeout(Duration::from_secs(5), async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
                Some(Ok(_)) => continue,
                other => panic!("socket ended unexpectedly: {other:?}"),
            }
        }
    })
    .await
    .expect("no text frame received in time")
}

/// Assert that no text frame arrives within `window`.
async fn assert_silent(socket: &mut Socket, window: Duration) {
    if let Ok(Some(Ok(Message::Text(text)))) = timeout(window, socket.next()).await {
        panic!("unexpected frame `{text}`");
    }
}

async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    timeout(Duration::from_secs(5), async {
        while !check().await {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

async fn is_idle(state: &SharedState) -> bool {
    state.game().status().await.snapshot.phase == GamePhase::Idle
}

#[tokio::test]
async fn plays_a_game_and_records_the_winner() {
    let server = spawn_server().await;
    let mut socket = connect(server.addr).await;

    send_text(&mut socket, "3").await;
    assert_eq!(next_text(&mut socket).await, "Blind is 100");

    send_text(&mut socket, "Ruth").await;
    let store = server.store.clone();
    eventually(|| {
        let store = store.clone();
        async move { store.player_score("Ruth".into()).await == 1 }
    })
    .await;

    assert_silent(&mut socket, Duration::from_millis(50)).await;
    assert_eq!(*server.alerter.started_with.lock().unwrap(), [3]);
    assert!(is_idle(&server.state).await);
    assert_eq!(store.league().await.len(), 1);
}

#[tokio::test]
async fn blinds_escalate_until_a_winner_is_declared() {
    // 300ms shared by three players: one level every 100ms.
    let blinds = BlindConfig::new(Duration::from_millis(300), vec![10, 20, 30]).unwrap();
    let server = spawn_server_with(AppConfig::default().with_blinds(blinds)).await;
    let mut socket = connect(server.addr).await;

    send_text(&mut socket, "3").await;
    assert_eq!(next_text(&mut socket).await, "Blind is 10");
    assert_eq!(next_text(&mut socket).await, "Blind is 20");

    send_text(&mut socket, "Cleo").await;
    let store = server.store.clone();
    eventually(|| {
        let store = store.clone();
        async move { store.player_score("Cleo".into()).await == 1 }
    })
    .await;
    assert!(is_idle(&server.state).await);
}

#[tokio::test]
async fn closing_the_socket_cancels_the_game() {
    let server = spawn_server().await;
    let mut socket = connect(server.addr).await;

    send_text(&mut socket, "4").await;
    assert_eq!(next_text(&mut socket).await, "Blind is 100");
    socket.close(None).await.unwrap();

    let state = server.state.clone();
    eventually(|| {
        let state = state.clone();
        async move { is_idle(&state).await }
    })
    .await;
    assert!(server.store.league().await.is_empty());
}

#[tokio::test]
async fn malformed_player_count_is_ignored() {
    let server = spawn_server().await;
    let mut socket = connect(server.addr).await;

    send_text(&mut socket, "three").await;
    send_text(&mut socket, "0").await;
    send_text(&mut socket, "3").await;

    assert_eq!(next_text(&mut socket).await, "Blind is 100");
    assert_eq!(*server.alerter.started_with.lock().unwrap(), [3]);
}

#[tokio::test]
async fn second_table_is_rejected_while_a_game_runs() {
    let server = spawn_server().await;
    let mut first = connect(server.addr).await;
    let mut second = connect(server.addr).await;

    send_text(&mut first, "3").await;
    assert_eq!(next_text(&mut first).await, "Blind is 100");

    // Rejected start leaves the second connection waiting for a count, so its
    // next frame is not taken as a winner either.
    send_text(&mut second, "5").await;
    send_text(&mut second, "Chris").await;
    assert_silent(&mut second, Duration::from_millis(50)).await;

    send_text(&mut first, "Ruth").await;
    let store = server.store.clone();
    eventually(|| {
        let store = store.clone();
        async move { store.player_score("Ruth".into()).await == 1 }
    })
    .await;

    assert_eq!(store.player_score("Chris".into()).await, 0);
    assert_eq!(*server.alerter.started_with.lock().unwrap(), [3]);
}

#[tokio::test]
async fn connection_can_play_consecutive_games() {
    let server = spawn_server().await;
    let mut socket = connect(server.addr).await;

    for winner in ["Ruth", "Ruth", "Chris"] {
        send_text(&mut socket, "2").await;
        assert_eq!(next_text(&mut socket).await, "Blind is 100");
        send_text(&mut socket, winner).await;
    }

    let store = server.store.clone();
    eventually(|| {
        let store = store.clone();
        async move { store.player_score("Chris".into()).await == 1 }
    })
    .await;
    assert_eq!(store.player_score("Ruth".into()).await, 2);
    assert_eq!(*server.alerter.started_with.lock().unwrap(), [2, 2, 2]);
}
