//! Shared test fixtures: a scripted game store and request helpers

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{
    cache::{RedisConfig, RedisPool},
    error::{DatabaseError, DatabaseResult},
};
use dispatcher::{
    AppState,
    config::{SessionBackend, Settings},
    models::{CreatedGame, MoveRequest, NewGame, PlayerLogin},
    routes::create_router,
    session::{MemorySessionStore, RedisSessionStore, SessionStore},
    store::{GameConnection, GameStore},
};
use serde_json::Value;
use tower::ServiceExt;

#[derive(Default)]
struct MockState {
    acquired: AtomicUsize,
    released: AtomicUsize,
    next_id: AtomicI64,
    fail_acquire: AtomicBool,
    fail_initialize: AtomicBool,
    fail_setup: AtomicBool,
    panic_on_move: AtomicBool,
    players: Mutex<HashMap<String, (i64, String)>>,
    games: Mutex<Vec<NewGame>>,
    moves: Mutex<Vec<MoveRequest>>,
}

/// Game store standing in for the stored procedures
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<MockState>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn acquired(&self) -> usize {
        self.state.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.state.released.load(Ordering::SeqCst)
    }

    pub fn fail_acquire(&self) {
        self.state.fail_acquire.store(true, Ordering::SeqCst);
    }

    pub fn fail_initialize(&self) {
        self.state.fail_initialize.store(true, Ordering::SeqCst);
    }

    pub fn fail_setup(&self) {
        self.state.fail_setup.store(true, Ordering::SeqCst);
    }

    pub fn panic_on_move(&self) {
        self.state.panic_on_move.store(true, Ordering::SeqCst);
    }

    pub fn games(&self) -> Vec<NewGame> {
        self.state.games.lock().unwrap().clone()
    }

    pub fn moves(&self) -> Vec<MoveRequest> {
        self.state.moves.lock().unwrap().clone()
    }
}

pub struct MockConnection {
    state: Arc<MockState>,
}

fn rejected(procedure: &'static str, reason: &str) -> DatabaseError {
    DatabaseError::Procedure {
        procedure,
        source: sqlx::Error::Protocol(reason.to_string()),
    }
}

impl GameStore for MockStore {
    type Connection = MockConnection;

    async fn acquire(&self) -> DatabaseResult<MockConnection> {
        if self.state.fail_acquire.load(Ordering::SeqCst) {
            return Err(DatabaseError::Connection(sqlx::Error::PoolTimedOut));
        }
        self.state.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            state: self.state.clone(),
        })
    }
}

impl GameConnection for MockConnection {
    async fn register_player(&mut self, username: &str, password: &str) -> DatabaseResult<i64> {
        let mut players = self.state.players.lock().unwrap();
        if players.contains_key(username) {
            return Err(rejected("RegisterPlayer", "username already taken"));
        }
        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        players.insert(username.to_string(), (id, password.to_string()));
        Ok(id)
    }

    async fn login_player(&mut self, username: &str, password: &str) -> DatabaseResult<PlayerLogin> {
        let players = self.state.players.lock().unwrap();
        match players.get(username) {
            Some((id, stored)) if stored == password => Ok(PlayerLogin {
                player_id: *id,
                token: format!("token-{}", id),
            }),
            _ => Err(DatabaseError::MissingOutput("Player ID")),
        }
    }

    async fn initialize_game(&mut self, game: &NewGame) -> DatabaseResult<CreatedGame> {
        if self.state.fail_initialize.load(Ordering::SeqCst) {
            return Err(rejected("InitializeGame", "invalid player token"));
        }
        let mut games = self.state.games.lock().unwrap();
        games.push(game.clone());
        let game_id = 100 + games.len() as i64;
        Ok(CreatedGame {
            game_id,
            game_token: format!("game-{}", game_id),
        })
    }

    async fn setup_game(&mut self, _game_id: i64) -> DatabaseResult<()> {
        if self.state.fail_setup.load(Ordering::SeqCst) {
            return Err(rejected("SetupGame", "board template missing"));
        }
        Ok(())
    }

    async fn apply_move(&mut self, mv: &MoveRequest) -> DatabaseResult<()> {
        if self.state.panic_on_move.load(Ordering::SeqCst) {
            panic!("piece {} vanished", mv.piece_id);
        }
        self.state.moves.lock().unwrap().push(mv.clone());
        Ok(())
    }

    fn release(&mut self) {
        self.state.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Router over `store` with an in-memory session store
pub fn app(store: &MockStore, debug_session: bool) -> Router {
    let sessions = SessionStore::Memory(MemorySessionStore::default());
    app_with_sessions(store, sessions, debug_session)
}

/// Router over `store` with the given session backend
pub fn app_with_sessions(store: &MockStore, sessions: SessionStore, debug_session: bool) -> Router {
    let backend = match sessions {
        SessionStore::Redis(_) => SessionBackend::Redis,
        SessionStore::Memory(_) => SessionBackend::Memory,
    };
    let settings = Settings {
        session_backend: backend,
        debug_session,
        ..Settings::default()
    };
    create_router(AppState::new(store.clone(), sessions, settings))
}

/// Redis session store pointed at a port nothing listens on. The client is
/// created lazily, so every load and save fails.
#[allow(dead_code)]
pub async fn unreachable_sessions() -> SessionStore {
    let config = RedisConfig {
        url: "redis://127.0.0.1:1".to_string(),
    };
    let redis_pool = RedisPool::new(&config).await.unwrap();
    SessionStore::Redis(RedisSessionStore::new(redis_pool, 60))
}

/// Reply to one request
pub struct Reply {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub body: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    Reply {
        status,
        cookie,
        body,
    }
}

/// POST `body` to the dispatch endpoint, optionally presenting a session cookie
pub async fn post(app: &Router, body: Value, cookie: Option<&str>) -> Reply {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}
