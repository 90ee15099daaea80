//! Operation handlers
//!
//! Each handler checks its required fields before touching the database,
//! runs its stored procedure calls on one scoped connection, and returns the
//! reply together with the caller's (possibly updated) session context.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::{
    error::{DispatchError, DispatchResult},
    models::{
        CreateGameResponse, LoginResponse, MoveRequest, MoveResponse, NewGame, RegisterResponse,
        SessionResponse,
    },
    session::SessionContext,
    store::{self, GameConnection, GameStore},
    validation::RequestBody,
};

/// Operations reachable through the `method` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    CreateGame,
    MakeMove,
    DebugSession,
}

impl Operation {
    /// Resolve a `method` value. `debugSession` only exists when enabled.
    pub fn resolve(name: &str, debug_session: bool) -> DispatchResult<Self> {
        match name {
            "register" => Ok(Operation::Register),
            "login" => Ok(Operation::Login),
            "createGame" => Ok(Operation::CreateGame),
            "makeMove" => Ok(Operation::MakeMove),
            "debugSession" if debug_session => Ok(Operation::DebugSession),
            other => Err(DispatchError::UnknownMethod(other.to_string())),
        }
    }

    /// Whether the operation reads or writes the caller's session.
    /// `register` and `makeMove` run without loading it.
    pub fn uses_session(self) -> bool {
        matches!(
            self,
            Operation::Login | Operation::CreateGame | Operation::DebugSession
        )
    }
}

/// A handler's reply plus the session context to carry forward
pub struct Handled {
    pub response: Response,
    pub session: SessionContext,
}

/// Run `operation` against `store`
pub async fn handle<S: GameStore>(
    operation: Operation,
    store: &S,
    body: &RequestBody,
    session: SessionContext,
) -> DispatchResult<Handled> {
    match operation {
        Operation::Register => register(store, body, session).await,
        Operation::Login => login(store, body, session).await,
        Operation::CreateGame => create_game(store, body, session).await,
        Operation::MakeMove => make_move(store, body, session).await,
        Operation::DebugSession => Ok(debug_session(session)),
    }
}

/// Register a new player
pub async fn register<S: GameStore>(
    store: &S,
    body: &RequestBody,
    session: SessionContext,
) -> DispatchResult<Handled> {
    let (Some(username), Some(password)) = (body.text("username"), body.text("password")) else {
        return Err(DispatchError::Validation(
            "'username' and 'password' are required for registration.".to_string(),
        ));
    };

    info!("Registration attempt for user: {}", username);

    let player_id = {
        let mut conn = store::acquire(store).await?;
        let player_id = conn
            .register_player(username, password)
            .await
            .inspect_err(|e| error!("Failed to register player {}: {}", username, e))?;
        player_id
    };

    let response = RegisterResponse {
        success: true,
        message: "Player registered successfully.".to_string(),
        player_id,
        username: username.to_string(),
    };

    Ok(Handled {
        response: Json(response).into_response(),
        session,
    })
}

/// Log a player in and remember them in the session
pub async fn login<S: GameStore>(
    store: &S,
    body: &RequestBody,
    mut session: SessionContext,
) -> DispatchResult<Handled> {
    let (Some(username), Some(password)) = (body.text("username"), body.text("password")) else {
        return Err(DispatchError::Validation(
            "'username' and 'password' are required for login.".to_string(),
        ));
    };

    info!("Login attempt for user: {}", username);

    let player = {
        let mut conn = store::acquire(store).await?;
        let player = conn
            .login_player(username, password)
            .await
            .inspect_err(|e| error!("Failed to log in player {}: {}", username, e))?;
        player
    };

    session.record_login(player.player_id, username, &player.token);

    let response = LoginResponse {
        success: true,
        message: "Player logged in successfully.".to_string(),
        player_id: player.player_id,
        username: username.to_string(),
        token: player.token,
    };

    Ok(Handled {
        response: Json(response).into_response(),
        session,
    })
}

/// Create a game between two players and run its setup
///
/// The session only learns about the game once both `InitializeGame` and
/// `SetupGame` succeeded.
pub async fn create_game<S: GameStore>(
    store: &S,
    body: &RequestBody,
    mut session: SessionContext,
) -> DispatchResult<Handled> {
    let (Some(player1_id), Some(player2_id), Some(player1_token), Some(player2_token)) = (
        body.integer("player1Id"),
        body.integer("player2Id"),
        body.text("player1Token"),
        body.text("player2Token"),
    ) else {
        return Err(DispatchError::Validation(
            "Player1Id, Player2Id, Player1Token, and Player2Token are required.".to_string(),
        ));
    };

    let new_game = NewGame {
        player1_id,
        player2_id,
        player1_token: player1_token.to_string(),
        player2_token: player2_token.to_string(),
    };

    info!(
        "Creating game between players {} and {}",
        player1_id, player2_id
    );

    let game = {
        let mut conn = store::acquire(store).await?;
        let game = conn
            .initialize_game(&new_game)
            .await
            .inspect_err(|e| error!("Failed to initialize game: {}", e))?;
        conn.setup_game(game.game_id)
            .await
            .inspect_err(|e| error!("Failed to set up game {}: {}", game.game_id, e))?;
        game
    };

    session.record_game(game.game_id, &game.game_token);

    let response = CreateGameResponse {
        success: true,
        message: "Game created successfully.".to_string(),
        game_id: game.game_id,
        game_token: game.game_token,
    };

    Ok(Handled {
        response: Json(response).into_response(),
        session,
    })
}

/// Submit a move; legality is decided by the database
pub async fn make_move<S: GameStore>(
    store: &S,
    body: &RequestBody,
    session: SessionContext,
) -> DispatchResult<Handled> {
    let (Some(game_id), Some(player_id), Some(piece_id), Some(start_x), Some(start_y)) = (
        body.integer("game_id"),
        body.integer("player_id"),
        body.integer("piece_id"),
        body.coordinate("startX"),
        body.coordinate("startY"),
    ) else {
        return Err(DispatchError::Validation(
            "Missing parameters. Required: 'game_id', 'player_id', 'piece_id', 'startX', 'startY'."
                .to_string(),
        ));
    };

    let mv = MoveRequest {
        game_id,
        player_id,
        piece_id,
        start_x,
        start_y,
    };

    {
        let mut conn = store::acquire(store).await?;
        conn.apply_move(&mv)
            .await
            .inspect_err(|e| error!("Failed to apply move in game {}: {}", game_id, e))?;
    }

    let response = MoveResponse {
        success: true,
        message: "Move submitted.".to_string(),
        game_id,
        player_id,
        piece_id,
    };

    Ok(Handled {
        response: Json(response).into_response(),
        session,
    })
}

/// Echo the caller's session context
pub fn debug_session(session: SessionContext) -> Handled {
    let response = Json(SessionResponse {
        success: true,
        message: "Current session.".to_string(),
        session: &session,
    })
    .into_response();

    Handled { response, session }
}
