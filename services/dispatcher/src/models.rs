//! Request and response models for the dispatcher service

use serde::Serialize;

/// Arguments of the `InitializeGame` procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub player1_id: i64,
    pub player2_id: i64,
    pub player1_token: String,
    pub player2_token: String,
}

/// Output parameters of `InitializeGame`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedGame {
    pub game_id: i64,
    pub game_token: String,
}

/// Identity returned by `LoginPlayer`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerLogin {
    pub player_id: i64,
    pub token: String,
}

/// Arguments of the `ApplyMove` procedure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub game_id: i64,
    pub player_id: i64,
    pub piece_id: i64,
    pub start_x: i32,
    pub start_y: i32,
}

/// Response for player registration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub player_id: i64,
    pub username: String,
}

/// Response for player login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub player_id: i64,
    pub username: String,
    pub token: String,
}

/// Response for game creation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameResponse {
    pub success: bool,
    pub message: String,
    pub game_id: i64,
    pub game_token: String,
}

/// Response for a submitted move
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    pub success: bool,
    pub message: String,
    pub game_id: i64,
    pub player_id: i64,
    pub piece_id: i64,
}

/// Response for a session dump
#[derive(Debug, Serialize)]
pub struct SessionResponse<'a> {
    pub success: bool,
    pub message: String,
    pub session: &'a crate::session::SessionContext,
}
