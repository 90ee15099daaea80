//! Database collaborator for the dispatcher
//!
//! Game rules live in stored procedures. This module only describes the
//! calls the dispatcher makes and how a connection is scoped around them:
//! a [`GameStore`] hands out one [`GameConnection`] per operation, and the
//! connection is always wrapped in a [`ScopedConnection`] so that it is
//! released exactly once, whichever way the operation exits.

use std::future::Future;
use std::ops::{Deref, DerefMut};

use common::error::DatabaseResult;

use crate::models::{CreatedGame, MoveRequest, NewGame, PlayerLogin};

pub mod postgres;

pub use postgres::{PgGameConnection, PgGameStore};

/// Source of database connections
pub trait GameStore: Clone + Send + Sync + 'static {
    type Connection: GameConnection;

    /// Acquire a connection for a single operation
    fn acquire(&self) -> impl Future<Output = DatabaseResult<Self::Connection>> + Send;
}

/// Stored procedure calls available on an acquired connection
pub trait GameConnection: Send + 'static {
    /// `RegisterPlayer(username, password) -> playerId`
    fn register_player(
        &mut self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = DatabaseResult<i64>> + Send;

    /// `LoginPlayer(username, password) -> playerId`, plus the player's token
    fn login_player(
        &mut self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = DatabaseResult<PlayerLogin>> + Send;

    /// `InitializeGame(player1Id, player2Id, player1Token, player2Token) -> (gameId, gameToken)`
    fn initialize_game(
        &mut self,
        game: &NewGame,
    ) -> impl Future<Output = DatabaseResult<CreatedGame>> + Send;

    /// `SetupGame(gameId)`, run once a game has been initialized
    fn setup_game(&mut self, game_id: i64) -> impl Future<Output = DatabaseResult<()>> + Send;

    /// `ApplyMove(gameId, playerId, pieceId, startX, startY)`
    fn apply_move(&mut self, mv: &MoveRequest) -> impl Future<Output = DatabaseResult<()>> + Send;

    /// Hand the connection back. Called exactly once, from [`ScopedConnection`]'s drop.
    fn release(&mut self);
}

/// A connection that is released when it goes out of scope
///
/// Release runs from `Drop`, so it also happens on early returns through `?`
/// and while unwinding from a panic.
pub struct ScopedConnection<C: GameConnection> {
    inner: C,
}

impl<C: GameConnection> Deref for ScopedConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: GameConnection> DerefMut for ScopedConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: GameConnection> Drop for ScopedConnection<C> {
    fn drop(&mut self) {
        self.inner.release();
    }
}

/// Acquire a connection from `store`, scoped for guaranteed release
pub async fn acquire<S: GameStore>(store: &S) -> DatabaseResult<ScopedConnection<S::Connection>> {
    let inner = store.acquire().await?;
    Ok(ScopedConnection { inner })
}
