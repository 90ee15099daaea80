//! PostgreSQL implementation of the game store
//!
//! Each operation is a `CALL` to a stored procedure. Output values come back
//! through `INOUT` parameters, which PostgreSQL returns as a single row.

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{
    PgPool, Postgres, Row,
    pool::PoolConnection,
    postgres::{PgArguments, PgRow},
    query::Query,
};
use tracing::{debug, info};

use super::{GameConnection, GameStore};
use crate::models::{CreatedGame, MoveRequest, NewGame, PlayerLogin};

/// Game store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgGameStore {
    pool: PgPool,
}

impl PgGameStore {
    /// Create a new store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl GameStore for PgGameStore {
    type Connection = PgGameConnection;

    async fn acquire(&self) -> DatabaseResult<PgGameConnection> {
        let conn = self.pool.acquire().await.map_err(DatabaseError::Connection)?;
        debug!("Acquired database connection");
        Ok(PgGameConnection { conn })
    }
}

/// A pooled connection; returned to the pool when dropped
pub struct PgGameConnection {
    conn: PoolConnection<Postgres>,
}

impl PgGameConnection {
    async fn call(
        &mut self,
        procedure: &'static str,
        query: Query<'_, Postgres, PgArguments>,
    ) -> DatabaseResult<Option<PgRow>> {
        query
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|source| DatabaseError::Procedure { procedure, source })
    }
}

/// Read the `INOUT` parameter at `index`; NULL means the procedure left it unset.
fn output<'r, T>(row: &'r PgRow, index: usize, name: &'static str) -> DatabaseResult<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<Option<T>, _>(index)
        .map_err(DatabaseError::Query)?
        .ok_or(DatabaseError::MissingOutput(name))
}

impl GameConnection for PgGameConnection {
    async fn register_player(&mut self, username: &str, password: &str) -> DatabaseResult<i64> {
        info!("Calling RegisterPlayer for user: {}", username);

        let row = self
            .call(
                "RegisterPlayer",
                sqlx::query("CALL RegisterPlayer($1, $2, NULL::bigint)")
                    .bind(username)
                    .bind(password),
            )
            .await?
            .ok_or(DatabaseError::MissingOutput("Player ID"))?;

        output::<i64>(&row, 0, "Player ID")
    }

    async fn login_player(&mut self, username: &str, password: &str) -> DatabaseResult<PlayerLogin> {
        info!("Calling LoginPlayer for user: {}", username);

        let row = self
            .call(
                "LoginPlayer",
                sqlx::query("CALL LoginPlayer($1, $2, NULL::bigint)")
                    .bind(username)
                    .bind(password),
            )
            .await?
            .ok_or(DatabaseError::MissingOutput("Player ID"))?;

        let player_id = output::<i64>(&row, 0, "Player ID")?;

        let token: Option<String> =
            sqlx::query_scalar::<_, Option<String>>("SELECT token FROM Players WHERE ID = $1")
                .bind(player_id)
                .fetch_optional(&mut *self.conn)
                .await
                .map_err(DatabaseError::Query)?
                .flatten();

        let token = token.ok_or(DatabaseError::MissingOutput("Player token"))?;

        Ok(PlayerLogin { player_id, token })
    }

    async fn initialize_game(&mut self, game: &NewGame) -> DatabaseResult<CreatedGame> {
        info!(
            "Calling InitializeGame for players {} and {}",
            game.player1_id, game.player2_id
        );

        let row = self
            .call(
                "InitializeGame",
                sqlx::query("CALL InitializeGame($1, $2, $3, $4, NULL::bigint, NULL::text)")
                    .bind(game.player1_id)
                    .bind(game.player2_id)
                    .bind(&game.player1_token)
                    .bind(&game.player2_token),
            )
            .await?
            .ok_or(DatabaseError::MissingOutput("Game ID"))?;

        let game_id = output::<i64>(&row, 0, "Game ID")?;
        let game_token = output::<String>(&row, 1, "Game token")?;

        Ok(CreatedGame { game_id, game_token })
    }

    async fn setup_game(&mut self, game_id: i64) -> DatabaseResult<()> {
        info!("Calling SetupGame for game: {}", game_id);

        self.call("SetupGame", sqlx::query("CALL SetupGame($1)").bind(game_id))
            .await?;

        Ok(())
    }

    async fn apply_move(&mut self, mv: &MoveRequest) -> DatabaseResult<()> {
        info!(
            "Calling ApplyMove for game {} by player {} (piece {} from {},{})",
            mv.game_id, mv.player_id, mv.piece_id, mv.start_x, mv.start_y
        );

        self.call(
            "ApplyMove",
            sqlx::query("CALL ApplyMove($1, $2, $3, $4, $5)")
                .bind(mv.game_id)
                .bind(mv.player_id)
                .bind(mv.piece_id)
                .bind(mv.start_x)
                .bind(mv.start_y),
        )
        .await?;

        Ok(())
    }

    fn release(&mut self) {
        debug!("Returning database connection to pool");
    }
}
