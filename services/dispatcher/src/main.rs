use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use common::{cache::RedisPool, database};
use dispatcher::{
    AppState,
    config::{SessionBackend, Settings},
    routes,
    session::{MemorySessionStore, RedisSessionStore, SessionStore},
    store::PgGameStore,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting dispatcher service");

    let settings = Settings::load()?;

    // Initialize database connection pool
    let pool = database::init_pool(&settings.database_config()).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let sessions = match settings.session_backend {
        SessionBackend::Redis => {
            let redis_pool = RedisPool::new(&settings.redis_config()).await?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }
            SessionStore::Redis(RedisSessionStore::new(
                redis_pool,
                settings.session_ttl_seconds,
            ))
        }
        SessionBackend::Memory => {
            info!("Using in-memory session store");
            SessionStore::Memory(MemorySessionStore::default())
        }
    };

    let bind_address = settings.bind_address.clone();
    let app_state = AppState::new(PgGameStore::new(pool), sessions, settings);

    info!("Dispatcher service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&bind_address).await?;
    info!("Dispatcher service listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
