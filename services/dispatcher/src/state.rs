//! Application state shared across handlers

use std::sync::Arc;

use crate::{config::Settings, session::SessionStore, store::GameStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState<S: GameStore> {
    pub store: S,
    pub sessions: SessionStore,
    pub settings: Arc<Settings>,
}

impl<S: GameStore> AppState<S> {
    pub fn new(store: S, sessions: SessionStore, settings: Settings) -> Self {
        Self {
            store,
            sessions,
            settings: Arc::new(settings),
        }
    }
}
