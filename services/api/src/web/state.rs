//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use scripture_core::ports::SessionStore;
use scripture_core::service::BibleService;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub bible: BibleService,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Arc<Config>,
}

/// The authenticated caller's user id, inserted by `require_auth`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);
