pub mod annotations;
pub mod bible;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod prayer;
pub mod rest;
pub mod state;
pub mod user;

// Re-export what the binaries need to build and serve the router.
pub use middleware::require_auth;
pub use rest::{build_router, ApiDoc};
pub use state::{AppState, AuthUser};
