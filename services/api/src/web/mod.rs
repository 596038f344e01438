pub mod admin;
pub mod auth;
pub mod chat;
pub mod listing;
pub mod mail;
pub mod middleware;
pub mod public;
pub mod router;
pub mod state;

// Re-export what the binaries need to build the web server.
pub use middleware::require_admin;
pub use router::{build_router, ApiDoc};
pub use state::AppState;
