pub mod api;
pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::{router, run_server, serve, ServerError};
pub use state::AppState;
