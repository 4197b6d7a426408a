pub mod api;
pub mod config;
pub mod error;
pub mod events;
mod main_lib;
pub mod session;

pub use main_lib::{build_state, init_tracing, AppState};
