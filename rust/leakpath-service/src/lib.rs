pub mod config;
pub mod errors;
pub mod host;
pub mod models;
pub mod routes;

pub use host::{load_grid, spawn_ticker, ShipHost};
pub use routes::{build_router, AppState};
