pub mod config;
pub mod room;
pub mod signaling;

pub use config::ServerConfig;
pub use room::{Room, RoomCommand, RoomManager};
pub use signaling::{AppState, router, ws_handler};
