mod relay_client;
mod room_session;
mod sink;

pub use relay_client::*;
pub use room_session::*;
pub use sink::*;
