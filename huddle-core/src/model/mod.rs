mod envelope;
mod participant;
mod room;

pub use envelope::*;
pub use participant::*;
pub use room::*;
