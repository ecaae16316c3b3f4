mod control;
mod source;
mod track;

pub use control::*;
pub use source::*;
pub use track::*;
