pub use event::*;
pub use phase::*;

mod event;
pub mod logger;
mod phase;
