pub use crate::config::GeneratorConfig;
pub use crate::error::{GeneratorError, SendError, SendFailReason};
pub use crate::generator::{Generator, StopHandle, Yielder, start};
pub use crate::io::base::{Cursor, NullCursor};
pub use crate::io::ext::{CursorExt, CursorIter, Limit, Zip};
pub use crate::io::handoff::{Handoff, HandoffReceiver, HandoffSender};
pub use crate::io::source::{FnCursor, IterCursor, from_iter, pull_fn};
pub use crate::tee::{TeeCursor, tee, tee_n};
pub use crate::utils::logger::LoggerConfig;
pub use crate::utils::{Event, Phase, PhaseFlag, WaitHandle};
