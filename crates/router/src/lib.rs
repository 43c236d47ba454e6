//! Interaction router (Layer 3)
//!
//! Turns world events into panel changes, habitat updates, quiz steps and
//! remote calls, and turns remote completions back into commands.

#![warn(missing_docs)]

pub mod clock;
pub mod completion;
pub mod error;
pub mod overlay;
pub mod router;
pub mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use completion::Completion;
pub use error::{Result, RouterError};
pub use overlay::OverlayTracker;
pub use router::InteractionRouter;
pub use sink::{CommandSink, TracingSink};
