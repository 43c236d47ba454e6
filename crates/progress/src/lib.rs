//! Progress synchronization
//!
//! Store binding, the completion gate, remote accumulation of quiz results,
//! and account provisioning.

#![warn(missing_docs)]

pub mod account;
pub mod error;
pub mod gate;
pub mod handle;
pub mod sync;

pub use account::{provision_player, PlayerProfile};
pub use error::{ProgressError, Result};
pub use gate::CompletionGate;
pub use handle::{Binding, RemoteHandle};
pub use sync::ProgressSync;
