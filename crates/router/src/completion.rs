//! Results of remote work, delivered back to the router's task.
//!
//! Remote calls run on spawned tasks and never touch router state. Each one
//! ends by sending exactly one [`Completion`]; the router applies it on its
//! own task, where it first checks the session token it was issued with.

use reefwarden_core::{GateVerdict, HabitatName, SubjectId};
use reefwarden_progress::ProgressError;
use reefwarden_session::SessionToken;

/// A finished remote call.
#[derive(Debug)]
pub enum Completion {
    /// Completion gate answered for a selection
    Gate {
        /// Token of the selection that asked
        token: SessionToken,
        /// Habitat checked
        habitat: HabitatName,
        /// Subject checked
        subject: SubjectId,
        /// Verdict or failure
        result: Result<GateVerdict, ProgressError>,
    },
    /// Quiz result commit finished
    Commit {
        /// Subject committed
        subject: SubjectId,
        /// Outcome; failures were already logged by the sync layer
        result: Result<(), ProgressError>,
    },
}
