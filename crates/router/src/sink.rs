//! Command sinks - where router output goes.

use reefwarden_core::Command;
use tracing::info;

/// Receives commands in emission order.
pub trait CommandSink: Send {
    /// Deliver one command.
    fn emit(&mut self, command: Command);
}

/// Collects commands; handy for tests and batch runs.
impl CommandSink for Vec<Command> {
    fn emit(&mut self, command: Command) {
        self.push(command);
    }
}

/// Logs every command at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl CommandSink for TracingSink {
    fn emit(&mut self, command: Command) {
        info!("command: {:?}", command);
    }
}
