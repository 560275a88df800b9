//! The [`Command`] trait implemented by every fqdemux subcommand.

use anyhow::Result;
use enum_dispatch::enum_dispatch;

/// A runnable subcommand.
///
/// `command_line` is the full invocation, logged so a run can be reproduced from its log.
#[enum_dispatch]
pub trait Command {
    #[allow(clippy::missing_errors_doc)]
    fn execute(&self, command_line: &str) -> Result<()>;
}
