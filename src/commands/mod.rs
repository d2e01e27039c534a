//! Command handlers: what the interpreter does with each identified
//! sub-command.
//!
//! `cmd` and `CALL` open new scopes and recurse into their bodies, `SET`
//! writes a variable. Everything else goes through `GenericHandler`, which
//! only records the command.

/// `CALL`: swaps the variable tables and runs its arguments as a line.
pub mod call;
/// `cmd`: switch parsing, scope push, and recursion into the body.
pub mod cmd;
/// Fallback recorder for every other command.
pub mod generic;
/// `SET name=value` assignments.
pub mod set;

use crate::eval::{CommandContext, Session};

/// Trait for command handlers.
///
/// A handler records at least one trace entry for the sub-command and may
/// push frames or run nested lines through the session.
pub trait CommandHandler: Send + Sync {
    fn handle(&self, session: &mut Session<'_>, ctx: &CommandContext);
}
