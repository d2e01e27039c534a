use super::CommandHandler;
use crate::eval::{CommandContext, CommandLine, Session};
use crate::parse::Switches;

/// Records the command and its arguments; no scope change, no recursion.
/// An unidentified sub-command is recorded with an empty name and the whole
/// text as its line.
pub struct GenericHandler;

impl CommandHandler for GenericHandler {
    fn handle(&self, session: &mut Session<'_>, ctx: &CommandContext) {
        let command = if ctx.ident.is_identified() {
            CommandLine {
                name: ctx.name().to_string(),
                line: ctx.line(),
            }
        } else {
            CommandLine {
                name: String::new(),
                line: ctx.text.to_string(),
            }
        };
        session.record(ctx.frame, command, Switches::new(), ctx.text);
    }
}
