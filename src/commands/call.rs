use super::CommandHandler;
use crate::eval::{CommandContext, CommandLine, Frame, Session};
use crate::parse::Switches;

/// Runs its arguments as a new line in a frame whose tables are the
/// parent's, swapped: a second expansion pass sees what the parent set.
pub struct CallHandler;

impl CommandHandler for CallHandler {
    fn handle(&self, session: &mut Session<'_>, ctx: &CommandContext) {
        let line = ctx.line();
        let frame = Frame::for_call(session.frame(ctx.frame));
        let child = session.push_frame(frame);
        session.record(
            child,
            CommandLine {
                name: "call".into(),
                line: line.clone(),
            },
            Switches::new(),
            ctx.text,
        );
        if !line.is_empty() {
            session.run_line(&line, Some(child), ctx.depth + 1);
        }
    }
}
