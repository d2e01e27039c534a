use log::debug;

use super::CommandHandler;
use crate::eval::{CommandContext, CommandLine, Frame, Session};
use crate::parse::parse_cmd_switches;

/// Spawns a child interpreter: a new frame reading the parent's writes,
/// then the body run as a line inside it.
pub struct CmdHandler;

impl CommandHandler for CmdHandler {
    fn handle(&self, session: &mut Session<'_>, ctx: &CommandContext) {
        let args = parse_cmd_switches(ctx.rest());
        let body = args.body.trim();

        let frame = Frame::for_cmd(Some(session.frame(ctx.frame)), args.switches.clone());
        let child = session.push_frame(frame);
        session.record(
            child,
            CommandLine {
                name: "cmd".into(),
                line: body.to_string(),
            },
            args.switches,
            ctx.text,
        );

        let body = strip_quotes(body).trim();
        if body.is_empty() {
            return;
        }
        let (tokens, inner) = session.identify(body);
        if inner.command == "cmd" && inner.rest(&tokens).is_empty() {
            debug!("cmd spawning a bare cmd, not recursing");
            return;
        }
        session.run_line(body, Some(child), ctx.depth + 1);
    }
}

/// Drop a leading and a trailing `"`, each independently.
fn strip_quotes(text: &str) -> &str {
    let text = text.strip_prefix('"').unwrap_or(text);
    text.strip_suffix('"').unwrap_or(text)
}
