use log::debug;

use super::CommandHandler;
use crate::eval::{CommandContext, CommandLine, Session};
use crate::parse::{Switches, stringify};

/// Writes `name=value` into the current frame's `nextframe`.
pub struct SetHandler;

impl CommandHandler for SetHandler {
    fn handle(&self, session: &mut Session<'_>, ctx: &CommandContext) {
        let args = arguments(ctx);
        if let Some((name, value)) = parse_assignment(&args) {
            debug!("set {name}={value} in frame {}", ctx.frame);
            session
                .frame_mut(ctx.frame)
                .vars
                .nextframe
                .set(name, value);
        }
        session.record(
            ctx.frame,
            CommandLine {
                name: "set".into(),
                line: args,
            },
            Switches::new(),
            ctx.text,
        );
    }
}

/// Argument text of a `set`, including whatever followed `set` inside a
/// quoted head (`"set x=y"`).
fn arguments(ctx: &CommandContext) -> String {
    let head: String = ctx.ident.head.chars().filter(|c| *c != '"').collect();
    let in_head = head
        .trim_start()
        .split_once(char::is_whitespace)
        .map_or("", |(_, after)| after.trim());
    let rest = stringify(ctx.rest());
    let rest = rest.trim();
    match (in_head.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (false, true) => in_head.to_string(),
        (false, false) => format!("{in_head} {rest}"),
    }
}

/// Split `set` arguments into a name and a value.
///
/// `/a` and `/p` never assign. `"name=value" tail` takes the value up to
/// the last quote. No `=` or an empty name means nothing is assigned.
pub fn parse_assignment(args: &str) -> Option<(&str, &str)> {
    let args = args.trim_start();
    let switch = args.get(..2).unwrap_or("");
    if switch.eq_ignore_ascii_case("/a") || switch.eq_ignore_ascii_case("/p") {
        return None;
    }
    let assignment = match args.strip_prefix('"') {
        Some(quoted) => quoted.rfind('"').map_or(quoted, |end| &quoted[..end]),
        None => args,
    };
    let (name, value) = assignment.split_once('=')?;
    if name.is_empty() {
        return None;
    }
    Some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{InterpretOptions, Interpreter, Interpretation};

    fn run(text: &str) -> Interpretation {
        Interpreter::new(InterpretOptions::default())
            .unwrap()
            .interpret(text)
    }

    #[test]
    fn plain_assignment() {
        assert_eq!(parse_assignment("foo=bar"), Some(("foo", "bar")));
        assert_eq!(parse_assignment("foo=a=b"), Some(("foo", "a=b")));
        assert_eq!(parse_assignment("foo="), Some(("foo", "")));
    }

    #[test]
    fn quoted_assignment() {
        assert_eq!(parse_assignment("\"foo=bar\" junk"), Some(("foo", "bar")));
        assert_eq!(parse_assignment("\"foo=b\"a\"r\""), Some(("foo", "b\"a\"r")));
        assert_eq!(parse_assignment("\"foo=bar"), Some(("foo", "bar")));
    }

    #[test]
    fn no_assignment() {
        assert_eq!(parse_assignment("foo"), None);
        assert_eq!(parse_assignment("=bar"), None);
        assert_eq!(parse_assignment("/a x=1+2"), None);
        assert_eq!(parse_assignment("/P name=Prompt"), None);
        assert_eq!(parse_assignment(""), None);
    }

    #[test]
    fn writes_nextframe() {
        let result = run("SET Foo=bar");
        let root = &result.frames[0];
        assert_eq!(root.vars.nextframe.get("foo"), Some("bar"));
        assert!(root.vars.thisframe.is_empty());
        assert_eq!(root.commands[0].command.name, "set");
        assert_eq!(root.commands[0].command.line, "Foo=bar");
    }

    #[test]
    fn quoted_head() {
        let result = run("\"set x=y\"");
        assert_eq!(result.frames[0].vars.nextframe.get("x"), Some("y"));
        assert_eq!(result.frames[0].commands[0].command.line, "x=y");
    }

    #[test]
    fn arithmetic_recorded_only() {
        let result = run("set /a x=1+2");
        assert!(result.frames[0].vars.nextframe.is_empty());
        assert_eq!(result.names(), vec!["set"]);
    }

    #[test]
    fn percent_expansion_precedes_assignment() {
        let result = run("SET x=y&& echo %x%");
        let echo = &result.frames[0].commands[1];
        assert_eq!(echo.command.line, "%x%");
    }
}
