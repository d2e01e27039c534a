pub mod context;
pub mod frame;

pub use context::CommandContext;
pub use frame::{CommandLine, CommandRecord, Frame, FrameVars, InterpretError, Interpretation};

use std::collections::{BTreeSet, HashMap};

use log::{debug, trace, warn};

use crate::commands::{
    CommandHandler, call::CallHandler, cmd::CmdHandler, generic::GenericHandler, set::SetHandler,
};
use crate::error::Error;
use crate::expand::{ExpandOptions, Vars, default_vars, expand};
use crate::parse::{
    FilterOptions, IdentifiedCommand, SwitchValue, Switches, Token, TokenKind, command_blocks,
    identify_command, stringify, tokenize,
};

/// Default nesting limit for `cmd`/`CALL` bodies.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Knobs for one [`Interpreter`].
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretOptions {
    pub filters: FilterOptions,
    /// Delayed `!` expansion in the root frame.
    pub delayed_expansion: bool,
    pub enable_extensions: bool,
    /// The environment every frame starts from.
    pub vars: Vars,
    pub max_depth: usize,
    /// Names recorded by the generic handler even when a built-in exists.
    pub passthrough: BTreeSet<String>,
}

impl Default for InterpretOptions {
    fn default() -> Self {
        Self {
            filters: FilterOptions::default(),
            delayed_expansion: false,
            enable_extensions: true,
            vars: default_vars(),
            max_depth: DEFAULT_MAX_DEPTH,
            passthrough: BTreeSet::new(),
        }
    }
}

/// Handler registry plus options. Holds no per-run state, so one instance
/// can interpret any number of command lines.
pub struct Interpreter {
    handlers: HashMap<String, Box<dyn CommandHandler>>,
    options: InterpretOptions,
}

impl Interpreter {
    /// Build an interpreter with the built-in `cmd`, `set` and `call`
    /// handlers, minus any passthrough names.
    pub fn new(options: InterpretOptions) -> Result<Self, Error> {
        if options.max_depth == 0 {
            return Err(Error::InvalidOptions("max_depth must be at least 1".into()));
        }
        let mut interpreter = Self {
            handlers: HashMap::new(),
            options,
        };
        interpreter.register("cmd", Box::new(CmdHandler));
        interpreter.register("set", Box::new(SetHandler));
        interpreter.register("call", Box::new(CallHandler));
        Ok(interpreter)
    }

    pub fn options(&self) -> &InterpretOptions {
        &self.options
    }

    /// Add or replace the handler for `name` (matched lower-case).
    /// Passthrough names are ignored.
    pub fn register(&mut self, name: &str, handler: Box<dyn CommandHandler>) {
        let name = name.to_lowercase();
        if self.options.passthrough.contains(&name) {
            debug!("{name} is passthrough, not registering a handler");
            return;
        }
        self.handlers.insert(name, handler);
    }

    fn handler(&self, name: &str) -> &dyn CommandHandler {
        self.handlers
            .get(name)
            .map_or(&GenericHandler as &dyn CommandHandler, |h| h.as_ref())
    }

    /// Interpret one command line. Never fails; cut-off branches show up
    /// in [`Interpretation::errors`].
    pub fn interpret(&self, text: &str) -> Interpretation {
        let mut session = Session::new(self);
        session.run_line(text, None, 0);
        session.finish()
    }
}

/// State of one [`Interpreter::interpret`] call.
pub struct Session<'i> {
    interpreter: &'i Interpreter,
    frames: Vec<Frame>,
    errors: Vec<InterpretError>,
    seq: usize,
}

impl<'i> Session<'i> {
    fn new(interpreter: &'i Interpreter) -> Self {
        Self {
            interpreter,
            frames: Vec::new(),
            errors: Vec::new(),
            seq: 0,
        }
    }

    fn finish(self) -> Interpretation {
        let mut frames = self.frames;
        frames.reverse();
        Interpretation {
            frames,
            errors: self.errors,
        }
    }

    pub fn options(&self) -> &'i InterpretOptions {
        &self.interpreter.options
    }

    pub fn frame(&self, index: usize) -> &Frame {
        &self.frames[index]
    }

    pub fn frame_mut(&mut self, index: usize) -> &mut Frame {
        &mut self.frames[index]
    }

    /// Push a new scope and return its index.
    pub fn push_frame(&mut self, frame: Frame) -> usize {
        self.frames.push(frame);
        let index = self.frames.len() - 1;
        debug!("entered frame {index}");
        index
    }

    /// Append a trace entry to `frame`.
    pub fn record(&mut self, frame: usize, command: CommandLine, options: Switches, text: &str) {
        debug!("frame {frame}: {} {}", command.name, command.line);
        let record = CommandRecord {
            command,
            options,
            text: text.to_string(),
            seq: self.seq,
        };
        self.seq += 1;
        self.frames[frame].commands.push(record);
    }

    fn root(&mut self) -> usize {
        if self.frames.is_empty() {
            let options = &self.interpreter.options;
            let mut switches = Switches::new();
            if options.delayed_expansion {
                switches.insert("delayed_expansion".into(), SwitchValue::Flag(true));
            }
            if !options.enable_extensions {
                switches.insert("cmd_extensions".into(), SwitchValue::Flag(false));
            }
            self.push_frame(Frame::for_cmd(None, switches));
        }
        0
    }

    fn extensions(&self, frame: Option<usize>) -> bool {
        let default = self.interpreter.options.enable_extensions;
        frame.map_or(default, |i| self.frames[i].extensions(default))
    }

    /// Run one logical line in `frame` (`None` for the top level, which
    /// lands in the root frame).
    pub fn run_line(&mut self, text: &str, frame: Option<usize>, depth: usize) {
        let limit = self.interpreter.options.max_depth;
        if depth >= limit {
            warn!("depth limit {limit} reached, not interpreting: {text}");
            self.errors.push(InterpretError::DepthExceeded {
                limit,
                line: text.to_string(),
            });
            return;
        }

        let scope = frame.or(if self.frames.is_empty() { None } else { Some(0) });
        let vars = match scope {
            Some(i) => self.interpreter.options.vars.overlay(&self.frames[i].vars.thisframe),
            None => self.interpreter.options.vars.clone(),
        };
        let percent = ExpandOptions {
            sigil: '%',
            enable_extensions: self.extensions(scope),
        };
        let expanded = expand(text, &vars, &percent);
        if expanded != text {
            trace!("expanded {text:?} to {expanded:?}");
        }

        let tokens = tokenize(&expanded);
        for block in command_blocks(&tokens) {
            let index = match frame {
                Some(i) => i,
                None => self.root(),
            };
            self.run_block(block, index, depth);
        }
    }

    fn run_block(&mut self, mut block: Vec<Token>, frame: usize, depth: usize) {
        let interpreter = self.interpreter;
        let options = &interpreter.options;

        let current = &self.frames[frame];
        if current.delayed_expansion() {
            let text = stringify(&block);
            if text.contains('!') {
                let vars = options.vars.overlay(&current.delayed_vars());
                let delayed = ExpandOptions {
                    sigil: '!',
                    enable_extensions: current.extensions(options.enable_extensions),
                };
                block = tokenize(&expand(&text, &vars, &delayed));
            }
        }

        let tokens = strip_grouping(options.filters.apply(block));
        if tokens.iter().any(|t| t.kind == TokenKind::Unrecognized) {
            warn!("unrecognized input in: {}", stringify(&tokens));
        }
        let text = stringify(&tokens).trim().to_string();
        if text.is_empty() {
            return;
        }

        let ident = identify_command(&tokens);
        trace!("identified {:?} at {:?}", ident.command, ident.offset);
        let ctx = CommandContext {
            tokens: &tokens,
            ident: &ident,
            frame,
            depth,
            text: &text,
        };
        interpreter.handler(&ident.command).handle(self, &ctx);
    }

    /// Identify `text` the way a sub-command would be.
    pub fn identify(&self, text: &str) -> (Vec<Token>, IdentifiedCommand) {
        let tokens = strip_grouping(self.interpreter.options.filters.apply(tokenize(text)));
        let ident = identify_command(&tokens);
        (tokens, ident)
    }
}

/// Peel matching outer `(`/`)` pairs and the delimiters around them.
fn strip_grouping(tokens: Vec<Token>) -> Vec<Token> {
    let mut inner: &[Token] = &tokens;
    loop {
        while inner.first().is_some_and(|t| t.kind == TokenKind::Delimiter) {
            inner = &inner[1..];
        }
        while inner.last().is_some_and(|t| t.kind == TokenKind::Delimiter) {
            inner = &inner[..inner.len() - 1];
        }
        match (inner.first(), inner.last()) {
            (Some(first), Some(last))
                if inner.len() >= 2
                    && first.kind == TokenKind::LParen
                    && last.kind == TokenKind::RParen =>
            {
                inner = &inner[1..inner.len() - 1];
            }
            _ => break,
        }
    }
    inner.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> Interpretation {
        Interpreter::new(InterpretOptions::default())
            .unwrap()
            .interpret(text)
    }

    fn grouped(text: &str) -> String {
        stringify(&strip_grouping(tokenize(text)))
    }

    #[test]
    fn zero_depth_rejected() {
        let options = InterpretOptions {
            max_depth: 0,
            ..InterpretOptions::default()
        };
        assert!(matches!(Interpreter::new(options), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn empty_input_has_no_frames() {
        let result = run("");
        assert!(result.frames.is_empty());
        assert!(result.is_complete());
    }

    #[test]
    fn siblings_share_root() {
        let result = run("calc & notepad || wscript");
        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.names(), vec!["calc", "notepad", "wscript"]);
    }

    #[test]
    fn grouping_stripped() {
        assert_eq!(grouped("(((calc)))"), "calc");
        assert_eq!(grouped(" ( calc ) "), "calc");
        assert_eq!(grouped("(calc"), "(calc");
        assert_eq!(grouped("echo (x)"), "echo (x)");
        assert_eq!(grouped("calc)"), "calc)");
    }

    #[test]
    fn root_frame_carries_delayed_option() {
        let options = InterpretOptions {
            delayed_expansion: true,
            ..InterpretOptions::default()
        };
        let result = Interpreter::new(options).unwrap().interpret("set a=1& echo !a!");
        let echo = result.records().into_iter().find(|r| r.command.name == "echo").unwrap();
        assert_eq!(echo.command.line, "1");
    }

    #[test]
    fn passthrough_disables_builtin() {
        let options = InterpretOptions {
            passthrough: BTreeSet::from(["cmd".to_string()]),
            ..InterpretOptions::default()
        };
        let result = Interpreter::new(options).unwrap().interpret("cmd /c calc");
        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.names(), vec!["cmd"]);
    }

    #[test]
    fn depth_limit_cuts_branch() {
        let options = InterpretOptions {
            max_depth: 2,
            ..InterpretOptions::default()
        };
        let result = Interpreter::new(options)
            .unwrap()
            .interpret("cmd /c cmd /c cmd /c calc");
        assert_eq!(
            result.errors,
            vec![InterpretError::DepthExceeded {
                limit: 2,
                line: "cmd /c calc".into()
            }]
        );
        assert_eq!(result.names(), vec!["cmd", "cmd"]);
    }
}
