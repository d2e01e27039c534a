//! Variable scopes and the command trace they collect.

use serde::Serialize;

use crate::expand::Vars;
use crate::parse::{SwitchValue, Switches};

/// The two variable tables of one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrameVars {
    /// Readable by `%name%` in this scope.
    pub thisframe: Vars,
    /// Written by `SET` in this scope; seen by `!name!` and by child scopes.
    pub nextframe: Vars,
}

/// The command and argument text of one trace entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandLine {
    pub name: String,
    pub line: String,
}

/// One executed sub-command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRecord {
    pub command: CommandLine,
    /// Switches for `cmd`, empty otherwise.
    pub options: Switches,
    /// The whole sub-command after filtering.
    pub text: String,
    /// Global execution order across all frames.
    #[serde(skip)]
    pub seq: usize,
}

/// One `cmd`/`CALL` nesting level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub vars: FrameVars,
    pub options: Switches,
    pub commands: Vec<CommandRecord>,
}

impl Frame {
    /// Scope of a `cmd` child: it reads what the parent set.
    pub fn for_cmd(parent: Option<&Frame>, options: Switches) -> Self {
        Self {
            vars: FrameVars {
                thisframe: parent.map(|p| p.vars.nextframe.clone()).unwrap_or_default(),
                nextframe: Vars::new(),
            },
            options,
            commands: Vec::new(),
        }
    }

    /// Scope of a `CALL`: the parent's tables swapped. Switches carry over
    /// since the call runs in the same interpreter process.
    pub fn for_call(parent: &Frame) -> Self {
        Self {
            vars: FrameVars {
                thisframe: parent.vars.nextframe.clone(),
                nextframe: parent.vars.thisframe.clone(),
            },
            options: parent.options.clone(),
            commands: Vec::new(),
        }
    }

    fn flag(&self, name: &str) -> Option<bool> {
        match self.options.get(name)? {
            SwitchValue::Flag(on) => Some(*on),
            SwitchValue::Text(_) => None,
        }
    }

    pub fn delayed_expansion(&self) -> bool {
        self.flag("delayed_expansion").unwrap_or(false)
    }

    /// `cmd /E:OFF` turns extensions off; anything else keeps `default`.
    pub fn extensions(&self, default: bool) -> bool {
        self.flag("cmd_extensions").unwrap_or(default)
    }

    /// What `!name!` sees.
    pub fn delayed_vars(&self) -> Vars {
        self.vars.thisframe.overlay(&self.vars.nextframe)
    }
}

/// Per-branch failures. Never abort the whole run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum InterpretError {
    #[error("recursion depth limit {limit} exceeded at: {line}")]
    DepthExceeded { limit: usize, line: String },
}

/// Result of interpreting one command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Interpretation {
    /// Every scope entered, most recent first.
    pub frames: Vec<Frame>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<InterpretError>,
}

impl Interpretation {
    /// All trace entries in execution order.
    pub fn records(&self) -> Vec<&CommandRecord> {
        let mut records: Vec<&CommandRecord> =
            self.frames.iter().flat_map(|f| f.commands.iter()).collect();
        records.sort_by_key(|r| r.seq);
        records
    }

    /// Cleaned sub-commands in execution order.
    pub fn commands(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.text.clone()).collect()
    }

    /// Identified command names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.records()
            .into_iter()
            .map(|r| r.command.name.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}
