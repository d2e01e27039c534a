use crate::parse::{IdentifiedCommand, Token, stringify};

/// Everything a handler knows about the sub-command it is dispatched on.
#[derive(Debug)]
pub struct CommandContext<'a> {
    /// Filtered tokens of this sub-command, grouping parentheses removed.
    pub tokens: &'a [Token],
    pub ident: &'a IdentifiedCommand,
    /// Index of the frame the sub-command runs in.
    pub frame: usize,
    /// Nesting depth of the line this sub-command came from.
    pub depth: usize,
    /// The cleaned sub-command text.
    pub text: &'a str,
}

impl<'a> CommandContext<'a> {
    /// The identified command name; empty when unidentified.
    pub fn name(&self) -> &str {
        &self.ident.command
    }

    /// Argument tokens after the command.
    pub fn rest(&self) -> &'a [Token] {
        self.ident.rest(self.tokens)
    }

    /// Argument text, trimmed.
    pub fn line(&self) -> String {
        stringify(self.rest()).trim().to_string()
    }
}
