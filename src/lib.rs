//! cmd-deob: a de-obfuscator for Windows `cmd.exe` command lines.
//!
//! Obfuscated BATCH one-liners hide the program they run behind escapes
//! (`p^o^w^e^r^s^h^e^l^l`), empty strings (`w""script`), variable
//! substring tricks (`%comspec:~-7,3%`) and nested `cmd /c` / `CALL`
//! layers. This crate lexes such a line the way `cmd.exe` would, cleans
//! the tokens, expands variables per scope, and records every command that
//! would run, frame by frame.
//!
//! # Architecture
//!
//! - **[`parse`]**: lexer, token filters, command identification and chain splitting.
//! - **[`expand`]**: `%var%` / `!var!` expansion with substring and replace forms.
//! - **[`eval`]**: the interpreter: frames, dispatch, depth limit, result types.
//! - **[`commands`]**: handlers for `cmd`, `SET`, `CALL` and the generic recorder.
//! - **[`config`]**: embedded defaults + user overlay merge.
//! - **[`logging`]**: `log` facade setup for the binary.

/// Handler trait and the built-in command handlers.
pub mod commands;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Crate-level error type.
pub mod error;
/// Interpreter, frames and the interpretation result.
pub mod eval;
/// Variable tables and expansion.
pub mod expand;
/// Logger setup and interpretation summaries.
pub mod logging;
/// Lexing, filtering, identification and splitting.
pub mod parse;

pub use error::Error;
pub use eval::{InterpretError, InterpretOptions, Interpretation, Interpreter};
pub use expand::{ExpandOptions, Vars, expand_variables};
pub use parse::{Token, TokenKind, identify_command, split_command};

/// Tokenize `text`. With `filter`, the default filter pipeline runs and
/// terminated strings are folded into single tokens.
pub fn tokenize(text: &str, filter: bool) -> Vec<Token> {
    let tokens = parse::tokenize(text);
    if filter {
        parse::collapse_strings(parse::FilterOptions::default().apply(tokens))
    } else {
        tokens
    }
}

/// Interpret a command line with `options`.
///
/// This is the main entry point. Build an [`Interpreter`] directly to reuse
/// it or to register extra handlers.
pub fn interpret(text: &str, options: &InterpretOptions) -> Result<Interpretation, Error> {
    Ok(Interpreter::new(options.clone())?.interpret(text))
}

/// Clean a single command line with the default filters, no expansion.
pub fn deobfuscate(text: &str) -> String {
    parse::deobfuscate(text, &parse::FilterOptions::default())
}
