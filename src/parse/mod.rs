pub mod filter;
pub mod identify;
pub mod split;
pub mod tokenize;
pub mod types;

pub use filter::{FilterOptions, deobfuscate};
pub use identify::{
    CmdArgs, IdentifiedCommand, SwitchValue, Switches, identify_command, parse_cmd_switches,
};
pub use split::{command_blocks, split_command};
pub use tokenize::{LexError, collapse_strings, tokenize};
pub use types::{Position, Token, TokenKind, stringify};
