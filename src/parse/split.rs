//! Splitting a command line at chain operators.
//!
//! Two tiers: [`split_command`] is the public, string-level split on `&` and
//! `&&` only. [`command_blocks`] is the finer token-level split the
//! interpreter uses, which also breaks at `||`.

use super::tokenize::tokenize;
use super::types::{Token, TokenKind, stringify};

/// Split a command line into sub-commands at `&` and `&&`.
///
/// Works on an unfiltered token pass, so escaped (`^&`) and quoted
/// ampersands never split. Segments are trimmed; empty ones are dropped.
pub fn split_command(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    tokens
        .split(|t| matches!(t.kind, TokenKind::CondAlways | TokenKind::CondSuccess))
        .map(|segment| stringify(segment).trim().to_string())
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Split a token list into blocks at every chain operator (`&`, `&&`,
/// `||`). Blocks holding nothing but delimiters are dropped.
pub fn command_blocks(tokens: &[Token]) -> Vec<Vec<Token>> {
    tokens
        .split(|t| t.kind.is_chain())
        .filter(|block| block.iter().any(|t| t.kind != TokenKind::Delimiter))
        .map(<[Token]>::to_vec)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_ampersand() {
        assert_eq!(split_command("echo foo & echo bar"), vec!["echo foo", "echo bar"]);
    }

    #[test]
    fn split_on_double_ampersand() {
        assert_eq!(split_command("echo foo&&calc"), vec!["echo foo", "calc"]);
    }

    #[test]
    fn trailing_operator_dropped() {
        assert_eq!(split_command("echo foo &"), vec!["echo foo"]);
    }

    #[test]
    fn empty_segments_dropped() {
        assert_eq!(
            split_command("echo foo & & & calc.exe"),
            vec!["echo foo", "calc.exe"]
        );
    }

    #[test]
    fn or_and_semicolon_do_not_split() {
        assert_eq!(split_command("a || b"), vec!["a || b"]);
        assert_eq!(split_command("a ; b"), vec!["a ; b"]);
    }

    #[test]
    fn escaped_and_quoted_ampersands_do_not_split() {
        assert_eq!(split_command("echo a^&b"), vec!["echo a^&b"]);
        assert_eq!(split_command("echo \"a&b\""), vec!["echo \"a&b\""]);
    }

    #[test]
    fn ampersand_before_digit_splits() {
        assert_eq!(split_command("whoami&1.bat"), vec!["whoami", "1.bat"]);
        assert_eq!(split_command("a 2>&1 & b"), vec!["a 2>&1", "b"]);
        assert_eq!(split_command("a >&2&b"), vec!["a >&2", "b"]);
    }

    #[test]
    fn no_operator_single_segment() {
        assert_eq!(split_command("  calc  "), vec!["calc"]);
        assert!(split_command("").is_empty());
    }

    #[test]
    fn blocks_split_on_every_chain_operator() {
        let tokens = tokenize("calc && (powershell) || wscript & notepad");
        let blocks: Vec<String> = command_blocks(&tokens)
            .iter()
            .map(|b| stringify(b))
            .collect();
        assert_eq!(
            blocks,
            vec!["calc ", " (powershell) ", " wscript ", " notepad"]
        );
    }

    #[test]
    fn blank_blocks_dropped() {
        let tokens = tokenize("a & & ,; & b");
        assert_eq!(command_blocks(&tokens).len(), 2);
    }
}
