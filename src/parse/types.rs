//! Token types produced by the lexer and consumed by the filters, the
//! identifier, the splitter and the interpreter.

use serde::Serialize;

/// Kind of a lexical token. Closed set; serialised as `SCREAMING_SNAKE_CASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// Run of ordinary characters outside any quote.
    Literal,
    /// The `^` of an escape pair.
    Escape,
    /// The character following a `^`.
    EscapedLiteral,

    StringDquoteBegin,
    StringDquoteChar,
    StringDquoteEnd,
    /// A whole double-quoted string, quotes included (see `collapse_strings`).
    StringDquote,

    StringSquoteBegin,
    StringSquoteChar,
    StringSquoteEnd,

    /// The `SET` reserved word.
    Set,
    /// Variable-name characters of a `SET` command.
    SetName,
    /// The `=` separating name from value in a `SET` command.
    SetAssignment,
    /// Value characters of a `SET` command.
    SetValue,
    SetDquoteBegin,
    SetDquoteEnd,

    /// Run of `,` `;` `=` space, tab, newline, `\x0b`, `\x0c`, `\xff`.
    Delimiter,

    /// `&`: run the next command unconditionally.
    CondAlways,
    /// `&&`: run the next command if this one succeeded.
    CondSuccess,
    /// `||`: run the next command if this one failed.
    CondOr,

    LParen,
    RParen,

    Call,
    If,
    Else,
    Not,
    Defined,
    Exist,
    For,
    In,
    Do,

    /// `==`
    DoubleEquals,
    IfEqu,
    IfNeq,
    IfLss,
    IfLeq,
    IfGtr,
    IfGeq,

    /// `<`
    RedirectIn,
    /// `>`
    RedirectOut,
    /// `>>`
    RedirectOutAppend,
    /// `2>` and friends.
    RedirectOutTo,
    /// `>&1`, `2>&1` ...
    RedirectStderrStdout,
    /// `|`
    RedirectPipe,

    /// Input the grammar could not classify. Text is kept verbatim.
    Unrecognized,
}

impl TokenKind {
    /// Chain operators separating commands on one line.
    pub fn is_chain(self) -> bool {
        matches!(
            self,
            TokenKind::CondAlways | TokenKind::CondSuccess | TokenKind::CondOr
        )
    }

    /// Bare words: literals and reserved words other than `SET`.
    pub fn is_word(self) -> bool {
        matches!(
            self,
            TokenKind::Literal
                | TokenKind::Call
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Not
                | TokenKind::Defined
                | TokenKind::Exist
                | TokenKind::For
                | TokenKind::In
                | TokenKind::Do
                | TokenKind::IfEqu
                | TokenKind::IfNeq
                | TokenKind::IfLss
                | TokenKind::IfLeq
                | TokenKind::IfGtr
                | TokenKind::IfGeq
        )
    }

    pub fn is_redirection(self) -> bool {
        matches!(
            self,
            TokenKind::RedirectIn
                | TokenKind::RedirectOut
                | TokenKind::RedirectOutAppend
                | TokenKind::RedirectOutTo
                | TokenKind::RedirectStderrStdout
                | TokenKind::RedirectPipe
        )
    }

    /// Kinds whose neighbours of the same kind can be fused into one token.
    pub fn is_mergeable(self) -> bool {
        matches!(
            self,
            TokenKind::Literal
                | TokenKind::StringDquoteChar
                | TokenKind::StringSquoteChar
                | TokenKind::SetName
                | TokenKind::SetValue
        )
    }
}

/// Where a token starts and ends in the source text.
///
/// `line` is 1-based; columns are 0-based character offsets on that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub col_start: usize,
    pub col_end: usize,
}

/// A typed, text-bearing token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Same token with a different kind.
    pub fn with_kind(mut self, kind: TokenKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Concatenate token texts back into a command string.
pub fn stringify(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}
