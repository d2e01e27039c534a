//! cmd.exe lexer.
//!
//! A logos scanner classifies raw units (escape pairs, quotes, delimiter
//! runs, operators, reserved words, literal runs). A small mode driver on top
//! turns those units into [`Token`]s, handling the places where cmd.exe's
//! grammar depends on what came before: double-quoted strings (no escapes),
//! single-quoted strings (escapes still apply) and the name/value regions of
//! a `SET` command.

use std::ops::Range;

use log::{trace, warn};
use logos::Logos;

use super::types::{Position, Token, TokenKind};

/// Raised by the scanner for input no rule matches. Recovered from by
/// emitting an [`TokenKind::Unrecognized`] token.
#[derive(Debug, Clone, PartialEq, Default, thiserror::Error)]
#[error("unrecognized input")]
pub struct LexError;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexError)]
enum Unit {
    // ═══════════════════════════════════════════════════════════════════
    // Escapes and quotes
    // ═══════════════════════════════════════════════════════════════════
    /// `^` followed by any character, newline included.
    #[regex(r"\^(.|\n)")]
    Escape,

    /// `^` at end of input.
    #[token("^")]
    Caret,

    #[token("\"")]
    DoubleQuote,

    #[token("'")]
    SingleQuote,

    // ═══════════════════════════════════════════════════════════════════
    // Separators and grouping
    // ═══════════════════════════════════════════════════════════════════
    #[regex(r"[,;= \t\n\x0b\x0c\xff]+")]
    Delimiter,

    #[token("&")]
    Ampersand,

    #[token("&&")]
    DoubleAmpersand,

    #[token("||")]
    DoublePipe,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    // ═══════════════════════════════════════════════════════════════════
    // Redirection
    // ═══════════════════════════════════════════════════════════════════
    #[token("<")]
    RedirectIn,

    #[token(">")]
    RedirectOut,

    #[token(">>")]
    RedirectOutAppend,

    /// `2>`, `1>` ...
    #[regex(r"[0-9]>")]
    RedirectOutTo,

    /// `>&1`, `2>&1` ...
    #[regex(r">&[0-9]")]
    #[regex(r"[0-9]>&[0-9]")]
    RedirectStderrStdout,

    #[token("|")]
    Pipe,

    // ═══════════════════════════════════════════════════════════════════
    // Reserved words
    // ═══════════════════════════════════════════════════════════════════
    #[token("set", ignore(case))]
    Set,

    #[token("call", ignore(case))]
    Call,

    #[token("if", ignore(case))]
    If,

    #[token("else", ignore(case))]
    Else,

    #[token("not", ignore(case))]
    Not,

    #[token("defined", ignore(case))]
    Defined,

    #[token("exist", ignore(case))]
    Exist,

    #[token("for", ignore(case))]
    For,

    #[token("in", ignore(case))]
    In,

    #[token("do", ignore(case))]
    Do,

    #[token("==")]
    DoubleEquals,

    #[token("equ", ignore(case))]
    Equ,

    #[token("neq", ignore(case))]
    Neq,

    #[token("lss", ignore(case))]
    Lss,

    #[token("leq", ignore(case))]
    Leq,

    #[token("gtr", ignore(case))]
    Gtr,

    #[token("geq", ignore(case))]
    Geq,

    // ═══════════════════════════════════════════════════════════════════
    // Everything else
    // ═══════════════════════════════════════════════════════════════════
    #[regex(r#"[^,;= \t\n\x0b\x0c\xff^"'()&|<>]+"#, allow_greedy = true)]
    Literal,
}

impl Unit {
    /// Token kind for units that map one-to-one onto a token.
    fn kind(self) -> TokenKind {
        match self {
            Unit::Escape | Unit::Caret => TokenKind::Escape,
            Unit::DoubleQuote => TokenKind::StringDquoteBegin,
            Unit::SingleQuote => TokenKind::Literal,
            Unit::Delimiter => TokenKind::Delimiter,
            Unit::Ampersand => TokenKind::CondAlways,
            Unit::DoubleAmpersand => TokenKind::CondSuccess,
            Unit::DoublePipe => TokenKind::CondOr,
            Unit::LParen => TokenKind::LParen,
            Unit::RParen => TokenKind::RParen,
            Unit::RedirectIn => TokenKind::RedirectIn,
            Unit::RedirectOut => TokenKind::RedirectOut,
            Unit::RedirectOutAppend => TokenKind::RedirectOutAppend,
            Unit::RedirectOutTo => TokenKind::RedirectOutTo,
            Unit::RedirectStderrStdout => TokenKind::RedirectStderrStdout,
            Unit::Pipe => TokenKind::RedirectPipe,
            Unit::Set => TokenKind::Set,
            Unit::Call => TokenKind::Call,
            Unit::If => TokenKind::If,
            Unit::Else => TokenKind::Else,
            Unit::Not => TokenKind::Not,
            Unit::Defined => TokenKind::Defined,
            Unit::Exist => TokenKind::Exist,
            Unit::For => TokenKind::For,
            Unit::In => TokenKind::In,
            Unit::Do => TokenKind::Do,
            Unit::DoubleEquals => TokenKind::DoubleEquals,
            Unit::Equ => TokenKind::IfEqu,
            Unit::Neq => TokenKind::IfNeq,
            Unit::Lss => TokenKind::IfLss,
            Unit::Leq => TokenKind::IfLeq,
            Unit::Gtr => TokenKind::IfGtr,
            Unit::Geq => TokenKind::IfGeq,
            Unit::Literal => TokenKind::Literal,
        }
    }

    /// Units that end the name or value region of a `SET` command.
    fn ends_set(self) -> bool {
        matches!(
            self,
            Unit::Ampersand
                | Unit::DoubleAmpersand
                | Unit::DoublePipe
                | Unit::Pipe
                | Unit::RedirectIn
                | Unit::RedirectOut
                | Unit::RedirectOutAppend
                | Unit::RedirectOutTo
                | Unit::RedirectStderrStdout
                | Unit::Caret
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Command,
    /// Between `SET` and the first name character.
    SetLead,
    SetName,
    SetValue,
}

/// Line/column bookkeeping. Tokens are emitted in source order, so the
/// cursor only ever moves forward.
struct Cursor {
    offset: usize,
    line: usize,
    col: usize,
}

impl Cursor {
    fn advance_to(&mut self, source: &str, offset: usize) {
        for ch in source[self.offset..offset].chars() {
            if ch == '\n' {
                self.line += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
        self.offset = offset;
    }
}

struct Scanner<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    cursor: Cursor,
}

impl<'s> Scanner<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            cursor: Cursor {
                offset: 0,
                line: 1,
                col: 0,
            },
        }
    }

    fn run(mut self) -> Vec<Token> {
        let mut lexer = Unit::lexer(self.source);
        let mut mode = Mode::Command;
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            let unit = match result {
                Ok(unit) => unit,
                Err(err) => {
                    warn!("{err} at byte {}: {:?}", span.start, lexer.slice());
                    self.emit(TokenKind::Unrecognized, span);
                    continue;
                }
            };
            mode = match mode {
                Mode::Command => self.command(unit, span, &mut lexer),
                Mode::SetLead => self.set_lead(unit, span, &mut lexer),
                Mode::SetName => self.set_name(unit, span, &mut lexer),
                Mode::SetValue => self.set_value(unit, span, &mut lexer),
            };
        }
        self.tokens
    }

    fn emit(&mut self, kind: TokenKind, range: Range<usize>) {
        self.cursor.advance_to(self.source, range.start);
        let text = &self.source[range];
        let position = Position {
            line: self.cursor.line,
            col_start: self.cursor.col,
            col_end: self.cursor.col + text.chars().count(),
        };
        self.tokens.push(Token::new(kind, text, position));
    }

    /// Emit, extending the previous token instead when it has the same
    /// mergeable kind. Keeps `SET` names and values in a single token.
    fn emit_merged(&mut self, kind: TokenKind, range: Range<usize>) {
        if kind.is_mergeable()
            && let Some(last) = self.tokens.last_mut()
            && last.kind == kind
        {
            let text = &self.source[range];
            last.text.push_str(text);
            last.position.col_end += text.chars().count();
            return;
        }
        self.emit(kind, range);
    }

    fn escape(&mut self, span: Range<usize>) {
        // `^` is a single byte, the escaped character may not be
        let split = span.start + 1;
        self.emit(TokenKind::Escape, span.start..split);
        self.emit(TokenKind::EscapedLiteral, split..span.end);
    }

    /// `"` opens a string that runs to the next `"`, carets included.
    fn double_quoted(&mut self, span: Range<usize>, lexer: &mut logos::Lexer<'s, Unit>) {
        let rest = lexer.remainder();
        let start = span.end;
        self.emit(TokenKind::StringDquoteBegin, span);
        match rest.find('"') {
            Some(len) => {
                if len > 0 {
                    self.emit(TokenKind::StringDquoteChar, start..start + len);
                }
                self.emit(TokenKind::StringDquoteEnd, start + len..start + len + 1);
                lexer.bump(len + 1);
            }
            None => {
                if !rest.is_empty() {
                    self.emit(TokenKind::StringDquoteChar, start..start + rest.len());
                }
                lexer.bump(rest.len());
            }
        }
    }

    /// `'` opens a string only when a closing `'` follows; escapes still apply
    /// inside. A lone `'` is an ordinary literal character.
    fn single_quoted(&mut self, span: Range<usize>, lexer: &mut logos::Lexer<'s, Unit>) {
        let rest = lexer.remainder();
        let Some((parts, close)) = squote_body(rest) else {
            self.emit(TokenKind::Literal, span);
            return;
        };
        let start = span.end;
        self.emit(TokenKind::StringSquoteBegin, span);
        for (kind, range) in parts {
            self.emit(kind, start + range.start..start + range.end);
        }
        self.emit(TokenKind::StringSquoteEnd, start + close..start + close + 1);
        lexer.bump(close + 1);
    }

    /// `SET "name=value"`: the quoted region holds the whole assignment.
    fn quoted_set(&mut self, span: Range<usize>, lexer: &mut logos::Lexer<'s, Unit>) {
        let rest = lexer.remainder();
        let start = span.end;
        self.emit(TokenKind::SetDquoteBegin, span);
        let (len, closed) = match rest.find('"') {
            Some(i) => (i, true),
            None => (rest.len(), false),
        };
        match rest[..len].find('=') {
            Some(eq) => {
                if eq > 0 {
                    self.emit(TokenKind::SetName, start..start + eq);
                }
                self.emit(TokenKind::SetAssignment, start + eq..start + eq + 1);
                if eq + 1 < len {
                    self.emit(TokenKind::SetValue, start + eq + 1..start + len);
                }
            }
            None if len > 0 => self.emit(TokenKind::SetName, start..start + len),
            None => {}
        }
        if closed {
            self.emit(TokenKind::SetDquoteEnd, start + len..start + len + 1);
            lexer.bump(len + 1);
        } else {
            lexer.bump(len);
        }
    }

    /// Split a delimiter run at its first `=`. Text before it keeps `before`,
    /// the `=` becomes the assignment and anything after starts the value.
    fn split_assignment(&mut self, span: Range<usize>, before: TokenKind, stay: Mode) -> Mode {
        let Some(eq) = self.source[span.clone()].find('=') else {
            self.emit_merged(before, span);
            return stay;
        };
        let eq_at = span.start + eq;
        if eq > 0 {
            self.emit_merged(before, span.start..eq_at);
        }
        self.emit(TokenKind::SetAssignment, eq_at..eq_at + 1);
        if eq_at + 1 < span.end {
            self.emit(TokenKind::SetValue, eq_at + 1..span.end);
        }
        Mode::SetValue
    }

    fn command(&mut self, unit: Unit, span: Range<usize>, lexer: &mut logos::Lexer<'s, Unit>) -> Mode {
        match unit {
            Unit::Set => {
                self.emit(TokenKind::Set, span);
                return Mode::SetLead;
            }
            Unit::Escape => self.escape(span),
            Unit::DoubleQuote => self.double_quoted(span, lexer),
            Unit::SingleQuote => self.single_quoted(span, lexer),
            other => self.emit(other.kind(), span),
        }
        Mode::Command
    }

    fn set_lead(&mut self, unit: Unit, span: Range<usize>, lexer: &mut logos::Lexer<'s, Unit>) -> Mode {
        match unit {
            Unit::Delimiter | Unit::DoubleEquals => {
                self.split_assignment(span, TokenKind::Delimiter, Mode::SetLead)
            }
            Unit::DoubleQuote => {
                self.quoted_set(span, lexer);
                Mode::Command
            }
            Unit::Escape => {
                self.escape(span);
                Mode::SetName
            }
            Unit::LParen | Unit::RParen => self.command(unit, span, lexer),
            u if u.ends_set() => self.command(u, span, lexer),
            _ => {
                self.emit_merged(TokenKind::SetName, span);
                Mode::SetName
            }
        }
    }

    fn set_name(&mut self, unit: Unit, span: Range<usize>, lexer: &mut logos::Lexer<'s, Unit>) -> Mode {
        match unit {
            Unit::Delimiter | Unit::DoubleEquals => {
                self.split_assignment(span, TokenKind::SetName, Mode::SetName)
            }
            Unit::Escape => {
                self.escape(span);
                Mode::SetName
            }
            u if u.ends_set() => self.command(u, span, lexer),
            _ => {
                self.emit_merged(TokenKind::SetName, span);
                Mode::SetName
            }
        }
    }

    fn set_value(&mut self, unit: Unit, span: Range<usize>, lexer: &mut logos::Lexer<'s, Unit>) -> Mode {
        match unit {
            Unit::Escape => self.escape(span),
            Unit::DoubleQuote => self.double_quoted(span, lexer),
            Unit::RParen => self.emit(TokenKind::RParen, span),
            u if u.ends_set() => return self.command(u, span, lexer),
            _ => self.emit_merged(TokenKind::SetValue, span),
        }
        Mode::SetValue
    }
}

/// Scan a single-quoted string body. Returns the inner parts (relative byte
/// ranges) and the offset of the closing quote, or `None` if it never closes.
fn squote_body(rest: &str) -> Option<(Vec<(TokenKind, Range<usize>)>, usize)> {
    let mut parts = Vec::new();
    let mut run_start = 0;
    let mut chars = rest.char_indices();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '\'' => {
                if i > run_start {
                    parts.push((TokenKind::StringSquoteChar, run_start..i));
                }
                return Some((parts, i));
            }
            '^' => {
                let (j, next) = chars.next()?;
                if i > run_start {
                    parts.push((TokenKind::StringSquoteChar, run_start..i));
                }
                let end = j + next.len_utf8();
                parts.push((TokenKind::Escape, i..j));
                parts.push((TokenKind::EscapedLiteral, j..end));
                run_start = end;
            }
            _ => {}
        }
    }
    None
}

/// Tokenize a command line. Never fails: unterminated quotes degrade to an
/// open string, unknown input to [`TokenKind::Unrecognized`]. Concatenating
/// the token texts gives back `text` exactly.
pub fn tokenize(text: &str) -> Vec<Token> {
    let tokens = Scanner::new(text).run();
    trace!("tokenized {} bytes into {} tokens", text.len(), tokens.len());
    tokens
}

/// Fold each terminated `BEGIN CHAR* END` run into one
/// [`TokenKind::StringDquote`] token whose text includes the quotes.
pub fn collapse_strings(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut open: Option<usize> = None;
    for token in tokens {
        match token.kind {
            TokenKind::StringDquoteBegin => {
                open = Some(out.len());
                out.push(token);
            }
            TokenKind::StringDquoteChar if open.is_some() => out.push(token),
            TokenKind::StringDquoteEnd => match open.take() {
                Some(start) => {
                    let parts = out.split_off(start);
                    let mut position = parts[0].position;
                    position.col_end = token.position.col_end;
                    let mut text: String = parts.iter().map(|t| t.text.as_str()).collect();
                    text.push_str(&token.text);
                    out.push(Token::new(TokenKind::StringDquote, text, position));
                }
                None => out.push(token),
            },
            _ => {
                open = None;
                out.push(token);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::stringify;
    use TokenKind::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).into_iter().map(|t| t.kind).collect()
    }

    fn collapsed(text: &str) -> Vec<(TokenKind, String)> {
        collapse_strings(tokenize(text))
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn literal_run() {
        assert_eq!(kinds("calc.exe"), vec![Literal]);
        assert_eq!(tokenize("calc.exe")[0].text, "calc.exe");
    }

    #[test]
    fn delimiters_collapse_to_one_token() {
        let tokens = tokenize(",;= \t;; \t\u{ff}\x0b\x0c  ");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, Delimiter);
    }

    #[test]
    fn delimiters_around_literal() {
        assert_eq!(kinds(",;,cmd,;,"), vec![Delimiter, Literal, Delimiter]);
    }

    #[test]
    fn escapes_pair_up() {
        assert_eq!(kinds("^p"), vec![Escape, EscapedLiteral]);
        for special in ["^^", "^&", "^|", "^<", "^>", "^(", "^)", "^ ", "^%", "^\""] {
            assert_eq!(kinds(special), vec![Escape, EscapedLiteral], "{special}");
        }
    }

    #[test]
    fn escaped_percent_between_literals() {
        assert_eq!(
            kinds("^%foo^%"),
            vec![Escape, EscapedLiteral, Literal, Escape, EscapedLiteral]
        );
    }

    #[test]
    fn trailing_caret_is_escape() {
        assert_eq!(kinds("calc^"), vec![Literal, Escape]);
    }

    #[test]
    fn escaped_quote_then_open_string() {
        assert_eq!(
            kinds("^\"a\""),
            vec![Escape, EscapedLiteral, Literal, StringDquoteBegin]
        );
    }

    #[test]
    fn caret_inside_double_quotes_is_plain() {
        assert_eq!(
            collapsed("\"a^\""),
            vec![(StringDquote, "\"a^\"".to_string())]
        );
    }

    #[test]
    fn backslash_does_not_escape_quote() {
        assert_eq!(
            collapsed("\"foo\\\""),
            vec![(StringDquote, "\"foo\\\"".to_string())]
        );
    }

    #[test]
    fn lone_quote_is_open_string() {
        assert_eq!(kinds("\""), vec![StringDquoteBegin]);
    }

    #[test]
    fn unterminated_string_keeps_chars() {
        assert_eq!(kinds("\"ab"), vec![StringDquoteBegin, StringDquoteChar]);
        assert_eq!(collapsed("\"ab").len(), 2);
    }

    #[test]
    fn empty_string() {
        assert_eq!(kinds("\"\""), vec![StringDquoteBegin, StringDquoteEnd]);
    }

    #[test]
    fn single_quotes_keep_escapes() {
        assert_eq!(
            kinds("'a^b'"),
            vec![
                StringSquoteBegin,
                StringSquoteChar,
                Escape,
                EscapedLiteral,
                StringSquoteEnd
            ]
        );
    }

    #[test]
    fn lone_single_quote_is_literal() {
        assert_eq!(kinds("it's"), vec![Literal, Literal, Literal]);
    }

    #[test]
    fn reserved_words_any_case() {
        assert_eq!(kinds("CALL"), vec![Call]);
        assert_eq!(kinds("call"), vec![Call]);
        assert_eq!(kinds("calc"), vec![Literal]);
        assert_eq!(kinds("If"), vec![If]);
        assert_eq!(kinds("settings"), vec![Literal]);
    }

    #[test]
    fn if_comparisons() {
        assert_eq!(
            kinds("IF NOT DEFINED foo"),
            vec![If, Delimiter, Not, Delimiter, Defined, Delimiter, Literal]
        );
        assert_eq!(kinds("a==b"), vec![Literal, DoubleEquals, Literal]);
        assert_eq!(
            kinds("1 EQU 2"),
            vec![Literal, Delimiter, IfEqu, Delimiter, Literal]
        );
        assert_eq!(kinds("gtr"), vec![IfGtr]);
    }

    #[test]
    fn for_loop_words() {
        assert_eq!(
            kinds("FOR %a IN (x) DO y"),
            vec![
                For, Delimiter, Literal, Delimiter, In, Delimiter, LParen, Literal, RParen,
                Delimiter, Do, Delimiter, Literal
            ]
        );
    }

    #[test]
    fn chain_operators() {
        assert_eq!(kinds("a&b"), vec![Literal, CondAlways, Literal]);
        assert_eq!(kinds("a&&b"), vec![Literal, CondSuccess, Literal]);
        assert_eq!(kinds("a||b"), vec![Literal, CondOr, Literal]);
    }

    #[test]
    fn redirections() {
        assert_eq!(kinds("<"), vec![RedirectIn]);
        assert_eq!(kinds(">"), vec![RedirectOut]);
        assert_eq!(kinds(">>"), vec![RedirectOutAppend]);
        assert_eq!(kinds("|"), vec![RedirectPipe]);
        assert_eq!(kinds("a 2>&1"), vec![Literal, Delimiter, RedirectStderrStdout]);
        assert_eq!(kinds("a>&2"), vec![Literal, RedirectStderrStdout]);
        assert_eq!(kinds("a 2>nul"), vec![Literal, Delimiter, RedirectOutTo, Literal]);
    }

    #[test]
    fn ampersand_before_digit_is_a_chain() {
        assert_eq!(kinds("whoami&1.bat"), vec![Literal, CondAlways, Literal]);
        assert_eq!(kinds("a&&1"), vec![Literal, CondSuccess, Literal]);
    }

    #[test]
    fn set_region() {
        assert_eq!(
            kinds("SET abc=x;y;z;&&echo"),
            vec![Set, Delimiter, SetName, SetAssignment, SetValue, CondSuccess, Literal]
        );
        let tokens = tokenize("SET abc=x;y;z;&&echo");
        assert_eq!(tokens[2].text, "abc");
        assert_eq!(tokens[4].text, "x;y;z;");
    }

    #[test]
    fn set_name_with_spaces_and_escapes() {
        let tokens = tokenize("set a b=c");
        assert_eq!(tokens[2].kind, SetName);
        assert_eq!(tokens[2].text, "a b");

        assert_eq!(
            kinds("SET ^>=foo"),
            vec![Set, Delimiter, Escape, EscapedLiteral, SetAssignment, SetValue]
        );
    }

    #[test]
    fn set_value_keeps_reserved_words() {
        let tokens = tokenize("set x=if not");
        assert_eq!(tokens.last().map(|t| (t.kind, t.text.as_str())), Some((SetValue, "if not")));
    }

    #[test]
    fn quoted_set() {
        assert_eq!(
            kinds("Set \"foo=bar\" & echo"),
            vec![
                Set,
                Delimiter,
                SetDquoteBegin,
                SetName,
                SetAssignment,
                SetValue,
                SetDquoteEnd,
                Delimiter,
                CondAlways,
                Delimiter,
                Literal
            ]
        );
    }

    #[test]
    fn set_value_ends_at_redirect() {
        assert_eq!(
            kinds("set x=y>nul"),
            vec![Set, Delimiter, SetName, SetAssignment, SetValue, RedirectOut, Literal]
        );
    }

    #[test]
    fn positions_track_lines() {
        let tokens = tokenize("ab cd\nef");
        assert_eq!(tokens[0].position, Position { line: 1, col_start: 0, col_end: 2 });
        assert_eq!(tokens[2].position, Position { line: 1, col_start: 3, col_end: 5 });
        let last = tokens.last().map(|t| t.position);
        assert_eq!(last, Some(Position { line: 2, col_start: 0, col_end: 2 }));
    }

    #[test]
    fn round_trip() {
        for text in [
            "cmd /c \"set x=y&&call echo %x%\"",
            "^p^o^w^e^r^s^h^e^l^l -e 'a^b' \"unterminated",
            "SET \"a=b\" & set c==d| x 2>&1 >> out.txt",
            "(((calc))) || w\"\"scr\"\"ipt & it's ^",
            "ÿ€ünicode ^€",
        ] {
            assert_eq!(stringify(&tokenize(text)), text);
        }
    }
}
