//! Token filters: pure `Vec<Token> -> Vec<Token>` normalisation passes.
//!
//! The pipeline order is fixed: apply escapes, strip empty strings, merge
//! literals, widen strings, strip whitespace, strip commas. Running it over
//! its own output is a no-op, which the interpreter relies on when it
//! re-tokenizes the body of a nested `cmd`.

use log::trace;
use serde::{Deserialize, Serialize};

use super::tokenize::tokenize;
use super::types::{Token, TokenKind, stringify};

/// Which filters run. Field names double as config keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterOptions {
    /// `^x` becomes the literal `x`.
    pub strip_escapes: bool,
    /// `""` disappears.
    pub strip_empty_strings: bool,
    /// Neighbouring literal runs fuse into one token.
    pub merge_contiguous_literals: bool,
    /// Strings touching each other (`"a""b"`) fuse when widened.
    pub merge_contiguous_strings: bool,
    /// Quoted strings absorb literals glued to them (`c"al"c` → `"calc"`).
    pub widen_strings: bool,
    pub strip_whitespace: bool,
    /// Off by default: commas and semicolons are argument separators too.
    pub strip_commas: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            strip_escapes: true,
            strip_empty_strings: true,
            merge_contiguous_literals: true,
            merge_contiguous_strings: true,
            widen_strings: true,
            strip_whitespace: true,
            strip_commas: false,
        }
    }
}

impl FilterOptions {
    /// Run every enabled filter in pipeline order.
    pub fn apply(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut tokens = tokens;
        if self.strip_escapes {
            tokens = apply_escapes(tokens);
        }
        if self.strip_empty_strings {
            tokens = strip_empty_strings(tokens);
        }
        if self.merge_contiguous_literals {
            tokens = merge_contiguous_literals(tokens);
        }
        if self.widen_strings {
            tokens = widen_strings(tokens, self.merge_contiguous_strings);
        }
        if self.strip_whitespace {
            tokens = strip_excessive_whitespace(tokens);
        }
        if self.strip_commas {
            tokens = strip_commas(tokens);
        }
        trace!("filtered: {:?}", stringify(&tokens));
        tokens
    }
}

/// Tokenize, filter and stringify in one go.
pub fn deobfuscate(text: &str, options: &FilterOptions) -> String {
    stringify(&options.apply(tokenize(text)))
}

/// Append `next` to `into`, keeping `into`'s start position.
fn fuse(into: &mut Token, next: &Token) {
    into.text.push_str(&next.text);
    if next.position.line == into.position.line {
        into.position.col_end = next.position.col_end;
    } else {
        into.position.col_end += next.text.chars().count();
    }
}

/// Drop `^` markers; the escaped character becomes a plain literal.
pub fn apply_escapes(tokens: Vec<Token>) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Escape)
        .map(|t| match t.kind {
            TokenKind::EscapedLiteral => t.with_kind(TokenKind::Literal),
            _ => t,
        })
        .collect()
}

/// Remove `""` pairs. A stack pass, so `""""` disappears in one go.
pub fn strip_empty_strings(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.kind == TokenKind::StringDquoteEnd
            && out
                .last()
                .is_some_and(|t| t.kind == TokenKind::StringDquoteBegin)
        {
            out.pop();
            continue;
        }
        out.push(token);
    }
    out
}

/// Fuse neighbouring tokens of the same mergeable kind.
pub fn merge_contiguous_literals(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(last) = out.last_mut()
            && last.kind == token.kind
            && token.kind.is_mergeable()
        {
            fuse(last, &token);
            continue;
        }
        out.push(token);
    }
    out
}

/// A double-quoted string being rebuilt by [`widen_strings`].
struct Widened {
    begin: Token,
    content: Option<Token>,
    end: Option<Token>,
}

impl Widened {
    fn absorb(&mut self, token: &Token) {
        match self.content.as_mut() {
            Some(content) => fuse(content, token),
            None => self.content = Some(token.clone().with_kind(TokenKind::StringDquoteChar)),
        }
    }

    fn emit(self, out: &mut Vec<Token>) {
        out.push(self.begin);
        out.extend(self.content);
        out.extend(self.end);
    }
}

/// Let double-quoted strings swallow the words glued to them, so the quote
/// boundaries enclose the whole word: `c"al"c.exe` → `"calc.exe"`. With
/// `merge`, strings touching each other fuse too: `"a""b"` → `"ab"`.
pub fn widen_strings(tokens: Vec<Token>, merge: bool) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut run: Vec<Token> = Vec::new();
    for token in tokens {
        if token.kind.is_word() || is_dquote(token.kind) {
            run.push(token);
        } else {
            widen_run(std::mem::take(&mut run), merge, &mut out);
            out.push(token);
        }
    }
    widen_run(run, merge, &mut out);
    out
}

fn is_dquote(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::StringDquoteBegin | TokenKind::StringDquoteChar | TokenKind::StringDquoteEnd
    )
}

/// Rebuild one delimiter-free run of words and string pieces.
fn widen_run(run: Vec<Token>, merge: bool, out: &mut Vec<Token>) {
    if !run.iter().any(|t| t.kind == TokenKind::StringDquoteBegin) {
        out.extend(run);
        return;
    }

    let mut leading: Vec<Token> = Vec::new();
    let mut current: Option<Widened> = None;
    for token in run {
        match token.kind {
            TokenKind::StringDquoteBegin => match current.as_mut() {
                Some(open) if merge => open.end = None,
                _ => {
                    if let Some(done) = current.take() {
                        done.emit(out);
                    }
                    let mut begin = token;
                    if let Some(first) = leading.first() {
                        begin.position.line = first.position.line;
                        begin.position.col_start = first.position.col_start;
                        begin.position.col_end = first.position.col_start + 1;
                    }
                    let mut widened = Widened {
                        begin,
                        content: None,
                        end: None,
                    };
                    for word in leading.drain(..) {
                        widened.absorb(&word);
                    }
                    current = Some(widened);
                }
            },
            TokenKind::StringDquoteEnd => {
                if let Some(open) = current.as_mut() {
                    open.end = Some(token);
                }
            }
            _ => match current.as_mut() {
                Some(open) => open.absorb(&token),
                None => leading.push(token),
            },
        }
    }
    if let Some(done) = current {
        done.emit(out);
    }
}

fn is_blank_delimiter(token: &Token) -> bool {
    token.kind == TokenKind::Delimiter && token.text.chars().all(|c| !matches!(c, ',' | ';' | '='))
}

/// Collapse whitespace-only delimiter runs to one space and drop them at
/// either end.
pub fn strip_excessive_whitespace(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.kind == TokenKind::Delimiter
            && let Some(last) = out.last_mut()
            && last.kind == TokenKind::Delimiter
        {
            fuse(last, &token);
            continue;
        }
        out.push(token);
    }
    for token in out.iter_mut().filter(|t| is_blank_delimiter(t)) {
        token.text = " ".into();
        token.position.col_end = token.position.col_start + 1;
    }
    while out.first().is_some_and(is_blank_delimiter) {
        out.remove(0);
    }
    while out.last().is_some_and(is_blank_delimiter) {
        out.pop();
    }
    out
}

/// Treat `,` and `;` in delimiter runs as plain spaces.
pub fn strip_commas(tokens: Vec<Token>) -> Vec<Token> {
    let tokens = tokens
        .into_iter()
        .map(|mut t| {
            if t.kind == TokenKind::Delimiter {
                t.text = t.text.replace([',', ';'], " ");
            }
            t
        })
        .collect();
    strip_excessive_whitespace(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(text: &str) -> String {
        deobfuscate(text, &FilterOptions::default())
    }

    #[test]
    fn carets_removed() {
        assert_eq!(clean("p^o^w^e^r^s^h^e^l^l"), "powershell");
    }

    #[test]
    fn escaped_caret_survives_once() {
        assert_eq!(clean("a^^b"), "a^b");
    }

    #[test]
    fn carets_kept_inside_double_quotes() {
        assert_eq!(clean("\"p^o^w^e^r\""), "\"p^o^w^e^r\"");
    }

    #[test]
    fn carets_removed_inside_single_quotes() {
        assert_eq!(clean("'p^o^w^e^r^s^h^e^l^l'"), "'powershell'");
    }

    #[test]
    fn escapes_kept_when_disabled() {
        let options = FilterOptions {
            strip_escapes: false,
            ..FilterOptions::default()
        };
        assert_eq!(deobfuscate("^c^a^l^c", &options), "^c^a^l^c");
    }

    #[test]
    fn empty_strings_removed() {
        assert_eq!(clean("w\"\"scr\"\"ipt\"\""), "wscript");
        assert_eq!(clean("c\"\"\"\"alc"), "calc");
    }

    #[test]
    fn empty_string_merge_leaves_literal_tokens_fused() {
        let tokens = FilterOptions::default().apply(tokenize("w\"\"scr\"\"ipt"));
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Literal);
    }

    #[test]
    fn string_widens_over_glued_literals() {
        assert_eq!(clean("c\"al\"c.exe"), "\"calc.exe\"");
    }

    #[test]
    fn string_widens_over_alternating_quotes() {
        assert_eq!(clean("h\"t\"t\"p\""), "\"http\"");
    }

    #[test]
    fn adjacent_strings_merge() {
        assert_eq!(clean("\"ca\"\"lc\""), "\"calc\"");
    }

    #[test]
    fn adjacent_strings_stay_apart_without_merge() {
        let options = FilterOptions {
            merge_contiguous_strings: false,
            ..FilterOptions::default()
        };
        assert_eq!(deobfuscate("\"ca\"\"lc\"", &options), "\"ca\"\"lc\"");
        assert_eq!(deobfuscate("\"ca\"x\"lc\"", &options), "\"cax\"\"lc\"");
    }

    #[test]
    fn widening_stops_at_delimiters() {
        assert_eq!(clean("echo a\"b\" c"), "echo \"ab\" c");
    }

    #[test]
    fn unterminated_string_widens_left() {
        assert_eq!(clean("c\"al"), "\"cal");
    }

    #[test]
    fn whitespace_collapsed_and_trimmed() {
        assert_eq!(clean("   calc    foo \t "), "calc foo");
    }

    #[test]
    fn commas_kept_by_default() {
        assert_eq!(clean("regsvr32,,, ;;;     foo"), "regsvr32,,, ;;;     foo");
    }

    #[test]
    fn commas_stripped_when_enabled() {
        let options = FilterOptions {
            strip_commas: true,
            ..FilterOptions::default()
        };
        assert_eq!(deobfuscate(",regsvr32,,, ;;;  foo;", &options), "regsvr32 foo");
    }

    #[test]
    fn pipeline_is_idempotent() {
        let options = FilterOptions {
            strip_commas: true,
            ..FilterOptions::default()
        };
        for text in [
            "c\"al\"c.exe",
            "h\"t\"t\"p\"",
            "  w\"\"scr\"\"ipt\"\" , a ",
            "^\"a\"b\"c",
            "cmd /c \"set x=y&&call echo %x%\"",
            "SET \"a=b\" & set c=d ,; (calc)",
            "'p^o^w' ^^ \"un",
        ] {
            for opts in [FilterOptions::default(), options] {
                let once = opts.apply(tokenize(text));
                let twice = opts.apply(once.clone());
                assert_eq!(stringify(&once), stringify(&twice), "{text}");
                let kinds = |ts: &[Token]| ts.iter().map(|t| t.kind).collect::<Vec<_>>();
                assert_eq!(kinds(&once), kinds(&twice), "{text}");
            }
        }
    }

    #[test]
    fn positions_cover_merged_text() {
        let tokens = FilterOptions::default().apply(tokenize("c^a^l^c"));
        assert_eq!(tokens[0].text, "calc");
        assert_eq!(tokens[0].position.col_start, 0);
        assert_eq!(tokens[0].position.col_end, 7);
    }
}
