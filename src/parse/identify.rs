//! Command identification: which leading token run names the program, and
//! where its arguments begin.

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{Token, TokenKind, stringify};

/// Value of a `cmd` switch: a flag, or the text after `:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SwitchValue {
    Flag(bool),
    Text(String),
}

/// `cmd` switches keyed by their descriptive name (`run_then_terminate`,
/// `delayed_expansion`, ...) or by the bare letter when unknown.
pub type Switches = BTreeMap<String, SwitchValue>;

/// The identified program of one sub-command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifiedCommand {
    /// Lower-cased basename without `.exe`/`.com`; empty when unidentified.
    pub command: String,
    /// Index of the first argument token. `None` means nothing could be
    /// identified and the whole block is opaque.
    pub offset: Option<usize>,
    /// Raw text of the head token run.
    pub head: String,
    /// Parsed switches, only filled for `cmd`.
    pub switches: Switches,
}

impl IdentifiedCommand {
    fn unidentified() -> Self {
        Self {
            command: String::new(),
            offset: None,
            head: String::new(),
            switches: Switches::new(),
        }
    }

    pub fn is_identified(&self) -> bool {
        self.offset.is_some()
    }

    /// Argument tokens following the command.
    pub fn rest<'t>(&self, tokens: &'t [Token]) -> &'t [Token] {
        match self.offset {
            Some(offset) if offset <= tokens.len() => &tokens[offset..],
            Some(_) => &[],
            None => tokens,
        }
    }
}

/// Identify the command at the start of `tokens`.
///
/// Leading `(`, `)`, delimiters and chain operators are skipped. The head
/// runs to the next delimiter or chain operator; trailing `)` are dropped
/// from it. A head that looks like a path (quoted or not) is reduced to its
/// basename, otherwise its first word is used. A leading `SET` token is
/// always `set`. An unterminated quote in the head yields an unidentified
/// command.
pub fn identify_command(tokens: &[Token]) -> IdentifiedCommand {
    let Some(start) = tokens.iter().position(|t| {
        !matches!(t.kind, TokenKind::LParen | TokenKind::RParen | TokenKind::Delimiter)
            && !t.kind.is_chain()
    }) else {
        return IdentifiedCommand::unidentified();
    };

    if tokens[start].kind == TokenKind::Set {
        let mut offset = start + 1;
        if tokens.get(offset).is_some_and(|t| t.kind == TokenKind::Delimiter) {
            offset += 1;
        }
        return IdentifiedCommand {
            command: "set".into(),
            offset: Some(offset),
            head: tokens[start].text.clone(),
            switches: Switches::new(),
        };
    }

    let end = tokens[start..]
        .iter()
        .position(|t| t.kind == TokenKind::Delimiter || t.kind.is_chain())
        .map_or(tokens.len(), |i| start + i);
    let mut head = &tokens[start..end];
    while head.last().is_some_and(|t| t.kind == TokenKind::RParen) {
        head = &head[..head.len() - 1];
    }

    let mut open = false;
    for token in head {
        match token.kind {
            TokenKind::StringDquoteBegin => open = true,
            TokenKind::StringDquoteEnd => open = false,
            _ => {}
        }
    }
    if open || head.is_empty() {
        return IdentifiedCommand::unidentified();
    }

    let text = stringify(head);
    let clean: String = text.chars().filter(|c| *c != '"').collect();
    let word = if looks_like_path(&clean) {
        basename(&clean)
    } else {
        clean.split_whitespace().next().unwrap_or("")
    };
    let command = normalize_name(word);

    let offset = (end + 1).min(tokens.len());
    let switches = if command == "cmd" {
        parse_cmd_switches(&tokens[offset..]).switches
    } else {
        Switches::new()
    };

    IdentifiedCommand {
        command,
        offset: Some(offset),
        head: text,
        switches,
    }
}

/// Lower-case and drop an `.exe`/`.com` suffix.
pub fn normalize_name(word: &str) -> String {
    let lower = word.to_lowercase();
    for ext in [".exe", ".com"] {
        if let Some(stem) = lower.strip_suffix(ext)
            && !stem.is_empty()
        {
            return stem.to_string();
        }
    }
    lower
}

fn has_drive(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

/// `C:...`, `.\`, `..\`, a leading slash, or a single word ending in
/// `sep name[.ext]`.
fn looks_like_path(s: &str) -> bool {
    if has_drive(s)
        || s.starts_with(is_separator)
        || ["./", ".\\", "../", "..\\"].iter().any(|p| s.starts_with(p))
    {
        return true;
    }
    if s.contains(char::is_whitespace) {
        return false;
    }
    let Some((_, last)) = s.rsplit_once(is_separator) else {
        return false;
    };
    let mut parts = last.split('.');
    let stem_ok = parts
        .next()
        .is_some_and(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric()));
    let ext_ok = match parts.next() {
        None => true,
        Some(ext) => !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()),
    };
    stem_ok && ext_ok && parts.next().is_none()
}

/// Windows-style basename: drive prefix and directories removed, trailing
/// separators ignored.
fn basename(path: &str) -> &str {
    let path = if has_drive(path) { &path[2..] } else { path };
    let path = path.trim_end_matches(is_separator);
    match path.rsplit_once(is_separator) {
        Some((_, name)) => name,
        None => path,
    }
}

/// Switch table for `cmd`: letter → descriptive name.
fn switch_name(letter: char) -> Option<&'static str> {
    Some(match letter {
        'c' => "run_then_terminate",
        'k' => "run_then_continue",
        'v' => "delayed_expansion",
        'e' => "cmd_extensions",
        'f' => "path_autocomplete",
        'q' => "echo_off",
        'd' => "ignore_autorun",
        's' => "strip_quotes",
        _ => return None,
    })
}

/// Switches and the remaining body of a `cmd` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CmdArgs {
    pub switches: Switches,
    /// Everything after the switches, untrimmed.
    pub body: String,
}

enum SwitchWord {
    /// The whole word was switches.
    Switches(Switches),
    /// `/c` or `/k` glued to the start of the body (`/ccalc`).
    Glued(Switches, String),
    NotSwitch,
}

fn parse_switch_word(word: &str) -> SwitchWord {
    let mut found = Switches::new();
    let mut rest = word;
    while let Some(after) = rest.strip_prefix('/') {
        let Some(letter) = after.chars().next().map(|c| c.to_ascii_lowercase()) else {
            return SwitchWord::NotSwitch;
        };
        let tail = &after[letter.len_utf8()..];
        let (arg, next) = match tail.strip_prefix(':') {
            Some(value) => match value.find('/') {
                Some(i) => (Some(&value[..i]), &value[i..]),
                None => (Some(value), ""),
            },
            None => (None, tail),
        };
        if !next.is_empty() && !next.starts_with('/') {
            if matches!(letter, 'c' | 'k') && arg.is_none() {
                insert_switch(&mut found, letter, None);
                return SwitchWord::Glued(found, next.to_string());
            }
            return SwitchWord::NotSwitch;
        }
        insert_switch(&mut found, letter, arg);
        rest = next;
    }
    if rest.is_empty() && !found.is_empty() {
        SwitchWord::Switches(found)
    } else {
        SwitchWord::NotSwitch
    }
}

fn insert_switch(switches: &mut Switches, letter: char, arg: Option<&str>) {
    let value = match (switch_name(letter), arg) {
        (Some(_), Some(arg)) if matches!(letter, 'v' | 'e' | 'f') => {
            SwitchValue::Flag(!arg.eq_ignore_ascii_case("off"))
        }
        (Some(_), _) => SwitchValue::Flag(true),
        (None, Some(arg)) => SwitchValue::Text(arg.to_string()),
        (None, None) => SwitchValue::Flag(true),
    };
    let key = switch_name(letter).map_or_else(|| letter.to_string(), str::to_string);
    switches.insert(key, value);
}

/// Parse leading `/X[:value]` switches of a `cmd` argument list.
///
/// Delimiters between switches are skipped. Parsing stops at the first token
/// that is not a switch word (a quote included); that token starts the body.
pub fn parse_cmd_switches(rest: &[Token]) -> CmdArgs {
    let mut switches = Switches::new();
    let mut i = 0;
    while let Some(token) = rest.get(i) {
        match token.kind {
            TokenKind::Delimiter => i += 1,
            TokenKind::Literal if token.text.starts_with('/') => match parse_switch_word(&token.text) {
                SwitchWord::Switches(found) => {
                    switches.extend(found);
                    i += 1;
                }
                SwitchWord::Glued(found, glued) => {
                    switches.extend(found);
                    return CmdArgs {
                        switches,
                        body: glued + &stringify(&rest[i + 1..]),
                    };
                }
                SwitchWord::NotSwitch => break,
            },
            _ => break,
        }
    }
    CmdArgs {
        switches,
        body: stringify(&rest[i..]),
    }
}
