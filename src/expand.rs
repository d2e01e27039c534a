//! Variable expansion: `%name%`, `!name!`, `%name:find=repl%` and
//! `%name:~start,len%`.
//!
//! Works on raw text, before tokenization, so escape carets are not
//! understood here: `%c^o^m^s^p^e^c%` is not a reference to `comspec`.
//! Expansion runs three ordered passes (direct, find/replace, substring).
//! Each pass scans left to right once and never rescans text it produced.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Value of `%appdata%` when the caller does not supply one.
pub const DEFAULT_APPDATA: &str = "C:\\Users\\whoami\\AppData\\Roaming";
/// Value of `%comspec%` when the caller does not supply one.
pub const DEFAULT_COMSPEC: &str = "C:\\Windows\\System32\\cmd.exe";

/// Variable table. Names keep the case they were first written with and
/// are looked up case-insensitively; iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars {
    entries: IndexMap<String, (String, String)>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    /// Assign a value. An existing name keeps its original spelling.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.get_mut(&name.to_lowercase()) {
            Some(entry) => entry.1 = value,
            None => {
                self.entries.insert(name.to_lowercase(), (name, value));
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .shift_remove(&name.to_lowercase())
            .map(|(_, value)| value)
    }

    /// `(name, value)` pairs in insertion order, names as typed.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy of `self` with every entry of `top` assigned over it.
    pub fn overlay(&self, top: &Vars) -> Vars {
        let mut merged = self.clone();
        for (name, value) in top.iter() {
            merged.set(name, value);
        }
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Vars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Vars::new();
        for (name, value) in iter {
            vars.set(name, value);
        }
        vars
    }
}

impl Serialize for Vars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The built-in environment: `appdata` and `comspec`.
pub fn default_vars() -> Vars {
    Vars::from_iter([("appdata", DEFAULT_APPDATA), ("comspec", DEFAULT_COMSPEC)])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    /// `%` for normal expansion, `!` for delayed expansion.
    pub sigil: char,
    /// With extensions off only direct substitution runs, and names
    /// containing a colon expand like any other.
    pub enable_extensions: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            sigil: '%',
            enable_extensions: true,
        }
    }
}

impl ExpandOptions {
    pub fn delayed() -> Self {
        Self {
            sigil: '!',
            ..Self::default()
        }
    }
}

/// Expand `text` against the default variables overlaid with `vars`.
pub fn expand_variables(text: &str, vars: &Vars, options: &ExpandOptions) -> String {
    expand(text, &default_vars().overlay(vars), options)
}

/// Expand `text` against exactly `vars`. Unknown references stay verbatim.
pub fn expand(text: &str, vars: &Vars, options: &ExpandOptions) -> String {
    if !text.contains(options.sigil) {
        return text.to_string();
    }
    let text = substitute_direct(text, vars, options);
    if !options.enable_extensions {
        return text;
    }
    let text = scan(&text, options.sigil, |name, spec| {
        replace_reference(vars.get(name)?, spec)
    });
    scan(&text, options.sigil, |name, spec| {
        substring_reference(vars.get(name)?, spec)
    })
}

/// A colon anywhere but the last position, with something before it.
fn has_inner_colon(name: &str) -> bool {
    name.char_indices()
        .any(|(i, c)| c == ':' && i > 0 && i + 1 < name.len())
}

/// Byte length of the prefix of `hay` equal to `needle` ignoring case.
fn prefix_len_ignore_case(hay: &str, needle: &str) -> Option<usize> {
    let mut hay_chars = hay.char_indices();
    for n in needle.chars() {
        let (_, h) = hay_chars.next()?;
        if !h.to_lowercase().eq(n.to_lowercase()) {
            return None;
        }
    }
    Some(hay_chars.next().map_or(hay.len(), |(i, _)| i))
}

/// Byte range of the first case-insensitive occurrence of `needle`.
fn find_ignore_case(hay: &str, needle: &str) -> Option<(usize, usize)> {
    hay.char_indices().find_map(|(i, _)| {
        prefix_len_ignore_case(&hay[i..], needle).map(|len| (i, i + len))
    })
}

fn substitute_direct(text: &str, vars: &Vars, options: &ExpandOptions) -> String {
    let sigil = options.sigil;
    let sigil_len = sigil.len_utf8();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(i) = rest.find(sigil) {
        out.push_str(&rest[..i]);
        let after = &rest[i + sigil_len..];
        let best = vars
            .iter()
            .filter(|(name, _)| {
                !name.is_empty() && !(options.enable_extensions && has_inner_colon(name))
            })
            .filter_map(|(name, value)| {
                let len = prefix_len_ignore_case(after, name)?;
                after[len..].starts_with(sigil).then_some((len, value))
            })
            .max_by_key(|(len, _)| *len);
        match best {
            Some((len, value)) => {
                out.push_str(value);
                rest = &after[len + sigil_len..];
            }
            None => {
                out.push(sigil);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Scan for `sigil name:spec sigil` references and let `resolve` rewrite
/// them. A `None` from `resolve` leaves the reference untouched.
fn scan(text: &str, sigil: char, resolve: impl Fn(&str, &str) -> Option<String>) -> String {
    let sigil_len = sigil.len_utf8();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(i) = rest.find(sigil) {
        out.push_str(&rest[..i]);
        let after = &rest[i + sigil_len..];
        match colon_reference(after, sigil).and_then(|(name, spec, used)| {
            resolve(name, spec).map(|value| (value, used))
        }) {
            Some((value, used)) => {
                out.push_str(&value);
                rest = &after[used..];
            }
            None => {
                out.push(sigil);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Split `name:spec%...` into name, spec and the bytes consumed through the
/// closing sigil.
fn colon_reference(after: &str, sigil: char) -> Option<(&str, &str, usize)> {
    let colon = after.find(':')?;
    let name = &after[..colon];
    if name.is_empty() || name.contains(sigil) {
        return None;
    }
    let spec_start = colon + 1;
    let spec_len = after[spec_start..].find(sigil)?;
    let spec = &after[spec_start..spec_start + spec_len];
    Some((name, spec, spec_start + spec_len + sigil.len_utf8()))
}

/// `find=repl`: replace every case-insensitive occurrence of `find`.
/// `*find=repl` replaces everything up to and including the first one.
fn replace_reference(value: &str, spec: &str) -> Option<String> {
    if spec.starts_with('~') {
        return None;
    }
    let (find, repl) = spec.split_once('=')?;
    if let Some(needle) = find.strip_prefix('*') {
        if needle.is_empty() {
            return None;
        }
        return Some(match find_ignore_case(value, needle) {
            Some((_, end)) => format!("{repl}{}", &value[end..]),
            None => value.to_string(),
        });
    }
    if find.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some((start, end)) = find_ignore_case(rest, find) {
        out.push_str(&rest[..start]);
        out.push_str(repl);
        rest = &rest[end..];
    }
    out.push_str(rest);
    Some(out)
}

/// `~start[,len]` with Windows index arithmetic.
fn substring_reference(value: &str, spec: &str) -> Option<String> {
    let args = spec.strip_prefix('~')?;
    let (start, len) = match args.split_once(',') {
        Some((start, len)) => (start, Some(len)),
        None => (args, None),
    };
    if start.trim().is_empty() || len.is_some_and(|l| l.trim().is_empty()) {
        return None;
    }
    Some(substring(value, parse_index(start), len.map(parse_index)))
}

/// strtol-style integer: leading whitespace, optional sign, `0x` hex,
/// leading-zero octal or decimal; stops at the first invalid digit.
pub fn parse_index(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, text) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None if text.starts_with('0') => (8, text),
        None => (10, text),
    };
    let mut n: i64 = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else {
            break;
        };
        n = n.saturating_mul(i64::from(radix)).saturating_add(i64::from(d));
    }
    if negative { -n } else { n }
}

/// Character-based substring. Negative values count from the end; both
/// negative selects the span between the two offsets in either order.
/// Indices clamp to the value, so this never fails.
pub fn substring(value: &str, start: i64, len: Option<i64>) -> String {
    let chars: Vec<char> = value.chars().collect();
    let total = chars.len() as i64;
    let clamp = |i: i64| i.clamp(0, total) as usize;
    let from = if start < 0 { clamp(total.saturating_add(start)) } else { clamp(start) };
    let to = match len {
        None => total as usize,
        Some(n) if n < 0 && start < 0 => {
            let other = clamp(total.saturating_add(n));
            let (a, b) = (from.min(other), from.max(other));
            return chars[a..b].iter().collect();
        }
        Some(n) if n < 0 => clamp(total.saturating_add(n)),
        Some(n) => clamp((from as i64).saturating_add(n)),
    };
    if to <= from {
        String::new()
    } else {
        chars[from..to].iter().collect()
    }
}
