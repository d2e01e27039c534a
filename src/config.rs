use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::eval::InterpretOptions;
use crate::expand::Vars;
use crate::parse::FilterOptions;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// User overlay location, relative to `$HOME`.
const USER_CONFIG: &str = ".config/cmd-deob/config.toml";

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub filters: FilterOptions,
    #[serde(default)]
    pub vars: VarsConfig,
    #[serde(default)]
    pub commands: Commands,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub max_depth: usize,
    pub delayed_expansion: bool,
    pub enable_extensions: bool,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    /// Extra log destination; `~` is expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: crate::eval::DEFAULT_MAX_DEPTH,
            delayed_expansion: false,
            enable_extensions: true,
            log_level: "warn".into(),
            log_file: None,
        }
    }
}

impl Settings {
    /// The configured level, or `warn` when it does not parse.
    pub fn level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Warn)
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct VarsConfig {
    /// Starting environment, in declaration order.
    #[serde(default)]
    pub defaults: IndexMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Commands {
    /// Names that bypass the built-in handlers.
    #[serde(default)]
    pub passthrough: Vec<String>,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    filters: FiltersOverlay,
    #[serde(default)]
    vars: VarsOverlay,
    #[serde(default)]
    commands: CommandsOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    max_depth: Option<usize>,
    delayed_expansion: Option<bool>,
    enable_extensions: Option<bool>,
    log_level: Option<String>,
    log_file: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct FiltersOverlay {
    strip_escapes: Option<bool>,
    strip_empty_strings: Option<bool>,
    merge_contiguous_literals: Option<bool>,
    merge_contiguous_strings: Option<bool>,
    widen_strings: Option<bool>,
    strip_whitespace: Option<bool>,
    strip_commas: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct VarsOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    defaults: IndexMap<String, String>,
    /// Names to drop, matched case-insensitively.
    #[serde(default)]
    remove: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CommandsOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    passthrough: Vec<String>,
    #[serde(default)]
    remove_passthrough: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

/// Merge a user variable table into the defaults. Names compare
/// case-insensitively; a user value replaces the default in place.
fn merge_vars(
    base: &mut IndexMap<String, String>,
    add: IndexMap<String, String>,
    remove: &[String],
    replace: bool,
) {
    if replace {
        *base = add;
        return;
    }
    base.retain(|name, _| !remove.iter().any(|r| r.eq_ignore_ascii_case(name)));
    for (name, value) in add {
        let existing = base.keys().find(|k| k.eq_ignore_ascii_case(&name)).cloned();
        base.insert(existing.unwrap_or(name), value);
    }
}

fn set_if(target: &mut bool, value: Option<bool>) {
    if let Some(v) = value {
        *target = v;
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/cmd-deob/config.toml (if exists)
    ///
    /// A missing user file is not an error; one that does not parse is.
    pub fn load() -> Result<Self, Error> {
        let mut config = Self::default_config();
        if let Some(path) = Self::user_path()
            && path.exists()
        {
            config.apply_overlay(Self::load_overlay(&path)?);
        }
        Ok(config)
    }

    /// Defaults merged with the overlay at `path`.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let mut config = Self::default_config();
        config.apply_overlay(Self::load_overlay(path)?);
        Ok(config)
    }

    fn user_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(Path::new(&home).join(USER_CONFIG))
    }

    fn load_overlay(path: &Path) -> Result<ConfigOverlay, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        let s = overlay.settings;
        if let Some(v) = s.max_depth {
            self.settings.max_depth = v;
        }
        set_if(&mut self.settings.delayed_expansion, s.delayed_expansion);
        set_if(&mut self.settings.enable_extensions, s.enable_extensions);
        if let Some(v) = s.log_level {
            self.settings.log_level = v;
        }
        if let Some(v) = s.log_file {
            self.settings.log_file = Some(v);
        }

        // Filters
        let f = overlay.filters;
        set_if(&mut self.filters.strip_escapes, f.strip_escapes);
        set_if(&mut self.filters.strip_empty_strings, f.strip_empty_strings);
        set_if(&mut self.filters.merge_contiguous_literals, f.merge_contiguous_literals);
        set_if(&mut self.filters.merge_contiguous_strings, f.merge_contiguous_strings);
        set_if(&mut self.filters.widen_strings, f.widen_strings);
        set_if(&mut self.filters.strip_whitespace, f.strip_whitespace);
        set_if(&mut self.filters.strip_commas, f.strip_commas);

        // Vars
        let v = overlay.vars;
        merge_vars(&mut self.vars.defaults, v.defaults, &v.remove, v.replace);

        // Commands
        let c = overlay.commands;
        merge_list(
            &mut self.commands.passthrough,
            c.passthrough,
            &c.remove_passthrough,
            c.replace,
        );
    }

    /// Interpreter options described by this config.
    pub fn to_options(&self) -> InterpretOptions {
        InterpretOptions {
            filters: self.filters,
            delayed_expansion: self.settings.delayed_expansion,
            enable_extensions: self.settings.enable_extensions,
            vars: self
                .vars
                .defaults
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect::<Vars>(),
            max_depth: self.settings.max_depth,
            passthrough: self
                .commands
                .passthrough
                .iter()
                .map(|name| name.to_lowercase())
                .collect::<BTreeSet<_>>(),
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
