// src/types.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Value of a user-supplied flag: either a bare switch (`--flag verbose`) or
/// a string value (`--flag mode=release`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Switch,
    Value(String),
}

impl FlagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Switch => None,
            FlagValue::Value(v) => Some(v),
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Switch => write!(f, "true"),
            FlagValue::Value(v) => write!(f, "{v}"),
        }
    }
}

/// User flags handed to the orchestrator and exposed to every task through
/// its context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    values: BTreeMap<String, FlagValue>,
}

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: FlagValue) {
        self.values.insert(name.into(), value);
    }

    pub fn with_switch(mut self, name: impl Into<String>) -> Self {
        self.set(name, FlagValue::Switch);
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, FlagValue::Value(value.into()));
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, FlagValue)> for Flags {
    fn from_iter<I: IntoIterator<Item = (String, FlagValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Options forwarded to the glob matcher used by discovery.
///
/// Directories are never yielded regardless of these settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Match without regard to case.
    pub case_insensitive: bool,
    /// `*` and `?` do not match `/` (on by default, like shell globs).
    pub literal_separator: bool,
    /// Treat `\` as an escape character.
    pub backslash_escape: bool,
    /// Also yield files below dot-directories and dotfiles.
    pub dot: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            literal_separator: true,
            backslash_escape: true,
            dot: false,
        }
    }
}
