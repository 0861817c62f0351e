//! Read-only state inspection.
//!
//! Components expose registers and latches by dotted path so a debugger
//! or a failing test can print them. Queries never change state.

use std::fmt;

/// A dynamically-typed value returned from a state query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    /// Free-form text such as a slot pair ("3-0").
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a property by path, e.g. `pc`, `hl` or `flags.z`.
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// All paths accepted by `query()`.
    fn query_paths(&self) -> &'static [&'static str];

    /// Render every path as `path=value`, space separated.
    fn dump(&self) -> String {
        self.query_paths()
            .iter()
            .filter_map(|path| self.query(path).map(|v| format!("{path}={v}")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
