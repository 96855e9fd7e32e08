//! Variable Model
//!
//! A leaf signal in the design hierarchy, as reported by the engine's typed
//! scope listing.

use serde::{Deserialize, Serialize};

/// Type tag the engine uses for sub-module scopes
pub const INSTANCE_KIND: &str = "INSTANCE";

/// Placeholder entry the engine appends to some scope listings
pub const PLACEHOLDER_NAME: &str = "extra";

/// A hierarchical signal name and its type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    /// Dot-separated hierarchical path
    pub name: String,
    /// Engine type tag (`WIRE`, `REG`, ...)
    pub kind: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }

    pub fn is_instance(&self) -> bool {
        self.kind.eq_ignore_ascii_case(INSTANCE_KIND)
    }

    /// Last path component
    pub fn leaf(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_placeholder(&self) -> bool {
        self.leaf() == PLACEHOLDER_NAME
    }
}

/// Remove Tcl quoting and escaped-identifier decoration from a name
///
/// Generate-block scopes come back brace-quoted (`{genblk1[0]}`) and
/// escaped identifiers carry a leading backslash and trailing space.
pub fn strip_decoration(raw: &str) -> String {
    let mut name = raw.trim();
    if let Some(inner) = name.strip_prefix('{').and_then(|n| n.strip_suffix('}')) {
        name = inner.trim();
    }
    name.strip_prefix('\\').unwrap_or(name).trim_end().to_string()
}

/// Parse one line of a scope listing into `(name, kind)`
///
/// Lines look like `name {TYPE}`, `{quoted[0]} {TYPE ...}` or just `name`
/// for an untyped listing, in which case the kind is empty.
pub fn parse_scope_entry(line: &str) -> Option<Variable> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (raw_name, rest) = if line.starts_with('{') {
        let end = line.find('}')?;
        (&line[..=end], &line[end + 1..])
    } else {
        match line.find(char::is_whitespace) {
            Some(end) => (&line[..end], &line[end..]),
            None => (line, ""),
        }
    };

    let name = strip_decoration(raw_name);
    if name.is_empty() {
        return None;
    }

    let kind = rest
        .trim()
        .trim_start_matches(['{', '('])
        .split(|c: char| c.is_whitespace() || c == '}' || c == ')')
        .next()
        .unwrap_or("")
        .to_string();

    Some(Variable { name, kind })
}
