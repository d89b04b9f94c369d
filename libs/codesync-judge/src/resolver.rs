/// Entry-Point Resolver
///
/// Maps a problem id to the function the harness must call. The registry is
/// an explicit table handed to the [`crate::Judge`], never a global.
///
/// Unknown ids resolve to `None`. The harness then reports a null actual
/// value for every case instead of failing, so problems added to the
/// catalogue before they get an entry here still evaluate.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with", "yield", "let", "static", "await",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid entry point name: {0:?}")]
pub struct InvalidEntryPoint(pub String);

/// A function name that is safe to splice into the harness verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryPoint(String);

impl EntryPoint {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidEntryPoint> {
        let name = name.into();
        let mut chars = name.chars();
        let head_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
        let tail_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

        if head_ok && tail_ok && !RESERVED.contains(&name.as_str()) {
            Ok(Self(name))
        } else {
            Err(InvalidEntryPoint(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntryPointRegistry {
    entries: HashMap<String, EntryPoint>,
}

impl EntryPointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry points for the problems shipped in `config/problems.json`
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (problem_id, name) in [
            ("two-sum", "twoSum"),
            ("valid-parentheses", "isValid"),
            ("reverse-string", "reverseString"),
            ("palindrome-number", "isPalindrome"),
            ("maximum-subarray", "maxSubArray"),
            ("climbing-stairs", "climbStairs"),
        ] {
            registry
                .entries
                .insert(problem_id.to_string(), EntryPoint(name.to_string()));
        }
        registry
    }

    /// Build a registry from `problem id -> function name` pairs
    pub fn from_map(map: HashMap<String, String>) -> Result<Self, InvalidEntryPoint> {
        let entries = map
            .into_iter()
            .map(|(id, name)| EntryPoint::new(name).map(|ep| (id, ep)))
            .collect::<Result<_, _>>()?;
        Ok(Self { entries })
    }

    /// Load from a JSON object such as `{"two-sum": "twoSum"}`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let map: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Self::from_map(map)?)
    }

    pub fn resolve(&self, problem_id: &str) -> Option<&EntryPoint> {
        self.entries.get(problem_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
