//! Column name normalization for logger exports.
//!
//! Different logger firmware and export settings spell the current channel
//! headers differently (`Idc1(A)`, `Idc 1(A)`, ...). This module maps those
//! spellings to the canonical names used everywhere else in the crate.
//! Matching is exact (case- and whitespace-sensitive) after trimming.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use thiserror::Error;

use crate::parsers::types::LogTable;
use crate::state::CurrentChannel;

/// Header schema problems that make a log unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// One or more required current channels are absent after aliasing
    #[error("Required current channels not found: {}", .0.join(", "))]
    MissingChannels(Vec<String>),

    /// Several source headers resolve to the same column name
    #[error("Ambiguous column '{column}': provided by {}", .sources.join(", "))]
    AmbiguousColumn {
        column: String,
        sources: Vec<String>,
    },
}

/// Mapping from canonical names to their known alternative spellings
static ALIAS_MAP: LazyLock<Vec<(&'static str, Vec<&'static str>)>> = LazyLock::new(|| {
    vec![
        (
            CurrentChannel::Idc1.column(),
            vec!["Idc1(A)", "Idc 1(A)"],
        ),
        (
            CurrentChannel::Idc2.column(),
            vec!["Idc2(A)", "Idc 2(A)"],
        ),
        (
            CurrentChannel::Idc3.column(),
            vec!["Idc3(A)", "Idc 3(A)"],
        ),
    ]
});

/// Get all built-in alias mappings as (canonical_name, alias_names)
pub fn get_builtin_mappings() -> Vec<(&'static str, Vec<&'static str>)> {
    ALIAS_MAP.clone()
}

/// Immutable alias table: alias spelling -> canonical name.
///
/// Built once at startup and passed to [`normalize_columns`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnAliases {
    map: HashMap<String, String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ColumnAliases {
    /// The built-in alias table
    pub fn builtin() -> Self {
        let mut map = HashMap::new();
        for (canonical, sources) in ALIAS_MAP.iter() {
            for source in sources {
                map.insert(source.to_string(), canonical.to_string());
            }
        }
        Self { map }
    }

    /// Built-in aliases plus custom ones.
    ///
    /// Custom entries cannot remap a built-in alias. A custom target that is
    /// itself an alias is followed until it reaches a non-alias name, so every
    /// entry maps straight to its final name; entries that loop are dropped.
    pub fn with_custom(custom: &HashMap<String, String>) -> Self {
        let builtin = Self::builtin();
        let mut combined = builtin.map.clone();
        for (source, target) in custom {
            let source = source.trim();
            let target = target.trim();
            if source.is_empty() || target.is_empty() || source == target {
                continue;
            }
            if builtin.map.contains_key(source) {
                tracing::warn!("Ignoring custom alias '{}': already a built-in alias", source);
                continue;
            }
            combined.insert(source.to_string(), target.to_string());
        }

        let mut map = HashMap::with_capacity(combined.len());
        for source in combined.keys() {
            match (resolve_alias(&combined, source), builtin.map.get(source)) {
                (Some(name), _) => {
                    map.insert(source.clone(), name);
                }
                (None, Some(canonical)) => {
                    map.insert(source.clone(), canonical.clone());
                }
                (None, None) => {
                    tracing::warn!("Ignoring custom alias '{}': alias chain loops", source)
                }
            }
        }
        Self { map }
    }

    /// Canonical name for an alias, if the name is a known alias
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Follow `source` through `map` to a name that is not an alias.
/// `None` when the chain revisits a name.
fn resolve_alias(map: &HashMap<String, String>, source: &str) -> Option<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = source;
    seen.insert(current);
    while let Some(next) = map.get(current) {
        if !seen.insert(next.as_str()) {
            return None;
        }
        current = next.as_str();
    }
    Some(current.to_string())
}

/// Normalize a single column name: trim, then resolve aliases
pub fn normalize_column_name(name: &str, aliases: &ColumnAliases) -> String {
    let trimmed = name.trim();
    aliases
        .canonical_name(trimmed)
        .unwrap_or(trimmed)
        .to_string()
}

/// Normalize every column label of a table. Row data is untouched.
///
/// Fails with [`SchemaError::AmbiguousColumn`] when two source headers end up
/// with the same name (an alias next to its canonical column, two aliases of
/// one channel, or headers that only differ in surrounding whitespace).
pub fn normalize_columns(mut table: LogTable, aliases: &ColumnAliases) -> Result<LogTable, SchemaError> {
    let normalized: Vec<String> = table
        .columns
        .iter()
        .map(|c| normalize_column_name(c, aliases))
        .collect();

    let mut sources: HashMap<&str, Vec<String>> = HashMap::new();
    for (original, name) in table.columns.iter().zip(normalized.iter()) {
        sources.entry(name.as_str()).or_default().push(original.clone());
    }

    // Report the first collision in column order for a stable message
    if let Some(name) = normalized.iter().find(|n| sources[n.as_str()].len() > 1) {
        return Err(SchemaError::AmbiguousColumn {
            column: name.clone(),
            sources: sources[name.as_str()].clone(),
        });
    }

    for (original, name) in table.columns.iter().zip(normalized.iter()) {
        if original != name {
            tracing::debug!("Renamed column '{}' -> '{}'", original, name);
        }
    }

    table.columns = normalized;
    Ok(table)
}

/// Check that every required current channel is present
pub fn require_current_channels(table: &LogTable) -> Result<(), SchemaError> {
    let missing: Vec<String> = CurrentChannel::columns()
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::MissingChannels(missing))
    }
}
