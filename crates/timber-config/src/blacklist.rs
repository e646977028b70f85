//! Tool blacklist resolved once at configuration load.
//!
//! The persisted config stores raw identifier strings; the lookup set is
//! built eagerly here so the engine never recomputes it mid-action.

use std::collections::HashSet;

use crate::config::Config;

/// Tools that must never chop, as a resolved lookup set.
#[derive(Clone, Debug, Default)]
pub struct ToolBlacklist {
    ids: HashSet<String>,
}

impl ToolBlacklist {
    /// Builds the set from raw identifiers.
    pub fn new(identifiers: impl IntoIterator<Item = String>) -> Self {
        Self {
            ids: identifiers.into_iter().collect(),
        }
    }

    /// Whether the given tool is allowed to chop.
    pub fn can_chop_with(&self, tool_id: &str) -> bool {
        !self.ids.contains(tool_id)
    }
}

impl Config {
    /// Resolves the tool blacklist from the compatibility section.
    pub fn resolve_blacklist(&self) -> ToolBlacklist {
        ToolBlacklist::new(self.compatibility.tool_blacklist.iter().cloned())
    }

    /// Chops one use of the given tool counts for, after config overrides.
    pub fn chop_multiplier_for(&self, tool_id: &str) -> u32 {
        self.compatibility
            .tool_chop_multipliers
            .get(tool_id)
            .copied()
            .unwrap_or(1)
    }
}
