//! Actors and tools as seen by the chopping engine.

use serde::{Deserialize, Serialize};

/// The entity performing a chop action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Display name, used for harvest attribution and logging.
    pub name: String,
    /// Creative-mode actors break blocks without harvesting or XP.
    pub creative: bool,
}

impl Actor {
    /// Creates a non-creative actor with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            creative: false,
        }
    }
}

/// Enchantment kinds the engine reads off a tool during harvesting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Enchant {
    /// Multiplies certain drops.
    Fortune,
    /// Drops the block itself instead of its loot.
    SilkTouch,
}

/// Tool metadata consumed by the engine.
///
/// The host resolves item registries and enchantment NBT; the engine only
/// sees the resulting levels and the per-use chop multiplier (some tools,
/// e.g. saws, are configured to count as several chops per swing).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    /// Host-side identifier (e.g. `"iron_axe"`).
    pub id: String,
    /// Fortune level, 0 if absent.
    pub fortune: u32,
    /// Silk Touch level, 0 if absent.
    pub silk_touch: u32,
    /// Chops contributed per use. Clamped to at least 1.
    pub chops_per_use: u32,
}

impl Tool {
    /// Creates a plain tool with no enchantments and a single chop per use.
    pub fn plain(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fortune: 0,
            silk_touch: 0,
            chops_per_use: 1,
        }
    }

    /// Returns the level of the given enchantment (0 if absent).
    pub fn enchantment_level(&self, enchant: Enchant) -> u32 {
        match enchant {
            Enchant::Fortune => self.fortune,
            Enchant::SilkTouch => self.silk_touch,
        }
    }

    /// Number of chops one use of this tool counts for (at least 1).
    pub fn chop_multiplier(&self) -> u32 {
        self.chops_per_use.max(1)
    }
}

impl Default for Tool {
    fn default() -> Self {
        Self::plain("hand")
    }
}
