//! Chop-count policy: converts tree size into a required number of chops.
//!
//! Pure functions of the tree size and an immutable configuration value;
//! the algorithm and rounding mode are sum types dispatched by a single
//! `match` so the formulas stay auditable.

use serde::{Deserialize, Serialize};

/// Formula mapping tree size to a (pre-rounding) chop count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Algorithm {
    /// `a * ln(size + 1)`: bigger trees cost disproportionately more
    /// chops in total but fewer chops per added block.
    Logarithmic {
        /// Positive scale coefficient.
        a: f64,
    },
    /// `chops_per_block * size + base_chops`.
    Linear {
        /// Chops per log block, in `[0, 1]`.
        chops_per_block: f64,
        /// Fixed offset; may be negative to subsidize small trees.
        base_chops: f64,
    },
}

/// How the raw formula output is rounded to an integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rounding {
    /// Round half away from zero.
    Nearest,
    /// Always round down.
    Down,
    /// Always round up.
    Up,
}

impl Rounding {
    fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::Nearest => value.round(),
            Rounding::Down => value.floor(),
            Rounding::Up => value.ceil(),
        }
    }
}

/// Complete chop-counting configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChopCounting {
    /// The counting formula.
    pub algorithm: Algorithm,
    /// Rounding applied uniformly after the formula.
    pub rounding: Rounding,
    /// Whether the result may exceed the number of blocks in the tree.
    /// When `false` the count is clamped to the tree size.
    pub can_require_more_chops_than_blocks: bool,
}

impl Default for ChopCounting {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Logarithmic { a: 10.0 },
            rounding: Rounding::Nearest,
            can_require_more_chops_than_blocks: false,
        }
    }
}

impl ChopCounting {
    /// Number of chops required to fell a tree of `tree_size` logs.
    ///
    /// Always at least 1 for a non-empty tree; 0 for an empty one.
    pub fn required_chops(&self, tree_size: u32) -> u32 {
        if tree_size == 0 {
            return 0;
        }
        let size = f64::from(tree_size);
        let raw = match self.algorithm {
            Algorithm::Logarithmic { a } => a * (size + 1.0).ln(),
            Algorithm::Linear {
                chops_per_block,
                base_chops,
            } => chops_per_block * size + base_chops,
        };
        let rounded = self.rounding.apply(raw).max(1.0) as u32;
        if self.can_require_more_chops_than_blocks {
            rounded
        } else {
            rounded.min(tree_size)
        }
    }
}
