//! Block states, classification, and commit notification flags.

use serde::{Deserialize, Serialize};

/// Opaque handle to a host block state (2 bytes).
///
/// The engine never inspects the value; it only carries states from the
/// grid back into [`crate::Grid::set_block_state`] at commit time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState(pub u16);

impl BlockState {
    /// The empty state written for removed blocks.
    pub const AIR: BlockState = BlockState(0);
}

/// How the engine classifies a grid cell during tree detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockClass {
    /// Part of a trunk or branch; connects a tree together.
    Log,
    /// Foliage attached to a tree. Persistent leaves (player-placed or
    /// otherwise non-decaying) can be excluded from felling by config.
    Leaf {
        /// Whether the leaf block does not decay on its own.
        persistent: bool,
    },
    /// Anything else, including unreadable cells.
    Other,
}

impl BlockClass {
    /// Returns `true` for [`BlockClass::Log`].
    pub fn is_log(self) -> bool {
        matches!(self, BlockClass::Log)
    }
}

/// Notify flag: trigger block updates on the six neighbours.
pub const NOTIFY_NEIGHBORS: u8 = 1 << 0;

/// Notify flag: sync the change to connected clients.
pub const NOTIFY_CLIENTS: u8 = 1 << 1;
