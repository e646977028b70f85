//! The grid-adapter and block-protection traits.

use glam::IVec3;

use crate::actor::{Actor, Tool};
use crate::block::{BlockClass, BlockState};

/// Who (if anyone) is credited with harvesting a block.
///
/// Passively felled blocks (leaves, logs falling as a side effect) are
/// harvested with no actor and no tool, so no actor-specific bonuses
/// apply; their XP still flows into the shared accumulator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Harvester<'a> {
    /// The harvesting actor, or `None` for ownerless harvests.
    pub actor: Option<&'a Actor>,
    /// The tool used, or `None` for bare harvests.
    pub tool: Option<&'a Tool>,
}

impl<'a> Harvester<'a> {
    /// An ownerless, tool-less harvester.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Host world access as the chopping engine sees it.
///
/// The host owns all persistent block storage; the engine only reads
/// classifications and states during scanning, and commits mutations in
/// one batch at the end of an apply step. Implementations must treat
/// unreadable positions as [`BlockClass::Other`] rather than failing.
pub trait Grid {
    /// Classifies the block at `pos` for tree detection.
    fn classify(&self, pos: IVec3) -> BlockClass;

    /// Returns the current state at `pos`.
    fn block_state(&self, pos: IVec3) -> BlockState;

    /// Writes a new state at `pos`. `flags` is a combination of
    /// [`crate::NOTIFY_NEIGHBORS`] and [`crate::NOTIFY_CLIENTS`].
    fn set_block_state(&mut self, pos: IVec3, state: BlockState, flags: u8);

    /// Returns the chopped-log variant of the block at `pos` carrying
    /// `chops` accumulated chops.
    fn chopped_state(&self, pos: IVec3, chops: u32) -> BlockState;

    /// Accumulated chops stored in the block at `pos` (0 for a fresh log
    /// or any non-chopped block).
    fn chop_progress(&self, pos: IVec3) -> u32;

    /// Simulates breaking the block at `pos`, spawning its drops for the
    /// given harvester. Returns the experience yielded.
    fn harvest(&mut self, pos: IVec3, harvester: Harvester<'_>) -> u32;

    /// Spawns an experience drop of `amount` at `pos`.
    fn drop_experience(&mut self, pos: IVec3, amount: u32);

    /// Plays a block-break particle/sound effect at `pos`.
    fn play_break_effect(&mut self, pos: IVec3);

    /// Whether this grid is a remote (client-side) simulation. Remote
    /// grids skip harvesting and XP entirely.
    fn is_remote(&self) -> bool {
        false
    }
}

/// External permission check for block mutation.
///
/// Evaluation must be free of side effects: filtering the same block set
/// twice with an unchanged grid yields the same result.
pub trait Protection {
    /// Whether `actor` may change the block at `pos` using `tool`
    /// (`None` for passively felled blocks).
    fn can_change_block(&self, pos: IVec3, actor: &Actor, tool: Option<&Tool>) -> bool;
}

/// Permits every change. Useful for worlds without claim systems.
pub struct AllowAll;

impl Protection for AllowAll {
    fn can_change_block(&self, _pos: IVec3, _actor: &Actor, _tool: Option<&Tool>) -> bool {
        true
    }
}
