//! Hash-map backed [`Grid`] implementation for the demo and for tests.
//!
//! Chop progress is encoded in the block state itself, the same way the
//! host would store it in a chopped-log variant: states with the high
//! byte `0x01` are chopped logs and carry the chop count in the low byte.

use glam::IVec3;
use rustc_hash::FxHashMap;

use crate::actor::Enchant;
use crate::block::{BlockClass, BlockState};
use crate::grid::{Grid, Harvester};

/// One recorded harvest, kept so tests can assert on attribution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarvestRecord {
    /// Harvested position.
    pub pos: IVec3,
    /// Name of the harvesting actor, if any.
    pub actor: Option<String>,
    /// Tool id used, if any.
    pub tool: Option<String>,
}

const CHOPPED_BASE: u16 = 0x0100;
const MAX_STORED_CHOPS: u32 = 0x00FF;

/// In-memory voxel world keyed by position.
///
/// Records every harvest, effect, XP drop, and commit it receives so
/// callers can inspect exactly what an apply step did.
#[derive(Debug, Default)]
pub struct MemoryGrid {
    cells: FxHashMap<IVec3, BlockState>,
    remote: bool,
    /// Experience yielded per harvested log block.
    pub xp_per_log: u32,
    /// Experience yielded per harvested leaf block.
    pub xp_per_leaf: u32,
    /// Every harvest performed, in order.
    pub harvests: Vec<HarvestRecord>,
    /// Every break effect played, in order.
    pub effects: Vec<IVec3>,
    /// Every experience drop spawned, as `(pos, amount)`.
    pub experience: Vec<(IVec3, u32)>,
    /// Every committed state write, as `(pos, state, flags)`.
    pub commits: Vec<(IVec3, BlockState, u8)>,
}

impl MemoryGrid {
    /// State of a fresh (unchopped) log block.
    pub const LOG: BlockState = BlockState(1);
    /// State of a decaying leaf block.
    pub const LEAF: BlockState = BlockState(2);
    /// State of a persistent (non-decaying) leaf block.
    pub const PERSISTENT_LEAF: BlockState = BlockState(3);

    /// Creates an empty local grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty grid that reports itself as a remote simulation.
    pub fn remote() -> Self {
        Self {
            remote: true,
            ..Self::default()
        }
    }

    /// Places a fresh log at `pos`.
    pub fn place_log(&mut self, pos: IVec3) {
        self.cells.insert(pos, Self::LOG);
    }

    /// Places a decaying leaf at `pos`.
    pub fn place_leaf(&mut self, pos: IVec3) {
        self.cells.insert(pos, Self::LEAF);
    }

    /// Places a persistent leaf at `pos`.
    pub fn place_persistent_leaf(&mut self, pos: IVec3) {
        self.cells.insert(pos, Self::PERSISTENT_LEAF);
    }

    /// Removes the block at `pos` entirely.
    pub fn clear(&mut self, pos: IVec3) {
        self.cells.remove(&pos);
    }

    /// Number of non-air blocks currently stored.
    pub fn block_count(&self) -> usize {
        self.cells
            .values()
            .filter(|&&s| s != BlockState::AIR)
            .count()
    }

    fn is_chopped(state: BlockState) -> bool {
        state.0 & 0xFF00 == CHOPPED_BASE
    }
}

impl Grid for MemoryGrid {
    fn classify(&self, pos: IVec3) -> BlockClass {
        match self.cells.get(&pos) {
            Some(&Self::LOG) => BlockClass::Log,
            Some(&Self::LEAF) => BlockClass::Leaf { persistent: false },
            Some(&Self::PERSISTENT_LEAF) => BlockClass::Leaf { persistent: true },
            Some(&state) if Self::is_chopped(state) => BlockClass::Log,
            _ => BlockClass::Other,
        }
    }

    fn block_state(&self, pos: IVec3) -> BlockState {
        self.cells.get(&pos).copied().unwrap_or(BlockState::AIR)
    }

    fn set_block_state(&mut self, pos: IVec3, state: BlockState, flags: u8) {
        self.commits.push((pos, state, flags));
        self.cells.insert(pos, state);
    }

    fn chopped_state(&self, _pos: IVec3, chops: u32) -> BlockState {
        BlockState(CHOPPED_BASE | chops.min(MAX_STORED_CHOPS) as u16)
    }

    fn chop_progress(&self, pos: IVec3) -> u32 {
        let state = self.block_state(pos);
        if Self::is_chopped(state) {
            (state.0 & 0x00FF) as u32
        } else {
            0
        }
    }

    fn harvest(&mut self, pos: IVec3, harvester: Harvester<'_>) -> u32 {
        let base = match self.classify(pos) {
            BlockClass::Log => self.xp_per_log,
            BlockClass::Leaf { .. } => self.xp_per_leaf,
            BlockClass::Other => 0,
        };
        // Silk touch takes the block itself, so it yields no experience;
        // otherwise fortune adds its level to any non-zero yield.
        let silk = harvester
            .tool
            .is_some_and(|tool| tool.enchantment_level(Enchant::SilkTouch) > 0);
        let xp = if base > 0 && !silk {
            base + harvester
                .tool
                .map_or(0, |tool| tool.enchantment_level(Enchant::Fortune))
        } else {
            0
        };
        self.harvests.push(HarvestRecord {
            pos,
            actor: harvester.actor.map(|a| a.name.clone()),
            tool: harvester.tool.map(|t| t.id.clone()),
        });
        xp
    }

    fn drop_experience(&mut self, pos: IVec3, amount: u32) {
        self.experience.push((pos, amount));
    }

    fn play_break_effect(&mut self, pos: IVec3) {
        self.effects.push(pos);
    }

    fn is_remote(&self) -> bool {
        self.remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_placed_blocks() {
        let mut grid = MemoryGrid::new();
        grid.place_log(IVec3::ZERO);
        grid.place_leaf(IVec3::Y);
        grid.place_persistent_leaf(IVec3::X);

        assert_eq!(grid.classify(IVec3::ZERO), BlockClass::Log);
        assert_eq!(grid.classify(IVec3::Y), BlockClass::Leaf { persistent: false });
        assert_eq!(grid.classify(IVec3::X), BlockClass::Leaf { persistent: true });
        assert_eq!(grid.classify(IVec3::NEG_Y), BlockClass::Other);
    }

    #[test]
    fn test_chopped_state_roundtrips_progress() {
        let mut grid = MemoryGrid::new();
        grid.place_log(IVec3::ZERO);
        assert_eq!(grid.chop_progress(IVec3::ZERO), 0);

        let chopped = grid.chopped_state(IVec3::ZERO, 5);
        grid.set_block_state(IVec3::ZERO, chopped, 0);
        assert_eq!(grid.chop_progress(IVec3::ZERO), 5);
        // A chopped log is still part of the tree.
        assert_eq!(grid.classify(IVec3::ZERO), BlockClass::Log);
    }

    #[test]
    fn test_fortune_adds_to_harvest_yield() {
        use crate::actor::{Actor, Tool};
        use crate::grid::Harvester;

        let mut grid = MemoryGrid::new();
        grid.xp_per_log = 2;
        grid.place_log(IVec3::ZERO);

        let actor = Actor::named("alex");
        let mut tool = Tool::plain("axe");
        tool.fortune = 3;
        let xp = grid.harvest(
            IVec3::ZERO,
            Harvester {
                actor: Some(&actor),
                tool: Some(&tool),
            },
        );
        assert_eq!(xp, 5);
        assert_eq!(grid.harvest(IVec3::ZERO, Harvester::none()), 2);
    }

    #[test]
    fn test_silk_touch_suppresses_harvest_xp() {
        use crate::actor::{Actor, Tool};
        use crate::grid::Harvester;

        let mut grid = MemoryGrid::new();
        grid.xp_per_log = 2;
        grid.place_log(IVec3::ZERO);

        let actor = Actor::named("alex");
        let mut tool = Tool::plain("axe");
        tool.silk_touch = 1;
        tool.fortune = 3;
        let xp = grid.harvest(
            IVec3::ZERO,
            Harvester {
                actor: Some(&actor),
                tool: Some(&tool),
            },
        );
        // The block is still harvested, it just yields nothing.
        assert_eq!(xp, 0);
        assert_eq!(grid.harvests.len(), 1);
    }

    #[test]
    fn test_air_commit_clears_classification() {
        let mut grid = MemoryGrid::new();
        grid.place_log(IVec3::ZERO);
        grid.set_block_state(IVec3::ZERO, BlockState::AIR, NOTIFY);
        assert_eq!(grid.classify(IVec3::ZERO), BlockClass::Other);
        assert_eq!(grid.commits, vec![(IVec3::ZERO, BlockState::AIR, NOTIFY)]);
    }

    const NOTIFY: u8 = crate::NOTIFY_NEIGHBORS | crate::NOTIFY_CLIENTS;
}
