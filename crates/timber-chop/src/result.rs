//! Applying a resolved chop to the grid: harvest, XP, effects, commit.

use glam::IVec3;
use rand::Rng;
use rand::seq::SliceRandom;
use timber_grid::{
    Actor, BlockState, Grid, Harvester, NOTIFY_CLIENTS, NOTIFY_NEIGHBORS, Protection, Tool,
};

use crate::scanner::{ScanLimits, scan_leaves};

/// Upper bound on break effects emitted by one felling.
pub const MAX_FELLING_EFFECTS: u32 = 32;

/// One grid cell's pending post-chop state.
///
/// Created during orchestration, consumed exactly once by
/// [`ChopResult::apply`], never mutated in between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeBlock {
    /// Cell position.
    pub pos: IVec3,
    /// State to commit (air, or a chopped-log variant).
    pub target_state: BlockState,
    /// `true` for actively chopped logs (harvested with the actor's
    /// tool), `false` for passively felled blocks.
    pub was_chopped: bool,
}

/// Everything `apply` needs to know about the triggering action.
#[derive(Clone, Copy, Debug)]
pub struct ChopContext<'a> {
    /// Position of the block the actor targeted.
    pub target: IVec3,
    /// The acting entity.
    pub actor: &'a Actor,
    /// The tool swung.
    pub tool: &'a Tool,
    /// Whether leaves are destroyed when this result is a felling.
    pub break_leaves: bool,
}

/// Outcome of evaluating one chop action, prior to being applied.
///
/// `Ignored` carries no blocks and is never a felling, by construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ChopResult {
    /// Nothing to do; the action fell through to ordinary block breaking.
    #[default]
    Ignored,
    /// One or more blocks transition to their post-chop state.
    Chopped {
        /// Pending log changes (leaves are derived at apply time).
        blocks: Vec<TreeBlock>,
        /// Whether this is a full felling pass rather than a single chop.
        felling: bool,
    },
}

impl ChopResult {
    /// Whether this result carries no changes.
    pub fn is_ignored(&self) -> bool {
        matches!(self, ChopResult::Ignored)
    }

    /// Whether this result fells the whole tree.
    pub fn is_felling(&self) -> bool {
        matches!(self, ChopResult::Chopped { felling: true, .. })
    }

    /// Applies this result to the grid.
    ///
    /// Logs are filtered by the protection predicate (with the acting
    /// tool for chopped blocks, no tool for felled ones) and re-checked
    /// against the grid, since the world may have changed between scan
    /// and commit. Leaves are derived from the *filtered* logs. Harvest
    /// and XP run only on local grids for non-creative actors; the
    /// aggregate XP drops once at the target. A bounded, seed-driven
    /// random sample of the affected blocks gets a break effect, and
    /// every surviving block's state is committed with neighbour and
    /// client notification.
    ///
    /// Blocks failing protection are silently excluded from harvesting,
    /// effects, and commit.
    pub fn apply<G, P, R>(
        &self,
        grid: &mut G,
        protection: &P,
        limits: &ScanLimits,
        ctx: &ChopContext<'_>,
        rng: &mut R,
    ) where
        G: Grid,
        P: Protection,
        R: Rng + ?Sized,
    {
        let ChopResult::Chopped { blocks, felling } = self else {
            return;
        };

        let logs: Vec<TreeBlock> = blocks
            .iter()
            .filter(|block| {
                grid.classify(block.pos).is_log()
                    && protection.can_change_block(
                        block.pos,
                        ctx.actor,
                        block.was_chopped.then_some(ctx.tool),
                    )
            })
            .cloned()
            .collect();

        let leaves: Vec<TreeBlock> = if *felling && ctx.break_leaves {
            let log_positions: Vec<IVec3> = logs.iter().map(|block| block.pos).collect();
            scan_leaves(grid, &log_positions, limits)
                .into_iter()
                .filter(|&pos| protection.can_change_block(pos, ctx.actor, None))
                .map(|pos| TreeBlock {
                    pos,
                    target_state: BlockState::AIR,
                    was_chopped: false,
                })
                .collect()
        } else {
            Vec::new()
        };

        let total = logs.len() + leaves.len();
        if total == 0 {
            return;
        }
        tracing::debug!(
            logs = logs.len(),
            leaves = leaves.len(),
            felling = *felling,
            "applying chop result"
        );

        if !grid.is_remote() && !ctx.actor.creative {
            let mut experience = 0u32;
            for block in logs.iter().chain(leaves.iter()) {
                let harvester = if block.was_chopped {
                    Harvester {
                        actor: Some(ctx.actor),
                        tool: Some(ctx.tool),
                    }
                } else {
                    Harvester::none()
                };
                experience += grid.harvest(block.pos, harvester);
            }
            if experience > 0 {
                grid.drop_experience(ctx.target, experience);
            }
        }

        emit_effects(grid, &logs, &leaves, rng);

        for block in logs.iter().chain(leaves.iter()) {
            grid.set_block_state(
                block.pos,
                block.target_state,
                NOTIFY_NEIGHBORS | NOTIFY_CLIENTS,
            );
        }
    }
}

/// Plays break effects on `min(ceil(sqrt(total)), 32) - 1` blocks,
/// split between logs and leaves in proportion to their share and picked
/// by shuffling copies, so large fellings do not flood the client and the
/// sample carries no bias toward scan order.
fn emit_effects<G, R>(grid: &mut G, logs: &[TreeBlock], leaves: &[TreeBlock], rng: &mut R)
where
    G: Grid,
    R: Rng + ?Sized,
{
    let total = logs.len() + leaves.len();
    let budget = (total as f64)
        .sqrt()
        .ceil()
        .min(f64::from(MAX_FELLING_EFFECTS)) as usize
        - 1;
    if budget == 0 {
        return;
    }

    let mut log_picks: Vec<IVec3> = logs.iter().map(|block| block.pos).collect();
    let mut leaf_picks: Vec<IVec3> = leaves.iter().map(|block| block.pos).collect();
    log_picks.shuffle(rng);
    leaf_picks.shuffle(rng);

    let leaf_share = (budget as f64 * leaf_picks.len() as f64 / total as f64).ceil() as usize;
    let log_share = budget - leaf_share;

    for &pos in log_picks.iter().take(log_share).chain(leaf_picks.iter().take(leaf_share)) {
        grid.play_break_effect(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use timber_grid::{AllowAll, MemoryGrid};

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn felled(positions: &[IVec3]) -> ChopResult {
        ChopResult::Chopped {
            blocks: positions
                .iter()
                .map(|&pos| TreeBlock {
                    pos,
                    target_state: BlockState::AIR,
                    was_chopped: true,
                })
                .collect(),
            felling: true,
        }
    }

    /// Trunk of `height` logs with a single leaf on top.
    fn capped_trunk(height: i32) -> (MemoryGrid, Vec<IVec3>) {
        let mut grid = MemoryGrid::new();
        let mut logs = Vec::new();
        for y in 0..height {
            let pos = IVec3::new(0, y, 0);
            grid.place_log(pos);
            logs.push(pos);
        }
        grid.place_leaf(IVec3::new(0, height, 0));
        (grid, logs)
    }

    struct DenyLeaves;

    impl Protection for DenyLeaves {
        fn can_change_block(&self, _pos: IVec3, _actor: &Actor, tool: Option<&Tool>) -> bool {
            // Felled blocks are checked with no tool.
            tool.is_some()
        }
    }

    #[test]
    fn test_ignored_apply_is_a_noop() {
        let mut grid = MemoryGrid::new();
        grid.place_log(IVec3::ZERO);
        let actor = Actor::named("alex");
        let tool = Tool::plain("axe");
        let ctx = ChopContext {
            target: IVec3::ZERO,
            actor: &actor,
            tool: &tool,
            break_leaves: true,
        };

        ChopResult::Ignored.apply(&mut grid, &AllowAll, &ScanLimits::default(), &ctx, &mut rng());
        assert!(grid.commits.is_empty());
        assert!(grid.harvests.is_empty());
        assert_eq!(grid.classify(IVec3::ZERO), timber_grid::BlockClass::Log);
    }

    #[test]
    fn test_felling_commits_air_and_breaks_leaves() {
        let (mut grid, logs) = capped_trunk(3);
        grid.xp_per_log = 2;
        grid.xp_per_leaf = 1;
        let actor = Actor::named("alex");
        let tool = Tool::plain("axe");
        let ctx = ChopContext {
            target: logs[0],
            actor: &actor,
            tool: &tool,
            break_leaves: true,
        };

        felled(&logs).apply(&mut grid, &AllowAll, &ScanLimits::default(), &ctx, &mut rng());

        for &pos in &logs {
            assert_eq!(grid.block_state(pos), BlockState::AIR);
        }
        assert_eq!(grid.block_state(IVec3::new(0, 3, 0)), BlockState::AIR);
        // One aggregate XP drop at the target: 3 logs * 2 + 1 leaf * 1.
        assert_eq!(grid.experience, vec![(logs[0], 7)]);
        // Chopped logs harvested with the tool; the leaf without one.
        assert!(grid
            .harvests
            .iter()
            .filter(|record| logs.contains(&record.pos))
            .all(|record| record.tool.as_deref() == Some("axe")));
        let leaf_harvest = grid
            .harvests
            .iter()
            .find(|record| record.pos == IVec3::new(0, 3, 0))
            .unwrap();
        assert_eq!(leaf_harvest.actor, None);
        assert_eq!(leaf_harvest.tool, None);
    }

    #[test]
    fn test_denied_leaves_are_excluded_silently() {
        let (mut grid, logs) = capped_trunk(3);
        grid.xp_per_log = 2;
        grid.xp_per_leaf = 5;
        let actor = Actor::named("alex");
        let tool = Tool::plain("axe");
        let ctx = ChopContext {
            target: logs[0],
            actor: &actor,
            tool: &tool,
            break_leaves: true,
        };

        felled(&logs).apply(&mut grid, &DenyLeaves, &ScanLimits::default(), &ctx, &mut rng());

        // Logs removed, leaf untouched, no leaf XP attributed.
        assert_eq!(grid.block_state(logs[0]), BlockState::AIR);
        assert_eq!(grid.block_state(IVec3::new(0, 3, 0)), MemoryGrid::LEAF);
        assert_eq!(grid.experience, vec![(logs[0], 6)]);
    }

    #[test]
    fn test_remote_grid_skips_harvest_but_commits() {
        let mut grid = MemoryGrid::remote();
        grid.place_log(IVec3::ZERO);
        grid.xp_per_log = 2;
        let actor = Actor::named("alex");
        let tool = Tool::plain("axe");
        let ctx = ChopContext {
            target: IVec3::ZERO,
            actor: &actor,
            tool: &tool,
            break_leaves: false,
        };

        felled(&[IVec3::ZERO]).apply(&mut grid, &AllowAll, &ScanLimits::default(), &ctx, &mut rng());
        assert!(grid.harvests.is_empty());
        assert!(grid.experience.is_empty());
        assert_eq!(grid.block_state(IVec3::ZERO), BlockState::AIR);
    }

    #[test]
    fn test_creative_actor_skips_harvest() {
        let (mut grid, logs) = capped_trunk(2);
        grid.xp_per_log = 2;
        let actor = Actor {
            name: "builder".to_string(),
            creative: true,
        };
        let tool = Tool::plain("axe");
        let ctx = ChopContext {
            target: logs[0],
            actor: &actor,
            tool: &tool,
            break_leaves: true,
        };

        felled(&logs).apply(&mut grid, &AllowAll, &ScanLimits::default(), &ctx, &mut rng());
        assert!(grid.harvests.is_empty());
        assert!(grid.experience.is_empty());
        assert_eq!(grid.block_state(logs[1]), BlockState::AIR);
    }

    #[test]
    fn test_blocks_changed_since_scan_are_skipped() {
        let (mut grid, logs) = capped_trunk(3);
        let result = felled(&logs);
        // The middle log disappears between scan and apply.
        grid.clear(logs[1]);
        let actor = Actor::named("alex");
        let tool = Tool::plain("axe");
        let ctx = ChopContext {
            target: logs[0],
            actor: &actor,
            tool: &tool,
            break_leaves: false,
        };

        result.apply(&mut grid, &AllowAll, &ScanLimits::default(), &ctx, &mut rng());
        let committed: Vec<IVec3> = grid.commits.iter().map(|&(pos, _, _)| pos).collect();
        assert!(committed.contains(&logs[0]));
        assert!(!committed.contains(&logs[1]));
        assert!(committed.contains(&logs[2]));
    }

    #[test]
    fn test_effect_count_bounds() {
        // 2000 affected blocks: ceil(sqrt) = 45, capped at 32, minus 1.
        let positions: Vec<IVec3> = (0..2000).map(|y| IVec3::new(0, y, 0)).collect();
        let mut grid = MemoryGrid::new();
        for &pos in &positions {
            grid.place_log(pos);
        }
        let actor = Actor::named("alex");
        let tool = Tool::plain("axe");
        let ctx = ChopContext {
            target: positions[0],
            actor: &actor,
            tool: &tool,
            break_leaves: false,
        };
        let huge = ScanLimits {
            max_tree_blocks: 4096,
            ..ScanLimits::default()
        };

        felled(&positions).apply(&mut grid, &AllowAll, &huge, &ctx, &mut rng());
        assert_eq!(grid.effects.len(), 31);

        // A single block never gets an effect: ceil(sqrt(1)) - 1 = 0.
        let mut small = MemoryGrid::new();
        small.place_log(IVec3::ZERO);
        felled(&[IVec3::ZERO]).apply(&mut small, &AllowAll, &huge, &ctx, &mut rng());
        assert!(small.effects.is_empty());
    }

    #[test]
    fn test_effect_sample_is_seed_reproducible() {
        let run = |seed: u64| {
            let (mut grid, logs) = capped_trunk(30);
            let actor = Actor::named("alex");
            let tool = Tool::plain("axe");
            let ctx = ChopContext {
                target: logs[0],
                actor: &actor,
                tool: &tool,
                break_leaves: true,
            };
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            felled(&logs).apply(&mut grid, &AllowAll, &ScanLimits::default(), &ctx, &mut rng);
            grid.effects
        };
        assert_eq!(run(7), run(7));
        // 30 logs + 1 leaf: ceil(sqrt(31)) - 1 = 5 effects.
        assert_eq!(run(7).len(), 5);
    }

    #[test]
    fn test_protection_filter_is_idempotent() {
        let protection = DenyLeaves;
        let actor = Actor::named("alex");
        let tool = Tool::plain("axe");
        let positions: Vec<IVec3> = (0..10).map(|y| IVec3::new(0, y, 0)).collect();

        let filter = || -> Vec<IVec3> {
            positions
                .iter()
                .copied()
                .filter(|&pos| protection.can_change_block(pos, &actor, Some(&tool)))
                .collect()
        };
        assert_eq!(filter(), filter());
    }
}
