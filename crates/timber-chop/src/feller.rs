//! Felling orchestration: scan, accumulate chops, resolve.
//!
//! A chop action moves through scan → accumulate → resolve. Progress is
//! stored in the grid's chopped-log block states rather than in the
//! engine, so the orchestrator itself carries no cross-action mutable
//! state beyond the optional re-entrancy guard.

use std::cell::Cell;

use glam::IVec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use timber_grid::{Actor, BlockState, Grid, Protection, Tool};

use crate::policy::ChopCounting;
use crate::result::{ChopContext, ChopResult, TreeBlock};
use crate::scanner::{ScanLimits, scan_tree};

/// Per-actor chopping preferences, supplied by the host's settings layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChopSettings {
    /// Whether this actor chops at all.
    pub chopping_enabled: bool,
    /// Whether accumulated chops may fell the whole tree. When disabled,
    /// every chop resolves as a single-block partial chop.
    pub felling_enabled: bool,
    /// Whether felling also destroys the attached leaves.
    pub break_leaves: bool,
    /// Whether creative-mode actors chop instead of breaking blocks
    /// outright. Off by default.
    pub chop_in_creative_mode: bool,
}

impl Default for ChopSettings {
    fn default() -> Self {
        Self {
            chopping_enabled: true,
            felling_enabled: true,
            break_leaves: true,
            chop_in_creative_mode: false,
        }
    }
}

/// Engages the re-entrancy guard for the duration of one external action.
///
/// While a scope is alive, further evaluations on the same [`Feller`]
/// resolve to [`ChopResult::Ignored`]. This breaks chains where another
/// system reacts to block removal by issuing more chops.
pub struct ActionScope<'a> {
    flag: &'a Cell<bool>,
}

impl Drop for ActionScope<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// The felling orchestrator.
///
/// Built once from immutable configuration; every chop action is
/// evaluated against the same limits and counting policy.
#[derive(Debug, Default)]
pub struct Feller {
    limits: ScanLimits,
    counting: ChopCounting,
    prevent_recursion: bool,
    action_active: Cell<bool>,
}

impl Feller {
    /// Creates an orchestrator from explicit configuration.
    pub fn new(limits: ScanLimits, counting: ChopCounting, prevent_recursion: bool) -> Self {
        Self {
            limits,
            counting,
            prevent_recursion,
            action_active: Cell::new(false),
        }
    }

    /// The scan limits this orchestrator was built with.
    pub fn limits(&self) -> &ScanLimits {
        &self.limits
    }

    /// Marks one external action (one tool swing) as in progress.
    ///
    /// Returns `None` when an action is already in progress and recursion
    /// prevention is enabled; the nested action must be dropped.
    pub fn action_scope(&self) -> Option<ActionScope<'_>> {
        if self.prevent_recursion && self.action_active.get() {
            return None;
        }
        self.action_active.set(true);
        Some(ActionScope {
            flag: &self.action_active,
        })
    }

    /// Evaluates one chop action against the block at `target`.
    ///
    /// Resolves to `Ignored` when chopping is disabled for this actor,
    /// the recursion guard is engaged by another action, or the target
    /// is not a log. Otherwise the tree is scanned, the tool's chops are
    /// added to the progress already stored across the tree's chopped
    /// blocks, and the action resolves to a full felling or to a
    /// single-block partial chop.
    pub fn evaluate_chop<G: Grid>(
        &self,
        grid: &G,
        settings: &ChopSettings,
        target: IVec3,
        actor: &Actor,
        tool: &Tool,
    ) -> ChopResult {
        if self.prevent_recursion && self.action_active.get() {
            tracing::trace!(?target, "chop ignored: recursion guard engaged");
            return ChopResult::Ignored;
        }
        self.resolve_chop(grid, settings, target, actor, tool)
    }

    /// Resolution body, run once per action. The re-entrancy flag is
    /// checked by the callers ([`Feller::evaluate_chop`] directly,
    /// [`Feller::chop`] via the scope it takes), never here, so the
    /// action that owns the scope is not mistaken for a recursion.
    fn resolve_chop<G: Grid>(
        &self,
        grid: &G,
        settings: &ChopSettings,
        target: IVec3,
        actor: &Actor,
        tool: &Tool,
    ) -> ChopResult {
        if !settings.chopping_enabled {
            return ChopResult::Ignored;
        }
        if actor.creative && !settings.chop_in_creative_mode {
            return ChopResult::Ignored;
        }
        if !grid.classify(target).is_log() {
            return ChopResult::Ignored;
        }

        let tree = scan_tree(grid, target, &self.limits, false);
        let size = tree.size() as u32;

        if !settings.felling_enabled {
            return self.partial_chop(grid, target, tool);
        }

        let required = self.counting.required_chops(size);
        let progress: u32 = tree.logs.iter().map(|&pos| grid.chop_progress(pos)).sum();
        let accumulated = progress + tool.chop_multiplier();
        tracing::debug!(?target, size, required, accumulated, "chop evaluated");

        if accumulated >= required {
            let blocks = tree
                .logs
                .into_iter()
                .map(|pos| TreeBlock {
                    pos,
                    target_state: BlockState::AIR,
                    was_chopped: true,
                })
                .collect();
            ChopResult::Chopped {
                blocks,
                felling: true,
            }
        } else {
            self.partial_chop(grid, target, tool)
        }
    }

    /// Evaluates and applies one complete chop action under the guard.
    ///
    /// Convenience for input layers that do not need to inspect the
    /// result between evaluation and application.
    #[allow(clippy::too_many_arguments)]
    pub fn chop<G, P, R>(
        &self,
        grid: &mut G,
        protection: &P,
        settings: &ChopSettings,
        target: IVec3,
        actor: &Actor,
        tool: &Tool,
        rng: &mut R,
    ) -> ChopResult
    where
        G: Grid,
        P: Protection,
        R: Rng + ?Sized,
    {
        let Some(_scope) = self.action_scope() else {
            return ChopResult::Ignored;
        };
        let result = self.resolve_chop(grid, settings, target, actor, tool);
        let ctx = ChopContext {
            target,
            actor,
            tool,
            break_leaves: settings.break_leaves,
        };
        result.apply(grid, protection, &self.limits, &ctx, rng);
        result
    }

    /// A single-block chop: only the targeted block advances, carrying
    /// its previous progress plus the tool's chops.
    fn partial_chop<G: Grid>(&self, grid: &G, target: IVec3, tool: &Tool) -> ChopResult {
        let chops = grid.chop_progress(target) + tool.chop_multiplier();
        ChopResult::Chopped {
            blocks: vec![TreeBlock {
                pos: target,
                target_state: grid.chopped_state(target, chops),
                was_chopped: true,
            }],
            felling: false,
        }
    }
}
