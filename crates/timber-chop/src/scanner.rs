//! Bounded connectivity search grouping log and leaf blocks into a tree.
//!
//! Logs connect over the full 26-neighborhood (face- and diagonal-adjacent
//! cells); leaves spread from discovered logs over the 6-neighborhood with
//! a per-step distance budget. Both searches are flood fills over a
//! visited set, seeded then drained in FIFO order, so discovery order is
//! fully deterministic for fixed grid contents and limits.

use std::collections::VecDeque;

use glam::IVec3;
use rustc_hash::FxHashSet;
use timber_grid::{BlockClass, Grid};

/// Size and distance limits for one scan.
///
/// Hitting a limit truncates the result silently; it is never an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanLimits {
    /// Maximum number of log blocks detected as one tree.
    pub max_tree_blocks: usize,
    /// Maximum number of leaf blocks destroyed when a tree is felled.
    pub max_leaves_blocks: usize,
    /// Maximum number of leaf-to-leaf steps away from a log.
    pub max_break_leaves_distance: u32,
    /// Whether non-decaying leaves are excluded from leaf detection.
    pub ignore_persistent_leaves: bool,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_tree_blocks: 320,
            max_leaves_blocks: 1024,
            max_break_leaves_distance: 7,
            ignore_persistent_leaves: true,
        }
    }
}

/// The result of scanning one tree: logs in discovery order, plus leaves
/// when requested. Exists only for the duration of one chop action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    /// Connected log positions, in BFS discovery order from the origin.
    pub logs: Vec<IVec3>,
    /// Attached leaf positions, in BFS discovery order from the logs.
    pub leaves: Vec<IVec3>,
}

impl Tree {
    /// Whether the scan found no logs at all (origin was not a log).
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Number of discovered log blocks.
    pub fn size(&self) -> usize {
        self.logs.len()
    }
}

/// The six axis-aligned neighbour offsets, in lexicographic order.
const NEIGHBORS_6: [IVec3; 6] = [
    IVec3::new(-1, 0, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, -1),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 1, 0),
    IVec3::new(1, 0, 0),
];

/// All 26 face-, edge-, and corner-adjacent offsets, in lexicographic
/// order. The fixed order keeps log discovery reproducible.
const NEIGHBORS_26: [IVec3; 26] = [
    IVec3::new(-1, -1, -1),
    IVec3::new(-1, -1, 0),
    IVec3::new(-1, -1, 1),
    IVec3::new(-1, 0, -1),
    IVec3::new(-1, 0, 0),
    IVec3::new(-1, 0, 1),
    IVec3::new(-1, 1, -1),
    IVec3::new(-1, 1, 0),
    IVec3::new(-1, 1, 1),
    IVec3::new(0, -1, -1),
    IVec3::new(0, -1, 0),
    IVec3::new(0, -1, 1),
    IVec3::new(0, 0, -1),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 1, -1),
    IVec3::new(0, 1, 0),
    IVec3::new(0, 1, 1),
    IVec3::new(1, -1, -1),
    IVec3::new(1, -1, 0),
    IVec3::new(1, -1, 1),
    IVec3::new(1, 0, -1),
    IVec3::new(1, 0, 0),
    IVec3::new(1, 0, 1),
    IVec3::new(1, 1, -1),
    IVec3::new(1, 1, 0),
    IVec3::new(1, 1, 1),
];

/// Collects the tree the log at `origin` belongs to.
///
/// Returns an empty tree when `origin` is not classified as a log. Leaf
/// discovery runs only when `include_leaves` is set; the felling path
/// defers it to apply time, where it is re-derived from the logs that
/// survived permission filtering.
pub fn scan_tree<G: Grid>(
    grid: &G,
    origin: IVec3,
    limits: &ScanLimits,
    include_leaves: bool,
) -> Tree {
    if !grid.classify(origin).is_log() {
        return Tree::default();
    }

    let mut visited = FxHashSet::default();
    let mut frontier = VecDeque::new();
    let mut logs = Vec::new();

    visited.insert(origin);
    frontier.push_back(origin);

    while let Some(pos) = frontier.pop_front() {
        logs.push(pos);
        if logs.len() >= limits.max_tree_blocks {
            tracing::debug!(
                max = limits.max_tree_blocks,
                "tree scan truncated at block limit"
            );
            break;
        }
        for offset in NEIGHBORS_26 {
            let next = pos + offset;
            if visited.insert(next) && grid.classify(next).is_log() {
                frontier.push_back(next);
            }
        }
    }

    let leaves = if include_leaves {
        scan_leaves(grid, &logs, limits)
    } else {
        Vec::new()
    };

    Tree { logs, leaves }
}

/// Collects leaves attached to the given logs.
///
/// Flood fill over the 6-neighborhood seeded from every log in order,
/// stepping only onto leaf blocks, for at most
/// `max_break_leaves_distance` steps and `max_leaves_blocks` results.
/// BFS reaches each leaf at its minimum distance first; equidistant
/// leaves resolve in stable seed-then-offset order.
pub fn scan_leaves<G: Grid>(grid: &G, logs: &[IVec3], limits: &ScanLimits) -> Vec<IVec3> {
    let mut leaves = Vec::new();
    if limits.max_break_leaves_distance == 0 || limits.max_leaves_blocks == 0 {
        return leaves;
    }

    let mut visited: FxHashSet<IVec3> = logs.iter().copied().collect();
    let mut frontier: VecDeque<(IVec3, u32)> = logs.iter().map(|&pos| (pos, 0)).collect();

    while let Some((pos, distance)) = frontier.pop_front() {
        if distance >= limits.max_break_leaves_distance {
            continue;
        }
        for offset in NEIGHBORS_6 {
            let next = pos + offset;
            if !visited.insert(next) {
                continue;
            }
            let BlockClass::Leaf { persistent } = grid.classify(next) else {
                continue;
            };
            if persistent && limits.ignore_persistent_leaves {
                continue;
            }
            leaves.push(next);
            if leaves.len() >= limits.max_leaves_blocks {
                tracing::debug!(
                    max = limits.max_leaves_blocks,
                    "leaf scan truncated at block limit"
                );
                return leaves;
            }
            frontier.push_back((next, distance + 1));
        }
    }

    leaves
}
