//! Tree detection and chop accounting over a voxel grid.
//!
//! Finds the connected log/leaf structure a target block belongs to,
//! converts its size into a required number of chops, accumulates chop
//! progress across actions, and applies the resulting block changes
//! (harvest drops, XP, effects, state commits) in one batch.

pub mod feller;
pub mod policy;
pub mod result;
pub mod scanner;

pub use feller::{ActionScope, ChopSettings, Feller};
pub use policy::{Algorithm, ChopCounting, Rounding};
pub use result::{ChopContext, ChopResult, MAX_FELLING_EFFECTS, TreeBlock};
pub use scanner::{ScanLimits, Tree, scan_leaves, scan_tree};
