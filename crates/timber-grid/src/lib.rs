//! Grid-adapter traits and value types for the Timber chopping engine.
//!
//! The engine never owns block storage. It reads and mutates the world
//! through the [`Grid`] trait, asks the [`Protection`] trait whether an
//! actor may change a block, and describes actors and tools with the
//! plain value types in [`actor`]. [`MemoryGrid`] is a hash-map backed
//! implementation used by the demo and by tests.

pub mod actor;
pub mod block;
pub mod grid;
pub mod memory;

pub use actor::{Actor, Enchant, Tool};
pub use block::{BlockClass, BlockState, NOTIFY_CLIENTS, NOTIFY_NEIGHBORS};
pub use grid::{AllowAll, Grid, Harvester, Protection};
pub use memory::{HarvestRecord, MemoryGrid};
