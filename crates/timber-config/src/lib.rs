//! Configuration for the Timber chopping engine.
//!
//! Runtime-tunable settings persisted to disk as RON, with CLI overrides
//! via clap and validation at load time. The engine crates never read
//! files themselves; they receive plain config values built from here.

mod blacklist;
mod cli;
mod config;
mod error;

pub use blacklist::ToolBlacklist;
pub use cli::CliArgs;
pub use config::{
    AlgorithmChoice, ChopCountingConfig, CompatibilityConfig, Config, DebugConfig,
    TreeDetectionConfig,
};
pub use error::ConfigError;
