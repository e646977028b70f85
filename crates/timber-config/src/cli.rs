//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Timber command-line arguments.
///
/// CLI values override settings loaded from `timber.ron`.
#[derive(Parser, Debug)]
#[command(name = "timber", about = "Voxel tree chopping engine")]
pub struct CliArgs {
    /// Maximum log blocks per tree.
    #[arg(long)]
    pub max_tree_blocks: Option<u32>,

    /// Maximum leaf blocks felled per tree.
    #[arg(long)]
    pub max_leaves_blocks: Option<u32>,

    /// Whether felling destroys leaves.
    #[arg(long)]
    pub break_leaves: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(max) = args.max_tree_blocks {
            self.tree_detection.max_tree_blocks = max;
        }
        if let Some(max) = args.max_leaves_blocks {
            self.tree_detection.max_leaves_blocks = max;
        }
        if let Some(break_leaves) = args.break_leaves {
            self.tree_detection.break_leaves = break_leaves;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            max_tree_blocks: Some(64),
            max_leaves_blocks: None,
            break_leaves: Some(false),
            log_level: None,
            config: None,
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.tree_detection.max_tree_blocks, 64);
        assert!(!config.tree_detection.break_leaves);
        // Non-overridden fields retain defaults
        assert_eq!(config.tree_detection.max_leaves_blocks, 1024);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        let args = CliArgs {
            max_tree_blocks: None,
            max_leaves_blocks: None,
            break_leaves: None,
            log_level: None,
            config: None,
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config, original);
    }
}
