//! Configuration structs with sensible defaults and RON persistence.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use timber_chop::{Algorithm, ChopCounting, Rounding, ScanLimits};

use crate::error::ConfigError;

/// Top-level Timber configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Tree detection limits.
    pub tree_detection: TreeDetectionConfig,
    /// Chop counting policy.
    pub chop_counting: ChopCountingConfig,
    /// Interop knobs for hosts with other block-breaking systems.
    pub compatibility: CompatibilityConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Tree detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreeDetectionConfig {
    /// Maximum number of log blocks detected as one tree.
    pub max_tree_blocks: u32,
    /// Maximum number of leaf blocks destroyed when a tree is felled.
    pub max_leaves_blocks: u32,
    /// Whether to destroy leaves when a tree is felled.
    pub break_leaves: bool,
    /// Whether non-decaying leaves are ignored when detecting leaves.
    pub ignore_persistent_leaves: bool,
    /// Maximum leaf-to-leaf distance from log blocks when felling.
    pub max_break_leaves_distance: u32,
}

/// Which chop-counting formula to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlgorithmChoice {
    /// Diminishing chops per block as trees grow.
    Logarithmic,
    /// Fixed chops per block plus a base offset.
    Linear,
}

/// Chop counting configuration.
///
/// Both formulas' coefficients are kept so switching the algorithm does
/// not lose tuning, matching how the persisted file groups them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChopCountingConfig {
    /// Formula choice.
    pub algorithm: AlgorithmChoice,
    /// How to round the computed chop count.
    pub rounding: Rounding,
    /// Whether felling can require more chops than the tree has blocks.
    pub can_require_more_chops_than_blocks: bool,
    /// Logarithmic scale coefficient; higher values mean more chops for
    /// bigger trees. Must be positive.
    pub logarithmic_a: f64,
    /// Linear chops per block, in `[0, 1]`.
    pub chops_per_block: f64,
    /// Linear base chops regardless of size; may be negative.
    pub base_chops: f64,
}

/// Interop configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompatibilityConfig {
    /// Whether a single external action may trigger chopping only once;
    /// fixes loops with items that break multiple blocks.
    pub prevent_chop_recursion: bool,
    /// Tool ids that never chop when used to break a log.
    pub tool_blacklist: Vec<String>,
    /// Per-tool chop multipliers (tool id -> chops per use), e.g. saws
    /// configured to count as several chops.
    pub tool_chop_multipliers: HashMap<String, u32>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for TreeDetectionConfig {
    fn default() -> Self {
        Self {
            max_tree_blocks: 320,
            max_leaves_blocks: 1024,
            break_leaves: true,
            ignore_persistent_leaves: true,
            max_break_leaves_distance: 7,
        }
    }
}

impl Default for ChopCountingConfig {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmChoice::Logarithmic,
            rounding: Rounding::Nearest,
            can_require_more_chops_than_blocks: false,
            logarithmic_a: 10.0,
            chops_per_block: 1.0,
            base_chops: 0.0,
        }
    }
}

impl Default for CompatibilityConfig {
    fn default() -> Self {
        Self {
            prevent_chop_recursion: true,
            tool_blacklist: Vec::new(),
            tool_chop_multipliers: HashMap::from([("saw".to_string(), 3)]),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Conversions into engine values ---

impl TreeDetectionConfig {
    /// Builds the scanner limits from this section.
    pub fn to_limits(&self) -> ScanLimits {
        ScanLimits {
            max_tree_blocks: self.max_tree_blocks as usize,
            max_leaves_blocks: self.max_leaves_blocks as usize,
            max_break_leaves_distance: self.max_break_leaves_distance,
            ignore_persistent_leaves: self.ignore_persistent_leaves,
        }
    }
}

impl ChopCountingConfig {
    /// Builds the counting policy from this section.
    pub fn to_counting(&self) -> ChopCounting {
        let algorithm = match self.algorithm {
            AlgorithmChoice::Logarithmic => Algorithm::Logarithmic {
                a: self.logarithmic_a,
            },
            AlgorithmChoice::Linear => Algorithm::Linear {
                chops_per_block: self.chops_per_block,
                base_chops: self.base_chops,
            },
        };
        ChopCounting {
            algorithm,
            rounding: self.rounding,
            can_require_more_chops_than_blocks: self.can_require_more_chops_than_blocks,
        }
    }
}

// --- Load / Save / Validate ---

impl Config {
    /// Load config from the given directory, or create a default config
    /// file. Loaded values are validated before being returned.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("timber.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `timber.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("timber.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None`
    /// otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("timber.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Rejects out-of-range values. Runs at load time so the engine
    /// never sees an invalid coefficient.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(field: &'static str, ok: bool, reason: String) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason })
            }
        }

        let td = &self.tree_detection;
        check(
            "tree_detection.max_tree_blocks",
            (1..=8096).contains(&td.max_tree_blocks),
            format!("{} not in 1..=8096", td.max_tree_blocks),
        )?;
        check(
            "tree_detection.max_leaves_blocks",
            (1..=8096).contains(&td.max_leaves_blocks),
            format!("{} not in 1..=8096", td.max_leaves_blocks),
        )?;
        check(
            "tree_detection.max_break_leaves_distance",
            td.max_break_leaves_distance <= 16,
            format!("{} not in 0..=16", td.max_break_leaves_distance),
        )?;

        let cc = &self.chop_counting;
        check(
            "chop_counting.logarithmic_a",
            cc.logarithmic_a > 0.0 && cc.logarithmic_a <= 10000.0,
            format!("{} not in (0, 10000]", cc.logarithmic_a),
        )?;
        check(
            "chop_counting.chops_per_block",
            (0.0..=1.0).contains(&cc.chops_per_block),
            format!("{} not in 0..=1", cc.chops_per_block),
        )?;
        check(
            "chop_counting.base_chops",
            (-10000.0..=10000.0).contains(&cc.base_chops),
            format!("{} not in -10000..=10000", cc.base_chops),
        )?;

        for (tool, &chops) in &self.compatibility.tool_chop_multipliers {
            check(
                "compatibility.tool_chop_multipliers",
                (1..=8096).contains(&chops),
                format!("{chops} chops for {tool} not in 1..=8096"),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.tree_detection.max_tree_blocks = 64;
        config.chop_counting.algorithm = AlgorithmChoice::Linear;
        config.save(dir.path()).unwrap();

        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("timber.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut changed = config.clone();
        changed.tree_detection.break_leaves = false;
        changed.save(dir.path()).unwrap();
        let reloaded = config.reload(dir.path()).unwrap().unwrap();
        assert!(!reloaded.tree_detection.break_leaves);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = Config::default();
        config.chop_counting.logarithmic_a = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "chop_counting.logarithmic_a",
                ..
            })
        ));

        let mut config = Config::default();
        config.tree_detection.max_tree_blocks = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.chop_counting.chops_per_block = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_conversions_into_engine_values() {
        let config = Config::default();
        let limits = config.tree_detection.to_limits();
        assert_eq!(limits.max_tree_blocks, 320);
        assert_eq!(limits.max_break_leaves_distance, 7);

        let counting = config.chop_counting.to_counting();
        assert_eq!(counting.algorithm, Algorithm::Logarithmic { a: 10.0 });
        assert!(!counting.can_require_more_chops_than_blocks);

        let mut config = config;
        config.chop_counting.algorithm = AlgorithmChoice::Linear;
        config.chop_counting.chops_per_block = 0.5;
        let counting = config.chop_counting.to_counting();
        assert_eq!(
            counting.algorithm,
            Algorithm::Linear {
                chops_per_block: 0.5,
                base_chops: 0.0
            }
        );
    }
}
