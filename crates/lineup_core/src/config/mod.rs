//! # Lineup Configuration
//!
//! 포메이션 규칙과 병렬 처리 설정을 한 곳에서 관리.
//!
//! ## 사용법
//! ```rust
//! use lineup_core::config::LineupConfig;
//!
//! let config = LineupConfig::default();
//! let sequential = LineupConfig::sequential();
//! assert!(!sequential.parallel.enabled);
//! assert_eq!(config.rules.starters, 11);
//! ```

mod formation_rules;
mod parallel_config;

pub use formation_rules::{FormationRules, PositionRange};
pub use parallel_config::ParallelConfig;

use crate::error::ConfigError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, JsonSchema)]
pub struct LineupConfig {
    #[serde(default)]
    pub rules: FormationRules,
    #[serde(default)]
    pub parallel: ParallelConfig,
}

impl LineupConfig {
    /// Standard fantasy rules (1 GK, 3-5 DEF, 3-5 MID, 1-3 FWD), parallel sweeps.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Same rules, everything on the calling thread.
    pub fn sequential() -> Self {
        Self { parallel: ParallelConfig::sequential(), ..Self::default() }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: LineupConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()
    }
}
