use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TbResult;

/// Testbench settings. Every field has a default, a TOML file only needs to name what changes.
///
/// ```toml
/// seed = 42
/// result_timeout_cycles = 70000
/// junit_path = "results.xml"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TbConfig {
    pub seed: u64,
    pub clock_period_ns: u64,
    /// Clock edges the reset is held for.
    pub reset_cycles: u32,
    /// Edges the driver waits for a stale result-valid to clear before it proceeds anyway.
    pub stale_valid_bound: u32,
    /// Edges the driver and the monitor wait for result-valid.
    pub result_timeout_cycles: u32,
    pub random_txns: usize,
    pub full_random_txns: usize,
    pub back_to_back_txns: usize,
    /// Edges to wait after the last sequence finished.
    pub drain_cycles: u32,
    pub full_drain_cycles: u32,
    pub startup_delay_ns: u64,
    pub delta_limit: u32,
    pub max_sim_time_ns: u64,
    pub junit_path: Option<PathBuf>,
}

impl Default for TbConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            clock_period_ns: 10,
            reset_cycles: 5,
            stale_valid_bound: 10,
            result_timeout_cycles: 1000,
            random_txns: 100,
            full_random_txns: 50,
            back_to_back_txns: 30,
            drain_cycles: 10,
            full_drain_cycles: 20,
            startup_delay_ns: 1,
            delta_limit: 1000,
            max_sim_time_ns: 10_000_000_000,
            junit_path: None,
        }
    }
}

impl TbConfig {
    pub fn from_toml_str(s: &str) -> TbResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> TbResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
