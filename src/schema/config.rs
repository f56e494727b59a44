/// Generator configuration, loadable from RON.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::lorem::LoremOptions;
use crate::core::name_list::DEFAULT_MIDDLE_NAME_PROBABILITY;
use crate::DEFAULT_DATA_DIR;

/// Minimum number of consecutive failed attempts tolerated by quote generation.
pub const DEFAULT_MIN_FAILURE_BUDGET: usize = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabulistConfig {
    /// Directory holding `*_list.txt` word lists and `lorem_*.txt` corpora.
    /// `None` starts without any file-backed data.
    pub data_dir: Option<PathBuf>,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub middle_name_probability: f64,
    pub min_failure_budget: usize,
    /// Defaults for the lorem convenience calls.
    pub lorem: LoremOptions,
}

impl Default for FabulistConfig {
    fn default() -> Self {
        Self {
            data_dir: Some(PathBuf::from(DEFAULT_DATA_DIR)),
            seed: None,
            middle_name_probability: DEFAULT_MIDDLE_NAME_PROBABILITY,
            min_failure_budget: DEFAULT_MIN_FAILURE_BUDGET,
            lorem: LoremOptions::default(),
        }
    }
}

impl FabulistConfig {
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}
