use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::calendar::WeekMath;

pub const ENV_DATABASE: &str = "SHIFT_PLANNER_DB";
pub const ENV_WEEK_MATH: &str = "SHIFT_PLANNER_WEEK_MATH";
pub const ENV_FAN_OUT: &str = "SHIFT_PLANNER_FAN_OUT";
pub const ENV_SEED: &str = "SHIFT_PLANNER_SEED";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {var} '{value}': {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// How per-employee lookups of an aggregation are dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOut {
    #[default]
    Parallel,
    Sequential,
}

impl FromStr for FanOut {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parallel" => Ok(FanOut::Parallel),
            "sequential" => Ok(FanOut::Sequential),
            other => Err(format!("unknown fan out '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    /// Length of the generated availability horizon.
    pub horizon_months: u32,
    /// Length of the placeholder window of partial days.
    pub partial_window_hours: u32,
    /// Fixed seed for generated availability; entropy when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            horizon_months: 12,
            partial_window_hours: 8,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub week_math: WeekMath,
    pub fan_out: FanOut,
    pub availability: AvailabilityConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Override fields from `SHIFT_PLANNER_*` environment variables.
    pub fn apply_env(mut self) -> ConfigResult<Self> {
        self.apply_vars(|name| std::env::var(name).ok())?;
        Ok(self)
    }

    fn apply_vars<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE).filter(|value| !value.trim().is_empty()) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup(ENV_WEEK_MATH) {
            self.week_math = value
                .parse()
                .map_err(|reason: String| invalid(ENV_WEEK_MATH, &value, reason))?;
        }
        if let Some(value) = lookup(ENV_FAN_OUT) {
            self.fan_out = value
                .parse()
                .map_err(|reason: String| invalid(ENV_FAN_OUT, &value, reason))?;
        }
        if let Some(value) = lookup(ENV_SEED) {
            let seed = value
                .trim()
                .parse::<u64>()
                .map_err(|err| invalid(ENV_SEED, &value, err))?;
            self.availability.seed = Some(seed);
        }
        Ok(())
    }
}
