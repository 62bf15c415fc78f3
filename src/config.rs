// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::engine_core::constants::{config as keys, limits};
use crate::engine_core::errors::TaintError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Per-transaction capacities, fixed when a transaction is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    max_tainted_objects: usize,
    max_ranges_per_object: usize,
    max_global_ranges: usize,
}

impl Limits {
    pub fn new(max_tainted_objects: usize, max_ranges_per_object: usize) -> Result<Self, TaintError> {
        if max_tainted_objects == 0 || !max_tainted_objects.is_power_of_two() {
            return Err(TaintError::Configuration(format!(
                "max_tainted_objects must be a non-zero power of two, got {}",
                max_tainted_objects
            )));
        }
        if max_ranges_per_object == 0 {
            return Err(TaintError::Configuration(
                "max_ranges_per_object must be at least 1".to_string(),
            ));
        }
        let max_global_ranges = max_tainted_objects
            .checked_mul(max_ranges_per_object)
            .filter(|n| *n <= u32::MAX as usize)
            .ok_or_else(|| {
                TaintError::Configuration(format!(
                    "{} objects x {} ranges overflows the range pool",
                    max_tainted_objects, max_ranges_per_object
                ))
            })?;
        Ok(Self {
            max_tainted_objects,
            max_ranges_per_object,
            max_global_ranges,
        })
    }

    /// Weak map buckets and tainted object pool size.
    pub fn max_tainted_objects(&self) -> usize {
        self.max_tainted_objects
    }

    pub fn max_ranges_per_object(&self) -> usize {
        self.max_ranges_per_object
    }

    /// Range pool size.
    pub fn max_global_ranges(&self) -> usize {
        self.max_global_ranges
    }

    /// Cap on SharedRanges instances per transaction.
    pub fn max_range_vectors(&self) -> usize {
        self.max_tainted_objects
    }

    pub fn max_input_infos(&self) -> usize {
        self.max_tainted_objects
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_tainted_objects: limits::DEFAULT_MAX_TAINTED_OBJECTS,
            max_ranges_per_object: limits::DEFAULT_MAX_RANGES_PER_OBJECT,
            max_global_ranges: limits::DEFAULT_MAX_TAINTED_OBJECTS
                * limits::DEFAULT_MAX_RANGES_PER_OBJECT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct Config {
    pub max_transactions: usize,
    pub max_tainted_objects: usize,
    pub max_ranges_per_object: usize,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl Config {
    /// Defaults, overlaid by the YAML file named in the environment (if
    /// any), overlaid by individual environment variables.
    pub fn from_env() -> Result<Self, TaintError> {
        let mut config = match env::var(keys::ENV_CONFIG_PATH) {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };

        if let Some(n) = env_usize(keys::ENV_MAX_TRANSACTIONS)? {
            config.max_transactions = n;
        }
        if let Some(n) = env_usize(keys::ENV_MAX_TAINTED_OBJECTS)? {
            config.max_tainted_objects = n;
        }
        if let Some(n) = env_usize(keys::ENV_MAX_RANGES)? {
            config.max_ranges_per_object = n;
        }
        if let Ok(level) = env::var(keys::ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Ok(format) = env::var(keys::ENV_LOG_FORMAT) {
            config.log_format = format;
        }
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, TaintError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TaintError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_yaml_ng::from_str(&raw).map_err(|e| {
            TaintError::Configuration(format!("Invalid YAML in {}: {}", path.display(), e))
        })
    }

    pub fn limits(&self) -> Result<Limits, TaintError> {
        Limits::new(self.max_tainted_objects, self.max_ranges_per_object)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_transactions: limits::DEFAULT_MAX_TRANSACTIONS,
            max_tainted_objects: limits::DEFAULT_MAX_TAINTED_OBJECTS,
            max_ranges_per_object: limits::DEFAULT_MAX_RANGES_PER_OBJECT,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

fn env_usize(name: &str) -> Result<Option<usize>, TaintError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| TaintError::Configuration(format!("{}={:?}: {}", name, raw, e))),
        Err(_) => Ok(None),
    }
}
