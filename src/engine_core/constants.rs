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

//! lilith-iast Constants - Single source of truth for all capacity values.
//!
//! This module centralizes all magic numbers, environment variable names and
//! default limits so that pools, maps and the transaction registry agree.

/// Capacity limits applied at construction time.
pub mod limits {
    /// Default maximum number of concurrently tracked transactions.
    pub const DEFAULT_MAX_TRANSACTIONS: usize = 2;
    /// Default tainted objects per transaction (must be a power of two)
    pub const DEFAULT_MAX_TAINTED_OBJECTS: usize = 4096;
    /// Default ranges per tainted object
    pub const DEFAULT_MAX_RANGES_PER_OBJECT: usize = 50;
}

/// Weak identity map hashing
pub mod weak_map {
    /// Host objects are 8-byte aligned, so the low bits carry no entropy.
    pub const KEY_ALIGNMENT_SHIFT: u32 = 3;
}

/// String propagation defaults
pub mod propagation {
    /// Separator length used by `Array.prototype.join` when none is given (",").
    pub const DEFAULT_JOIN_SEPARATOR_LENGTH: usize = 1;
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_CONFIG_PATH: &str = "LILITH_IAST_CONFIG_PATH";
    pub const ENV_MAX_TRANSACTIONS: &str = "LILITH_IAST_MAX_TRANSACTIONS";
    pub const ENV_MAX_TAINTED_OBJECTS: &str = "LILITH_IAST_MAX_TAINTED_OBJECTS";
    pub const ENV_MAX_RANGES: &str = "LILITH_IAST_MAX_RANGES";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
}
