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

//! Domain error types.
//!
//! Exhaustion is routine in the taint engine, so every failure is a returned
//! value. Callers at the propagation boundary downgrade these to "taint not
//! recorded" but can still tell them apart from "no taint existed".

use thiserror::Error;

/// Fixed and queued pool failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No free slot remains and the pool never grows
    #[error("Pool exhausted (capacity {capacity})")]
    Exhausted { capacity: usize },

    /// Handle refers to a slot that is free or was recycled since
    #[error("Stale or foreign pool handle")]
    StaleHandle,
}

/// Weak identity map failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeakMapError {
    /// Payload handle is not live in the backing pool
    #[error("Invalid argument: payload is not a live pool entry")]
    InvalidArgument,

    /// Map already holds `capacity` entries
    #[error("Weak map capacity exceeded (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    /// Bucket count must be a non-zero power of two
    #[error("Weak map capacity must be a power of two, got {requested}")]
    InvalidCapacity { requested: usize },
}

/// Main error type for the taint engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaintError {
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Weak map error: {0}")]
    WeakMap(#[from] WeakMapError),

    /// Registry already tracks `max` transactions
    #[error("Transaction limit reached (max {max})")]
    TransactionLimit { max: usize },

    #[error("Unknown transaction")]
    UnknownTransaction,

    #[error("Input info limit reached (capacity {capacity})")]
    InputInfoLimit { capacity: usize },

    #[error("Invalid range [{start}, {end})")]
    InvalidRange { start: usize, end: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TaintError {
    /// True for capacity conditions: the engine ran out of room, as opposed
    /// to being called with bad input.
    pub fn is_exhaustion(&self) -> bool {
        match self {
            TaintError::Pool(PoolError::Exhausted { .. })
            | TaintError::WeakMap(WeakMapError::CapacityExceeded { .. })
            | TaintError::TransactionLimit { .. }
            | TaintError::InputInfoLimit { .. } => true,
            TaintError::Pool(PoolError::StaleHandle)
            | TaintError::WeakMap(_)
            | TaintError::UnknownTransaction
            | TaintError::InvalidRange { .. }
            | TaintError::Configuration(_) => false,
        }
    }

    /// Short label used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            TaintError::Pool(PoolError::Exhausted { .. }) => "pool_exhausted",
            TaintError::Pool(PoolError::StaleHandle) => "stale_handle",
            TaintError::WeakMap(WeakMapError::CapacityExceeded { .. }) => "map_full",
            TaintError::WeakMap(_) => "invalid_argument",
            TaintError::TransactionLimit { .. } => "transaction_limit",
            TaintError::UnknownTransaction => "unknown_transaction",
            TaintError::InputInfoLimit { .. } => "input_info_limit",
            TaintError::InvalidRange { .. } => "invalid_range",
            TaintError::Configuration(_) => "configuration",
        }
    }
}
