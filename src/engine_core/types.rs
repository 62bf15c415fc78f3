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

//! Identity Types.
//!
//! Strongly typed address wrappers so a string identity can never be passed
//! where a transaction identity is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::container::pool::PoolHandle;

/// Snapshot of a host object's current address.
///
/// Only stable until the next garbage collection epoch; the weak map must be
/// rehashed before it is trusted again.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct WeakKey(usize);

impl WeakKey {
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn addr(self) -> usize {
        self.0
    }
}

impl From<usize> for WeakKey {
    fn from(addr: usize) -> Self {
        Self(addr)
    }
}

impl fmt::Display for WeakKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Identity of one logical request, derived from a host-side token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionKey(usize);

impl TransactionKey {
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn addr(self) -> usize {
        self.0
    }
}

impl From<usize> for TransactionKey {
    fn from(addr: usize) -> Self {
        Self(addr)
    }
}

impl fmt::Display for TransactionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Handed to the host when a weak reference is created; the host returns it
/// when the referenced string is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeakCallbackToken {
    pub transaction: TransactionKey,
    pub object: PoolHandle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_is_hex() {
        assert_eq!(WeakKey::new(0x1000).to_string(), "0x1000");
        assert_eq!(TransactionKey::from(255).to_string(), "0xff");
    }

    #[test]
    fn test_key_serde_transparent_roundtrip() {
        let key = WeakKey::new(0x2000);
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "8192");
        let back: WeakKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
