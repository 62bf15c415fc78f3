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

//! Tainted span of a string.

use crate::container::pool::PoolHandle;
use crate::container::shared_vector::SharedVector;
use crate::tainted::input_info::InputInfoId;

/// Bitmask of sanitizers a range already went through.
pub type SecureMarks = u32;

/// Handle of a [`Range`] in its transaction's range pool.
pub type RangeHandle = PoolHandle;

/// Ordered range handles shared between tainted strings.
pub type SharedRanges = SharedVector<RangeHandle>;

/// Half-open `[start, end)` span in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
    pub input_info: InputInfoId,
    pub secure_marks: SecureMarks,
}

impl Range {
    pub fn new(start: usize, end: usize, input_info: InputInfoId, secure_marks: SecureMarks) -> Self {
        Self {
            start,
            end,
            input_info,
            secure_marks,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len() {
        let r = Range::new(2, 7, InputInfoId::new(0), 0);
        assert_eq!(r.len(), 5);
        assert!(!r.is_empty());
        assert!(Range::new(3, 3, InputInfoId::new(0), 0).is_empty());
    }
}
