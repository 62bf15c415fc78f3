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

//! Tainted Object.
//!
//! Binds one host string to the ranges describing its taint. The object
//! holds a weak reference to the string; once the host collects it the
//! object reports empty, drops its ranges and waits for the next rehash to
//! evict it from the weak map.

use crate::engine_core::traits::{HostWeakRef, WeakLink, WeakObject};
use crate::engine_core::types::WeakKey;
use crate::tainted::range::SharedRanges;

#[derive(Debug)]
pub struct TaintedObject<R> {
    link: WeakLink,
    ranges: Option<SharedRanges>,
    target: R,
}

impl<R: HostWeakRef> TaintedObject<R> {
    pub fn new(key: WeakKey, ranges: SharedRanges, target: R) -> Self {
        Self {
            link: WeakLink { key, next: None },
            ranges: Some(ranges),
            target,
        }
    }

    /// Identity snapshot the object is indexed under.
    pub fn key(&self) -> WeakKey {
        self.link.key
    }

    pub fn ranges(&self) -> Option<&SharedRanges> {
        self.ranges.as_ref()
    }

    pub fn set_ranges(&mut self, ranges: SharedRanges) {
        self.ranges = Some(ranges);
    }

    /// Weak callback: release the target and the ranges. Memory held by the
    /// object itself is reclaimed by the next rehash.
    pub fn mark_collected(&mut self) {
        self.target.reset();
        self.ranges = None;
    }
}

impl<R: HostWeakRef> WeakObject for TaintedObject<R> {
    fn is_empty(&self) -> bool {
        self.target.is_collected()
    }

    fn current_key(&self) -> WeakKey {
        self.target.current_identity()
    }

    fn link(&self) -> &WeakLink {
        &self.link
    }

    fn link_mut(&mut self) -> &mut WeakLink {
        &mut self.link
    }
}
