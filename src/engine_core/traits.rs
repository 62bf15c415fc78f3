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

//! Host Runtime Boundary Traits.
//!
//! Defines what the engine needs from the managed-language runtime that
//! embeds it, and the capability every weak map payload must expose.
//!
//! The engine is single-threaded: all calls, including weak callbacks and
//! GC epilogue hooks, arrive on the host's execution thread. Shared state
//! uses `Rc`/`RefCell`, so the compiler rejects moving it across threads.

use crate::container::pool::PoolHandle;
use crate::engine_core::types::{WeakCallbackToken, WeakKey};

/// A live host string value.
pub trait HostString {
    /// Weak handle type produced by [`HostString::downgrade`].
    type Weak: HostWeakRef;

    /// Current address-like identity. Stable only until the next GC epoch.
    fn identity(&self) -> WeakKey;

    /// Length in UTF-16 code units.
    fn len_utf16(&self) -> usize;

    fn to_utf8(&self) -> String;

    /// Create a weak reference that reports emptiness once the string is
    /// collected. The host must deliver `token` to the weak-callback hook
    /// when that happens.
    fn downgrade(&self, token: WeakCallbackToken) -> Self::Weak;
}

/// Weak reference onto a host string.
pub trait HostWeakRef {
    /// True once the collector reclaimed the target (or after `reset`).
    fn is_collected(&self) -> bool;

    /// Identity of the target right now; it drifts when the collector
    /// moves the string.
    fn current_identity(&self) -> WeakKey;

    /// Drop the reference so it reports collected from now on.
    fn reset(&mut self);
}

/// Intrusive chain link stored inside every weak map payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeakLink {
    /// Identity snapshot the entry is currently bucketed under
    pub key: WeakKey,
    /// Next entry in the same bucket
    pub next: Option<PoolHandle>,
}

/// Capability the weak identity map requires from its payloads.
pub trait WeakObject {
    /// True once the host collected the backing object.
    fn is_empty(&self) -> bool;

    /// Live identity of the backing object, which may differ from the
    /// bucketed `link().key` after a moving collection.
    fn current_key(&self) -> WeakKey;

    fn link(&self) -> &WeakLink;

    fn link_mut(&mut self) -> &mut WeakLink;
}
