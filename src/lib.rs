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

//! lilith-iast: string taint tracking for interactive application security
//! testing.
//!
//! A host runtime reports where untrusted input enters (sources) and how
//! strings are derived from one another (concatenation, slicing, replacement
//! and so on). The engine keeps, per request, the character ranges of each
//! string that came from which input, so a sink can ask whether a value
//! carries user data and exactly where.
//!
//! State is scoped to a [`engine::TransactionManager`] transaction, sized up
//! front from [`config::Limits`], and follows the host's moving collector
//! through weak references (see [`engine::gc`]).

pub mod api;
pub mod config;
pub mod container;
pub mod engine;
pub mod engine_core;
pub mod host;
pub mod tainted;
pub mod utils;

#[cfg(kani)]
mod verification;
