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

//! Transaction Manager.
//!
//! Bounded registry from request key to [`Transaction`]. The bound is
//! backpressure: once `max_items` requests are tracked, further requests run
//! untracked until one ends. Ended transactions are cleaned and parked in a
//! recycler so their pools are reused instead of reallocated.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::Limits;
use crate::container::queued_pool::QueuedPool;
use crate::container::weak_map::RehashStats;
use crate::engine_core::constants::limits::DEFAULT_MAX_TRANSACTIONS;
use crate::engine_core::errors::TaintError;
use crate::engine_core::traits::HostWeakRef;
use crate::engine_core::types::{TransactionKey, WeakCallbackToken};
use crate::tainted::transaction::Transaction;

#[derive(Debug)]
pub struct TransactionManager<R> {
    max_items: usize,
    limits: Limits,
    registry: HashMap<TransactionKey, Box<Transaction<R>>>,
    recycler: QueuedPool<Box<Transaction<R>>>,
}

impl<R: HostWeakRef> TransactionManager<R> {
    pub fn new(limits: Limits, max_items: usize) -> Self {
        Self {
            max_items,
            limits,
            registry: HashMap::new(),
            recycler: QueuedPool::new(),
        }
    }

    /// Transaction for `key`, creating it when the bound allows.
    pub fn new_transaction(&mut self, key: TransactionKey) -> Result<&mut Transaction<R>, TaintError> {
        if !self.registry.contains_key(&key) {
            if self.registry.len() >= self.max_items {
                warn!(
                    transaction = %key,
                    max = self.max_items,
                    "Transaction limit reached, request runs untracked"
                );
                return Err(TaintError::TransactionLimit {
                    max: self.max_items,
                });
            }
            let limits = self.limits;
            let mut transaction = self
                .recycler
                .try_pop_or_else(|n| Transaction::new(key, n, limits).map(Box::new))?;
            transaction.bind(key);
            debug!(
                transaction = %key,
                instance = transaction.instance_id(),
                "Transaction created"
            );
            self.registry.insert(key, transaction);
        }
        self.registry
            .get_mut(&key)
            .map(|t| &mut **t)
            .ok_or(TaintError::UnknownTransaction)
    }

    pub fn get(&self, key: TransactionKey) -> Option<&Transaction<R>> {
        self.registry.get(&key).map(|t| &**t)
    }

    pub fn get_mut(&mut self, key: TransactionKey) -> Option<&mut Transaction<R>> {
        self.registry.get_mut(&key).map(|t| &mut **t)
    }

    /// End a request: release its taint state and recycle the instance.
    pub fn remove(&mut self, key: TransactionKey) -> bool {
        match self.registry.remove(&key) {
            Some(mut transaction) => {
                transaction.clean();
                debug!(
                    transaction = %key,
                    instance = transaction.instance_id(),
                    "Transaction removed"
                );
                self.recycler.push(transaction);
                true
            }
            None => false,
        }
    }

    /// Rehash every live transaction. Must run after each collector epoch.
    pub fn rehash_all(&mut self) -> RehashStats {
        let mut total = RehashStats::default();
        for transaction in self.registry.values_mut() {
            total += transaction.rehash_map();
        }
        total
    }

    /// Route a weak callback to the transaction that registered it.
    pub fn on_weak_collected(&mut self, token: WeakCallbackToken) -> bool {
        self.registry
            .get_mut(&token.transaction)
            .is_some_and(|t| t.on_weak_collected(token.object))
    }

    /// Drop every transaction, live or recycled.
    pub fn clear(&mut self) {
        for (_, mut transaction) in self.registry.drain() {
            transaction.clean();
            self.recycler.push(transaction);
        }
        self.recycler.clear();
    }

    pub fn set_max_items(&mut self, max_items: usize) {
        self.max_items = max_items;
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Live transactions.
    pub fn size(&self) -> usize {
        self.registry.len()
    }

    /// Instances constructed and not yet dropped, live or recycled.
    pub fn instances(&self) -> usize {
        self.recycler.size()
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

impl<R: HostWeakRef> Default for TransactionManager<R> {
    fn default() -> Self {
        Self::new(Limits::default(), DEFAULT_MAX_TRANSACTIONS)
    }
}
