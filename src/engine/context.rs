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

//! Process-wide engine context.
//!
//! One [`IastContext`] is built by the embedder at module load and passed to
//! every entry point; there is no hidden global. Dropping or shutting it down
//! releases every transaction.

use tracing::info;

use crate::config::Config;
use crate::container::weak_map::RehashStats;
use crate::engine::gc::{self, GcEpoch};
use crate::engine::manager::TransactionManager;
use crate::engine_core::errors::TaintError;
use crate::engine_core::traits::HostWeakRef;
use crate::engine_core::types::WeakCallbackToken;

#[derive(Debug)]
pub struct IastContext<R> {
    config: Config,
    manager: TransactionManager<R>,
}

impl<R: HostWeakRef> IastContext<R> {
    /// Validate `config` and build the transaction registry.
    pub fn init(config: Config) -> Result<Self, TaintError> {
        let limits = config.limits()?;
        info!(
            max_transactions = config.max_transactions,
            max_tainted_objects = limits.max_tainted_objects(),
            max_ranges_per_object = limits.max_ranges_per_object(),
            "IAST taint engine initialised"
        );
        Ok(Self {
            manager: TransactionManager::new(limits, config.max_transactions),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manager(&self) -> &TransactionManager<R> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut TransactionManager<R> {
        &mut self.manager
    }

    pub fn on_gc_epilogue(&mut self, epoch: GcEpoch) -> RehashStats {
        gc::on_gc_epilogue(&mut self.manager, epoch)
    }

    pub fn on_weak_collected(&mut self, token: WeakCallbackToken) -> bool {
        self.manager.on_weak_collected(token)
    }

    /// Release all transactions. Consumes the context so nothing can use it
    /// afterwards.
    pub fn shutdown(mut self) {
        let live = self.manager.size();
        self.manager.clear();
        info!(released = live, "IAST taint engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_core::types::TransactionKey;
    use crate::host::sim::SimWeak;

    #[test]
    fn test_init_rejects_invalid_limits() {
        let config = Config {
            max_tainted_objects: 100,
            ..Config::default()
        };
        assert!(IastContext::<SimWeak>::init(config).is_err());
    }

    #[test]
    fn test_init_applies_transaction_bound() {
        let config = Config {
            max_transactions: 1,
            max_tainted_objects: 16,
            ..Config::default()
        };
        let mut ctx = IastContext::<SimWeak>::init(config).unwrap();
        assert_eq!(ctx.manager().max_items(), 1);
        assert_eq!(ctx.manager().limits().max_tainted_objects(), 16);

        ctx.manager_mut().new_transaction(TransactionKey::new(1)).unwrap();
        assert!(ctx.manager_mut().new_transaction(TransactionKey::new(2)).is_err());
        ctx.shutdown();
    }
}
