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

use serde::{Deserialize, Serialize};

use crate::engine::manager::TransactionManager;
use crate::engine_core::traits::HostWeakRef;
use crate::engine_core::types::TransactionKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryVerbosity {
    Off,
    Mandatory,
    Information,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Tainted objects tracked for the request
    pub request_count: usize,
}

/// Per-request telemetry. Only reported at `Information` and above.
pub fn metrics<R: HostWeakRef>(
    manager: &TransactionManager<R>,
    transaction: TransactionKey,
    verbosity: TelemetryVerbosity,
) -> Option<Metrics> {
    let tx = manager.get(transaction)?;
    match verbosity {
        TelemetryVerbosity::Debug | TelemetryVerbosity::Information => Some(Metrics {
            request_count: tx.tainted_count(),
        }),
        TelemetryVerbosity::Off | TelemetryVerbosity::Mandatory => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&Metrics { request_count: 3 }).unwrap();
        assert_eq!(json, r#"{"requestCount":3}"#);
        let v: TelemetryVerbosity = serde_json::from_str(r#""information""#).unwrap();
        assert_eq!(v, TelemetryVerbosity::Information);
    }
}
