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

/// Where a taint came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct InputInfo {
    pub parameter_name: String,
    pub parameter_value: String,
    #[serde(rename = "type")]
    pub origin_type: String,
}

impl InputInfo {
    pub fn new(
        parameter_name: impl Into<String>,
        parameter_value: impl Into<String>,
        origin_type: impl Into<String>,
    ) -> Self {
        Self {
            parameter_name: parameter_name.into(),
            parameter_value: parameter_value.into(),
            origin_type: origin_type.into(),
        }
    }
}

/// Position of an [`InputInfo`] in its transaction. Only meaningful until
/// that transaction is cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputInfoId(u32);

impl InputInfoId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let info = InputInfo::new("user.name", "alice", "http.request.parameter");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["parameterName"], "user.name");
        assert_eq!(json["parameterValue"], "alice");
        assert_eq!(json["type"], "http.request.parameter");
    }
}
