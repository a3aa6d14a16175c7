// Copyright 2025 RisingWave Labs
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

//! Construction-time configuration for a [`crate::store::Store`].
//!
//! There is no process boundary here to read a config file at: the adapter
//! is a library embedded by the graph database, so this is a plain value
//! type built by the embedder rather than a layered file/env loader.

use std::time::Duration;

use crate::consistency::ConsistencyLevel;

/// Identity and operational knobs for one [`crate::store::Store`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Non-empty keyspace name; also the pool lease key (see §4.7).
    pub keyspace: String,
    /// Non-empty column-family name.
    pub column_family: String,
    /// Timeout applied by the caller-supplied RPC client; the adapter itself
    /// does not enforce it, it only maps a backend timeout error to
    /// [`crate::error::StoreError::RemoteTimeout`].
    pub rpc_timeout: Duration,
}

impl StoreConfig {
    pub fn new(keyspace: impl Into<String>, column_family: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            column_family: column_family.into(),
            rpc_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }

    /// Every RPC issued by the core uses the strongest available consistency.
    /// Fixed by design (§6.4); not configurable.
    pub fn consistency(&self) -> ConsistencyLevel {
        ConsistencyLevel::All
    }
}
