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

/// Replica-agreement parameter for a single RPC. The adapter only ever uses
/// [`ConsistencyLevel::All`] (§6.4); the other variants exist so the type
/// mirrors the backend's real enum and a future caller-configurable
/// consistency level doesn't require a breaking change to this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsistencyLevel {
    One,
    Quorum,
    All,
}

impl Default for ConsistencyLevel {
    fn default() -> Self {
        ConsistencyLevel::All
    }
}
