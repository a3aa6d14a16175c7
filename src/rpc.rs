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

//! The backend RPC contract and connection pool contract this adapter
//! consumes (§6.1, §6.2). Both are external collaborators: their concrete
//! implementations (a real Thrift client, a real connection pool) live
//! outside this crate. We only depend on the trait shape here, plus an
//! in-memory double in [`crate::memory`] used to exercise the adapter
//! without a live cluster.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::consistency::ConsistencyLevel;
use crate::error::Result;

/// A `(column, value)` pair, the unit of read and write (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub column: Bytes,
    pub value: Bytes,
}

impl Entry {
    /// Always copies its inputs rather than assuming a `'static` or
    /// already-refcounted buffer, per the "duplicate byte sequences" design
    /// note: a caller's byte sequence must not be aliased or mutated after
    /// being handed across this boundary.
    pub fn new(column: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Self {
        Self {
            column: Bytes::copy_from_slice(column.as_ref()),
            value: Bytes::copy_from_slice(value.as_ref()),
        }
    }
}

/// The selector half of `get_slice`: either an explicit list of column
/// names, or a range with both endpoints inclusive and a result-count cap.
/// This mirrors the backend's real slice predicate, which has no
/// exclusivity flags — the empty `Bytes` value on either end of `Range`
/// means "unbounded on that side", matching the wire convention the
/// backend itself uses.
#[derive(Debug, Clone)]
pub enum SlicePredicate {
    Columns(Vec<Bytes>),
    Range {
        start: Bytes,
        finish: Bytes,
        count: i32,
    },
}

/// One element of a batched mutation for a single (key, column-family)
/// (§4.5, §6.1).
#[derive(Debug, Clone)]
pub enum Mutation {
    Insert {
        column: Bytes,
        value: Bytes,
        timestamp: i64,
    },
    /// A column-set deletion: the predicate enumerates the column names to
    /// remove under one timestamp.
    Delete {
        columns: Vec<Bytes>,
        timestamp: i64,
    },
}

/// The backend RPC client contract (§6.1). A concrete implementation talks
/// Thrift (or whatever wire protocol the deployed backend speaks) to one
/// live connection; this adapter never constructs one directly, it only
/// borrows one from a [`ConnectionPool`].
#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn get(
        &self,
        key: &Bytes,
        column_family: &str,
        column: &Bytes,
        consistency: ConsistencyLevel,
    ) -> Result<Option<Bytes>>;

    async fn get_slice(
        &self,
        key: &Bytes,
        column_family: &str,
        predicate: &SlicePredicate,
        consistency: ConsistencyLevel,
    ) -> Result<Vec<Entry>>;

    async fn insert(
        &self,
        key: &Bytes,
        column_family: &str,
        column: &Bytes,
        value: &Bytes,
        timestamp: i64,
        consistency: ConsistencyLevel,
    ) -> Result<()>;

    async fn remove(
        &self,
        key: &Bytes,
        column_family: &str,
        column: &Bytes,
        timestamp: i64,
        consistency: ConsistencyLevel,
    ) -> Result<()>;

    /// `map<key, map<columnFamily, list<Mutation>>>` in one RPC (§6.1).
    async fn batch_mutate(
        &self,
        mutations: &HashMap<Bytes, HashMap<String, Vec<Mutation>>>,
        consistency: ConsistencyLevel,
    ) -> Result<()>;
}

/// The connection pool contract (§6.2). `borrow` may fail (e.g. pool
/// exhausted, backend unreachable); `return_connection` must not.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    async fn borrow(&self, keyspace: &str) -> Result<Arc<dyn BackendClient>>;

    fn return_connection(&self, keyspace: &str, connection: Arc<dyn BackendClient>);
}
