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

//! An in-process double of the backend RPC client and connection pool
//! (§6.1, §6.2), analogous to an in-memory state store used elsewhere to
//! exercise a storage trait without a live cluster.
//!
//! [`InMemoryBackend`] never compacts tombstones and keeps every column in
//! memory for as long as the process runs, so — like its counterparts
//! elsewhere in this ecosystem — it should never be used for anything but
//! tests and local experimentation.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::consistency::ConsistencyLevel;
use crate::error::Result;
use crate::rpc::{BackendClient, ConnectionPool, Entry, Mutation, SlicePredicate};

#[derive(Debug, Clone)]
struct Cell {
    value: Option<Bytes>,
    timestamp: i64,
}

type RowKey = (Bytes, String);

/// An in-memory backend keyed by `(row key, column family) -> column ->
/// cell`. Writes are last-write-wins by timestamp, with a later call always
/// beating an earlier one on a tie — matching the fact that the timestamp
/// oracle already guarantees strictly increasing timestamps for any single
/// `Store`, so true ties only arise across independent, out-of-scope
/// writers (§4.6's scope limit).
#[derive(Default)]
pub struct InMemoryBackend {
    rows: RwLock<HashMap<RowKey, BTreeMap<Bytes, Cell>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_write(&self, key: &Bytes, cf: &str, column: &Bytes, value: Option<Bytes>, ts: i64) {
        let mut rows = self.rows.write();
        let row = rows
            .entry((key.clone(), cf.to_owned()))
            .or_insert_with(BTreeMap::new);
        let should_write = match row.get(column) {
            Some(existing) => ts >= existing.timestamp,
            None => true,
        };
        if should_write {
            row.insert(column.clone(), Cell { value, timestamp: ts });
        }
    }

    fn read_slice(
        &self,
        key: &Bytes,
        cf: &str,
        predicate: &SlicePredicate,
    ) -> Vec<Entry> {
        let rows = self.rows.read();
        let Some(row) = rows.get(&(key.clone(), cf.to_owned())) else {
            return Vec::new();
        };
        match predicate {
            SlicePredicate::Columns(columns) => columns
                .iter()
                .filter_map(|column| {
                    row.get(column).and_then(|cell| {
                        cell.value
                            .clone()
                            .map(|value| Entry::new(column.clone(), value))
                    })
                })
                .collect(),
            SlicePredicate::Range {
                start,
                finish,
                count,
            } => {
                let lower = if start.is_empty() {
                    Bound::Unbounded
                } else {
                    Bound::Included(start.clone())
                };
                let upper = if finish.is_empty() {
                    Bound::Unbounded
                } else {
                    Bound::Included(finish.clone())
                };
                row.range((lower, upper))
                    .filter_map(|(column, cell)| {
                        cell.value
                            .clone()
                            .map(|value| Entry::new(column.clone(), value))
                    })
                    .take((*count).max(0) as usize)
                    .collect()
            }
        }
    }
}

#[async_trait]
impl BackendClient for InMemoryBackend {
    async fn get(
        &self,
        key: &Bytes,
        column_family: &str,
        column: &Bytes,
        _consistency: ConsistencyLevel,
    ) -> Result<Option<Bytes>> {
        let rows = self.rows.read();
        Ok(rows
            .get(&(key.clone(), column_family.to_owned()))
            .and_then(|row| row.get(column))
            .and_then(|cell| cell.value.clone()))
    }

    async fn get_slice(
        &self,
        key: &Bytes,
        column_family: &str,
        predicate: &SlicePredicate,
        _consistency: ConsistencyLevel,
    ) -> Result<Vec<Entry>> {
        Ok(self.read_slice(key, column_family, predicate))
    }

    async fn insert(
        &self,
        key: &Bytes,
        column_family: &str,
        column: &Bytes,
        value: &Bytes,
        timestamp: i64,
        _consistency: ConsistencyLevel,
    ) -> Result<()> {
        self.apply_write(key, column_family, column, Some(value.clone()), timestamp);
        Ok(())
    }

    async fn remove(
        &self,
        key: &Bytes,
        column_family: &str,
        column: &Bytes,
        timestamp: i64,
        _consistency: ConsistencyLevel,
    ) -> Result<()> {
        self.apply_write(key, column_family, column, None, timestamp);
        Ok(())
    }

    async fn batch_mutate(
        &self,
        mutations: &HashMap<Bytes, HashMap<String, Vec<Mutation>>>,
        _consistency: ConsistencyLevel,
    ) -> Result<()> {
        for (key, by_cf) in mutations {
            for (cf, column_mutations) in by_cf {
                for mutation in column_mutations {
                    match mutation {
                        Mutation::Insert {
                            column,
                            value,
                            timestamp,
                        } => self.apply_write(key, cf, column, Some(value.clone()), *timestamp),
                        Mutation::Delete { columns, timestamp } => {
                            for column in columns {
                                self.apply_write(key, cf, column, None, *timestamp);
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// A pool double that hands out the same shared [`InMemoryBackend`] for
/// every keyspace and counts borrows/returns so tests can assert the
/// connection-lease discipline of §4.7 (property 6 of §8) holds even on
/// error paths.
pub struct InMemoryPool {
    backend: Arc<InMemoryBackend>,
    borrowed: AtomicUsize,
    returned: AtomicUsize,
}

impl InMemoryPool {
    pub fn new() -> Self {
        Self {
            backend: Arc::new(InMemoryBackend::new()),
            borrowed: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
        }
    }

    pub fn backend(&self) -> Arc<InMemoryBackend> {
        self.backend.clone()
    }

    pub fn borrowed_count(&self) -> usize {
        self.borrowed.load(Ordering::SeqCst)
    }

    pub fn returned_count(&self) -> usize {
        self.returned.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryPool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionPool for InMemoryPool {
    async fn borrow(&self, _keyspace: &str) -> Result<Arc<dyn BackendClient>> {
        self.borrowed.fetch_add(1, Ordering::SeqCst);
        let connection: Arc<dyn BackendClient> = self.backend.clone();
        Ok(connection)
    }

    fn return_connection(&self, _keyspace: &str, _connection: Arc<dyn BackendClient>) {
        self.returned.fetch_add(1, Ordering::SeqCst);
    }
}

/// A backend wrapper that fails every call with a fixed error, for testing
/// that a borrowed connection is still returned when the RPC itself fails.
pub struct AlwaysFailBackend {
    error: fn() -> crate::error::StoreError,
}

impl AlwaysFailBackend {
    pub fn new(error: fn() -> crate::error::StoreError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl BackendClient for AlwaysFailBackend {
    async fn get(
        &self,
        _key: &Bytes,
        _column_family: &str,
        _column: &Bytes,
        _consistency: ConsistencyLevel,
    ) -> Result<Option<Bytes>> {
        Err((self.error)())
    }

    async fn get_slice(
        &self,
        _key: &Bytes,
        _column_family: &str,
        _predicate: &SlicePredicate,
        _consistency: ConsistencyLevel,
    ) -> Result<Vec<Entry>> {
        Err((self.error)())
    }

    async fn insert(
        &self,
        _key: &Bytes,
        _column_family: &str,
        _column: &Bytes,
        _value: &Bytes,
        _timestamp: i64,
        _consistency: ConsistencyLevel,
    ) -> Result<()> {
        Err((self.error)())
    }

    async fn remove(
        &self,
        _key: &Bytes,
        _column_family: &str,
        _column: &Bytes,
        _timestamp: i64,
        _consistency: ConsistencyLevel,
    ) -> Result<()> {
        Err((self.error)())
    }

    async fn batch_mutate(
        &self,
        _mutations: &HashMap<Bytes, HashMap<String, Vec<Mutation>>>,
        _consistency: ConsistencyLevel,
    ) -> Result<()> {
        Err((self.error)())
    }
}

/// A pool double that always hands out an [`AlwaysFailBackend`], for
/// testing borrow-failure and mid-operation-failure connection-return
/// paths.
pub struct AlwaysFailPool {
    error: fn() -> crate::error::StoreError,
    borrowed: AtomicUsize,
    returned: AtomicUsize,
}

impl AlwaysFailPool {
    pub fn new(error: fn() -> crate::error::StoreError) -> Self {
        Self {
            error,
            borrowed: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
        }
    }

    pub fn borrowed_count(&self) -> usize {
        self.borrowed.load(Ordering::SeqCst)
    }

    pub fn returned_count(&self) -> usize {
        self.returned.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionPool for AlwaysFailPool {
    async fn borrow(&self, _keyspace: &str) -> Result<Arc<dyn BackendClient>> {
        self.borrowed.fetch_add(1, Ordering::SeqCst);
        let connection: Arc<dyn BackendClient> = Arc::new(AlwaysFailBackend::new(self.error));
        Ok(connection)
    }

    fn return_connection(&self, _keyspace: &str, _connection: Arc<dyn BackendClient>) {
        self.returned.fetch_add(1, Ordering::SeqCst);
    }
}
