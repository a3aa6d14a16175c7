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

//! The ordered key-column-value [`Store`] (§2, §4).
//!
//! A `Store` binds one (keyspace, column-family) pair. It is stateless
//! beyond that identity, a handle to the externally-owned connection pool,
//! and its own [`TimestampOracle`]. All public operations may be called
//! concurrently from any number of tasks (§5).

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::lease::ConnectionLease;
use crate::oracle::TimestampOracle;
use crate::rpc::{ConnectionPool, Entry, Mutation, SlicePredicate};
use crate::slice::{filter_inclusive_result, normalize_limit, plan_slice, SlicePlan};

/// Opaque token threaded through every operation (§3). The core does not
/// interpret it; it exists only so callers can carry transactional context
/// into a future implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionHandle;

/// Per-key additions and deletions for [`Store::mutate_many`] (§4.5).
#[derive(Debug, Clone, Default)]
pub struct KeyMutation {
    pub additions: Vec<Entry>,
    pub deletions: Vec<Bytes>,
}

impl KeyMutation {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty()
    }
}

pub struct Store<P: ConnectionPool + 'static> {
    config: StoreConfig,
    pool: Arc<P>,
    oracle: TimestampOracle,
}

impl<P: ConnectionPool + 'static> Store<P> {
    pub fn new(config: StoreConfig, pool: Arc<P>) -> Self {
        assert!(!config.keyspace.is_empty(), "keyspace must be non-empty");
        assert!(
            !config.column_family.is_empty(),
            "column family must be non-empty"
        );
        Self {
            config,
            pool,
            oracle: TimestampOracle::new(),
        }
    }

    async fn lease(&self) -> Result<ConnectionLease<'_>> {
        ConnectionLease::acquire(self.pool.as_ref(), &self.config.keyspace).await
    }

    /// §4.1 `getSlice`, no explicit limit: the no-limit overload applies
    /// `limit = MAX`.
    pub async fn get_slice_unbounded(
        &self,
        key: &Bytes,
        col_start: &Bytes,
        col_end: &Bytes,
        start_inclusive: bool,
        end_inclusive: bool,
        txh: TransactionHandle,
    ) -> Result<Vec<Entry>> {
        self.get_slice(
            key,
            col_start,
            col_end,
            start_inclusive,
            end_inclusive,
            i32::MAX as i64,
            txh,
        )
        .await
    }

    /// §4.1 `getSlice`.
    pub async fn get_slice(
        &self,
        key: &Bytes,
        col_start: &Bytes,
        col_end: &Bytes,
        start_inclusive: bool,
        end_inclusive: bool,
        limit: i64,
        _txh: TransactionHandle,
    ) -> Result<Vec<Entry>> {
        assert!(!key.is_empty(), "key must be non-empty");

        let normalized_limit = normalize_limit(limit);
        if limit < 0 {
            tracing::warn!(limit, "getSlice called with a negative limit, coercing to 0");
        }

        match plan_slice(
            col_start,
            col_end,
            start_inclusive,
            end_inclusive,
            normalized_limit,
        )? {
            SlicePlan::Empty => Ok(Vec::new()),
            SlicePlan::PointRead { column } => {
                match self.get(key, &column, TransactionHandle).await? {
                    Some(value) => Ok(vec![Entry { column, value }]),
                    None => Ok(Vec::new()),
                }
            }
            SlicePlan::RemoteRange {
                start,
                finish,
                count,
            } => {
                let lease = self.lease().await?;
                let predicate = SlicePredicate::Range {
                    start,
                    finish,
                    count,
                };
                let raw = lease
                    .get_slice(
                        key,
                        &self.config.column_family,
                        &predicate,
                        self.config.consistency(),
                    )
                    .await?;
                Ok(filter_inclusive_result(
                    raw,
                    col_start,
                    col_end,
                    start_inclusive,
                    end_inclusive,
                ))
            }
        }
    }

    /// §4.2 `containsKey`: a slice of count 1 over the unbounded column
    /// range. This deliberately bypasses [`Store::get_slice`]'s boundary
    /// algebra — an empty start and an empty finish here mean "unbounded",
    /// not "equal endpoints", so the degenerate point-read case in §4.1
    /// does not apply.
    pub async fn contains_key(&self, key: &Bytes, _txh: TransactionHandle) -> Result<bool> {
        assert!(!key.is_empty(), "key must be non-empty");
        let lease = self.lease().await?;
        let predicate = SlicePredicate::Range {
            start: Bytes::new(),
            finish: Bytes::new(),
            count: 1,
        };
        let raw = lease
            .get_slice(key, &self.config.column_family, &predicate, self.config.consistency())
            .await?;
        Ok(!raw.is_empty())
    }

    /// §4.2 `containsKeyColumn`. Never raises for absence.
    pub async fn contains_key_column(
        &self,
        key: &Bytes,
        column: &Bytes,
        _txh: TransactionHandle,
    ) -> Result<bool> {
        Ok(self.get(key, column, TransactionHandle).await?.is_some())
    }

    /// §4.3 `get`. Not-found is a `None`, not an error.
    pub async fn get(
        &self,
        key: &Bytes,
        column: &Bytes,
        _txh: TransactionHandle,
    ) -> Result<Option<Bytes>> {
        assert!(!key.is_empty(), "key must be non-empty");
        let lease = self.lease().await?;
        lease
            .get(key, &self.config.column_family, column, self.config.consistency())
            .await
    }

    /// §4.4 `insert`: one remote call per entry against the same borrowed
    /// connection (the non-batched path).
    pub async fn insert(
        &self,
        key: &Bytes,
        entries: &[Entry],
        _txh: TransactionHandle,
    ) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let lease = self.lease().await?;
        for entry in entries {
            let ts = self.oracle.next_timestamp().await?;
            lease
                .insert(
                    key,
                    &self.config.column_family,
                    &entry.column,
                    &entry.value,
                    ts,
                    self.config.consistency(),
                )
                .await?;
        }
        Ok(())
    }

    /// §4.4 `delete`: one remote call per column against the same borrowed
    /// connection.
    pub async fn delete(
        &self,
        key: &Bytes,
        columns: &[Bytes],
        _txh: TransactionHandle,
    ) -> Result<()> {
        if columns.is_empty() {
            return Ok(());
        }
        let lease = self.lease().await?;
        for column in columns {
            let ts = self.oracle.next_timestamp().await?;
            lease
                .remove(key, &self.config.column_family, column, ts, self.config.consistency())
                .await?;
        }
        Ok(())
    }

    /// §4.4 `mutate`: deletions first, then additions, so a reinsert of the
    /// same column in one call wins.
    pub async fn mutate(
        &self,
        key: &Bytes,
        additions: &[Entry],
        deletions: &[Bytes],
        txh: TransactionHandle,
    ) -> Result<()> {
        self.delete(key, deletions, txh).await?;
        self.insert(key, additions, txh).await?;
        Ok(())
    }

    /// §4.5 `mutateMany`: one oracle timestamp for the whole deletion batch,
    /// one for the whole insertion batch; deletions submitted before
    /// insertions, each half as a single `batch_mutate` RPC.
    pub async fn mutate_many(
        &self,
        mutations: HashMap<Bytes, KeyMutation>,
        _txh: TransactionHandle,
    ) -> Result<()> {
        if mutations.is_empty() {
            return Ok(());
        }

        let mut deletion_batch: HashMap<Bytes, HashMap<String, Vec<Mutation>>> = HashMap::new();
        let mut insertion_batch: HashMap<Bytes, HashMap<String, Vec<Mutation>>> = HashMap::new();

        let delete_ts = self.oracle.next_timestamp().await?;
        for (key, key_mutation) in &mutations {
            if key_mutation.deletions.is_empty() {
                continue;
            }
            deletion_batch.entry(key.clone()).or_default().insert(
                self.config.column_family.clone(),
                vec![Mutation::Delete {
                    columns: key_mutation.deletions.clone(),
                    timestamp: delete_ts,
                }],
            );
        }

        let insert_ts = self.oracle.next_timestamp().await?;
        for (key, key_mutation) in &mutations {
            if key_mutation.additions.is_empty() {
                continue;
            }
            let column_mutations = key_mutation
                .additions
                .iter()
                .map(|entry| Mutation::Insert {
                    column: entry.column.clone(),
                    value: entry.value.clone(),
                    timestamp: insert_ts,
                })
                .collect();
            insertion_batch
                .entry(key.clone())
                .or_default()
                .insert(self.config.column_family.clone(), column_mutations);
        }

        let lease = self.lease().await?;
        if !deletion_batch.is_empty() {
            lease
                .batch_mutate(&deletion_batch, self.config.consistency())
                .await?;
        }
        if !insertion_batch.is_empty() {
            lease
                .batch_mutate(&insertion_batch, self.config.consistency())
                .await?;
        }
        Ok(())
    }

    /// §4.8: intentionally a no-op. Optimistic locking is not implemented by
    /// this adapter; callers that speculatively request a lock still
    /// proceed.
    pub async fn acquire_lock(
        &self,
        _key: &Bytes,
        _column: &Bytes,
        _expected_value: Option<&Bytes>,
        _txh: TransactionHandle,
    ) -> Result<()> {
        Ok(())
    }

    /// §4.9: the adapter cannot inspect the backend's partitioning, so it
    /// conservatively reports every key as local.
    pub fn is_local_key(&self, _key: &Bytes) -> bool {
        true
    }

    /// No-op: the pool, not the `Store`, owns connections.
    pub async fn close(&self) -> Result<()> {
        Ok(())
    }
}
