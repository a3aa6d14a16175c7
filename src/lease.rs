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

//! Scoped connection borrowing (§4.7): a connection leased from the pool is
//! returned on every exit path, success or error, without callers having to
//! remember to do so themselves.

use std::ops::Deref;
use std::sync::Arc;

use crate::error::Result;
use crate::rpc::{BackendClient, ConnectionPool};

/// A connection borrowed from a [`ConnectionPool`], returned automatically
/// when dropped. Every operation that issues a remote call acquires exactly
/// one of these and lets it go out of scope at the end of the operation,
/// guaranteeing property 6 of §8 (every borrowed connection is returned
/// exactly once) regardless of which `?` exits the function early.
pub struct ConnectionLease<'p> {
    pool: &'p (dyn ConnectionPool + 'p),
    keyspace: String,
    connection: Option<Arc<dyn BackendClient>>,
}

impl<'p> ConnectionLease<'p> {
    pub async fn acquire(pool: &'p (dyn ConnectionPool + 'p), keyspace: &str) -> Result<Self> {
        let connection = pool.borrow(keyspace).await?;
        Ok(Self {
            pool,
            keyspace: keyspace.to_owned(),
            connection: Some(connection),
        })
    }
}

impl Deref for ConnectionLease<'_> {
    type Target = dyn BackendClient;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_deref()
            .expect("connection is only taken in Drop")
    }
}

impl Drop for ConnectionLease<'_> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.return_connection(&self.keyspace, connection);
        }
    }
}
