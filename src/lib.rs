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

//! An ordered key-column-value store adapter over a Thrift-style wide-column
//! backend.
//!
//! This crate is the persistence adapter a graph database uses to store its
//! adjacency and property data in an external wide-column backend. It
//! exposes a uniform, ordered, sliceable key→(column→value) abstraction
//! ([`store::Store`]) and translates it into backend-specific remote calls
//! through the [`rpc::BackendClient`] and [`rpc::ConnectionPool`] contracts.
//!
//! The higher-level graph data model, the concrete connection pool, the
//! concrete RPC client, schema/keyspace provisioning, authentication, and
//! the graph transaction system are all external collaborators referenced
//! only by their contracts; this crate does not implement any of them.

pub mod config;
pub mod consistency;
pub mod error;
pub mod lease;
pub mod memory;
pub mod oracle;
pub mod rpc;
pub mod slice;
pub mod store;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use rpc::{BackendClient, ConnectionPool, Entry, Mutation, SlicePredicate};
pub use store::{KeyMutation, Store, TransactionHandle};
