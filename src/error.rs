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

//! Uniform error taxonomy for the store adapter.
//!
//! The backend RPC contract surfaces four separately-named remote failure
//! kinds; callers never need to distinguish them beyond logging, so we
//! collapse them into a single tagged [`StoreError`] instead of propagating
//! four checked-exception-shaped variants.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// A single storage-error kind carrying a cause code, as called for by the
/// error handling design: callers switch on the variant, not on a nested
/// backend-specific type.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backend RPC timed out: {0}")]
    RemoteTimeout(String),

    #[error("backend reported insufficient replicas available: {0}")]
    RemoteUnavailable(String),

    #[error("backend rejected the request: {0}")]
    RemoteInvalid(String),

    #[error("transport failure talking to the backend: {0}")]
    RemoteTransport(String),

    #[error("unexpected interrupt while waiting on the timestamp oracle")]
    InternalInterrupt,

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("failed to borrow a pooled connection: {0}")]
    PoolExhausted(String),
}

impl StoreError {
    /// Whether a caller could plausibly retry the same operation unchanged.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            StoreError::RemoteTimeout(_) | StoreError::RemoteUnavailable(_)
        )
    }
}
