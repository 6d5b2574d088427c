// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the TabStore client.
///
/// `IllegalState` is always raised before any remote call is issued. Remote
/// failures propagate unchanged as `Remote`; this layer performs no retry or
/// translation, except during teardown where they are swallowed.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation was attempted in a client state that forbids it, e.g. a
    /// table-scoped call with no table selected, or a write whose length does
    /// not match the current schema.
    #[error("illegal state: {message}")]
    IllegalState { message: String },

    /// Opening the transport to the server failed.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// A failure reported by the remote service.
    #[error("remote error: {message}")]
    Remote { message: String },

    /// The server violated the wire protocol, e.g. a record page whose length
    /// is not a multiple of the record size.
    #[error("unexpected error: {message}")]
    Unexpected { message: String },
}

impl Error {
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Error::IllegalState {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Error::Connection {
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Error::Remote {
            message: message.into(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Error::Unexpected {
            message: message.into(),
        }
    }
}
