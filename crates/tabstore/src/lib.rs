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

//! Rust client for the TabStore tabular data service.
//!
//! The client keeps one logical connection to a server, tracks which table is
//! current, gates every table-scoped operation on that selection, and turns
//! server-side query cursors into lazily-fetched record and alert streams.
//! The RPC transport itself is pluggable: any implementation of
//! [`rpc::RemoteSession`] / [`rpc::SessionConnector`] can back the client.
//!
//! ```rust,ignore
//! use tabstore::client::TabStoreClient;
//! use tabstore::schema::{DataType, Schema, StorageMode};
//!
//! # async fn example(connector: Box<dyn tabstore::rpc::SessionConnector>) -> tabstore::error::Result<()> {
//! let mut client = TabStoreClient::connect_to(connector, "127.0.0.1", 9090).await?;
//!
//! let schema = Schema::builder()
//!     .column("ts", DataType::Long)
//!     .column("value", DataType::Double)
//!     .build()?;
//! client.create_table("events", &schema, StorageMode::InMemory).await?;
//!
//! client.write(&[0u8; 16]).await?;
//!
//! let mut stream = client.predef_filter("high_value", 1000, 2000).await?;
//! while let Some(record) = stream.next().await? {
//!     println!("matched record of {} bytes", record.len());
//! }
//!
//! client.disconnect().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod rpc;
pub mod schema;
pub mod test_utils;

/// Server-assigned table identifier.
pub type TableId = i64;

pub use client::{AlertStream, RecordStream, TabStoreClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
