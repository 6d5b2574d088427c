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

//! The remote-session capability the client is written against: one method
//! per remote operation, implemented by whatever RPC transport backs the
//! deployment. The client owns at most one session at a time and shares it
//! with the streams it opens.

use crate::error::Result;
use crate::rpc::wire::{CursorHandle, WireMode, WireSchema, WireTableInfo};
use crate::TableId;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Synchronous request/response surface of the remote service.
///
/// Every method maps to exactly one round-trip; implementations must not
/// retry. Whatever timeout the underlying transport enforces applies
/// transitively, none is added here.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Whether the underlying transport is currently open. Teardown consults
    /// this directly rather than tracking a local flag.
    fn is_open(&self) -> bool;

    /// Close the underlying transport.
    fn close(&self) -> Result<()>;

    async fn register_handler(&self) -> Result<()>;

    async fn deregister_handler(&self) -> Result<()>;

    async fn create_table(
        &self,
        name: &str,
        schema: &WireSchema,
        mode: WireMode,
    ) -> Result<TableId>;

    async fn get_table_info(&self, name: &str) -> Result<WireTableInfo>;

    async fn remove_table(&self, table_id: TableId) -> Result<()>;

    async fn add_index(&self, table_id: TableId, field: &str, bucket_size: f64) -> Result<()>;

    async fn remove_index(&self, table_id: TableId, field: &str) -> Result<()>;

    async fn add_filter(&self, table_id: TableId, name: &str, expr: &str) -> Result<()>;

    async fn remove_filter(&self, table_id: TableId, name: &str) -> Result<()>;

    async fn add_trigger(
        &self,
        table_id: TableId,
        name: &str,
        filter_name: &str,
        expr: &str,
    ) -> Result<()>;

    async fn remove_trigger(&self, table_id: TableId, name: &str) -> Result<()>;

    async fn append(&self, table_id: TableId, record: Bytes) -> Result<()>;

    async fn read(&self, table_id: TableId, offset: i64, nrecords: usize) -> Result<Bytes>;

    async fn adhoc_filter(&self, table_id: TableId, expr: &str) -> Result<CursorHandle>;

    async fn predef_filter(
        &self,
        table_id: TableId,
        name: &str,
        begin_ms: i64,
        end_ms: i64,
    ) -> Result<CursorHandle>;

    async fn combined_filter(
        &self,
        table_id: TableId,
        name: &str,
        expr: &str,
        begin_ms: i64,
        end_ms: i64,
    ) -> Result<CursorHandle>;

    async fn alerts_by_time(
        &self,
        table_id: TableId,
        begin_ms: i64,
        end_ms: i64,
    ) -> Result<CursorHandle>;

    async fn num_records(&self, table_id: TableId) -> Result<i64>;

    /// Next page of raw record bytes for a cursor. An empty page signals
    /// exhaustion.
    async fn fetch_record_page(&self, table_id: TableId, cursor: &CursorHandle) -> Result<Bytes>;

    /// Next page of alerts for a cursor. An empty page signals exhaustion.
    async fn fetch_alert_page(
        &self,
        table_id: TableId,
        cursor: &CursorHandle,
    ) -> Result<Vec<String>>;
}

/// Factory opening a [`RemoteSession`] to a server endpoint. Transport open
/// failures surface as [`crate::error::Error::Connection`].
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self, host: &str, port: u16) -> Result<Arc<dyn RemoteSession>>;
}
