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

//! The client session coordinator: one logical connection, one "current
//! table", and the precondition gate every table-scoped operation passes
//! through before anything goes over the wire.

use crate::client::stream::{AlertStream, RecordStream};
use crate::error::{Error, Result};
use crate::rpc::convert::{from_wire_schema, to_wire_mode, to_wire_schema};
use crate::rpc::{RemoteSession, SessionConnector};
use crate::schema::{Schema, StorageMode};
use crate::TableId;
use bytes::Bytes;
use log::{info, warn};
use std::sync::Arc;

/// Which table (if any) is selected, and its schema. Mutated only by the
/// create/set/remove-table operations, and only after their remote call
/// succeeds; every other table-scoped operation reads it through
/// [`TabStoreClient::current_table`].
#[derive(Default)]
struct TableContext {
    table_id: Option<TableId>,
    schema: Schema,
}

/// Client for a TabStore server.
///
/// Holds at most one open connection; all operations and every stream opened
/// from this client share it. The client is single-owner: each call runs to
/// completion before the next begins, with no internal retries, timeouts or
/// concurrency. A typical session connects, selects or creates a table, then
/// issues data operations or opens query streams against it.
pub struct TabStoreClient {
    connector: Box<dyn SessionConnector>,
    session: Option<Arc<dyn RemoteSession>>,
    peer: Option<(String, u16)>,
    table: TableContext,
}

impl TabStoreClient {
    /// Create a disconnected client that will open sessions through
    /// `connector`.
    pub fn new(connector: Box<dyn SessionConnector>) -> Self {
        TabStoreClient {
            connector,
            session: None,
            peer: None,
            table: TableContext::default(),
        }
    }

    /// Create a client and connect it to `host:port` in one step.
    pub async fn connect_to(
        connector: Box<dyn SessionConnector>,
        host: &str,
        port: u16,
    ) -> Result<Self> {
        let mut client = Self::new(connector);
        client.connect(host, port).await?;
        Ok(client)
    }

    /// Open a connection to `host:port` and perform the registration
    /// handshake.
    ///
    /// Calling `connect` again without an intervening [`disconnect`] replaces
    /// the prior session without tearing it down; callers must disconnect
    /// first.
    ///
    /// [`disconnect`]: TabStoreClient::disconnect
    pub async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        info!("Connecting to {host}:{port}");
        let session = self.connector.connect(host, port).await?;
        self.session = Some(session.clone());
        self.peer = Some((host.to_string(), port));
        session.register_handler().await?;
        Ok(())
    }

    /// Deregister with the server and close the transport.
    ///
    /// A no-op when the transport is not open, so it is safe to call
    /// repeatedly and on a never-connected client. Teardown failures are
    /// logged and swallowed; this never fails.
    pub async fn disconnect(&mut self) {
        if let Some(session) = &self.session {
            if session.is_open() {
                if let Some((host, port)) = &self.peer {
                    info!("Disconnecting from {host}:{port}");
                }
                if let Err(e) = session.deregister_handler().await {
                    warn!("Ignoring deregistration failure during disconnect: {e}");
                }
                if let Err(e) = session.close() {
                    warn!("Ignoring transport close failure during disconnect: {e}");
                }
            }
        }
    }

    /// Id of the currently selected table, if any.
    pub fn table_id(&self) -> Option<TableId> {
        self.table.table_id
    }

    /// Schema of the currently selected table. Meaningful only while
    /// [`table_id`](TabStoreClient::table_id) returns `Some`.
    pub fn current_schema(&self) -> &Schema {
        &self.table.schema
    }

    fn session(&self) -> Result<&Arc<dyn RemoteSession>> {
        self.session
            .as_ref()
            .ok_or_else(|| Error::illegal_state("must connect first"))
    }

    /// The precondition gate: every table-scoped operation calls this before
    /// issuing anything remote.
    fn current_table(&self) -> Result<TableId> {
        self.table
            .table_id
            .ok_or_else(|| Error::illegal_state("must set table first"))
    }

    /// Create a table and select it as the current table.
    pub async fn create_table(
        &mut self,
        name: &str,
        schema: &Schema,
        mode: StorageMode,
    ) -> Result<()> {
        let session = self.session()?.clone();
        let table_id = session
            .create_table(name, &to_wire_schema(schema), to_wire_mode(mode))
            .await?;
        self.table.table_id = Some(table_id);
        self.table.schema = schema.clone();
        Ok(())
    }

    /// Look up a table by name and select it as the current table.
    pub async fn set_current_table(&mut self, name: &str) -> Result<()> {
        let session = self.session()?.clone();
        let info = session.get_table_info(name).await?;
        let schema = from_wire_schema(&info.schema)?;
        self.table.table_id = Some(info.table_id);
        self.table.schema = schema;
        Ok(())
    }

    /// Remove the current table and return to the unselected state.
    pub async fn remove_table(&mut self) -> Result<()> {
        let table_id = self.current_table()?;
        self.session()?.remove_table(table_id).await?;
        self.table.table_id = None;
        Ok(())
    }

    /// Add an index on `field` with the default bucket size of 1.0.
    pub async fn add_index(&self, field: &str) -> Result<()> {
        self.add_index_with_bucket(field, 1.0).await
    }

    pub async fn add_index_with_bucket(&self, field: &str, bucket_size: f64) -> Result<()> {
        let table_id = self.current_table()?;
        self.session()?
            .add_index(table_id, field, bucket_size)
            .await
    }

    pub async fn remove_index(&self, field: &str) -> Result<()> {
        let table_id = self.current_table()?;
        self.session()?.remove_index(table_id, field).await
    }

    pub async fn add_filter(&self, name: &str, expr: &str) -> Result<()> {
        let table_id = self.current_table()?;
        self.session()?.add_filter(table_id, name, expr).await
    }

    pub async fn remove_filter(&self, name: &str) -> Result<()> {
        let table_id = self.current_table()?;
        self.session()?.remove_filter(table_id, name).await
    }

    pub async fn add_trigger(&self, name: &str, filter_name: &str, expr: &str) -> Result<()> {
        let table_id = self.current_table()?;
        self.session()?
            .add_trigger(table_id, name, filter_name, expr)
            .await
    }

    pub async fn remove_trigger(&self, name: &str) -> Result<()> {
        let table_id = self.current_table()?;
        self.session()?.remove_trigger(table_id, name).await
    }

    /// Append one record to the current table.
    ///
    /// The record must be exactly `record_size` bytes under the current
    /// schema; each call is a single remote append with no client-side
    /// buffering.
    pub async fn write(&self, record: &[u8]) -> Result<()> {
        let table_id = self.current_table()?;
        let expected = self.table.schema.record_size();
        if record.len() != expected {
            return Err(Error::illegal_state(format!(
                "record size incorrect; expected={}, got={}",
                expected,
                record.len()
            )));
        }
        self.session()?
            .append(table_id, Bytes::copy_from_slice(record))
            .await
    }

    /// Read the record at `offset`.
    pub async fn read(&self, offset: i64) -> Result<Bytes> {
        self.read_batch(offset, 1).await
    }

    /// Read `nrecords` records starting at `offset`, returned as one raw
    /// blob; decoding is the caller's concern.
    pub async fn read_batch(&self, offset: i64, nrecords: usize) -> Result<Bytes> {
        let table_id = self.current_table()?;
        self.session()?.read(table_id, offset, nrecords).await
    }

    /// Open a stream over a one-off filter expression evaluated against the
    /// full table. Nothing is fetched until the stream is pulled.
    pub async fn adhoc_filter(&self, expr: &str) -> Result<RecordStream> {
        let table_id = self.current_table()?;
        let session = self.session()?.clone();
        let cursor = session.adhoc_filter(table_id, expr).await?;
        Ok(RecordStream::new(
            table_id,
            self.table.schema.clone(),
            session,
            cursor,
        ))
    }

    /// Open a stream over the named, previously registered filter restricted
    /// to `[begin_ms, end_ms)`.
    pub async fn predef_filter(
        &self,
        filter_name: &str,
        begin_ms: i64,
        end_ms: i64,
    ) -> Result<RecordStream> {
        let table_id = self.current_table()?;
        let session = self.session()?.clone();
        let cursor = session
            .predef_filter(table_id, filter_name, begin_ms, end_ms)
            .await?;
        Ok(RecordStream::new(
            table_id,
            self.table.schema.clone(),
            session,
            cursor,
        ))
    }

    /// Open a stream over the conjunction of a named filter and an ad-hoc
    /// expression, restricted to `[begin_ms, end_ms)`.
    pub async fn combined_filter(
        &self,
        filter_name: &str,
        expr: &str,
        begin_ms: i64,
        end_ms: i64,
    ) -> Result<RecordStream> {
        let table_id = self.current_table()?;
        let session = self.session()?.clone();
        let cursor = session
            .combined_filter(table_id, filter_name, expr, begin_ms, end_ms)
            .await?;
        Ok(RecordStream::new(
            table_id,
            self.table.schema.clone(),
            session,
            cursor,
        ))
    }

    /// Open a stream over the alerts generated in `[begin_ms, end_ms)`.
    pub async fn get_alerts(&self, begin_ms: i64, end_ms: i64) -> Result<AlertStream> {
        let table_id = self.current_table()?;
        let session = self.session()?.clone();
        let cursor = session.alerts_by_time(table_id, begin_ms, end_ms).await?;
        Ok(AlertStream::new(table_id, session, cursor))
    }

    /// Current row count of the selected table.
    pub async fn num_records(&self) -> Result<i64> {
        let table_id = self.current_table()?;
        self.session()?.num_records(table_id).await
    }
}

impl Drop for TabStoreClient {
    fn drop(&mut self) {
        if let Some(session) = &self.session {
            if session.is_open() {
                if let Err(e) = session.close() {
                    warn!("Ignoring transport close failure during drop: {e}");
                }
            }
        }
    }
}
