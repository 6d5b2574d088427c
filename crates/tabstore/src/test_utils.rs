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

//! Call-recording in-memory session used by the crate's own tests.

use crate::client::TabStoreClient;
use crate::error::{Error, Result};
use crate::rpc::wire::{CursorHandle, WireMode, WireSchema, WireTableInfo};
use crate::rpc::{RemoteSession, SessionConnector};
use crate::TableId;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// An in-memory [`RemoteSession`] that records every remote call it receives
/// and serves scripted responses. Tests assert on the recorded call log to
/// prove which operations did (or did not) reach the server.
#[derive(Default)]
pub struct MockSession {
    open: AtomicBool,
    calls: Mutex<Vec<String>>,
    fail_ops: Mutex<HashSet<String>>,
    tables: Mutex<HashMap<String, WireTableInfo>>,
    next_table_id: AtomicI64,
    next_cursor_id: AtomicI64,
    appended: Mutex<Vec<(TableId, Bytes)>>,
    read_result: Mutex<Bytes>,
    record_pages: Mutex<VecDeque<Bytes>>,
    alert_pages: Mutex<VecDeque<Vec<String>>>,
    num_records: AtomicI64,
}

impl MockSession {
    pub fn new() -> Arc<Self> {
        Arc::new(MockSession {
            next_table_id: AtomicI64::new(1),
            next_cursor_id: AtomicI64::new(1),
            ..Default::default()
        })
    }

    /// Every remote call issued so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == op)
            .count()
    }

    /// Make subsequent invocations of `op` fail with a remote error.
    pub fn fail_on(&self, op: &str) {
        self.fail_ops.lock().unwrap().insert(op.to_string());
    }

    /// Records appended so far, with the table they were appended to.
    pub fn appended(&self) -> Vec<(TableId, Bytes)> {
        self.appended.lock().unwrap().clone()
    }

    pub fn set_read_result(&self, blob: Bytes) {
        *self.read_result.lock().unwrap() = blob;
    }

    /// Queue the pages `fetch_record_page` will serve, in order. Once drained,
    /// further fetches return empty pages.
    pub fn script_record_pages(&self, pages: Vec<Bytes>) {
        *self.record_pages.lock().unwrap() = pages.into();
    }

    /// Queue the pages `fetch_alert_page` will serve, in order.
    pub fn script_alert_pages(&self, pages: Vec<Vec<String>>) {
        *self.alert_pages.lock().unwrap() = pages.into();
    }

    pub fn set_num_records(&self, n: i64) {
        self.num_records.store(n, Ordering::SeqCst);
    }

    pub(crate) fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    fn record(&self, op: &str) -> Result<()> {
        self.calls.lock().unwrap().push(op.to_string());
        if self.fail_ops.lock().unwrap().contains(op) {
            return Err(Error::remote(format!("injected failure in {op}")));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSession for MockSession {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn close(&self) -> Result<()> {
        self.record("close")?;
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn register_handler(&self) -> Result<()> {
        self.record("register_handler")
    }

    async fn deregister_handler(&self) -> Result<()> {
        self.record("deregister_handler")
    }

    async fn create_table(
        &self,
        name: &str,
        schema: &WireSchema,
        _mode: WireMode,
    ) -> Result<TableId> {
        self.record("create_table")?;
        let table_id = self.next_table_id.fetch_add(1, Ordering::SeqCst);
        self.tables.lock().unwrap().insert(
            name.to_string(),
            WireTableInfo {
                table_id,
                schema: schema.clone(),
            },
        );
        Ok(table_id)
    }

    async fn get_table_info(&self, name: &str) -> Result<WireTableInfo> {
        self.record("get_table_info")?;
        self.tables
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::remote(format!("no such table '{name}'")))
    }

    async fn remove_table(&self, _table_id: TableId) -> Result<()> {
        self.record("remove_table")
    }

    async fn add_index(&self, _table_id: TableId, _field: &str, _bucket_size: f64) -> Result<()> {
        self.record("add_index")
    }

    async fn remove_index(&self, _table_id: TableId, _field: &str) -> Result<()> {
        self.record("remove_index")
    }

    async fn add_filter(&self, _table_id: TableId, _name: &str, _expr: &str) -> Result<()> {
        self.record("add_filter")
    }

    async fn remove_filter(&self, _table_id: TableId, _name: &str) -> Result<()> {
        self.record("remove_filter")
    }

    async fn add_trigger(
        &self,
        _table_id: TableId,
        _name: &str,
        _filter_name: &str,
        _expr: &str,
    ) -> Result<()> {
        self.record("add_trigger")
    }

    async fn remove_trigger(&self, _table_id: TableId, _name: &str) -> Result<()> {
        self.record("remove_trigger")
    }

    async fn append(&self, table_id: TableId, record: Bytes) -> Result<()> {
        self.record("append")?;
        self.appended.lock().unwrap().push((table_id, record));
        Ok(())
    }

    async fn read(&self, _table_id: TableId, _offset: i64, _nrecords: usize) -> Result<Bytes> {
        self.record("read")?;
        Ok(self.read_result.lock().unwrap().clone())
    }

    async fn adhoc_filter(&self, _table_id: TableId, _expr: &str) -> Result<CursorHandle> {
        self.record("adhoc_filter")?;
        Ok(CursorHandle::new(
            self.next_cursor_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn predef_filter(
        &self,
        _table_id: TableId,
        _name: &str,
        _begin_ms: i64,
        _end_ms: i64,
    ) -> Result<CursorHandle> {
        self.record("predef_filter")?;
        Ok(CursorHandle::new(
            self.next_cursor_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn combined_filter(
        &self,
        _table_id: TableId,
        _name: &str,
        _expr: &str,
        _begin_ms: i64,
        _end_ms: i64,
    ) -> Result<CursorHandle> {
        self.record("combined_filter")?;
        Ok(CursorHandle::new(
            self.next_cursor_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn alerts_by_time(
        &self,
        _table_id: TableId,
        _begin_ms: i64,
        _end_ms: i64,
    ) -> Result<CursorHandle> {
        self.record("alerts_by_time")?;
        Ok(CursorHandle::new(
            self.next_cursor_id.fetch_add(1, Ordering::SeqCst),
        ))
    }

    async fn num_records(&self, _table_id: TableId) -> Result<i64> {
        self.record("num_records")?;
        Ok(self.num_records.load(Ordering::SeqCst))
    }

    async fn fetch_record_page(&self, _table_id: TableId, _cursor: &CursorHandle) -> Result<Bytes> {
        self.record("fetch_record_page")?;
        Ok(self
            .record_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn fetch_alert_page(
        &self,
        _table_id: TableId,
        _cursor: &CursorHandle,
    ) -> Result<Vec<String>> {
        self.record("fetch_alert_page")?;
        Ok(self
            .alert_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// Connector handing out a shared [`MockSession`], or refusing to connect to
/// exercise the transport-failure path.
pub struct MockConnector {
    session: Arc<MockSession>,
    refuse: bool,
}

impl MockConnector {
    pub fn new(session: Arc<MockSession>) -> Self {
        MockConnector {
            session,
            refuse: false,
        }
    }

    pub fn refusing(session: Arc<MockSession>) -> Self {
        MockConnector {
            session,
            refuse: true,
        }
    }
}

#[async_trait]
impl SessionConnector for MockConnector {
    async fn connect(&self, host: &str, port: u16) -> Result<Arc<dyn RemoteSession>> {
        if self.refuse {
            return Err(Error::connection(format!(
                "failed to open transport to {host}:{port}"
            )));
        }
        self.session.set_open(true);
        Ok(self.session.clone())
    }
}

/// A client connected to a fresh mock session, with the handshake calls
/// already cleared from the call log.
pub async fn connected_client() -> (Arc<MockSession>, TabStoreClient) {
    let session = MockSession::new();
    let mut client = TabStoreClient::new(Box::new(MockConnector::new(session.clone())));
    client
        .connect("127.0.0.1", 9090)
        .await
        .expect("mock connect failed");
    session.calls.lock().unwrap().clear();
    (session, client)
}
