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

//! Lazy, forward-only streams over server-side query cursors.
//!
//! A stream owns its cursor for life. Nothing is fetched at open time; each
//! pull on a dry local buffer issues exactly one page fetch, and an empty
//! page latches exhaustion, after which pulls return `Ok(None)` without
//! touching the server again.

use crate::error::{Error, Result};
use crate::rpc::wire::CursorHandle;
use crate::rpc::RemoteSession;
use crate::schema::Schema;
use crate::TableId;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::Arc;

/// Stream of fixed-width records produced by a filter query.
pub struct RecordStream {
    table_id: TableId,
    schema: Schema,
    session: Arc<dyn RemoteSession>,
    cursor: CursorHandle,
    buffer: Bytes,
    exhausted: bool,
}

impl RecordStream {
    pub(crate) fn new(
        table_id: TableId,
        schema: Schema,
        session: Arc<dyn RemoteSession>,
        cursor: CursorHandle,
    ) -> Self {
        RecordStream {
            table_id,
            schema,
            session,
            cursor,
            buffer: Bytes::new(),
            exhausted: false,
        }
    }

    /// Schema of the records this stream yields.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Whether the server has reported the cursor exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    /// Pull the next record, fetching a page from the server when the local
    /// buffer runs dry.
    pub async fn next(&mut self) -> Result<Option<Bytes>> {
        if self.buffer.is_empty() && !self.fill_buffer().await? {
            return Ok(None);
        }
        Ok(Some(self.buffer.split_to(self.schema.record_size())))
    }

    async fn fill_buffer(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        let page = self
            .session
            .fetch_record_page(self.table_id, &self.cursor)
            .await?;
        if page.is_empty() {
            self.exhausted = true;
            return Ok(false);
        }
        let record_size = self.schema.record_size();
        if record_size == 0 || page.len() % record_size != 0 {
            return Err(Error::unexpected(format!(
                "record page of {} bytes is not a multiple of record size {}",
                page.len(),
                record_size
            )));
        }
        self.buffer = page;
        Ok(true)
    }
}

/// Stream of alerts produced by a time-window alert query. Alerts are a fixed
/// structure, so no schema is involved.
pub struct AlertStream {
    table_id: TableId,
    session: Arc<dyn RemoteSession>,
    cursor: CursorHandle,
    buffer: VecDeque<String>,
    exhausted: bool,
}

impl AlertStream {
    pub(crate) fn new(
        table_id: TableId,
        session: Arc<dyn RemoteSession>,
        cursor: CursorHandle,
    ) -> Self {
        AlertStream {
            table_id,
            session,
            cursor,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Whether the server has reported the cursor exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }

    /// Pull the next alert, fetching a page from the server when the local
    /// buffer runs dry.
    pub async fn next(&mut self) -> Result<Option<String>> {
        if self.buffer.is_empty() {
            if self.exhausted {
                return Ok(None);
            }
            let page = self
                .session
                .fetch_alert_page(self.table_id, &self.cursor)
                .await?;
            if page.is_empty() {
                self.exhausted = true;
                return Ok(None);
            }
            self.buffer = page.into();
        }
        Ok(self.buffer.pop_front())
    }
}
