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

//! Wire representations exchanged with the remote service, distinct from the
//! local in-process model in [`crate::schema`]. Transport implementations
//! marshal these through serde; this crate does not prescribe an encoding.

use serde::{Deserialize, Serialize};

/// Wire column type ids.
pub const WIRE_TYPE_BOOL: i32 = 1;
pub const WIRE_TYPE_CHAR: i32 = 2;
pub const WIRE_TYPE_SHORT: i32 = 3;
pub const WIRE_TYPE_INT: i32 = 4;
pub const WIRE_TYPE_LONG: i32 = 5;
pub const WIRE_TYPE_FLOAT: i32 = 6;
pub const WIRE_TYPE_DOUBLE: i32 = 7;
pub const WIRE_TYPE_STRING: i32 = 8;

/// Wire storage mode ids.
pub const WIRE_MODE_IN_MEMORY: i32 = 0;
pub const WIRE_MODE_DURABLE_RELAXED: i32 = 1;
pub const WIRE_MODE_DURABLE: i32 = 2;

/// One column as the remote service sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireColumn {
    pub name: String,
    pub type_id: i32,
    pub size: i64,
}

/// The serialized form of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireSchema {
    pub columns: Vec<WireColumn>,
}

/// The serialized form of a storage mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMode(pub i32);

/// Table metadata returned by a table-info lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTableInfo {
    pub table_id: i64,
    pub schema: WireSchema,
}

/// Opaque server-assigned token identifying server-side iteration state for a
/// streaming query.
///
/// A cursor belongs to exactly one stream for its whole lifetime; the handle
/// moves into the stream when the query is opened and is never duplicated.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorHandle {
    cursor_id: i64,
}

impl CursorHandle {
    pub fn new(cursor_id: i64) -> Self {
        CursorHandle { cursor_id }
    }

    pub fn id(&self) -> i64 {
        self.cursor_id
    }
}
