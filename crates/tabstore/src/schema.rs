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

//! Local schema model: fixed-width column types, ordered columns and the
//! derived record size used to validate writes.

use crate::error::{Error, Result};
use std::fmt::{Display, Formatter};

/// Column type of a TabStore table. All types have a fixed width; records are
/// the concatenation of their column encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Bool,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Fixed-capacity string of `n` bytes.
    String(usize),
}

impl DataType {
    /// Width of this type inside a record, in bytes.
    pub fn size(&self) -> usize {
        match self {
            DataType::Bool | DataType::Char => 1,
            DataType::Short => 2,
            DataType::Int | DataType::Float => 4,
            DataType::Long | DataType::Double => 8,
            DataType::String(n) => *n,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Bool => write!(f, "BOOL"),
            DataType::Char => write!(f, "CHAR"),
            DataType::Short => write!(f, "SHORT"),
            DataType::Int => write!(f, "INT"),
            DataType::Long => write!(f, "LONG"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::String(n) => write!(f, "STRING({n})"),
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Column {
            name: name.into(),
            data_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// Ordered sequence of columns describing the record layout of a table.
///
/// A `Schema` is owned by the client's table context and replaced wholesale
/// when the current table changes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Schema { columns }
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Total width of one record under this schema, in bytes.
    pub fn record_size(&self) -> usize {
        self.columns.iter().map(|c| c.data_type().size()).sum()
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", column.name(), column.data_type())?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<Column>,
}

impl SchemaBuilder {
    pub fn column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(Column::new(name, data_type));
        self
    }

    pub fn build(self) -> Result<Schema> {
        if self.columns.is_empty() {
            return Err(Error::illegal_state("schema must have at least one column"));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if let DataType::String(0) = column.data_type() {
                return Err(Error::illegal_state(format!(
                    "column '{}' has zero-width string type",
                    column.name()
                )));
            }
            if self.columns[..i].iter().any(|c| c.name() == column.name()) {
                return Err(Error::illegal_state(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }
        Ok(Schema::new(self.columns))
    }
}

/// Storage mode a table is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    InMemory,
    DurableRelaxed,
    Durable,
}

impl Display for StorageMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::InMemory => write!(f, "IN_MEMORY"),
            StorageMode::DurableRelaxed => write!(f, "DURABLE_RELAXED"),
            StorageMode::Durable => write!(f, "DURABLE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_size_sums_column_widths() {
        let schema = Schema::builder()
            .column("ts", DataType::Long)
            .column("value", DataType::Double)
            .build()
            .unwrap();
        assert_eq!(schema.record_size(), 16);

        let schema = Schema::builder()
            .column("flag", DataType::Bool)
            .column("tag", DataType::Char)
            .column("count", DataType::Short)
            .column("id", DataType::Int)
            .column("score", DataType::Float)
            .column("msg", DataType::String(24))
            .build()
            .unwrap();
        assert_eq!(schema.record_size(), 1 + 1 + 2 + 4 + 4 + 24);
    }

    #[test]
    fn builder_rejects_duplicate_columns() {
        let result = Schema::builder()
            .column("a", DataType::Int)
            .column("a", DataType::Long)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_rejects_empty_schema() {
        assert!(Schema::builder().build().is_err());
    }
}
