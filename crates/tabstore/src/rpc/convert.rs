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

//! Conversions between the local schema model and its wire representation.
//! Column name, type and order round-trip losslessly.

use crate::error::{Error, Result};
use crate::rpc::wire::{
    WireColumn, WireMode, WireSchema, WIRE_MODE_DURABLE, WIRE_MODE_DURABLE_RELAXED,
    WIRE_MODE_IN_MEMORY, WIRE_TYPE_BOOL, WIRE_TYPE_CHAR, WIRE_TYPE_DOUBLE, WIRE_TYPE_FLOAT,
    WIRE_TYPE_INT, WIRE_TYPE_LONG, WIRE_TYPE_SHORT, WIRE_TYPE_STRING,
};
use crate::schema::{Column, DataType, Schema, StorageMode};

pub fn to_wire_schema(schema: &Schema) -> WireSchema {
    WireSchema {
        columns: schema.columns().iter().map(to_wire_column).collect(),
    }
}

fn to_wire_column(column: &Column) -> WireColumn {
    let (type_id, size) = match column.data_type() {
        DataType::Bool => (WIRE_TYPE_BOOL, 1),
        DataType::Char => (WIRE_TYPE_CHAR, 1),
        DataType::Short => (WIRE_TYPE_SHORT, 2),
        DataType::Int => (WIRE_TYPE_INT, 4),
        DataType::Long => (WIRE_TYPE_LONG, 8),
        DataType::Float => (WIRE_TYPE_FLOAT, 4),
        DataType::Double => (WIRE_TYPE_DOUBLE, 8),
        DataType::String(n) => (WIRE_TYPE_STRING, n as i64),
    };
    WireColumn {
        name: column.name().to_string(),
        type_id,
        size,
    }
}

pub fn to_wire_mode(mode: StorageMode) -> WireMode {
    WireMode(match mode {
        StorageMode::InMemory => WIRE_MODE_IN_MEMORY,
        StorageMode::DurableRelaxed => WIRE_MODE_DURABLE_RELAXED,
        StorageMode::Durable => WIRE_MODE_DURABLE,
    })
}

pub fn from_wire_schema(wire: &WireSchema) -> Result<Schema> {
    let columns = wire
        .columns
        .iter()
        .map(from_wire_column)
        .collect::<Result<Vec<_>>>()?;
    Ok(Schema::new(columns))
}

fn from_wire_column(wire: &WireColumn) -> Result<Column> {
    let data_type = match wire.type_id {
        WIRE_TYPE_BOOL => DataType::Bool,
        WIRE_TYPE_CHAR => DataType::Char,
        WIRE_TYPE_SHORT => DataType::Short,
        WIRE_TYPE_INT => DataType::Int,
        WIRE_TYPE_LONG => DataType::Long,
        WIRE_TYPE_FLOAT => DataType::Float,
        WIRE_TYPE_DOUBLE => DataType::Double,
        WIRE_TYPE_STRING => {
            if wire.size <= 0 {
                return Err(Error::unexpected(format!(
                    "string column '{}' has invalid wire size {}",
                    wire.name, wire.size
                )));
            }
            DataType::String(wire.size as usize)
        }
        other => {
            return Err(Error::unexpected(format!(
                "unknown wire type id {} for column '{}'",
                other, wire.name
            )));
        }
    };
    Ok(Column::new(wire.name.clone(), data_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_types_schema() -> Schema {
        Schema::builder()
            .column("b", DataType::Bool)
            .column("c", DataType::Char)
            .column("s", DataType::Short)
            .column("i", DataType::Int)
            .column("l", DataType::Long)
            .column("f", DataType::Float)
            .column("d", DataType::Double)
            .column("msg", DataType::String(42))
            .build()
            .unwrap()
    }

    #[test]
    fn schema_round_trips_through_wire_form() {
        let schema = all_types_schema();
        let decoded = from_wire_schema(&to_wire_schema(&schema)).unwrap();
        assert_eq!(decoded, schema);
        assert_eq!(decoded.record_size(), schema.record_size());
    }

    #[test]
    fn wire_sizes_match_local_widths() {
        let wire = to_wire_schema(&all_types_schema());
        for (column, wire_column) in all_types_schema().columns().iter().zip(&wire.columns) {
            assert_eq!(column.data_type().size() as i64, wire_column.size);
        }
    }

    #[test]
    fn unknown_type_id_is_rejected() {
        let wire = WireSchema {
            columns: vec![WireColumn {
                name: "x".to_string(),
                type_id: 99,
                size: 4,
            }],
        };
        assert!(from_wire_schema(&wire).is_err());
    }

    #[test]
    fn storage_modes_map_to_distinct_wire_ids() {
        let ids = [
            to_wire_mode(StorageMode::InMemory).0,
            to_wire_mode(StorageMode::DurableRelaxed).0,
            to_wire_mode(StorageMode::Durable).0,
        ];
        assert_eq!(ids, [0, 1, 2]);
    }
}
