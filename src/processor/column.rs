use std::sync::Arc;

use arrow2::{
    array::{Array, Float64Array, Int64Array, MutableUtf8Array, Utf8Array},
    chunk::Chunk,
    datatypes::{DataType, Field, Schema},
};
use serde::Serialize;

use crate::processor::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Int64,
    Float64,
    Str,
}

/// One typed column of a chart-input table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum Column {
    Int64(Vec<i64>),
    /// Missing values are `None`
    Float64(Vec<Option<f64>>),
    Str(Vec<String>),
}

impl Column {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Int64(_) => ColumnType::Int64,
            Column::Float64(_) => ColumnType::Float64,
            Column::Str(_) => ColumnType::Str,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Int64(v) => v.len(),
            Column::Float64(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            Column::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&[String]> {
        match self {
            Column::Str(v) => Some(v),
            _ => None,
        }
    }

    fn data_type(&self) -> DataType {
        match self.column_type() {
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Str => DataType::Utf8,
        }
    }

    fn to_arrow(&self) -> Arc<dyn Array> {
        match self {
            Column::Int64(values) => Arc::new(Int64Array::from_vec(values.clone())),
            Column::Float64(values) => Arc::new(Float64Array::from(values.as_slice())),
            Column::Str(values) => {
                let mut arr = MutableUtf8Array::<i32>::with_capacity(values.len());
                for s in values {
                    arr.push(Some(s.as_str()));
                }
                let array: Utf8Array<i32> = arr.into();
                Arc::new(array)
            }
        }
    }
}

/// Small derived table handed to a chart renderer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartTable {
    headers: Vec<String>,
    columns: Vec<Column>,
}

impl ChartTable {
    pub fn new() -> Self {
        ChartTable {
            headers: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Appends a column; all columns of a table share one length.
    pub fn with_column(mut self, name: &str, column: Column) -> Self {
        debug_assert!(
            self.columns.first().is_none_or(|c| c.len() == column.len()),
            "column {name} has a different length"
        );
        self.headers.push(name.to_string());
        self.columns.push(column);
        self
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn get_col(&self, col_name: &str) -> Result<&Column, DataError> {
        let col_pos = self
            .headers
            .iter()
            .position(|cn| cn == col_name)
            .ok_or_else(|| DataError::MissingColumn(col_name.to_string()))?;

        self.columns
            .get(col_pos)
            .ok_or_else(|| DataError::MissingColumn(col_name.to_string()))
    }

    /// Exports the table as an Arrow schema plus one chunk of arrays.
    pub fn to_arrow(&self) -> (Schema, Chunk<Arc<dyn Array>>) {
        let fields: Vec<Field> = self
            .headers
            .iter()
            .zip(&self.columns)
            .map(|(h, col)| Field::new(h, col.data_type(), true))
            .collect();

        let arrays: Vec<Arc<dyn Array>> = self.columns.iter().map(Column::to_arrow).collect();

        (Schema::from(fields), Chunk::new(arrays))
    }
}
