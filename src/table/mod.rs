// src/table/mod.rs

use anyhow::{ensure, Context, Result};
use arrow::{
    array::{ArrayRef, UInt64Array},
    datatypes::{DataType, Field, Schema as ArrowSchema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::record::{CatalogRecord, FieldKind, FieldMap, FieldValue};

pub mod arrow_schema;
pub mod write;

pub use arrow_schema::{build_arrow_schema, column_to_array, map_to_arrow_type};
pub use write::{write_workbook, Sheet};

/// Name of the row-label column prepended on export.
pub const INDEX_COLUMN: &str = "index";

/// One named column of values, all of the declared kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub kind: FieldKind,
    pub values: Vec<FieldValue>,
}

/// Column-oriented storage with a fixed schema.
///
/// Every push and append is checked against the schema, so all columns
/// always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    columns: Vec<Column>,
}

impl Columns {
    pub fn with_schema(fields: &[(&'static str, FieldKind)]) -> Self {
        let columns = fields
            .iter()
            .map(|&(name, kind)| Column {
                name,
                kind,
                values: Vec::new(),
            })
            .collect();
        Self { columns }
    }

    pub fn for_record<R: CatalogRecord>() -> Self {
        Self::with_schema(R::FIELDS)
    }

    /// Append one row. The row must carry exactly the schema's fields, in order.
    pub fn push(&mut self, row: &FieldMap) -> Result<()> {
        ensure!(
            row.len() == self.columns.len(),
            "row has {} fields, schema has {}",
            row.len(),
            self.columns.len()
        );
        for (col, (name, value)) in self.columns.iter().zip(row.iter()) {
            ensure!(
                col.name == name && col.kind == value.kind(),
                "row field {} ({:?}) does not match column {} ({:?})",
                name,
                value.kind(),
                col.name,
                col.kind
            );
        }

        for (col, (_, value)) in self.columns.iter_mut().zip(row.iter()) {
            col.values.push(value.clone());
        }
        Ok(())
    }

    /// Concatenate `other` after the existing rows.
    pub fn append(&mut self, other: Columns) -> Result<()> {
        ensure!(
            self.same_schema(&other),
            "cannot merge columns [{}] into [{}]",
            other.names().collect::<Vec<_>>().join(","),
            self.names().collect::<Vec<_>>().join(",")
        );
        for (col, other) in self.columns.iter_mut().zip(other.columns) {
            col.values.extend(other.values);
        }
        Ok(())
    }

    fn same_schema(&self, other: &Columns) -> bool {
        self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.name == b.name && a.kind == b.kind)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }
}

/// Row/column table handed to the export side.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    /// Assemble the table in schema column order.
    pub fn from_columns(columns: &Columns) -> Result<Self> {
        let schema = build_arrow_schema(columns);
        let arrays: Vec<ArrayRef> = columns.iter().map(column_to_array).collect();
        let batch = RecordBatch::try_new(schema, arrays).context("assembling table from columns")?;
        Ok(Self { batch })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// The table with a leading `index` row-label column.
    pub fn with_row_index(&self) -> Result<RecordBatch> {
        let index: ArrayRef = Arc::new(UInt64Array::from_iter_values(
            0..self.batch.num_rows() as u64,
        ));

        let mut fields = vec![Arc::new(Field::new(INDEX_COLUMN, DataType::UInt64, false))];
        fields.extend(self.batch.schema().fields().iter().cloned());
        let mut arrays = vec![index];
        arrays.extend(self.batch.columns().iter().cloned());

        RecordBatch::try_new(Arc::new(ArrowSchema::new(fields)), arrays)
            .context("adding row index column")
    }
}
