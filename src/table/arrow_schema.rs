// src/table/arrow_schema.rs

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::{Column, Columns};
use crate::record::FieldKind;

/// Map a field kind to its Arrow type.
///
/// - Text   → Utf8 (null when the listing had no such element)
/// - Number → Float64
pub fn map_to_arrow_type(kind: FieldKind) -> DataType {
    match kind {
        FieldKind::Text => DataType::Utf8,
        FieldKind::Number => DataType::Float64,
    }
}

/// Build an ArrowSchema (inside an Arc) from the columns, in order.
pub fn build_arrow_schema(columns: &Columns) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = columns
        .iter()
        .map(|col| ArrowField::new(col.name, map_to_arrow_type(col.kind), /* nullable = */ true))
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

pub fn column_to_array(column: &Column) -> ArrayRef {
    match column.kind {
        FieldKind::Text => Arc::new(
            column
                .values
                .iter()
                .map(|v| v.as_text())
                .collect::<StringArray>(),
        ),
        FieldKind::Number => Arc::new(
            column
                .values
                .iter()
                .map(|v| v.as_number())
                .collect::<Float64Array>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldValue, Program};
    use arrow::array::Array;

    #[test]
    fn program_schema() {
        let cols = Columns::for_record::<Program>();
        let schema = build_arrow_schema(&cols);
        let types: Vec<_> = schema
            .fields()
            .iter()
            .map(|f| (f.name().as_str(), f.data_type().clone()))
            .collect();
        assert_eq!(
            types,
            vec![
                ("Name", DataType::Utf8),
                ("Faculty", DataType::Utf8),
                ("Department", DataType::Utf8),
                ("Level", DataType::Utf8),
                ("Degree", DataType::Utf8),
                ("Credits", DataType::Float64),
            ]
        );
    }

    #[test]
    fn empty_text_stays_distinct_from_absent() {
        let col = Column {
            name: "Level",
            kind: FieldKind::Text,
            values: vec![
                FieldValue::Text(Some(String::new())),
                FieldValue::Text(None),
            ],
        };
        let arr = column_to_array(&col);
        let arr = arr.as_any().downcast_ref::<StringArray>().unwrap();
        assert!(arr.is_valid(0));
        assert_eq!(arr.value(0), "");
        assert!(arr.is_null(1));
    }
}
