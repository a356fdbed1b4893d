//! Table assembly
//!
//! Turns a batch of decoded records into one rectangular table with a single
//! consistent column ordering: the two preamble columns, every schema column
//! in declaration order, then one synthetic column per unknown tag in
//! first-appearance order across the batch.

use crate::schema::{FieldSchema, GroupMember};
use crate::types::{CellValue, DecodedRecord};
use indexmap::IndexSet;
use serde::Serialize;

/// Column name for the preamble transaction ID
pub const TID_COLUMN: &str = "TID";

/// Column name for the preamble order-type classifier
pub const ORDER_TYPE_COLUMN: &str = "Order Type";

/// Column name for a tag code outside the schema
pub fn unknown_column_name(tag: &str) -> String {
    format!("Unknown Tag {}", tag)
}

/// The assembled output table
///
/// Rectangular by construction: every row has exactly one cell per column,
/// absent data degrading to [`CellValue::Empty`]. Row order is record order;
/// column order is deterministic for a given record sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTable {
    /// Column names in output order
    pub columns: Vec<String>,
    /// One row per record, cells aligned to `columns`
    pub rows: Vec<Vec<CellValue>>,
}

impl OutputTable {
    /// Number of data rows
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

/// What a column is backed by
///
/// The assembler first builds this plan, then materializes every record
/// against it, so the unknown-column registry is explicit rather than an
/// artifact of map iteration order.
enum ColumnKind {
    /// Preamble transaction ID
    TransactionId,
    /// Preamble order-type classifier
    Classifier,
    /// Schema field, by index into the schema's field list
    Known(usize),
    /// Dynamically discovered tag code outside the schema
    Unknown(String),
}

/// Table assembler - builds the output table from decoded records
pub struct TableAssembler;

impl TableAssembler {
    /// Assemble a batch of records into an [`OutputTable`]
    ///
    /// Never fails: an empty batch yields the canonical header and zero rows.
    /// Two runs over the same record sequence produce identical column
    /// orders.
    pub fn assemble(records: &[DecodedRecord], schema: &FieldSchema) -> OutputTable {
        let plan = Self::column_plan(records, schema);

        let columns = plan
            .iter()
            .map(|kind| match kind {
                ColumnKind::TransactionId => TID_COLUMN.to_string(),
                ColumnKind::Classifier => ORDER_TYPE_COLUMN.to_string(),
                ColumnKind::Known(idx) => schema.fields()[*idx].column.clone(),
                ColumnKind::Unknown(tag) => unknown_column_name(tag),
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                plan.iter()
                    .map(|kind| Self::cell(record, kind, schema))
                    .collect()
            })
            .collect();

        OutputTable { columns, rows }
    }

    /// Build the column plan: fixed preamble columns, schema order, then
    /// unknown tags in first-appearance order across the batch
    fn column_plan(records: &[DecodedRecord], schema: &FieldSchema) -> Vec<ColumnKind> {
        let mut extra_tags: IndexSet<&str> = IndexSet::new();
        for record in records {
            for tag in record.unknown_fields.keys() {
                // Re-discovery of a tag in a later record keeps its original
                // position
                extra_tags.insert(tag.as_str());
            }
        }

        let mut plan = Vec::with_capacity(2 + schema.len() + extra_tags.len());
        plan.push(ColumnKind::TransactionId);
        plan.push(ColumnKind::Classifier);
        plan.extend((0..schema.len()).map(ColumnKind::Known));
        plan.extend(
            extra_tags
                .into_iter()
                .map(|tag| ColumnKind::Unknown(tag.to_string())),
        );
        plan
    }

    /// Materialize one cell for a record
    fn cell(record: &DecodedRecord, kind: &ColumnKind, schema: &FieldSchema) -> CellValue {
        match kind {
            ColumnKind::TransactionId => CellValue::Text(record.transaction_id.clone()),
            ColumnKind::Classifier => CellValue::Text(record.classifier.clone()),
            ColumnKind::Known(idx) => {
                let field = &schema.fields()[*idx];
                if field.repeating {
                    Self::group_cell(record, schema.group_member(&field.tag))
                } else {
                    match record.known_fields.get(&field.column) {
                        Some(value) => CellValue::Text(value.clone()),
                        None => CellValue::Empty,
                    }
                }
            }
            ColumnKind::Unknown(tag) => match record.unknown_fields.get(tag) {
                Some(value) => CellValue::Text(value.clone()),
                None => CellValue::Empty,
            },
        }
    }

    /// Cell for a repeating-group column
    fn group_cell(record: &DecodedRecord, member: Option<GroupMember>) -> CellValue {
        let Some(group) = &record.repeating_group else {
            return CellValue::Empty;
        };
        let values = match member {
            Some(GroupMember::PartyId) => &group.party_ids,
            Some(GroupMember::PartyIdSource) => &group.party_id_sources,
            Some(GroupMember::PartyRole) => &group.party_roles,
            None => return CellValue::Empty,
        };
        if values.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Values(values.clone())
        }
    }
}
