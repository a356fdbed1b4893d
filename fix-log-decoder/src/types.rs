//! Core types for the FIX log decoder library
//!
//! This module defines the fundamental types the decoder emits when processing
//! log lines. The decoder is stateless and only outputs decoded records - it
//! does not track batch state or choose a recovery policy for bad lines.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Sentinel used when the preamble carries no `(TID=...)` marker
pub const UNKNOWN_TID: &str = "Unknown TID";

/// Sentinel used when the preamble carries no `| ` classifier marker
pub const UNKNOWN_ORDER_TYPE: &str = "Unknown Order Type";

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    /// The line has no `]: ` preamble/body separator and cannot be decoded.
    /// Carries the offending line so batch drivers can report it.
    #[error("malformed line (missing ']: ' separator): {0}")]
    MalformedLine(String),

    #[error("invalid field schema: {0}")]
    InvalidSchema(String),
}

/// One decoded log line - the primary output of the decoder
///
/// Immutable after creation: the decoder builds it from a single line and the
/// table assembler only reads it. Field values are opaque strings; the decoder
/// never interprets enumerated FIX semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    /// Transaction ID extracted from the preamble, or [`UNKNOWN_TID`]
    pub transaction_id: String,
    /// Order-type classifier extracted from the preamble, or [`UNKNOWN_ORDER_TYPE`]
    pub classifier: String,
    /// Single-valued known fields, keyed by schema column name
    pub known_fields: HashMap<String, String>,
    /// Party repeating group, present only if at least one occurrence existed
    pub repeating_group: Option<RepeatingGroup>,
    /// Fields whose tag code is not in the schema, keyed by raw tag code.
    /// Insertion order is first-encounter order within the line.
    pub unknown_fields: IndexMap<String, String>,
}

/// The party repeating group: three index-aligned value sequences
///
/// Occurrences at the same ordinal position belong together (position i of
/// `party_ids` corresponds to position i of `party_id_sources` and
/// `party_roles`). Asymmetric occurrence counts are kept as-is - no padding
/// or validation is performed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeatingGroup {
    /// PartyID (tag 448) occurrences in encounter order
    pub party_ids: Vec<String>,
    /// PartyIDSource (tag 447) occurrences in encounter order
    pub party_id_sources: Vec<String>,
    /// PartyRole (tag 452) occurrences in encounter order
    pub party_roles: Vec<String>,
}

impl RepeatingGroup {
    /// True if no tag of the group occurred at all
    pub fn is_empty(&self) -> bool {
        self.party_ids.is_empty() && self.party_id_sources.is_empty() && self.party_roles.is_empty()
    }
}

/// A single output-table cell
///
/// Scalar fields produce [`CellValue::Text`]; repeating-group fields produce
/// [`CellValue::Values`] with the index-aligned sequence; fields absent from a
/// record degrade to [`CellValue::Empty`], never to an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Field absent from the record
    Empty,
    /// Single scalar value, verbatim from the wire
    Text(String),
    /// Ordered repeating-group values
    Values(Vec<String>),
}

impl CellValue {
    /// True if this cell renders as an empty string
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Values(v) => v.is_empty(),
        }
    }

    /// Borrow the scalar value if this is a text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Values(v) => write!(f, "{}", v.join(", ")),
        }
    }
}

// Empty cells serialize as "" rather than null so every JSON row carries the
// full column set with string-or-array values.
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_str(""),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Values(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for value in v {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}
