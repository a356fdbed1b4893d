//! FIX Log Decoder Library
//!
//! A stateless, reusable library for decoding human-written log lines that
//! embed pipe-delimited, tag=value encoded FIX-like messages, and for
//! assembling the decoded records into one rectangular table.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Splits the free-text preamble from the structured message body
//! - Decodes tag=value pairs against a static field schema
//! - Folds the party tags (448/447/452) into an index-aligned repeating group
//! - Captures unknown tags and grows columns for them dynamically
//! - Produces a deterministic global column order across a heterogeneous batch
//!
//! The library does NOT:
//! - Read log files or write output files
//! - Render tables (column widths, formats) - cells stay structured values
//! - Validate FIX checksums or session rules
//! - Interpret enumerated field semantics - every value is an opaque string
//!
//! All higher-level functionality is in the application layer (fix-log-cli).
//!
//! # Example Usage
//!
//! ```
//! use fix_log_decoder::Decoder;
//!
//! let decoder = Decoder::new();
//! let lines = [
//!     "Session(TID=XYZ123) | NewOrder]: 35=D|55=AAPL|44=187.20",
//!     "Session(TID=XYZ124) | Execution]: 35=8|55=AAPL|9999=custom",
//! ];
//!
//! let (table, failures) = decoder.tabulate(lines);
//! assert!(failures.is_empty());
//! assert_eq!(table.num_rows(), 2);
//! assert_eq!(table.columns[0], "TID");
//! // Unknown tag 9999 got its own column after every schema column
//! assert!(table.columns.iter().any(|c| c == "Unknown Tag 9999"));
//! ```

// Public modules
pub mod decoder;
pub mod schema;
pub mod table;
pub mod types;

// Re-export main types for convenience
pub use decoder::{BatchResult, Decoder, LineError};
pub use schema::{FieldDef, FieldSchema, GroupMember};
pub use table::{unknown_column_name, OutputTable, TableAssembler, ORDER_TYPE_COLUMN, TID_COLUMN};
pub use types::{
    CellValue, DecodedRecord, DecoderError, RepeatingGroup, Result, UNKNOWN_ORDER_TYPE,
    UNKNOWN_TID,
};

// Internal modules (not exposed in public API)
mod message_decoder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: ensure we can create a decoder with the built-in schema
        let decoder = Decoder::new();
        assert!(!decoder.schema().is_empty());
        assert_eq!(decoder.schema().num_repeating(), 3);
    }
}
