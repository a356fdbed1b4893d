//! Main decoder API
//!
//! The [`Decoder`] struct is the entry point for the library: it owns the
//! field schema and exposes line, batch, and table-level operations. Batch
//! decoding reports failures per line instead of failing the whole batch, so
//! drivers can choose skip-and-continue or abort.

use crate::message_decoder::MessageDecoder;
use crate::schema::FieldSchema;
use crate::table::{OutputTable, TableAssembler};
use crate::types::{DecodedRecord, DecoderError, Result};

/// A per-line decode failure inside a batch
#[derive(Debug)]
pub struct LineError {
    /// 1-based line number within the batch (blank lines counted)
    pub line_no: usize,
    /// The decode error; [`DecoderError::MalformedLine`] carries the line text
    pub error: DecoderError,
}

/// Outcome of a batch decode: successful records plus per-line failures
///
/// Records keep their original line order, which the table assembler depends
/// on for row order and unknown-column discovery.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Successfully decoded records in input order
    pub records: Vec<DecodedRecord>,
    /// Lines that could not be decoded, in input order
    pub failures: Vec<LineError>,
}

impl BatchResult {
    /// True if every non-blank line decoded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The main decoder - entry point for all decoding operations
pub struct Decoder {
    schema: FieldSchema,
}

impl Decoder {
    /// Create a decoder with the built-in FIX field schema
    pub fn new() -> Self {
        Self {
            schema: FieldSchema::default_fix(),
        }
    }

    /// Create a decoder with a custom field schema
    pub fn with_schema(schema: FieldSchema) -> Self {
        Self { schema }
    }

    /// The decoder's field schema
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Decode a single log line
    ///
    /// # Errors
    /// [`DecoderError::MalformedLine`] if the line has no `]: ` separator.
    pub fn decode_line(&self, line: &str) -> Result<DecodedRecord> {
        MessageDecoder::decode_line(line, &self.schema)
    }

    /// Decode an ordered sequence of lines
    ///
    /// Blank lines are skipped but still counted, so reported line numbers
    /// match the source. Failures never abort the batch here; callers that
    /// want abort-on-error check [`BatchResult::is_complete`].
    pub fn decode_batch<'a, I>(&self, lines: I) -> BatchResult
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut result = BatchResult::default();

        for (idx, line) in lines.into_iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match self.decode_line(line) {
                Ok(record) => result.records.push(record),
                Err(error) => {
                    log::warn!("line {}: {}", idx + 1, error);
                    result.failures.push(LineError {
                        line_no: idx + 1,
                        error,
                    });
                }
            }
        }

        log::debug!(
            "decoded {} records, {} failures",
            result.records.len(),
            result.failures.len()
        );
        result
    }

    /// Assemble decoded records into an output table
    pub fn assemble(&self, records: &[DecodedRecord]) -> OutputTable {
        TableAssembler::assemble(records, &self.schema)
    }

    /// Decode a batch and assemble the table in one step
    ///
    /// Returns the table over every decodable line together with the list of
    /// unparsable lines, enabling partial success.
    pub fn tabulate<'a, I>(&self, lines: I) -> (OutputTable, Vec<LineError>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let batch = self.decode_batch(lines);
        let table = self.assemble(&batch.records);
        (table, batch.failures)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
