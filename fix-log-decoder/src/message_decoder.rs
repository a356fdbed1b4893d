//! Message decoding engine
//!
//! Extracts one [`DecodedRecord`] from one raw log line: splits the free-text
//! preamble from the structured body, pulls the transaction ID and order-type
//! classifier out of the preamble, and decodes the pipe-delimited tag=value
//! body against the field schema, folding the party tags into the repeating
//! group.

use crate::schema::{FieldSchema, GroupMember};
use crate::types::{
    DecodedRecord, DecoderError, RepeatingGroup, Result, UNKNOWN_ORDER_TYPE, UNKNOWN_TID,
};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Separator between the free-text preamble and the message body
const PREAMBLE_SEPARATOR: &str = "]: ";

/// Marker that introduces the transaction ID inside the preamble
const TID_MARKER: &str = "(TID=";

/// Marker that introduces the order-type classifier inside the preamble
const CLASSIFIER_MARKER: &str = "| ";

/// Message decoder - extracts a structured record from a raw log line
pub struct MessageDecoder;

impl MessageDecoder {
    /// Decode a single log line into a [`DecodedRecord`]
    ///
    /// Pure function of its input: no state, no I/O. Fails only when the line
    /// has no `]: ` preamble/body separator; every other irregularity degrades
    /// locally (malformed sub-fields are dropped, unknown tags are captured).
    ///
    /// Known limitation: the classifier is everything after the *first* `| `
    /// in the preamble, so a transaction ID whose text itself contains `| `
    /// bleeds into the classifier. Kept for compatibility with the upstream
    /// log-producing systems.
    ///
    /// # Errors
    /// [`DecoderError::MalformedLine`] if the separator is missing. The error
    /// carries the input line so batch drivers can report it and decide
    /// whether to skip or abort.
    pub fn decode_line(line: &str, schema: &FieldSchema) -> Result<DecodedRecord> {
        let (preamble, body) = line
            .split_once(PREAMBLE_SEPARATOR)
            .ok_or_else(|| DecoderError::MalformedLine(line.to_string()))?;

        // The TID and classifier searches are independent scans over the same
        // preamble; no ordering between their markers is assumed.
        let transaction_id = Self::extract_transaction_id(preamble);
        let classifier = Self::extract_classifier(preamble);

        let mut known_fields = HashMap::new();
        let mut unknown_fields: IndexMap<String, String> = IndexMap::new();
        let mut group = RepeatingGroup::default();

        for part in body.split('|') {
            // Segments without '=' (typically trailing delimiters) are
            // dropped, not errors.
            let Some((tag, value)) = part.split_once('=') else {
                log::trace!("dropping sub-field without '=': {:?}", part);
                continue;
            };

            if let Some(member) = schema.group_member(tag) {
                let seq = match member {
                    GroupMember::PartyId => &mut group.party_ids,
                    GroupMember::PartyIdSource => &mut group.party_id_sources,
                    GroupMember::PartyRole => &mut group.party_roles,
                };
                seq.push(value.to_string());
            } else if let Some(field) = schema.field_by_tag(tag) {
                // Last occurrence wins when a scalar tag repeats in one line
                known_fields.insert(field.column.clone(), value.to_string());
            } else {
                // Last occurrence wins here too; insertion position (and with
                // it first-seen order) is preserved on overwrite
                unknown_fields.insert(tag.to_string(), value.to_string());
            }
        }

        let repeating_group = if group.is_empty() { None } else { Some(group) };

        Ok(DecodedRecord {
            transaction_id,
            classifier,
            known_fields,
            repeating_group,
            unknown_fields,
        })
    }

    /// Extract the transaction ID from the preamble
    ///
    /// The TID is the preamble prefix up to and including the first `)` at or
    /// after the `(TID=` marker, whitespace-trimmed. This is a textual
    /// extraction - nested parentheses beyond the first closing one are not
    /// parsed. A marker with no closing paren yields the sentinel.
    fn extract_transaction_id(preamble: &str) -> String {
        let Some(marker) = preamble.find(TID_MARKER) else {
            return UNKNOWN_TID.to_string();
        };
        match preamble[marker..].find(')') {
            Some(close) => preamble[..marker + close + 1].trim().to_string(),
            None => UNKNOWN_TID.to_string(),
        }
    }

    /// Extract the order-type classifier from the preamble
    ///
    /// Everything after the first `| `, whitespace-trimmed.
    fn extract_classifier(preamble: &str) -> String {
        match preamble.find(CLASSIFIER_MARKER) {
            Some(pos) => preamble[pos + CLASSIFIER_MARKER.len()..].trim().to_string(),
            None => UNKNOWN_ORDER_TYPE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(line: &str) -> DecodedRecord {
        MessageDecoder::decode_line(line, &FieldSchema::default_fix()).unwrap()
    }

    #[test]
    fn test_preamble_extraction() {
        let record = decode("Session(TID=XYZ123) | NewOrder]: 35=D|55=AAPL");
        assert_eq!(record.transaction_id, "Session(TID=XYZ123)");
        assert_eq!(record.classifier, "NewOrder");
        assert_eq!(record.known_fields["35 MsgType"], "D");
        assert_eq!(record.known_fields["55 Symbol"], "AAPL");
    }

    #[test]
    fn test_missing_tid_marker_uses_sentinel() {
        let record = decode("Session | NewOrder]: 35=D");
        assert_eq!(record.transaction_id, UNKNOWN_TID);
    }

    #[test]
    fn test_tid_marker_without_closing_paren_uses_sentinel() {
        let record = decode("Session(TID=XYZ | NewOrder]: 35=D");
        assert_eq!(record.transaction_id, UNKNOWN_TID);
    }

    #[test]
    fn test_missing_classifier_marker_uses_sentinel() {
        let record = decode("Session(TID=XYZ123)]: 35=D");
        assert_eq!(record.classifier, UNKNOWN_ORDER_TYPE);
    }

    #[test]
    fn test_classifier_uses_first_pipe_marker() {
        // Documented limitation: the first "| " wins, so later markers are
        // swallowed into the classifier text
        let record = decode("Sess | A | B]: 35=D");
        assert_eq!(record.classifier, "A | B");
    }

    #[test]
    fn test_missing_separator_is_malformed_line() {
        let err =
            MessageDecoder::decode_line("no separator here 35=D", &FieldSchema::default_fix())
                .unwrap_err();
        match err {
            DecoderError::MalformedLine(line) => assert!(line.contains("no separator")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_repeating_group_alignment() {
        let record = decode("S(TID=1) | Exec]: 448=A|447=B|452=1|448=C|447=D|452=2");
        let group = record.repeating_group.unwrap();
        assert_eq!(group.party_ids, vec!["A", "C"]);
        assert_eq!(group.party_id_sources, vec!["B", "D"]);
        assert_eq!(group.party_roles, vec!["1", "2"]);
    }

    #[test]
    fn test_asymmetric_repeating_group_kept_unpadded() {
        let record = decode("S(TID=1) | Exec]: 448=A|447=B|448=C");
        let group = record.repeating_group.unwrap();
        assert_eq!(group.party_ids.len(), 2);
        assert_eq!(group.party_id_sources.len(), 1);
        assert!(group.party_roles.is_empty());
    }

    #[test]
    fn test_no_party_tags_means_no_group() {
        let record = decode("S(TID=1) | Exec]: 35=8|55=AAPL");
        assert!(record.repeating_group.is_none());
    }

    #[test]
    fn test_malformed_sub_fields_silently_dropped() {
        // Trailing pipe and a '='-less segment in the middle
        let record = decode("S(TID=1) | Exec]: 35=8|garbage|55=AAPL|");
        assert_eq!(record.known_fields.len(), 2);
        assert!(record.unknown_fields.is_empty());
    }

    #[test]
    fn test_last_occurrence_wins_for_scalar_tags() {
        let record = decode("S(TID=1) | Exec]: 44=10.5|44=11.0");
        assert_eq!(record.known_fields["44 Price"], "11.0");
    }

    #[test]
    fn test_unknown_tags_captured_in_encounter_order() {
        let record = decode("S(TID=1) | Exec]: 9999=x|35=8|7777=y|9999=z");
        let tags: Vec<&String> = record.unknown_fields.keys().collect();
        assert_eq!(tags, ["9999", "7777"]);
        // Repeated unknown tag: last value wins, first-seen position kept
        assert_eq!(record.unknown_fields["9999"], "z");
    }

    #[test]
    fn test_value_with_equals_sign_splits_on_first() {
        let record = decode("S(TID=1) | Exec]: 58=a=b");
        assert_eq!(record.unknown_fields["58"], "a=b");
    }
}
