//! Field schema: the set of FIX tags the decoder recognizes by construction
//!
//! The schema does double duty in the original design - decode-time membership
//! tests and canonical output ordering - so it is kept as two explicit
//! structures: an order-preserving field list (defines output column order)
//! and a tag-code index built from it (defines lookups).

use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag code for PartyID, the first member of the party repeating group
pub const TAG_PARTY_ID: &str = "448";
/// Tag code for PartyIDSource, the second member of the party repeating group
pub const TAG_PARTY_ID_SOURCE: &str = "447";
/// Tag code for PartyRole, the third member of the party repeating group
pub const TAG_PARTY_ROLE: &str = "452";

/// A single known-field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Numeric tag code as it appears on the wire (e.g. "35")
    pub tag: String,
    /// Human-readable column name (e.g. "35 MsgType")
    pub column: String,
    /// True for the party repeating-group tags
    #[serde(default)]
    pub repeating: bool,
}

impl FieldDef {
    /// Create a scalar (non-repeating) field definition
    pub fn scalar(tag: &str, column: &str) -> Self {
        Self {
            tag: tag.to_string(),
            column: column.to_string(),
            repeating: false,
        }
    }

    /// Create a repeating-group field definition
    pub fn repeating(tag: &str, column: &str) -> Self {
        Self {
            tag: tag.to_string(),
            column: column.to_string(),
            repeating: true,
        }
    }
}

/// Member of the party repeating group a tag code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMember {
    PartyId,
    PartyIdSource,
    PartyRole,
}

/// The field schema: ordered known-field list plus tag lookup index
///
/// Field order is significant and defines the canonical output column order.
/// Tag codes and column names are unique; `new` rejects duplicates.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    /// All field definitions in canonical output order
    fields: Vec<FieldDef>,
    /// Tag code -> index into `fields`
    by_tag: HashMap<String, usize>,
}

impl FieldSchema {
    /// Build a schema from an ordered field list
    ///
    /// # Errors
    /// Returns [`DecoderError::InvalidSchema`] if a tag code or column name
    /// appears twice, or if a field outside the party group is marked
    /// repeating (the group members are fixed by the record type).
    pub fn new(fields: Vec<FieldDef>) -> Result<Self> {
        let mut by_tag = HashMap::with_capacity(fields.len());
        let mut columns = HashMap::with_capacity(fields.len());

        for (idx, field) in fields.iter().enumerate() {
            if by_tag.insert(field.tag.clone(), idx).is_some() {
                return Err(DecoderError::InvalidSchema(format!(
                    "duplicate tag code '{}'",
                    field.tag
                )));
            }
            if columns.insert(field.column.clone(), idx).is_some() {
                return Err(DecoderError::InvalidSchema(format!(
                    "duplicate column name '{}'",
                    field.column
                )));
            }
            let is_party_tag = matches!(
                field.tag.as_str(),
                TAG_PARTY_ID | TAG_PARTY_ID_SOURCE | TAG_PARTY_ROLE
            );
            if field.repeating && !is_party_tag {
                return Err(DecoderError::InvalidSchema(format!(
                    "tag '{}' cannot repeat: only the party group tags do",
                    field.tag
                )));
            }
        }

        Ok(Self { fields, by_tag })
    }

    /// The built-in FIX tag table
    ///
    /// Order matches the canonical output column order. The three party tags
    /// are the only repeating fields.
    pub fn default_fix() -> Self {
        let fields = vec![
            FieldDef::scalar("8", "8 BeginString"),
            FieldDef::scalar("9", "9 BodyLength"),
            FieldDef::scalar("35", "35 MsgType"),
            FieldDef::scalar("34", "34 MsgSeqNum"),
            FieldDef::scalar("49", "49 SenderCompID"),
            FieldDef::scalar("56", "56 TargetCompID"),
            FieldDef::scalar("57", "57 TargetSubID"),
            FieldDef::scalar("52", "52 SendingTime"),
            FieldDef::scalar("11", "11 ClOrdID"),
            FieldDef::scalar("17", "17 ExecID"),
            FieldDef::scalar("37", "37 OrderID"),
            FieldDef::scalar("198", "198 SecondaryOrderId"),
            FieldDef::scalar("150", "150 ExecType"),
            FieldDef::scalar("453", "453 NoPartyIDs"),
            FieldDef::repeating(TAG_PARTY_ID, "448 PartyID"),
            FieldDef::repeating(TAG_PARTY_ID_SOURCE, "447 PartyIDSource"),
            FieldDef::repeating(TAG_PARTY_ROLE, "452 PartyRole"),
            FieldDef::scalar("55", "55 Symbol"),
            FieldDef::scalar("48", "48 SecurityID"),
            FieldDef::scalar("22", "22 SecurityIDSource"),
            FieldDef::scalar("762", "762 SecuritySubType"),
            FieldDef::scalar("1", "1 Account"),
            FieldDef::scalar("14", "14 CumQty"),
            FieldDef::scalar("31", "31 LastPx"),
            FieldDef::scalar("32", "32 LastQty"),
            FieldDef::scalar("38", "38 OrderQty"),
            FieldDef::scalar("110", "110 MinQty"),
            FieldDef::scalar("39", "39 OrdStatus"),
            FieldDef::scalar("40", "40 OrdType"),
            FieldDef::scalar("44", "44 Price"),
            FieldDef::scalar("847", "847 TargetStrategy"),
            FieldDef::scalar("54", "54 Side"),
            FieldDef::scalar("59", "59 TimeInForce"),
            FieldDef::scalar("60", "60 TransactTime"),
            FieldDef::scalar("75", "75 TradeDate"),
            FieldDef::scalar("64", "64 SettlDate"),
            FieldDef::scalar("151", "151 LeavesQty"),
            FieldDef::scalar("880", "880 TrdMatchID"),
            FieldDef::scalar("1891", "1891 TrdMatchSubID"),
            FieldDef::scalar("1057", "1057 AggressorIndicator"),
            FieldDef::scalar("381", "381 GrossTradeAmt"),
            FieldDef::scalar("797", "797 CopyMsgIndicator"),
            FieldDef::scalar("10", "10 CheckSum"),
        ];

        // The built-in table is statically unique
        Self::new(fields).expect("built-in FIX schema is valid")
    }

    /// Extend the schema with additional known fields, preserving order
    ///
    /// # Errors
    /// Returns [`DecoderError::InvalidSchema`] if an extra field collides with
    /// an existing tag code or column name.
    pub fn with_extra_fields(self, extra: Vec<FieldDef>) -> Result<Self> {
        let mut fields = self.fields;
        fields.extend(extra);
        Self::new(fields)
    }

    /// All field definitions in canonical output order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Number of known fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of repeating-group fields
    pub fn num_repeating(&self) -> usize {
        self.fields.iter().filter(|f| f.repeating).count()
    }

    /// Look up a field definition by tag code
    pub fn field_by_tag(&self, tag: &str) -> Option<&FieldDef> {
        self.by_tag.get(tag).map(|&idx| &self.fields[idx])
    }

    /// Which party-group member a tag code belongs to, if any
    pub fn group_member(&self, tag: &str) -> Option<GroupMember> {
        match tag {
            TAG_PARTY_ID => Some(GroupMember::PartyId),
            TAG_PARTY_ID_SOURCE => Some(GroupMember::PartyIdSource),
            TAG_PARTY_ROLE => Some(GroupMember::PartyRole),
            _ => None,
        }
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::default_fix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_lookups() {
        let schema = FieldSchema::default_fix();

        let price = schema.field_by_tag("44").unwrap();
        assert_eq!(price.column, "44 Price");
        assert!(!price.repeating);

        let party_id = schema.field_by_tag("448").unwrap();
        assert!(party_id.repeating);

        assert!(schema.field_by_tag("9999").is_none());
        assert_eq!(schema.num_repeating(), 3);
    }

    #[test]
    fn test_schema_order_is_declaration_order() {
        let schema = FieldSchema::default_fix();
        let columns: Vec<&str> = schema.fields().iter().map(|f| f.column.as_str()).collect();

        assert_eq!(columns[0], "8 BeginString");
        assert_eq!(columns[2], "35 MsgType");
        // The checksum column comes last, after every business field
        assert_eq!(columns[schema.len() - 1], "10 CheckSum");
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        let result = FieldSchema::new(vec![
            FieldDef::scalar("35", "35 MsgType"),
            FieldDef::scalar("35", "35 MessageType"),
        ]);
        assert!(matches!(result, Err(DecoderError::InvalidSchema(_))));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = FieldSchema::new(vec![
            FieldDef::scalar("35", "MsgType"),
            FieldDef::scalar("36", "MsgType"),
        ]);
        assert!(matches!(result, Err(DecoderError::InvalidSchema(_))));
    }

    #[test]
    fn test_with_extra_fields() {
        let schema = FieldSchema::default_fix();
        let base_len = schema.len();

        let schema = schema
            .with_extra_fields(vec![FieldDef::scalar("58", "58 Text")])
            .unwrap();
        assert_eq!(schema.len(), base_len + 1);
        assert_eq!(schema.fields()[base_len].column, "58 Text");

        // Extending with an existing tag is rejected
        let result = schema.with_extra_fields(vec![FieldDef::scalar("35", "35 Other")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_repeating_outside_party_group_rejected() {
        let result = FieldSchema::new(vec![FieldDef::repeating("55", "55 Symbol")]);
        assert!(matches!(result, Err(DecoderError::InvalidSchema(_))));
    }

    #[test]
    fn test_group_member_mapping() {
        let schema = FieldSchema::default_fix();
        assert_eq!(schema.group_member("448"), Some(GroupMember::PartyId));
        assert_eq!(schema.group_member("447"), Some(GroupMember::PartyIdSource));
        assert_eq!(schema.group_member("452"), Some(GroupMember::PartyRole));
        assert_eq!(schema.group_member("55"), None);
    }
}
