//! Column metadata as reported by the server at channel open.
//!
//! The channel-open response carries one [`ColumnMetadata`] record per table
//! column. Records are validated into immutable [`ColumnDescriptor`]s, which
//! is where column names get case-normalized and the logical/physical type
//! strings are resolved against the supported matrix.

use serde::Deserialize;

use crate::error::TypeError;

/// SQL-level column type, as named by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    /// Any type; stored as text.
    Any,
    /// Boolean.
    Boolean,
    /// Internal row index column.
    RowIndex,
    /// The NULL type.
    Null,
    /// Double-precision float.
    Real,
    /// Fixed-point number (integer when scale is 0).
    Fixed,
    /// Variable-length text.
    Text,
    /// Fixed-length text.
    Char,
    /// Raw bytes.
    Binary,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Timestamp with local time zone.
    TimestampLtz,
    /// Timestamp without time zone.
    TimestampNtz,
    /// Timestamp with time zone. Not supported by the ingest path.
    TimestampTz,
    /// Day-time interval.
    Interval,
    /// Raw column.
    Raw,
    /// Array; stored as text.
    Array,
    /// Object; stored as text.
    Object,
    /// Semi-structured variant; stored as text.
    Variant,
    /// Nested row.
    Row,
    /// Sequence.
    Sequence,
    /// Function.
    Function,
    /// User-defined type.
    UserDefinedType,
}

impl LogicalType {
    /// Resolve a server-supplied logical type string.
    ///
    /// Matching is case-insensitive; unknown strings yield `None` and must be
    /// rejected by the schema builder.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let ty = match s.to_ascii_uppercase().as_str() {
            "ANY" => Self::Any,
            "BOOLEAN" => Self::Boolean,
            "ROWINDEX" => Self::RowIndex,
            "NULL" => Self::Null,
            "REAL" => Self::Real,
            "FIXED" => Self::Fixed,
            "TEXT" => Self::Text,
            "CHAR" => Self::Char,
            "BINARY" => Self::Binary,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "TIMESTAMP_LTZ" => Self::TimestampLtz,
            "TIMESTAMP_NTZ" => Self::TimestampNtz,
            "TIMESTAMP_TZ" => Self::TimestampTz,
            "INTERVAL" => Self::Interval,
            "RAW" => Self::Raw,
            "ARRAY" => Self::Array,
            "OBJECT" => Self::Object,
            "VARIANT" => Self::Variant,
            "ROW" => Self::Row,
            "SEQUENCE" => Self::Sequence,
            "FUNCTION" => Self::Function,
            "USER_DEFINED_TYPE" => Self::UserDefinedType,
            _ => return None,
        };
        Some(ty)
    }

    /// Canonical upper-case name, as used in messages and vector metadata.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::Boolean => "BOOLEAN",
            Self::RowIndex => "ROWINDEX",
            Self::Null => "NULL",
            Self::Real => "REAL",
            Self::Fixed => "FIXED",
            Self::Text => "TEXT",
            Self::Char => "CHAR",
            Self::Binary => "BINARY",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::TimestampLtz => "TIMESTAMP_LTZ",
            Self::TimestampNtz => "TIMESTAMP_NTZ",
            Self::TimestampTz => "TIMESTAMP_TZ",
            Self::Interval => "INTERVAL",
            Self::Raw => "RAW",
            Self::Array => "ARRAY",
            Self::Object => "OBJECT",
            Self::Variant => "VARIANT",
            Self::Row => "ROW",
            Self::Sequence => "SEQUENCE",
            Self::Function => "FUNCTION",
            Self::UserDefinedType => "USER_DEFINED_TYPE",
        }
    }
}

/// Physical storage kind realizing a logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    /// Internal row index storage.
    RowIndex,
    /// 8-byte IEEE double.
    Double,
    /// Signed 1-byte integer-like storage.
    Sb1,
    /// Signed 2-byte integer-like storage.
    Sb2,
    /// Signed 4-byte integer-like storage.
    Sb4,
    /// Signed 8-byte integer-like storage.
    Sb8,
    /// Signed 16-byte integer-like storage.
    Sb16,
    /// Variable-length large object.
    Lob,
    /// Variable-length binary.
    Binary,
    /// Nested row storage.
    Row,
}

impl PhysicalType {
    /// Resolve a server-supplied physical type string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let ty = match s.to_ascii_uppercase().as_str() {
            "ROWINDEX" => Self::RowIndex,
            "DOUBLE" => Self::Double,
            "SB1" => Self::Sb1,
            "SB2" => Self::Sb2,
            "SB4" => Self::Sb4,
            "SB8" => Self::Sb8,
            "SB16" => Self::Sb16,
            "LOB" => Self::Lob,
            "BINARY" => Self::Binary,
            "ROW" => Self::Row,
            _ => return None,
        };
        Some(ty)
    }

    /// Canonical upper-case name, as used in messages and vector metadata.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RowIndex => "ROWINDEX",
            Self::Double => "DOUBLE",
            Self::Sb1 => "SB1",
            Self::Sb2 => "SB2",
            Self::Sb4 => "SB4",
            Self::Sb8 => "SB8",
            Self::Sb16 => "SB16",
            Self::Lob => "LOB",
            Self::Binary => "BINARY",
            Self::Row => "ROW",
        }
    }
}

/// One column record of the channel-open response, as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    /// Column name, possibly double-quoted for case-sensitive identifiers.
    pub name: String,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Logical type string.
    pub logical_type: String,
    /// Physical type string.
    pub physical_type: String,
    /// Precision for fixed-point columns.
    #[serde(default)]
    pub precision: Option<u32>,
    /// Scale for fixed-point and temporal columns.
    #[serde(default)]
    pub scale: Option<u32>,
    /// Byte cap for binary columns.
    #[serde(default)]
    pub byte_length: Option<u32>,
    /// Character cap for text columns.
    #[serde(default, rename = "length")]
    pub char_length: Option<u32>,
}

/// Normalize a column identifier.
///
/// Double-quoted identifiers keep their exact spelling with the quotes
/// stripped; everything else is folded to upper case. Row keys and schema
/// names go through the same normalization so they meet in the middle.
#[must_use]
pub fn normalize_column_name(name: &str) -> String {
    let bytes = name.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"' {
        name[1..name.len() - 1].to_owned()
    } else {
        name.to_uppercase()
    }
}

/// Immutable, validated per-column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Normalized column name.
    pub name: String,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Logical type.
    pub logical_type: LogicalType,
    /// Physical type.
    pub physical_type: PhysicalType,
    /// Precision for fixed-point columns.
    pub precision: Option<u32>,
    /// Scale for fixed-point and temporal columns.
    pub scale: Option<u32>,
    /// Byte cap for binary columns.
    pub byte_length: Option<u32>,
    /// Character cap for text columns.
    pub char_length: Option<u32>,
}

impl ColumnDescriptor {
    /// Create a descriptor; the name is normalized here.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        nullable: bool,
        logical_type: LogicalType,
        physical_type: PhysicalType,
    ) -> Self {
        Self {
            name: normalize_column_name(&name.into()),
            nullable,
            logical_type,
            physical_type,
            precision: None,
            scale: None,
            byte_length: None,
            char_length: None,
        }
    }

    /// Set precision and scale.
    #[must_use]
    pub fn with_precision_scale(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Set the scale only.
    #[must_use]
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set the byte cap.
    #[must_use]
    pub fn with_byte_length(mut self, byte_length: u32) -> Self {
        self.byte_length = Some(byte_length);
        self
    }

    /// Set the character cap.
    #[must_use]
    pub fn with_char_length(mut self, char_length: u32) -> Self {
        self.char_length = Some(char_length);
        self
    }

    /// Validate a channel-open metadata record into a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownDataType`] when either type string is not
    /// in the supported matrix.
    pub fn from_metadata(meta: &ColumnMetadata) -> Result<Self, TypeError> {
        let unknown = || TypeError::UnknownDataType {
            logical: meta.logical_type.clone(),
            physical: meta.physical_type.clone(),
        };
        let logical_type = LogicalType::parse(&meta.logical_type).ok_or_else(|| unknown())?;
        let physical_type = PhysicalType::parse(&meta.physical_type).ok_or_else(|| unknown())?;
        Ok(Self {
            name: normalize_column_name(&meta.name),
            nullable: meta.nullable,
            logical_type,
            physical_type,
            precision: meta.precision,
            scale: meta.scale,
            byte_length: meta.byte_length,
            char_length: meta.char_length,
        })
    }

    /// Scale to use for numeric paths; absent means 0.
    #[must_use]
    pub fn scale_or_zero(&self) -> u32 {
        self.scale.unwrap_or(0)
    }

    /// Encoding metadata key-values that travel with the flushed vector so
    /// the server-side reader can decode it.
    #[must_use]
    pub fn metadata_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("logicalType", self.logical_type.as_str().to_owned()),
            ("physicalType", self.physical_type.as_str().to_owned()),
        ];
        if let Some(precision) = self.precision {
            pairs.push(("precision", precision.to_string()));
        }
        if let Some(scale) = self.scale {
            pairs.push(("scale", scale.to_string()));
        }
        if let Some(byte_length) = self.byte_length {
            pairs.push(("byteLength", byte_length.to_string()));
        }
        if let Some(char_length) = self.char_length {
            pairs.push(("charLength", char_length.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_unquoted_uppercases() {
        assert_eq!(normalize_column_name("foo"), "FOO");
        assert_eq!(normalize_column_name("Foo_bar1"), "FOO_BAR1");
    }

    #[test]
    fn test_normalize_quoted_preserved_verbatim() {
        assert_eq!(normalize_column_name("\"Foo\""), "Foo");
        assert_eq!(normalize_column_name("\"foo bar\""), "foo bar");
        // A lone quote is not a quoted identifier.
        assert_eq!(normalize_column_name("\""), "\"");
    }

    #[test]
    fn test_logical_type_round_trip() {
        for name in [
            "ANY",
            "BOOLEAN",
            "FIXED",
            "TEXT",
            "TIMESTAMP_LTZ",
            "TIMESTAMP_NTZ",
            "TIMESTAMP_TZ",
            "USER_DEFINED_TYPE",
        ] {
            let ty = LogicalType::parse(name);
            assert!(ty.is_some(), "{name} should parse");
            assert_eq!(ty.map(|t| t.as_str()), Some(name));
        }
        assert!(LogicalType::parse("GEOGRAPHY").is_none());
    }

    #[test]
    fn test_physical_type_parse_case_insensitive() {
        assert_eq!(PhysicalType::parse("sb16"), Some(PhysicalType::Sb16));
        assert_eq!(PhysicalType::parse("Lob"), Some(PhysicalType::Lob));
        assert!(PhysicalType::parse("SB32").is_none());
    }

    #[test]
    fn test_metadata_json_shape() {
        let meta: ColumnMetadata = serde_json::from_str(
            r#"{
                "name": "price",
                "nullable": true,
                "logicalType": "FIXED",
                "physicalType": "SB4",
                "precision": 9,
                "scale": 2
            }"#,
        )
        .expect("valid metadata");
        let desc = ColumnDescriptor::from_metadata(&meta).expect("supported types");
        assert_eq!(desc.name, "PRICE");
        assert_eq!(desc.logical_type, LogicalType::Fixed);
        assert_eq!(desc.physical_type, PhysicalType::Sb4);
        assert_eq!(desc.precision, Some(9));
        assert_eq!(desc.scale, Some(2));
    }

    #[test]
    fn test_metadata_length_alias() {
        let meta: ColumnMetadata = serde_json::from_str(
            r#"{"name": "s", "nullable": false, "logicalType": "TEXT",
                "physicalType": "LOB", "length": 64}"#,
        )
        .expect("valid metadata");
        assert_eq!(meta.char_length, Some(64));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let meta: ColumnMetadata = serde_json::from_str(
            r#"{"name": "g", "nullable": true, "logicalType": "GEOGRAPHY",
                "physicalType": "LOB"}"#,
        )
        .expect("valid metadata");
        let err = ColumnDescriptor::from_metadata(&meta).expect_err("unsupported");
        assert!(matches!(err, TypeError::UnknownDataType { .. }));
    }

    #[test]
    fn test_metadata_pairs() {
        let desc = ColumnDescriptor::new("n", true, LogicalType::Fixed, PhysicalType::Sb16)
            .with_precision_scale(38, 4);
        let pairs = desc.metadata_pairs();
        assert!(pairs.contains(&("logicalType", "FIXED".to_owned())));
        assert!(pairs.contains(&("physicalType", "SB16".to_owned())));
        assert!(pairs.contains(&("precision", "38".to_owned())));
        assert!(pairs.contains(&("scale", "4".to_owned())));
    }
}
