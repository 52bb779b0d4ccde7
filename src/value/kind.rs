use crate::errors::DbError;
use bson::Bson;

/// Kinds addressable by `$type`. `Number` is the alias matching every numeric kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsonKind {
    Double,
    String,
    Object,
    Array,
    BinData,
    Undefined,
    ObjectId,
    Bool,
    Date,
    Null,
    Regex,
    DbPointer,
    JavaScript,
    Symbol,
    JavaScriptWithScope,
    Int,
    Timestamp,
    Long,
    Decimal,
    MinKey,
    MaxKey,
    Number,
}

// (alias, numeric code, kind)
const KIND_TABLE: &[(&str, i32, BsonKind)] = &[
    ("double", 1, BsonKind::Double),
    ("string", 2, BsonKind::String),
    ("object", 3, BsonKind::Object),
    ("array", 4, BsonKind::Array),
    ("binData", 5, BsonKind::BinData),
    ("undefined", 6, BsonKind::Undefined),
    ("objectId", 7, BsonKind::ObjectId),
    ("bool", 8, BsonKind::Bool),
    ("date", 9, BsonKind::Date),
    ("null", 10, BsonKind::Null),
    ("regex", 11, BsonKind::Regex),
    ("dbPointer", 12, BsonKind::DbPointer),
    ("javascript", 13, BsonKind::JavaScript),
    ("symbol", 14, BsonKind::Symbol),
    ("javascriptWithScope", 15, BsonKind::JavaScriptWithScope),
    ("int", 16, BsonKind::Int),
    ("timestamp", 17, BsonKind::Timestamp),
    ("long", 18, BsonKind::Long),
    ("decimal", 19, BsonKind::Decimal),
    ("minKey", -1, BsonKind::MinKey),
    ("maxKey", 127, BsonKind::MaxKey),
];

impl BsonKind {
    pub fn from_alias(alias: &str) -> Option<Self> {
        match alias {
            "number" => Some(Self::Number),
            "MaxKey" => Some(Self::MaxKey),
            _ => KIND_TABLE.iter().find(|(a, _, _)| *a == alias).map(|(_, _, k)| *k),
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        KIND_TABLE.iter().find(|(_, c, _)| *c == code).map(|(_, _, k)| *k)
    }

    /// Parses a single `$type` operand: an alias string or a numeric code.
    pub fn parse(operand: &Bson) -> Result<Self, DbError> {
        let unsupported = || DbError::UnsupportedBsonType(operand.to_string());
        match operand {
            Bson::String(s) => Self::from_alias(s).ok_or_else(unsupported),
            Bson::Int32(i) => Self::from_code(*i).ok_or_else(unsupported),
            Bson::Int64(i) => {
                i32::try_from(*i).ok().and_then(Self::from_code).ok_or_else(unsupported)
            }
            #[allow(clippy::cast_possible_truncation)]
            Bson::Double(f) if f.fract() == 0.0 && f.abs() <= f64::from(i32::MAX) => {
                Self::from_code(*f as i32).ok_or_else(unsupported)
            }
            _ => Err(unsupported()),
        }
    }

    /// Runtime kind of a value.
    pub fn of(v: &Bson) -> Self {
        match v {
            Bson::Double(_) => Self::Double,
            Bson::String(_) => Self::String,
            Bson::Document(_) => Self::Object,
            Bson::Array(_) => Self::Array,
            Bson::Binary(_) => Self::BinData,
            Bson::Undefined => Self::Undefined,
            Bson::ObjectId(_) => Self::ObjectId,
            Bson::Boolean(_) => Self::Bool,
            Bson::DateTime(_) => Self::Date,
            Bson::Null => Self::Null,
            Bson::RegularExpression(_) => Self::Regex,
            Bson::DbPointer(_) => Self::DbPointer,
            Bson::JavaScriptCode(_) => Self::JavaScript,
            Bson::Symbol(_) => Self::Symbol,
            Bson::JavaScriptCodeWithScope(_) => Self::JavaScriptWithScope,
            Bson::Int32(_) => Self::Int,
            Bson::Timestamp(_) => Self::Timestamp,
            Bson::Int64(_) => Self::Long,
            Bson::Decimal128(_) => Self::Decimal,
            Bson::MinKey => Self::MinKey,
            Bson::MaxKey => Self::MaxKey,
        }
    }

    pub fn matches(self, v: &Bson) -> bool {
        match self {
            Self::Number => super::compare::is_numeric(v),
            k => Self::of(v) == k,
        }
    }
}
