use serde::{Deserialize, Serialize};
use std::fmt;

/// Leading character that turns a type name into "array of" that type.
pub const ARRAY_MARKER: char = '_';

/// Deepest array nesting recognized, matching Postgres' `MAXDIM`. Names with
/// more leading markers are kept whole as [`TypeTag::Other`].
pub const MAX_ARRAY_DIMS: usize = 6;

/// A PostgreSQL column type, as named in a change payload's column list.
///
/// The closed set of variants covers every type the converter knows how to
/// cast. Anything else is kept verbatim in [`TypeTag::Other`] and passes
/// through unconverted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    Abstime,
    Bool,
    Date,
    Daterange,
    Float4,
    Float8,
    Int2,
    Int4,
    Int4range,
    Int8,
    Int8range,
    Json,
    Jsonb,
    Money,
    Numeric,
    Oid,
    Reltime,
    Time,
    Timestamp,
    Timestamptz,
    Timetz,
    Tsrange,
    Tstzrange,
    /// `_<element>`: a one-dimensional array of the element type.
    Array(Box<TypeTag>),
    Other(String),
}

/// How a non-array type's text value is turned into a native value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Boolean,
    Integer,
    Float,
    Json,
    Timestamp,
    IntRange,
    DateRange,
    PassThrough,
}

impl TypeTag {
    /// Parses a type name. Never fails: unknown names become [`TypeTag::Other`].
    pub fn parse(name: &str) -> Self {
        let base = name.trim_start_matches(ARRAY_MARKER);
        let dims = name.len() - base.len();
        if dims > MAX_ARRAY_DIMS {
            return TypeTag::Other(name.to_string());
        }

        let mut tag = TypeTag::parse_base(base);
        for _ in 0..dims {
            tag = TypeTag::Array(Box::new(tag));
        }
        tag
    }

    fn parse_base(name: &str) -> Self {
        match name {
            "abstime" => TypeTag::Abstime,
            "bool" => TypeTag::Bool,
            "date" => TypeTag::Date,
            "daterange" => TypeTag::Daterange,
            "float4" => TypeTag::Float4,
            "float8" => TypeTag::Float8,
            "int2" => TypeTag::Int2,
            "int4" => TypeTag::Int4,
            "int4range" => TypeTag::Int4range,
            "int8" => TypeTag::Int8,
            "int8range" => TypeTag::Int8range,
            "json" => TypeTag::Json,
            "jsonb" => TypeTag::Jsonb,
            "money" => TypeTag::Money,
            "numeric" => TypeTag::Numeric,
            "oid" => TypeTag::Oid,
            "reltime" => TypeTag::Reltime,
            "time" => TypeTag::Time,
            "timestamp" => TypeTag::Timestamp,
            "timestamptz" => TypeTag::Timestamptz,
            "timetz" => TypeTag::Timetz,
            "tsrange" => TypeTag::Tsrange,
            "tstzrange" => TypeTag::Tstzrange,
            other => TypeTag::Other(other.to_string()),
        }
    }

    /// Canonical PostgreSQL name of a non-array tag.
    ///
    /// Array tags have no static name; use the `Display` impl for those.
    pub fn base_name(&self) -> Option<&str> {
        let name = match self {
            TypeTag::Abstime => "abstime",
            TypeTag::Bool => "bool",
            TypeTag::Date => "date",
            TypeTag::Daterange => "daterange",
            TypeTag::Float4 => "float4",
            TypeTag::Float8 => "float8",
            TypeTag::Int2 => "int2",
            TypeTag::Int4 => "int4",
            TypeTag::Int4range => "int4range",
            TypeTag::Int8 => "int8",
            TypeTag::Int8range => "int8range",
            TypeTag::Json => "json",
            TypeTag::Jsonb => "jsonb",
            TypeTag::Money => "money",
            TypeTag::Numeric => "numeric",
            TypeTag::Oid => "oid",
            TypeTag::Reltime => "reltime",
            TypeTag::Time => "time",
            TypeTag::Timestamp => "timestamp",
            TypeTag::Timestamptz => "timestamptz",
            TypeTag::Timetz => "timetz",
            TypeTag::Tsrange => "tsrange",
            TypeTag::Tstzrange => "tstzrange",
            TypeTag::Other(name) => name.as_str(),
            TypeTag::Array(_) => return None,
        };
        Some(name)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeTag::Array(_))
    }

    /// Conversion applied to a single (non-array) value of this type.
    ///
    /// Array tags report `PassThrough`; the converter handles them before
    /// consulting this table.
    pub fn conversion(&self) -> Conversion {
        match self {
            TypeTag::Bool => Conversion::Boolean,
            TypeTag::Int2 | TypeTag::Int4 | TypeTag::Int8 | TypeTag::Oid => Conversion::Integer,
            TypeTag::Float4 | TypeTag::Float8 | TypeTag::Numeric | TypeTag::Money => {
                Conversion::Float
            }
            TypeTag::Json | TypeTag::Jsonb => Conversion::Json,
            TypeTag::Timestamp => Conversion::Timestamp,
            TypeTag::Int4range | TypeTag::Int8range => Conversion::IntRange,
            TypeTag::Daterange | TypeTag::Tsrange | TypeTag::Tstzrange => Conversion::DateRange,
            // Left as strings so callers can apply their own timezone handling
            TypeTag::Abstime
            | TypeTag::Date
            | TypeTag::Reltime
            | TypeTag::Time
            | TypeTag::Timestamptz
            | TypeTag::Timetz => Conversion::PassThrough,
            TypeTag::Array(_) | TypeTag::Other(_) => Conversion::PassThrough,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Array(element) => write!(f, "{}{}", ARRAY_MARKER, element),
            other => f.write_str(other.base_name().unwrap_or_default()),
        }
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        TypeTag::parse(name)
    }
}

impl From<String> for TypeTag {
    fn from(name: String) -> Self {
        TypeTag::parse(&name)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.to_string()
    }
}
