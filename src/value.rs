use std::fmt;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

/// One decoded scalar: the narrowest representation a number parsed to,
/// plus the non-numeric leaves. Returned directly by the lexer and by
/// [`EventReader::next_value`](crate::reader::EventReader::next_value) —
/// the scanner and the event reader never produce a container, so this
/// type has no `Object`/`Array` case.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
    String(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "null"),
            ScalarValue::Bool(b) => write!(f, "{b}"),
            ScalarValue::Int32(n) => write!(f, "{n}"),
            ScalarValue::Int64(n) => write!(f, "{n}"),
            ScalarValue::Double(n) => write!(f, "{n}"),
            ScalarValue::BigInt(n) => write!(f, "{n}"),
            ScalarValue::BigDecimal(n) => write!(f, "{n}"),
            ScalarValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// The value a [`Collector`](crate::collector::Collector) is handed when
/// asked to `put`/`push` a freshly-materialised child: every
/// [`ScalarValue`] case, plus a fully finished object or array result.
///
/// `OR`/`AR` are the collector's own `ObjectResult`/`ArrayResult`
/// associated types — a finished child container is transferred into its
/// parent by value, never reopened.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<OR, AR> {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
    String(String),
    Object(OR),
    Array(AR),
}

impl<OR, AR> From<ScalarValue> for Value<OR, AR> {
    fn from(scalar: ScalarValue) -> Self {
        match scalar {
            ScalarValue::Null => Value::Null,
            ScalarValue::Bool(b) => Value::Bool(b),
            ScalarValue::Int32(n) => Value::Int32(n),
            ScalarValue::Int64(n) => Value::Int64(n),
            ScalarValue::Double(n) => Value::Double(n),
            ScalarValue::BigInt(n) => Value::BigInt(n),
            ScalarValue::BigDecimal(n) => Value::BigDecimal(n),
            ScalarValue::String(s) => Value::String(s),
        }
    }
}
