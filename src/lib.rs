//! A strict, streaming RFC 8259 JSON parser.
//!
//! Five layers, each usable on its own:
//!
//! - [`source`] — a position-tracked `char` stream with one character of
//!   push-back.
//! - [`lexer`] — whitespace skipping, token classification, and
//!   string/number decoding.
//! - [`reader`] — a pull-parser [`ParseEvent`](reader::ParseEvent)
//!   stream driving a grammar state machine.
//! - [`builder`] — a non-recursive [`TreeBuilder`](builder::TreeBuilder)
//!   that turns an event stream into a tree, enforcing
//!   [`BuilderLimits`](limits::BuilderLimits) and an optional
//!   [`Filter`](filter::Filter) as it goes.
//! - [`collector`] — the pluggable accumulator/result contract the tree
//!   builder materialises into; [`DomCollector`](collector::DomCollector)
//!   and [`ImmutableMapListCollector`](collector::ImmutableMapListCollector)
//!   ship as reference implementations.
//!
//! Every layer reports failure through the single [`Error`](error::Error)
//! type — there is no retry, and no per-layer error enum to match on.
//!
//! ```
//! use strict_json::{build_value, BuilderLimits, DomCollector};
//!
//! let limits = BuilderLimits::secure_defaults();
//! let value = build_value(r#"{"a":[1,2,3]}"#, &limits, &DomCollector).unwrap();
//! ```

pub mod builder;
pub mod collector;
pub mod error;
pub mod filter;
pub mod lexer;
pub mod limits;
pub mod position;
pub mod reader;
pub mod sink;
pub mod source;
pub mod value;

pub use builder::TreeBuilder;
pub use collector::{Collector, DomCollector, ImmutableMapListCollector, PutFailure};
pub use error::{Error, ErrorKind, JsonPointer};
pub use filter::{AcceptAll, Filter, PendingKind};
pub use limits::BuilderLimits;
pub use reader::{EventReader, ParseEvent};
pub use source::{CharacterSource, StrSource};
pub use value::{ScalarValue, Value};

/// Parse `input` into whatever value its single top-level JSON value
/// represents — a scalar, or a full object/array tree.
pub fn build_value<C: Collector>(
    input: &str,
    limits: &BuilderLimits,
    collector: &C,
) -> Result<Value<C::ObjectResult, C::ArrayResult>, Error> {
    let mut reader = EventReader::new(StrSource::new(input));
    TreeBuilder::new(limits, collector).build_value(&mut reader)
}

/// Parse `input`, requiring its single top-level value to be an object.
pub fn build_object<C: Collector>(
    input: &str,
    limits: &BuilderLimits,
    collector: &C,
) -> Result<C::ObjectResult, Error> {
    let mut reader = EventReader::new(StrSource::new(input));
    TreeBuilder::new(limits, collector).build_object(&mut reader)
}

/// Parse `input`, requiring its single top-level value to be an array.
pub fn build_array<C: Collector>(
    input: &str,
    limits: &BuilderLimits,
    collector: &C,
) -> Result<C::ArrayResult, Error> {
    let mut reader = EventReader::new(StrSource::new(input));
    TreeBuilder::new(limits, collector).build_array(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::DomValue;

    #[test]
    fn top_level_convenience_functions_round_trip() {
        let limits = BuilderLimits::unbounded();
        let value = build_value(r#"{"a":1}"#, &limits, &DomCollector).unwrap();
        assert_eq!(value, Value::Object(vec![("a".to_string(), DomValue::Int32(1))]));

        let object = build_object(r#"{"a":1}"#, &limits, &DomCollector).unwrap();
        assert_eq!(object, vec![("a".to_string(), DomValue::Int32(1))]);

        let array = build_array("[1,2,3]", &limits, &DomCollector).unwrap();
        assert_eq!(array, vec![DomValue::Int32(1), DomValue::Int32(2), DomValue::Int32(3)]);
    }
}
