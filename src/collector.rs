use std::sync::Arc;

use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::error::{Error, JsonPointer};
use crate::position::Position;
use crate::value::Value;

/// Why a `put` call was rejected, so the builder can choose the right
/// [`ErrorKind`](crate::error::ErrorKind) without guessing from the
/// message text. See spec §7: duplicate keys are
/// [`Semantic`](crate::error::ErrorKind::Semantic); anything a
/// caller-supplied collector reports on its own behalf is
/// [`Collector`](crate::error::ErrorKind::Collector) and propagated
/// unchanged.
pub enum PutFailure {
    /// A reference collector's own duplicate-key rejection.
    DuplicateKey(String),
    /// Anything else the collector wants to report.
    Custom(String),
}

/// The accumulator/result contract a [`TreeBuilder`](crate::builder::TreeBuilder)
/// drives while materialising a tree.
///
/// Spec models this as four independent type parameters
/// (`ObjectAccumulator`, `ArrayAccumulator`, `ObjectResult`, `ArrayResult`);
/// Rust expresses the same shape as four associated types on one trait,
/// so a caller picks one `Collector` impl rather than four cooperating
/// generic parameters.
pub trait Collector {
    type ObjectAccumulator;
    type ArrayAccumulator;
    type ObjectResult;
    type ArrayResult;

    fn new_object(&self) -> Self::ObjectAccumulator;
    fn new_array(&self) -> Self::ArrayAccumulator;

    /// Insert a field. See [`PutFailure`] for how a rejection maps to
    /// an [`ErrorKind`](crate::error::ErrorKind).
    fn put(
        &self,
        object: &mut Self::ObjectAccumulator,
        key: String,
        value: Value<Self::ObjectResult, Self::ArrayResult>,
    ) -> Result<(), PutFailure>;

    fn put_null(&self, object: &mut Self::ObjectAccumulator, key: String) -> Result<(), PutFailure> {
        self.put(object, key, self.null_value())
    }

    fn push(&self, array: &mut Self::ArrayAccumulator, value: Value<Self::ObjectResult, Self::ArrayResult>);

    fn push_null(&self, array: &mut Self::ArrayAccumulator) {
        self.push(array, self.null_value());
    }

    fn finish_object(&self, object: Self::ObjectAccumulator) -> Self::ObjectResult;
    fn finish_array(&self, array: Self::ArrayAccumulator) -> Self::ArrayResult;

    fn null_value(&self) -> Value<Self::ObjectResult, Self::ArrayResult> {
        Value::Null
    }
}

pub(crate) fn collector_error(failure: PutFailure, position: Position, pointer: JsonPointer) -> Error {
    match failure {
        PutFailure::DuplicateKey(message) => Error::semantic(message, position).with_pointer(pointer),
        PutFailure::Custom(message) => Error::collector(message, position).with_pointer(pointer),
    }
}

/// A DOM-style tree: ordered object fields, `null` represented by its
/// own sentinel variant rather than Rust's absence-of-value, duplicate
/// keys rejected outright. This mirrors the document-object-model shape
/// most JSON libraries ship as their zero-configuration default.
#[derive(Debug, Clone, PartialEq)]
pub enum DomValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
    String(String),
    Object(Vec<(String, DomValue)>),
    Array(Vec<DomValue>),
}

impl From<Value<Vec<(String, DomValue)>, Vec<DomValue>>> for DomValue {
    fn from(value: Value<Vec<(String, DomValue)>, Vec<DomValue>>) -> Self {
        match value {
            Value::Null => DomValue::Null,
            Value::Bool(b) => DomValue::Bool(b),
            Value::Int32(n) => DomValue::Int32(n),
            Value::Int64(n) => DomValue::Int64(n),
            Value::Double(n) => DomValue::Double(n),
            Value::BigInt(n) => DomValue::BigInt(n),
            Value::BigDecimal(n) => DomValue::BigDecimal(n),
            Value::String(s) => DomValue::String(s),
            Value::Object(o) => DomValue::Object(o),
            Value::Array(a) => DomValue::Array(a),
        }
    }
}

/// Reference [`Collector`]: preserves object key insertion order with a
/// plain `Vec` of pairs (no hashing overhead, no reliance on a map
/// crate's own ordering guarantees) and rejects a repeated key.
#[derive(Debug, Default, Clone, Copy)]
pub struct DomCollector;

impl Collector for DomCollector {
    type ObjectAccumulator = Vec<(String, DomValue)>;
    type ArrayAccumulator = Vec<DomValue>;
    type ObjectResult = Vec<(String, DomValue)>;
    type ArrayResult = Vec<DomValue>;

    fn new_object(&self) -> Self::ObjectAccumulator {
        Vec::new()
    }

    fn new_array(&self) -> Self::ArrayAccumulator {
        Vec::new()
    }

    fn put(
        &self,
        object: &mut Self::ObjectAccumulator,
        key: String,
        value: Value<Self::ObjectResult, Self::ArrayResult>,
    ) -> Result<(), PutFailure> {
        if object.iter().any(|(k, _)| *k == key) {
            return Err(PutFailure::DuplicateKey(format!("duplicate key '{key}'")));
        }
        object.push((key, value.into()));
        Ok(())
    }

    fn push(&self, array: &mut Self::ArrayAccumulator, value: Value<Self::ObjectResult, Self::ArrayResult>) {
        array.push(value.into());
    }

    fn finish_object(&self, object: Self::ObjectAccumulator) -> Self::ObjectResult {
        object
    }

    fn finish_array(&self, array: Self::ArrayAccumulator) -> Self::ArrayResult {
        array
    }
}

/// An immutable, shareable JSON tree: a hash map keyed by field name
/// (insertion order preserved, per spec's determinism requirement, by
/// [`indexmap::IndexMap`] rather than a plain `HashMap`) and a vector for
/// arrays, both wrapped behind a read-only view once finished.
#[derive(Debug, Clone, PartialEq)]
pub enum ImmutableValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Double(f64),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
    String(String),
    Object(ImmutableObject),
    Array(ImmutableArray),
}

/// A read-only, reference-counted, insertion-ordered map. Cloning is an
/// `Arc` bump, not a deep copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmutableObject(Arc<IndexMap<String, ImmutableValue>>);

impl ImmutableObject {
    pub fn get(&self, key: &str) -> Option<&ImmutableValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ImmutableValue> {
        self.0.iter()
    }
}

/// A read-only, reference-counted array. Cloning is an `Arc` bump, not a
/// deep copy.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmutableArray(Arc<Vec<ImmutableValue>>);

impl ImmutableArray {
    pub fn get(&self, index: usize) -> Option<&ImmutableValue> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImmutableValue> {
        self.0.iter()
    }
}

impl From<Value<ImmutableObject, ImmutableArray>> for ImmutableValue {
    fn from(value: Value<ImmutableObject, ImmutableArray>) -> Self {
        match value {
            Value::Null => ImmutableValue::Null,
            Value::Bool(b) => ImmutableValue::Bool(b),
            Value::Int32(n) => ImmutableValue::Int32(n),
            Value::Int64(n) => ImmutableValue::Int64(n),
            Value::Double(n) => ImmutableValue::Double(n),
            Value::BigInt(n) => ImmutableValue::BigInt(n),
            Value::BigDecimal(n) => ImmutableValue::BigDecimal(n),
            Value::String(s) => ImmutableValue::String(s),
            Value::Object(o) => ImmutableValue::Object(o),
            Value::Array(a) => ImmutableValue::Array(a),
        }
    }
}

/// Reference [`Collector`] producing an immutable, `Arc`-shared tree —
/// the shape a caller reaches for when the parsed document is read many
/// times from multiple places after being built once.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmutableMapListCollector;

impl Collector for ImmutableMapListCollector {
    type ObjectAccumulator = IndexMap<String, ImmutableValue>;
    type ArrayAccumulator = Vec<ImmutableValue>;
    type ObjectResult = ImmutableObject;
    type ArrayResult = ImmutableArray;

    fn new_object(&self) -> Self::ObjectAccumulator {
        IndexMap::new()
    }

    fn new_array(&self) -> Self::ArrayAccumulator {
        Vec::new()
    }

    fn put(
        &self,
        object: &mut Self::ObjectAccumulator,
        key: String,
        value: Value<Self::ObjectResult, Self::ArrayResult>,
    ) -> Result<(), PutFailure> {
        if object.contains_key(&key) {
            return Err(PutFailure::DuplicateKey(format!("duplicate key '{key}'")));
        }
        object.insert(key, value.into());
        Ok(())
    }

    fn push(&self, array: &mut Self::ArrayAccumulator, value: Value<Self::ObjectResult, Self::ArrayResult>) {
        array.push(value.into());
    }

    fn finish_object(&self, object: Self::ObjectAccumulator) -> Self::ObjectResult {
        ImmutableObject(Arc::new(object))
    }

    fn finish_array(&self, array: Self::ArrayAccumulator) -> Self::ArrayResult {
        ImmutableArray(Arc::new(array))
    }
}
