use crate::collector::{collector_error, Collector};
use crate::error::{Error, JsonPointer};
use crate::filter::PendingKind;
use crate::limits::BuilderLimits;
use crate::position::Position;
use crate::reader::{EventReader, ParseEvent};
use crate::source::CharacterSource;
use crate::value::Value;

enum FrameData<C: Collector> {
    Object {
        acc: C::ObjectAccumulator,
        current_key: Option<String>,
    },
    Array {
        acc: C::ArrayAccumulator,
        index: usize,
    },
}

struct BuilderFrame<C: Collector> {
    path: JsonPointer,
    content_count: usize,
    data: FrameData<C>,
}

impl<C: Collector> BuilderFrame<C> {
    fn new(collector: &C, event: ParseEvent, path: JsonPointer) -> Self {
        let data = match event {
            ParseEvent::StartObject => FrameData::Object {
                acc: collector.new_object(),
                current_key: None,
            },
            ParseEvent::StartArray => FrameData::Array {
                acc: collector.new_array(),
                index: 0,
            },
            other => unreachable!("BuilderFrame::new called with {other:?}"),
        };
        Self { path, content_count: 0, data }
    }

    fn finish(self, collector: &C) -> Value<C::ObjectResult, C::ArrayResult> {
        match self.data {
            FrameData::Object { acc, .. } => Value::Object(collector.finish_object(acc)),
            FrameData::Array { acc, .. } => Value::Array(collector.finish_array(acc)),
        }
    }
}

/// Materialises a tree from an [`EventReader`] into whatever shape a
/// [`Collector`] produces, as an explicit heap-allocated frame stack
/// rather than recursive calls — arbitrarily deep, hostile input can
/// only ever grow `Vec<BuilderFrame<C>>`, never the native call stack.
pub struct TreeBuilder<'a, C: Collector> {
    limits: &'a BuilderLimits,
    collector: &'a C,
}

impl<'a, C: Collector> TreeBuilder<'a, C> {
    pub fn new(limits: &'a BuilderLimits, collector: &'a C) -> Self {
        Self { limits, collector }
    }

    /// Build whatever value is next: a scalar, or a full object/array
    /// subtree. Consumes `DOCUMENT`, then the one top-level value, then
    /// requires `END_DOCUMENT` — trailing non-whitespace content after the
    /// value is a grammar error, not a silently ignored tail.
    pub fn build_value<S: CharacterSource>(
        &self,
        reader: &mut EventReader<S>,
    ) -> Result<Value<C::ObjectResult, C::ArrayResult>, Error> {
        self.ensure_started(reader)?;
        let value = match reader.current_event() {
            ParseEvent::StartObject | ParseEvent::StartArray => self.run(reader)?,
            _ => {
                let scalar = reader.next_value(
                    self.limits.max_string_length(),
                    self.limits.max_mantissa_digits(),
                    self.limits.max_exponent_digits(),
                )?;
                Value::from(scalar)
            }
        };
        self.expect_end_document(reader)?;
        Ok(value)
    }

    /// Build an object. Fails with a [`GrammarError`](crate::error::ErrorKind::Grammar)
    /// if the document's next value is not `{`, or if anything other than
    /// whitespace follows the closing `}`.
    pub fn build_object<S: CharacterSource>(
        &self,
        reader: &mut EventReader<S>,
    ) -> Result<C::ObjectResult, Error> {
        self.ensure_started(reader)?;
        let object = self.build_object_subtree(reader)?;
        self.expect_end_document(reader)?;
        Ok(object)
    }

    /// Build an array. Fails with a [`GrammarError`](crate::error::ErrorKind::Grammar)
    /// if the document's next value is not `[`, or if anything other than
    /// whitespace follows the closing `]`.
    pub fn build_array<S: CharacterSource>(
        &self,
        reader: &mut EventReader<S>,
    ) -> Result<C::ArrayResult, Error> {
        self.ensure_started(reader)?;
        let array = self.build_array_subtree(reader)?;
        self.expect_end_document(reader)?;
        Ok(array)
    }

    /// Entered with the reader positioned at `StartObject`; leaves it at
    /// the matching `EndObject`.
    pub fn build_object_subtree<S: CharacterSource>(
        &self,
        reader: &mut EventReader<S>,
    ) -> Result<C::ObjectResult, Error> {
        if reader.current_event() != ParseEvent::StartObject {
            return Err(Error::grammar(
                format!("expected an object, found {:?}", reader.current_event()),
                reader.position(),
            ));
        }
        match self.run(reader)? {
            Value::Object(o) => Ok(o),
            _ => unreachable!("run() started from StartObject always returns Value::Object"),
        }
    }

    /// Entered with the reader positioned at `StartArray`; leaves it at
    /// the matching `EndArray`.
    pub fn build_array_subtree<S: CharacterSource>(
        &self,
        reader: &mut EventReader<S>,
    ) -> Result<C::ArrayResult, Error> {
        if reader.current_event() != ParseEvent::StartArray {
            return Err(Error::grammar(
                format!("expected an array, found {:?}", reader.current_event()),
                reader.position(),
            ));
        }
        match self.run(reader)? {
            Value::Array(a) => Ok(a),
            _ => unreachable!("run() started from StartArray always returns Value::Array"),
        }
    }

    fn ensure_started<S: CharacterSource>(&self, reader: &mut EventReader<S>) -> Result<(), Error> {
        if reader.current_event() == ParseEvent::Document {
            reader.next()?;
        }
        Ok(())
    }

    /// Spec §4.4: a top-level build consumes `DOCUMENT, one value, END_DOCUMENT`.
    /// Advancing once more past the value must land on `END_DOCUMENT`; any
    /// other event means trailing non-whitespace content followed the value.
    fn expect_end_document<S: CharacterSource>(&self, reader: &mut EventReader<S>) -> Result<(), Error> {
        match reader.next()? {
            ParseEvent::EndDocument => Ok(()),
            other => Err(Error::grammar(
                format!("expected end of document after the top-level value, found {other:?}"),
                reader.position(),
            )),
        }
    }

    fn run<S: CharacterSource>(
        &self,
        reader: &mut EventReader<S>,
    ) -> Result<Value<C::ObjectResult, C::ArrayResult>, Error> {
        let start_event = reader.current_event();
        if 1 > self.limits.max_nesting_depth() {
            log::debug!("max_nesting_depth breached at /");
            return Err(Error::limit("maximum nesting depth exceeded", reader.position())
                .with_pointer(JsonPointer::root()));
        }
        let mut frames = vec![BuilderFrame::new(self.collector, start_event, JsonPointer::root())];
        log::trace!("pushed frame, depth 1");

        loop {
            let event = reader.next()?;
            match event {
                ParseEvent::Key => {
                    let key = reader.next_key(self.limits.max_key_length())?;
                    match &mut frames.last_mut().expect("non-empty frame stack").data {
                        FrameData::Object { current_key, .. } => *current_key = Some(key),
                        FrameData::Array { .. } => {
                            unreachable!("Key event while the top frame is an array")
                        }
                    }
                }
                ParseEvent::EndObject | ParseEvent::EndArray => {
                    let frame = frames.pop().expect("frame stack desynchronised from events");
                    log::trace!("popped frame, depth {}", frames.len());
                    let finished = frame.finish(self.collector);
                    match frames.last_mut() {
                        Some(parent) => {
                            let pointer = child_pointer(parent);
                            let position = reader.position();
                            offer(self.collector, parent, finished, &pointer, position)?;
                        }
                        None => return Ok(finished),
                    }
                }
                value_event => {
                    let depth_if_pushed = frames.len() + 1;
                    let top = frames.last_mut().expect("non-empty frame stack");
                    top.content_count += 1;
                    let pointer = child_pointer(top);
                    if top.content_count > self.limits.max_content_nodes_per_container() {
                        log::debug!("max_content_nodes_per_container breached at {pointer}");
                        return Err(Error::limit(
                            "container exceeds max_content_nodes_per_container",
                            reader.position(),
                        )
                        .with_pointer(pointer));
                    }

                    let pending_kind = pending_kind_of(value_event);
                    let accepted = match self.limits.filter() {
                        Some(f) => match &top.data {
                            FrameData::Object { current_key, .. } => f.accept_field(
                                current_key.as_deref().expect("value event without a preceding key"),
                                pending_kind,
                                &pointer,
                            ),
                            FrameData::Array { index, .. } => f.accept_index(*index, pending_kind, &pointer),
                        },
                        None => true,
                    };

                    if matches!(value_event, ParseEvent::StartObject | ParseEvent::StartArray) {
                        if accepted {
                            if depth_if_pushed > self.limits.max_nesting_depth() {
                                log::debug!("max_nesting_depth breached at {pointer}");
                                return Err(Error::limit(
                                    "maximum nesting depth exceeded",
                                    reader.position(),
                                )
                                .with_pointer(pointer));
                            }
                            log::trace!("pushed frame, depth {depth_if_pushed}");
                            frames.push(BuilderFrame::new(self.collector, value_event, pointer));
                        } else {
                            reader.skip_to_end_container()?;
                            finalize_child(frames.last_mut().expect("non-empty frame stack"));
                        }
                    } else if accepted {
                        let scalar = reader.next_value(
                            self.limits.max_string_length(),
                            self.limits.max_mantissa_digits(),
                            self.limits.max_exponent_digits(),
                        )?;
                        let position = reader.position();
                        offer(
                            self.collector,
                            frames.last_mut().expect("non-empty frame stack"),
                            Value::from(scalar),
                            &pointer,
                            position,
                        )?;
                    } else {
                        finalize_child(frames.last_mut().expect("non-empty frame stack"));
                    }
                }
            }
        }
    }
}

fn pending_kind_of(event: ParseEvent) -> PendingKind {
    match event {
        ParseEvent::NullValue => PendingKind::Null,
        ParseEvent::BooleanValue => PendingKind::Boolean,
        ParseEvent::NumberValue => PendingKind::Number,
        ParseEvent::StringValue => PendingKind::String,
        ParseEvent::StartObject => PendingKind::Object,
        ParseEvent::StartArray => PendingKind::Array,
        other => unreachable!("pending_kind_of called with non-value event {other:?}"),
    }
}

/// The path a not-yet-materialised child would have, built from its
/// parent's own path plus this frame's current key or index — the
/// per-frame `identifier()` spec calls for, expressed as a pure function
/// over the frame rather than a stored field that would need upkeep.
fn child_pointer<C: Collector>(frame: &BuilderFrame<C>) -> JsonPointer {
    match &frame.data {
        FrameData::Object { current_key, .. } => {
            frame.path.clone().push_field(current_key.as_deref().unwrap_or(""))
        }
        FrameData::Array { index, .. } => frame.path.clone().push_index(*index),
    }
}

fn finalize_child<C: Collector>(frame: &mut BuilderFrame<C>) {
    match &mut frame.data {
        FrameData::Object { current_key, .. } => *current_key = None,
        FrameData::Array { index, .. } => *index += 1,
    }
}

fn offer<C: Collector>(
    collector: &C,
    frame: &mut BuilderFrame<C>,
    value: Value<C::ObjectResult, C::ArrayResult>,
    pointer: &JsonPointer,
    position: Position,
) -> Result<(), Error> {
    match &mut frame.data {
        FrameData::Object { acc, current_key } => {
            let key = current_key.take().expect("offering a value without a pending key");
            collector
                .put(acc, key, value)
                .map_err(|failure| collector_error(failure, position, pointer.clone()))?;
        }
        FrameData::Array { acc, .. } => collector.push(acc, value),
    }
    finalize_child(frame);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::DomCollector;
    use crate::collector::DomValue;
    use crate::filter::Filter;
    use crate::source::StrSource;

    fn build(input: &str, limits: &BuilderLimits) -> Result<Value<Vec<(String, DomValue)>, Vec<DomValue>>, Error> {
        let mut reader = EventReader::new(StrSource::new(input));
        let builder = TreeBuilder::new(limits, &DomCollector);
        builder.build_value(&mut reader)
    }

    #[test]
    fn builds_nested_object_and_array() {
        let limits = BuilderLimits::unbounded();
        let value = build(r#"{"a":1,"b":[true,null,"x"]}"#, &limits).unwrap();
        match value {
            Value::Object(fields) => {
                assert_eq!(fields[0], ("a".to_string(), DomValue::Int32(1)));
                match &fields[1].1 {
                    DomValue::Array(elements) => {
                        assert_eq!(
                            elements,
                            &vec![DomValue::Bool(true), DomValue::Null, DomValue::String("x".into())]
                        );
                    }
                    other => panic!("expected an array, got {other:?}"),
                }
            }
            other => panic!("expected an object, got {other:?}"),
        }
    }

    #[test]
    fn content_node_limit_reports_the_offending_index() {
        let limits = BuilderLimits::unbounded().with_max_content_nodes_per_container(4);
        let err = build("[1,2,3,4,5]", &limits).unwrap_err();
        assert!(err.is_limit());
        assert_eq!(err.pointer().unwrap().as_str(), "/4");
    }

    #[test]
    fn duplicate_key_reports_nested_pointer() {
        let limits = BuilderLimits::unbounded();
        let err = build(r#"{"a":{"a":1,"a":2}}"#, &limits).unwrap_err();
        assert_eq!(err.pointer().unwrap().as_str(), "/a/a");
    }

    #[test]
    fn trailing_content_after_a_scalar_document_is_rejected() {
        let limits = BuilderLimits::unbounded();
        let err = build("1 true", &limits).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Grammar);
    }

    #[test]
    fn trailing_content_after_a_container_document_is_rejected() {
        let limits = BuilderLimits::unbounded();
        let err = build("{} garbage", &limits).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Grammar);
    }

    #[test]
    fn build_object_rejects_a_scalar_document() {
        let mut reader = EventReader::new(StrSource::new(r#""hello""#));
        let limits = BuilderLimits::unbounded();
        let builder = TreeBuilder::new(&limits, &DomCollector);
        assert!(builder.build_value(&mut reader).is_ok());

        let mut reader = EventReader::new(StrSource::new(r#""hello""#));
        let builder = TreeBuilder::new(&limits, &DomCollector);
        assert!(builder.build_object(&mut reader).is_err());
    }

    #[test]
    fn nesting_depth_limit_fires_on_the_boundary_bracket() {
        let limits = BuilderLimits::unbounded().with_max_nesting_depth(3);
        let err = build("[[[[]]]]", &limits).unwrap_err();
        assert!(err.is_limit());
        assert_eq!(err.pointer().unwrap().as_str(), "/0/0/0");
    }

    struct RejectB;
    impl Filter for RejectB {
        fn accept_field(&self, key: &str, _pending_kind: PendingKind, _path: &JsonPointer) -> bool {
            key != "b"
        }
        fn accept_index(&self, _index: usize, _pending_kind: PendingKind, _path: &JsonPointer) -> bool {
            true
        }
    }

    #[test]
    fn filter_rejection_skips_the_field_without_erroring() {
        let limits = BuilderLimits::unbounded().with_filter(RejectB);
        let value = build(r#"{"a":1,"b":{"deep":[1,2,3]},"c":3}"#, &limits).unwrap();
        match value {
            Value::Object(fields) => {
                let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["a", "c"]);
            }
            other => panic!("expected an object, got {other:?}"),
        }
    }
}
