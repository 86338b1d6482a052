use crate::error::Error;
use crate::lexer::{Lexer, TokenKind};
use crate::limits::{BuilderLimits, UNBOUNDED};
use crate::position::Position;
use crate::sink::{NullSink, Sink};
use crate::source::CharacterSource;
use crate::value::ScalarValue;

/// A single step of the grammar state machine. `Document` is always the
/// first event produced by a fresh [`EventReader`]; `EndDocument` is
/// sticky once reached. `KeySeparator`/`ValueSeparator` from spec's
/// internal-only vocabulary never appear here — the colon and comma are
/// consumed invisibly between two externally visible events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseEvent {
    Document,
    EndDocument,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Key,
    NullValue,
    BooleanValue,
    NumberValue,
    StringValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy)]
struct ContainerFrame {
    kind: ContainerKind,
    /// Has at least one member/element been accepted yet. Controls
    /// whether `,` is required before the next one and whether the
    /// closing bracket is permitted immediately.
    started: bool,
    /// Object frames only: true right after a `Key` event, before the
    /// `:` and the value that follows it have been consumed.
    after_key: bool,
}

/// A token classified but not yet decoded: its payload is only pulled
/// off the character source once a typed reader asks for it, or —
/// if the caller never asks — the next call to [`EventReader::next`]
/// drains it into a [`NullSink`] so the stream keeps advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    StringLike,
    Number,
}

/// A pull parser over a [`CharacterSource`] that exposes one
/// [`ParseEvent`] at a time, validating RFC 8259 grammar as it goes.
///
/// Typed readers (`next_key`, `next_value`, `next_boolean`,
/// `next_int32`, ...) each assert the current event matches before
/// decoding, and every one of them consumes the outstanding payload —
/// there is no way to read the same value twice.
pub struct EventReader<S> {
    lexer: Lexer<S>,
    current: ParseEvent,
    stack: Vec<ContainerFrame>,
    pending: Option<Pending>,
    pending_bool: Option<bool>,
    root_value_consumed: bool,
    done: bool,
    limits: BuilderLimits,
}

impl<S: CharacterSource> EventReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            lexer: Lexer::new(source),
            current: ParseEvent::Document,
            stack: Vec::new(),
            pending: None,
            pending_bool: None,
            root_value_consumed: false,
            done: false,
            limits: BuilderLimits::unbounded(),
        }
    }

    /// Configure the limits the `_default` typed readers below pull
    /// their `max_*` arguments from, so a caller driving the reader
    /// directly doesn't have to thread them into every read by hand.
    /// Does not affect the implicit drain of a value the caller left
    /// unread, which stays unbounded regardless: a value nobody asked
    /// to read should never fail a limit check nobody asked to enforce.
    pub fn with_limits(mut self, limits: BuilderLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &BuilderLimits {
        &self.limits
    }

    pub fn position(&self) -> Position {
        self.lexer.position()
    }

    pub fn current_event(&self) -> ParseEvent {
        self.current
    }

    /// Depth of open containers (0 at the document root).
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn has_next(&self) -> bool {
        !self.done
    }

    /// Advance to and return the next event, draining any payload the
    /// caller left unread on the current one.
    pub fn next(&mut self) -> Result<ParseEvent, Error> {
        if self.done {
            return Ok(ParseEvent::EndDocument);
        }
        self.drain_pending()?;
        let event = self.advance()?;
        self.current = event;
        if event == ParseEvent::EndDocument {
            self.done = true;
        }
        Ok(event)
    }

    /// Entered right after a `StartObject`/`StartArray` event, consumes
    /// events until the matching close, without the caller having to
    /// track bracket depth itself — nested strings and brackets can't
    /// desynchronise this because the same grammar engine that tracks
    /// real nesting drives the skip.
    pub fn skip_to_end_container(&mut self) -> Result<(), Error> {
        let target = self.stack.len();
        while self.stack.len() >= target {
            self.next()?;
        }
        Ok(())
    }

    fn drain_pending(&mut self) -> Result<(), Error> {
        match self.pending.take() {
            Some(Pending::StringLike) => {
                // Skipped values are never length-capped: the caller chose
                // not to read this payload, so it should never fail a limit
                // check it never asked to have enforced.
                self.lexer.decode_string(&mut NullSink, UNBOUNDED)?;
            }
            Some(Pending::Number) => {
                self.lexer.decode_number(&mut NullSink, UNBOUNDED, UNBOUNDED)?;
            }
            None => {}
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<ParseEvent, Error> {
        if self.stack.is_empty() {
            return self.advance_root();
        }

        let top = self.stack.len() - 1;
        match self.stack[top].kind {
            ContainerKind::Array => self.advance_array(top),
            ContainerKind::Object => self.advance_object(top),
        }
    }

    fn advance_root(&mut self) -> Result<ParseEvent, Error> {
        if !self.root_value_consumed {
            let kind = self.lexer.next_token_kind()?;
            if kind == TokenKind::EndOfInput {
                return Err(Error::grammar("expected a value, found end of input", self.lexer.position()));
            }
            self.root_value_consumed = true;
            self.start_value(kind)
        } else {
            let kind = self.lexer.next_token_kind()?;
            if kind != TokenKind::EndOfInput {
                return Err(Error::grammar(
                    "expected end of input after the document's single value",
                    self.lexer.position(),
                ));
            }
            Ok(ParseEvent::EndDocument)
        }
    }

    fn advance_array(&mut self, top: usize) -> Result<ParseEvent, Error> {
        if !self.stack[top].started {
            let kind = self.lexer.next_token_kind()?;
            if kind == TokenKind::EndArray {
                self.stack.pop();
                return Ok(ParseEvent::EndArray);
            }
            self.stack[top].started = true;
            self.start_value(kind)
        } else {
            let kind = self.lexer.next_token_kind()?;
            match kind {
                TokenKind::EndArray => {
                    self.stack.pop();
                    Ok(ParseEvent::EndArray)
                }
                TokenKind::ValueSeparator => {
                    let kind = self.lexer.next_token_kind()?;
                    self.start_value(kind)
                }
                _ => Err(Error::grammar("expected ',' or ']'", self.lexer.position())),
            }
        }
    }

    fn advance_object(&mut self, top: usize) -> Result<ParseEvent, Error> {
        if self.stack[top].after_key {
            let separator = self.lexer.next_token_kind()?;
            if separator != TokenKind::KeySeparator {
                return Err(Error::grammar("expected ':' after an object key", self.lexer.position()));
            }
            let kind = self.lexer.next_token_kind()?;
            self.stack[top].after_key = false;
            self.start_value(kind)
        } else if !self.stack[top].started {
            let kind = self.lexer.next_token_kind()?;
            if kind == TokenKind::EndObject {
                self.stack.pop();
                return Ok(ParseEvent::EndObject);
            }
            if kind != TokenKind::String {
                return Err(Error::grammar("expected a string key or '}'", self.lexer.position()));
            }
            self.stack[top].started = true;
            self.stack[top].after_key = true;
            self.pending = Some(Pending::StringLike);
            Ok(ParseEvent::Key)
        } else {
            let kind = self.lexer.next_token_kind()?;
            match kind {
                TokenKind::EndObject => {
                    self.stack.pop();
                    Ok(ParseEvent::EndObject)
                }
                TokenKind::ValueSeparator => {
                    let kind = self.lexer.next_token_kind()?;
                    if kind != TokenKind::String {
                        return Err(Error::grammar("expected a string key after ','", self.lexer.position()));
                    }
                    self.stack[top].after_key = true;
                    self.pending = Some(Pending::StringLike);
                    Ok(ParseEvent::Key)
                }
                _ => Err(Error::grammar("expected ',' or '}'", self.lexer.position())),
            }
        }
    }

    fn start_value(&mut self, kind: TokenKind) -> Result<ParseEvent, Error> {
        match kind {
            TokenKind::StartObject => {
                self.stack.push(ContainerFrame {
                    kind: ContainerKind::Object,
                    started: false,
                    after_key: false,
                });
                Ok(ParseEvent::StartObject)
            }
            TokenKind::StartArray => {
                self.stack.push(ContainerFrame {
                    kind: ContainerKind::Array,
                    started: false,
                    after_key: false,
                });
                Ok(ParseEvent::StartArray)
            }
            TokenKind::Null => Ok(ParseEvent::NullValue),
            TokenKind::True => {
                self.pending_bool = Some(true);
                Ok(ParseEvent::BooleanValue)
            }
            TokenKind::False => {
                self.pending_bool = Some(false);
                Ok(ParseEvent::BooleanValue)
            }
            TokenKind::Number => {
                self.pending = Some(Pending::Number);
                Ok(ParseEvent::NumberValue)
            }
            TokenKind::String => {
                self.pending = Some(Pending::StringLike);
                Ok(ParseEvent::StringValue)
            }
            TokenKind::EndObject
            | TokenKind::EndArray
            | TokenKind::KeySeparator
            | TokenKind::ValueSeparator
            | TokenKind::EndOfInput => Err(Error::grammar("expected a value", self.lexer.position())),
        }
    }

    fn require(&self, expected: ParseEvent) -> Result<(), Error> {
        if self.current == expected {
            Ok(())
        } else {
            Err(Error::grammar(
                format!("expected {expected:?}, but the current event is {:?}", self.current),
                self.lexer.position(),
            ))
        }
    }

    pub fn next_key(&mut self, max_key_length: usize) -> Result<String, Error> {
        self.require(ParseEvent::Key)?;
        let mut key = String::new();
        self.lexer.decode_string(&mut key, max_key_length)?;
        self.pending = None;
        Ok(key)
    }

    pub fn next_boolean(&mut self) -> Result<bool, Error> {
        self.require(ParseEvent::BooleanValue)?;
        Ok(self.pending_bool.take().expect("boolean event without a pending value"))
    }

    pub fn next_string(&mut self, max_string_length: usize) -> Result<String, Error> {
        let mut s = String::new();
        self.append_next_string(&mut s, max_string_length)?;
        Ok(s)
    }

    pub fn append_next_string<T: Sink>(
        &mut self,
        sink: &mut T,
        max_string_length: usize,
    ) -> Result<(), Error> {
        self.require(ParseEvent::StringValue)?;
        self.lexer.decode_string(sink, max_string_length)?;
        self.pending = None;
        Ok(())
    }

    pub fn append_next_number<T: Sink>(
        &mut self,
        sink: &mut T,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<bool, Error> {
        self.require(ParseEvent::NumberValue)?;
        let is_float = self.lexer.decode_number(sink, max_mantissa_digits, max_exponent_digits)?;
        self.pending = None;
        Ok(is_float)
    }

    pub fn next_int32(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<i32, Error> {
        self.require(ParseEvent::NumberValue)?;
        let v = self.lexer.decode_number_as_int32(max_mantissa_digits, max_exponent_digits)?;
        self.pending = None;
        Ok(v)
    }

    pub fn next_int64(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<i64, Error> {
        self.require(ParseEvent::NumberValue)?;
        let v = self.lexer.decode_number_as_int64(max_mantissa_digits, max_exponent_digits)?;
        self.pending = None;
        Ok(v)
    }

    pub fn next_double(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<f64, Error> {
        self.require(ParseEvent::NumberValue)?;
        let v = self.lexer.decode_number_as_double(max_mantissa_digits, max_exponent_digits)?;
        self.pending = None;
        Ok(v)
    }

    pub fn next_bigdecimal(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<bigdecimal::BigDecimal, Error> {
        self.require(ParseEvent::NumberValue)?;
        let v = self.lexer.decode_number_as_bigdec(max_mantissa_digits, max_exponent_digits)?;
        self.pending = None;
        Ok(v)
    }

    pub fn next_biginteger(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<num_bigint::BigInt, Error> {
        self.require(ParseEvent::NumberValue)?;
        let v = self.lexer.decode_number_as_bigint(max_mantissa_digits, max_exponent_digits)?;
        self.pending = None;
        Ok(v)
    }

    /// Read whichever scalar the current event holds, narrowed the same
    /// way [`crate::lexer::Lexer::decode_number_value`] narrows a number.
    pub fn next_value(
        &mut self,
        max_string_length: usize,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<ScalarValue, Error> {
        match self.current {
            ParseEvent::NullValue => {
                self.pending = None;
                Ok(ScalarValue::Null)
            }
            ParseEvent::BooleanValue => {
                Ok(ScalarValue::Bool(self.pending_bool.take().expect("boolean event without a pending value")))
            }
            ParseEvent::NumberValue => {
                let v = self.lexer.decode_number_value(max_mantissa_digits, max_exponent_digits)?;
                self.pending = None;
                Ok(v)
            }
            ParseEvent::StringValue => {
                let mut s = String::new();
                self.lexer.decode_string(&mut s, max_string_length)?;
                self.pending = None;
                Ok(ScalarValue::String(s))
            }
            other => Err(Error::grammar(
                format!("expected a value, but the current event is {other:?}"),
                self.lexer.position(),
            )),
        }
    }

    /// Like [`next_key`](Self::next_key), bounded by the limits passed to
    /// [`with_limits`](Self::with_limits) instead of an explicit argument.
    pub fn next_key_default(&mut self) -> Result<String, Error> {
        self.next_key(self.limits.max_key_length())
    }

    pub fn next_string_default(&mut self) -> Result<String, Error> {
        self.next_string(self.limits.max_string_length())
    }

    pub fn append_next_string_default<T: Sink>(&mut self, sink: &mut T) -> Result<(), Error> {
        self.append_next_string(sink, self.limits.max_string_length())
    }

    pub fn append_next_number_default<T: Sink>(&mut self, sink: &mut T) -> Result<bool, Error> {
        self.append_next_number(sink, self.limits.max_mantissa_digits(), self.limits.max_exponent_digits())
    }

    pub fn next_int32_default(&mut self) -> Result<i32, Error> {
        self.next_int32(self.limits.max_mantissa_digits(), self.limits.max_exponent_digits())
    }

    pub fn next_int64_default(&mut self) -> Result<i64, Error> {
        self.next_int64(self.limits.max_mantissa_digits(), self.limits.max_exponent_digits())
    }

    pub fn next_double_default(&mut self) -> Result<f64, Error> {
        self.next_double(self.limits.max_mantissa_digits(), self.limits.max_exponent_digits())
    }

    pub fn next_bigdecimal_default(&mut self) -> Result<bigdecimal::BigDecimal, Error> {
        self.next_bigdecimal(self.limits.max_mantissa_digits(), self.limits.max_exponent_digits())
    }

    pub fn next_biginteger_default(&mut self) -> Result<num_bigint::BigInt, Error> {
        self.next_biginteger(self.limits.max_mantissa_digits(), self.limits.max_exponent_digits())
    }

    /// Like [`next_value`](Self::next_value), bounded by the limits passed
    /// to [`with_limits`](Self::with_limits) instead of explicit arguments.
    pub fn next_value_default(&mut self) -> Result<ScalarValue, Error> {
        self.next_value(
            self.limits.max_string_length(),
            self.limits.max_mantissa_digits(),
            self.limits.max_exponent_digits(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;

    fn reader(input: &str) -> EventReader<StrSource<'_>> {
        EventReader::new(StrSource::new(input))
    }

    #[test]
    fn basic_object_array_event_sequence() {
        let mut r = reader(r#"{"a":1,"b":[true,null,"x"]}"#);
        assert_eq!(r.current_event(), ParseEvent::Document);
        assert_eq!(r.next().unwrap(), ParseEvent::StartObject);
        assert_eq!(r.next().unwrap(), ParseEvent::Key);
        assert_eq!(r.next_key(usize::MAX).unwrap(), "a");
        assert_eq!(r.next().unwrap(), ParseEvent::NumberValue);
        assert_eq!(r.next_int32(usize::MAX, usize::MAX).unwrap(), 1);
        assert_eq!(r.next().unwrap(), ParseEvent::Key);
        assert_eq!(r.next_key(usize::MAX).unwrap(), "b");
        assert_eq!(r.next().unwrap(), ParseEvent::StartArray);
        assert_eq!(r.next().unwrap(), ParseEvent::BooleanValue);
        assert!(r.next_boolean().unwrap());
        assert_eq!(r.next().unwrap(), ParseEvent::NullValue);
        assert_eq!(r.next().unwrap(), ParseEvent::StringValue);
        assert_eq!(r.next_string(usize::MAX).unwrap(), "x");
        assert_eq!(r.next().unwrap(), ParseEvent::EndArray);
        assert_eq!(r.next().unwrap(), ParseEvent::EndObject);
        assert_eq!(r.next().unwrap(), ParseEvent::EndDocument);
        assert_eq!(r.next().unwrap(), ParseEvent::EndDocument);
    }

    #[test]
    fn empty_object_and_array() {
        let mut r = reader("{}");
        assert_eq!(r.next().unwrap(), ParseEvent::StartObject);
        assert_eq!(r.next().unwrap(), ParseEvent::EndObject);
        assert_eq!(r.next().unwrap(), ParseEvent::EndDocument);

        let mut r = reader("[]");
        assert_eq!(r.next().unwrap(), ParseEvent::StartArray);
        assert_eq!(r.next().unwrap(), ParseEvent::EndArray);
        assert_eq!(r.next().unwrap(), ParseEvent::EndDocument);
    }

    #[test]
    fn rejects_trailing_comma_in_array() {
        let mut r = reader("[1,]");
        assert_eq!(r.next().unwrap(), ParseEvent::StartArray);
        assert_eq!(r.next().unwrap(), ParseEvent::NumberValue);
        assert!(r.next().is_err());
    }

    #[test]
    fn rejects_non_string_key() {
        let mut r = reader("{1:2}");
        assert_eq!(r.next().unwrap(), ParseEvent::StartObject);
        assert!(r.next().is_err());
    }

    #[test]
    fn auto_advances_past_unread_value() {
        let mut r = reader(r#"{"a":"ignored","b":2}"#);
        assert_eq!(r.next().unwrap(), ParseEvent::StartObject);
        assert_eq!(r.next().unwrap(), ParseEvent::Key);
        assert_eq!(r.next_key(usize::MAX).unwrap(), "a");
        assert_eq!(r.next().unwrap(), ParseEvent::StringValue);
        // never read the string value — next() must drain it itself.
        assert_eq!(r.next().unwrap(), ParseEvent::Key);
        assert_eq!(r.next_key(usize::MAX).unwrap(), "b");
        assert_eq!(r.next().unwrap(), ParseEvent::NumberValue);
        assert_eq!(r.next_int32(usize::MAX, usize::MAX).unwrap(), 2);
        assert_eq!(r.next().unwrap(), ParseEvent::EndObject);
    }

    #[test]
    fn skip_to_end_container_skips_nested_structures() {
        let mut r = reader(r#"{"a":[1,{"b":[2,3]},4],"c":5}"#);
        assert_eq!(r.next().unwrap(), ParseEvent::StartObject);
        assert_eq!(r.next().unwrap(), ParseEvent::Key);
        assert_eq!(r.next_key(usize::MAX).unwrap(), "a");
        assert_eq!(r.next().unwrap(), ParseEvent::StartArray);
        r.skip_to_end_container().unwrap();
        assert_eq!(r.stack_depth(), 1);
        assert_eq!(r.next().unwrap(), ParseEvent::Key);
        assert_eq!(r.next_key(usize::MAX).unwrap(), "c");
        assert_eq!(r.next().unwrap(), ParseEvent::NumberValue);
        assert_eq!(r.next_int32(usize::MAX, usize::MAX).unwrap(), 5);
        assert_eq!(r.next().unwrap(), ParseEvent::EndObject);
        assert_eq!(r.next().unwrap(), ParseEvent::EndDocument);
    }

    #[test]
    fn rejects_trailing_content_after_document() {
        let mut r = reader("1 2");
        assert_eq!(r.next().unwrap(), ParseEvent::NumberValue);
        assert!(r.next().is_err());
    }

    #[test]
    fn typed_readers_validate_current_event() {
        let mut r = reader("true");
        assert_eq!(r.next().unwrap(), ParseEvent::BooleanValue);
        assert!(r.next_int32(usize::MAX, usize::MAX).is_err());
    }

    #[test]
    fn with_limits_configures_the_default_readers() {
        let mut r = reader(r#"{"a":1}"#).with_limits(BuilderLimits::unbounded());
        assert_eq!(r.next().unwrap(), ParseEvent::StartObject);
        assert_eq!(r.next().unwrap(), ParseEvent::Key);
        assert_eq!(r.next_key_default().unwrap(), "a");
        assert_eq!(r.next().unwrap(), ParseEvent::NumberValue);
        assert_eq!(r.next_int32_default().unwrap(), 1);
    }

    #[test]
    fn with_limits_enforces_the_configured_key_length() {
        let mut r = reader(r#"{"abcdef":1}"#).with_limits(BuilderLimits::unbounded().with_max_key_length(3));
        assert_eq!(r.next().unwrap(), ParseEvent::StartObject);
        assert_eq!(r.next().unwrap(), ParseEvent::Key);
        assert!(r.next_key_default().is_err());
    }
}
