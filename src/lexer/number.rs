use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use std::str::FromStr;

use super::Lexer;
use crate::error::Error;
use crate::sink::Sink;
use crate::source::CharacterSource;
use crate::value::ScalarValue;

impl<S: CharacterSource> Lexer<S> {
    /// Consume a JSON number literal, writing its raw characters to
    /// `sink`. Returns `true` if a `.`, `e`, or `E` appeared (a float),
    /// `false` for a bare integer.
    ///
    /// Grammar: `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
    pub fn decode_number<T: Sink>(
        &mut self,
        sink: &mut T,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<bool, Error> {
        let mut mantissa_digits = 0usize;
        let mut is_float = false;

        if self.peek() == '-' {
            sink.push(self.source.next());
        }

        match self.peek() {
            '0' => {
                sink.push(self.source.next());
                mantissa_digits += 1;
                if self.peek().is_ascii_digit() {
                    return Err(self.syntax_error(
                        "a leading zero must not be followed by another digit",
                    ));
                }
            }
            '1'..='9' => {
                sink.push(self.source.next());
                mantissa_digits += 1;
                self.consume_digit_run(sink, &mut mantissa_digits, max_mantissa_digits)?;
            }
            _ => return Err(self.syntax_error("expected a digit")),
        }

        if self.peek() == '.' {
            is_float = true;
            sink.push(self.source.next());
            let before = mantissa_digits;
            self.consume_digit_run(sink, &mut mantissa_digits, max_mantissa_digits)?;
            if mantissa_digits == before {
                return Err(self.syntax_error("expected a digit after '.'"));
            }
        }

        if matches!(self.peek(), 'e' | 'E') {
            is_float = true;
            sink.push(self.source.next());
            if matches!(self.peek(), '+' | '-') {
                sink.push(self.source.next());
            }
            let mut exponent_digits = 0usize;
            self.consume_digit_run(sink, &mut exponent_digits, max_exponent_digits)?;
            if exponent_digits == 0 {
                return Err(self.syntax_error("expected a digit in the exponent"));
            }
        }

        Ok(is_float)
    }

    fn consume_digit_run<T: Sink>(
        &mut self,
        sink: &mut T,
        count: &mut usize,
        max: usize,
    ) -> Result<(), Error> {
        while self.peek().is_ascii_digit() {
            sink.push(self.source.next());
            *count += 1;
            if *count > max {
                return Err(self.syntax_error("number exceeds configured digit limit"));
            }
        }
        Ok(())
    }

    /// Decode a number into a private buffer and classify it into the
    /// narrowest matching [`ScalarValue`] variant, surfacing overflow or
    /// non-finite results as errors rather than silently coercing them.
    pub fn decode_number_value(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<ScalarValue, Error> {
        let mut buf = String::new();
        let is_float = self.decode_number(&mut buf, max_mantissa_digits, max_exponent_digits)?;

        if is_float {
            let d: f64 = buf
                .parse()
                .map_err(|_| self.syntax_error(format!("malformed number '{buf}'")))?;
            if !d.is_finite() {
                return Err(Error::semantic(
                    format!("number '{buf}' is not representable as a finite float"),
                    self.position(),
                ));
            }
            Ok(ScalarValue::Double(d))
        } else if let Ok(v) = buf.parse::<i64>() {
            match i32::try_from(v) {
                Ok(v32) => Ok(ScalarValue::Int32(v32)),
                Err(_) => Ok(ScalarValue::Int64(v)),
            }
        } else {
            let big = BigInt::from_str(&buf)
                .map_err(|_| self.syntax_error(format!("malformed integer '{buf}'")))?;
            Ok(ScalarValue::BigInt(big))
        }
    }

    pub fn decode_number_as_int32(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<i32, Error> {
        let mut buf = String::new();
        let is_float = self.decode_number(&mut buf, max_mantissa_digits, max_exponent_digits)?;
        if is_float {
            return Err(Error::semantic(
                format!("expected a 32-bit integer, found float '{buf}'"),
                self.position(),
            ));
        }
        buf.parse::<i32>().map_err(|_| {
            Error::semantic(format!("integer '{buf}' does not fit in 32 bits"), self.position())
        })
    }

    pub fn decode_number_as_int64(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<i64, Error> {
        let mut buf = String::new();
        let is_float = self.decode_number(&mut buf, max_mantissa_digits, max_exponent_digits)?;
        if is_float {
            return Err(Error::semantic(
                format!("expected a 64-bit integer, found float '{buf}'"),
                self.position(),
            ));
        }
        buf.parse::<i64>().map_err(|_| {
            Error::semantic(format!("integer '{buf}' does not fit in 64 bits"), self.position())
        })
    }

    pub fn decode_number_as_double(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<f64, Error> {
        let mut buf = String::new();
        self.decode_number(&mut buf, max_mantissa_digits, max_exponent_digits)?;
        let d: f64 = buf
            .parse()
            .map_err(|_| self.syntax_error(format!("malformed number '{buf}'")))?;
        if !d.is_finite() {
            return Err(Error::semantic(
                format!("number '{buf}' is not representable as a finite float"),
                self.position(),
            ));
        }
        Ok(d)
    }

    pub fn decode_number_as_bigdec(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<BigDecimal, Error> {
        let mut buf = String::new();
        self.decode_number(&mut buf, max_mantissa_digits, max_exponent_digits)?;
        BigDecimal::from_str(&buf)
            .map_err(|_| self.syntax_error(format!("malformed number '{buf}'")))
    }

    pub fn decode_number_as_bigint(
        &mut self,
        max_mantissa_digits: usize,
        max_exponent_digits: usize,
    ) -> Result<BigInt, Error> {
        let mut buf = String::new();
        let is_float = self.decode_number(&mut buf, max_mantissa_digits, max_exponent_digits)?;
        if is_float {
            return Err(Error::semantic(
                format!("expected an integer, found float '{buf}'"),
                self.position(),
            ));
        }
        BigInt::from_str(&buf).map_err(|_| self.syntax_error(format!("malformed integer '{buf}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;

    fn value(input: &str) -> ScalarValue {
        let mut lexer = Lexer::new(StrSource::new(input));
        lexer.decode_number_value(usize::MAX, usize::MAX).unwrap()
    }

    #[test]
    fn narrows_to_int32_when_representable() {
        assert!(matches!(value("42"), ScalarValue::Int32(42)));
        assert!(matches!(value("-7"), ScalarValue::Int32(-7)));
    }

    #[test]
    fn widens_to_int64_past_int32_max() {
        let v = value("2147483648");
        assert!(matches!(v, ScalarValue::Int64(2147483648)));
    }

    #[test]
    fn int32_boundary_is_accepted() {
        let mut lexer = Lexer::new(StrSource::new("2147483647"));
        assert_eq!(lexer.decode_number_as_int32(usize::MAX, usize::MAX).unwrap(), i32::MAX);
    }

    #[test]
    fn one_past_int32_boundary_is_rejected() {
        let mut lexer = Lexer::new(StrSource::new("2147483648"));
        assert!(lexer.decode_number_as_int32(usize::MAX, usize::MAX).is_err());
    }

    #[test]
    fn widens_to_bigint_past_int64() {
        let v = value("123456789012345678901234567890");
        assert!(matches!(v, ScalarValue::BigInt(_)));
    }

    #[test]
    fn rejects_leading_zero_followed_by_digit() {
        let mut lexer = Lexer::new(StrSource::new("01"));
        assert!(lexer.decode_number_value(usize::MAX, usize::MAX).is_err());
    }

    #[test]
    fn rejects_non_finite_float() {
        // exponent digit count (400 is 3 digits, within bound) but the
        // resulting float overflows to infinity.
        let mut lexer = Lexer::new(StrSource::new("1e400"));
        assert!(lexer.decode_number_value(usize::MAX, usize::MAX).is_err());
    }

    #[test]
    fn exponent_digit_limit_is_enforced() {
        // "50" is 2 digits, within a cap of 3, and 1e50 is still finite.
        let mut lexer = Lexer::new(StrSource::new("1e50"));
        assert!(lexer.decode_number_value(usize::MAX, 3).is_ok());
        // "4000" is 4 digits, over a cap of 3: rejected before the value
        // is even assembled, let alone checked for finiteness.
        let mut lexer = Lexer::new(StrSource::new("1e4000"));
        let err = lexer.decode_number_value(usize::MAX, 3).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Lexical);
    }

    #[test]
    fn decodes_float_shape() {
        assert!(matches!(value("3.14"), ScalarValue::Double(_)));
        assert!(matches!(value("1e10"), ScalarValue::Double(_)));
    }
}
