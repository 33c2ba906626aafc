//! Leaf encoders: boolean, integer, float, string.

use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::EncodeError;
use crate::value::Value;

use super::{Cached, Encode, Plan};

static FALSE_TOKENS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// String tokens encoded as SQL `f`. Built once, never mutated.
pub(crate) fn false_tokens() -> &'static HashSet<&'static str> {
    FALSE_TOKENS.get_or_init(|| {
        ["0", "f", "F", "false", "FALSE", "off", "OFF"]
            .into_iter()
            .collect()
    })
}

/// Encoder for the PostgreSQL `bool` type.
///
/// `false`, numeric zero and the fixed false tokens (`"0"`, `"f"`, `"F"`,
/// `"false"`, `"FALSE"`, `"off"`, `"OFF"`, case-sensitive) encode as `f`;
/// anything else - the empty string included - encodes as `t`. NULL is the
/// caller's concern, not this encoder's.
pub struct BooleanEncoder {
    false_tokens: &'static HashSet<&'static str>,
}

impl BooleanEncoder {
    pub fn new() -> Self {
        Self {
            false_tokens: false_tokens(),
        }
    }
}

impl Default for BooleanEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encode for BooleanEncoder {
    fn measure(&self, _value: &Value) -> Result<Plan, EncodeError> {
        Ok(Plan::sized(1))
    }

    fn write(
        &self,
        value: &Value,
        out: &mut [u8],
        _cached: Option<Cached>,
    ) -> Result<usize, EncodeError> {
        out[0] = match value {
            Value::Bool(false) => b'f',
            Value::Int(n) => {
                if *n == 0 {
                    b'f'
                } else {
                    b't'
                }
            }
            Value::Float(x) => {
                if *x == 0.0 {
                    b'f'
                } else {
                    b't'
                }
            }
            Value::String(s) if self.false_tokens.contains(s.as_str()) => b'f',
            _ => b't',
        };
        Ok(1)
    }
}

/// Encoder for the PostgreSQL `int` types.
///
/// Magnitudes below 10^14 are sized exactly by a branching digit-tier table
/// and written digit-by-digit; anything wider falls back to the string path.
pub struct IntegerEncoder;

/// Decimal digit count for magnitudes below 10^14.
#[inline]
fn decimal_digits(mag: u64) -> usize {
    if mag < 100_000_000 {
        if mag < 10_000 {
            if mag < 100 {
                if mag < 10 { 1 } else { 2 }
            } else if mag < 1_000 {
                3
            } else {
                4
            }
        } else if mag < 1_000_000 {
            if mag < 100_000 { 5 } else { 6 }
        } else if mag < 10_000_000 {
            7
        } else {
            8
        }
    } else if mag < 1_000_000_000_000 {
        if mag < 10_000_000_000 {
            if mag < 1_000_000_000 { 9 } else { 10 }
        } else if mag < 100_000_000_000 {
            11
        } else {
            12
        }
    } else if mag < 10_000_000_000_000 {
        13
    } else {
        14
    }
}

/// Fast-path cutoff: 10^14. At or above this, delegate to the string path.
const DIGIT_TABLE_LIMIT: u64 = 100_000_000_000_000;

impl Encode for IntegerEncoder {
    fn measure(&self, value: &Value) -> Result<Plan, EncodeError> {
        let n = value.to_int()?;
        let mag = n.unsigned_abs();
        if mag >= DIGIT_TABLE_LIMIT {
            let mut tmp = itoa::Buffer::new();
            return Ok(Plan::Materialized(tmp.format(n).as_bytes().to_vec()));
        }
        let bound = decimal_digits(mag) + usize::from(n < 0);
        Ok(Plan::Sized {
            bound,
            cached: Some(Cached::Int(n)),
        })
    }

    fn write(
        &self,
        value: &Value,
        out: &mut [u8],
        cached: Option<Cached>,
    ) -> Result<usize, EncodeError> {
        let n = match cached {
            Some(Cached::Int(n)) => n,
            None => value.to_int()?,
        };
        // unsigned_abs keeps i64::MIN from overflowing on negation
        let mut mag = n.unsigned_abs();
        let mut len = 0;

        // Digits least-significant-first, then reverse in place.
        loop {
            out[len] = b'0' + (mag % 10) as u8;
            len += 1;
            mag /= 10;
            if mag == 0 {
                break;
            }
        }
        if n < 0 {
            out[len] = b'-';
            len += 1;
        }
        out[..len].reverse();
        Ok(len)
    }
}

/// Upper bound on a finite float's text: sign, 17 significant digits,
/// decimal point, `E`, exponent sign, three exponent digits.
pub const FLOAT_TEXT_MAX: usize = 24;

/// Encoder for the PostgreSQL `float` types.
///
/// Finite values are written in scientific notation with 16 fractional
/// digits and an uppercase `E` (`%.16E`), which round-trips every `f64`
/// exactly. Infinities and NaN use the spellings the server accepts.
pub struct FloatEncoder;

impl Encode for FloatEncoder {
    fn measure(&self, _value: &Value) -> Result<Plan, EncodeError> {
        Ok(Plan::sized(FLOAT_TEXT_MAX))
    }

    fn write(
        &self,
        value: &Value,
        out: &mut [u8],
        _cached: Option<Cached>,
    ) -> Result<usize, EncodeError> {
        let x = value.to_float()?;
        if x.is_infinite() {
            let text: &[u8] = if x < 0.0 { b"-Infinity" } else { b"Infinity" };
            out[..text.len()].copy_from_slice(text);
            return Ok(text.len());
        }
        if x.is_nan() {
            out[..3].copy_from_slice(b"NaN");
            return Ok(3);
        }

        // {:.16E} yields the mantissa we want but a bare exponent (`E5`,
        // `E-3`); the server grammar wants a sign and two digits minimum.
        let formatted = format!("{x:.16E}");
        let (mantissa, exponent) = formatted
            .split_once('E')
            .ok_or(EncodeError::Contract("malformed float text"))?;
        let exp: i32 = exponent
            .parse()
            .map_err(|_| EncodeError::Contract("malformed float exponent"))?;

        let mut len = mantissa.len();
        out[..len].copy_from_slice(mantissa.as_bytes());
        out[len] = b'E';
        len += 1;
        out[len] = if exp < 0 { b'-' } else { b'+' };
        len += 1;
        let mag = exp.unsigned_abs();
        if mag >= 100 {
            out[len] = b'0' + (mag / 100) as u8;
            len += 1;
        }
        out[len] = b'0' + ((mag / 10) % 10) as u8;
        len += 1;
        out[len] = b'0' + (mag % 10) as u8;
        len += 1;
        Ok(len)
    }
}

/// Encoder for the PostgreSQL text types.
///
/// Delegates to the generic string coercion and hands the materialized
/// bytes straight back; there is never a second pass.
pub struct StringEncoder;

impl Encode for StringEncoder {
    fn measure(&self, value: &Value) -> Result<Plan, EncodeError> {
        Ok(Plan::Materialized(value.to_text().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;

    fn text(coder: &dyn Encode, value: &Value) -> String {
        String::from_utf8(encode(coder, value).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn test_boolean_mapping() {
        let enc = BooleanEncoder::new();
        assert_eq!(text(&enc, &Value::Bool(false)), "f");
        assert_eq!(text(&enc, &Value::Bool(true)), "t");
        assert_eq!(text(&enc, &Value::Int(0)), "f");
        assert_eq!(text(&enc, &Value::Int(-3)), "t");
        assert_eq!(text(&enc, &Value::Float(0.0)), "f");
        assert_eq!(text(&enc, &Value::Float(0.5)), "t");
        for token in ["0", "f", "F", "false", "FALSE", "off", "OFF"] {
            assert_eq!(text(&enc, &Value::from(token)), "f");
        }
        // Case-sensitive membership; everything else is true.
        assert_eq!(text(&enc, &Value::from("False")), "t");
        assert_eq!(text(&enc, &Value::from("")), "t");
        assert_eq!(text(&enc, &Value::from("anything-else")), "t");
        assert_eq!(text(&enc, &Value::Null), "t");
    }

    #[test]
    fn test_integer_basic() {
        assert_eq!(text(&IntegerEncoder, &Value::Int(0)), "0");
        assert_eq!(text(&IntegerEncoder, &Value::Int(-5)), "-5");
        assert_eq!(text(&IntegerEncoder, &Value::Int(1234567890)), "1234567890");
    }

    #[test]
    fn test_integer_digit_tiers() {
        // Every boundary of the tier table, both sides.
        let mut p = 1i64;
        for digits in 1..=14usize {
            assert_eq!(text(&IntegerEncoder, &Value::Int(p)).len(), digits);
            assert_eq!(text(&IntegerEncoder, &Value::Int(-p)).len(), digits + 1);
            let top = p.checked_mul(10).unwrap() - 1;
            assert_eq!(text(&IntegerEncoder, &Value::Int(top)).len(), digits);
            p *= 10;
        }
    }

    #[test]
    fn test_integer_string_fallback() {
        // 10^14 and wider leave the tier table.
        let plan = IntegerEncoder
            .measure(&Value::Int(100_000_000_000_000))
            .unwrap();
        assert!(matches!(plan, Plan::Materialized(_)));
        assert_eq!(
            text(&IntegerEncoder, &Value::Int(100_000_000_000_000)),
            "100000000000000"
        );
        assert_eq!(
            text(&IntegerEncoder, &Value::Int(i64::MIN)),
            "-9223372036854775808"
        );
        assert_eq!(
            text(&IntegerEncoder, &Value::Int(i64::MAX)),
            "9223372036854775807"
        );
    }

    #[test]
    fn test_integer_coercions() {
        assert_eq!(text(&IntegerEncoder, &Value::Float(7.9)), "7");
        assert_eq!(text(&IntegerEncoder, &Value::from("42")), "42");
        assert!(IntegerEncoder.measure(&Value::Bool(true)).is_err());
        assert!(IntegerEncoder.measure(&Value::Null).is_err());
    }

    #[test]
    fn test_integer_roundtrip() {
        for n in [
            0,
            1,
            -1,
            42,
            -42,
            9_999_999,
            -10_000_000,
            99_999_999_999_999,
            -99_999_999_999_999,
            i64::MIN,
            i64::MAX,
        ] {
            let encoded = text(&IntegerEncoder, &Value::Int(n));
            assert_eq!(encoded.parse::<i64>().unwrap(), n);
        }
    }

    #[test]
    fn test_float_specials() {
        assert_eq!(text(&FloatEncoder, &Value::Float(f64::INFINITY)), "Infinity");
        assert_eq!(
            text(&FloatEncoder, &Value::Float(f64::NEG_INFINITY)),
            "-Infinity"
        );
        assert_eq!(text(&FloatEncoder, &Value::Float(f64::NAN)), "NaN");
    }

    #[test]
    fn test_float_format() {
        assert_eq!(
            text(&FloatEncoder, &Value::Float(0.0)),
            "0.0000000000000000E+00"
        );
        assert_eq!(
            text(&FloatEncoder, &Value::Float(1.0)),
            "1.0000000000000000E+00"
        );
        assert_eq!(
            text(&FloatEncoder, &Value::Float(-0.0625)),
            "-6.2500000000000000E-02"
        );
        assert_eq!(
            text(&FloatEncoder, &Value::Float(1e300)),
            "1.0000000000000000E+300"
        );
    }

    #[test]
    fn test_float_roundtrip() {
        for x in [
            0.0,
            -0.0,
            1.5,
            -2.25,
            3.141592653589793,
            1e-300,
            -1e300,
            f64::MAX,
            f64::MIN,
            f64::MIN_POSITIVE,
        ] {
            let encoded = text(&FloatEncoder, &Value::Float(x));
            assert!(encoded.len() <= FLOAT_TEXT_MAX);
            assert_eq!(encoded.parse::<f64>().unwrap(), x);
        }
    }

    #[test]
    fn test_float_rejects_non_numeric() {
        let mut out = [0u8; FLOAT_TEXT_MAX];
        let err = FloatEncoder
            .write(&Value::from("1.5"), &mut out, None)
            .unwrap_err();
        assert!(matches!(err, EncodeError::Coerce { .. }));
    }

    #[test]
    fn test_string_materializes() {
        let plan = StringEncoder.measure(&Value::from("hello")).unwrap();
        assert_eq!(plan, Plan::Materialized(b"hello".to_vec()));
        assert_eq!(text(&StringEncoder, &Value::Int(12)), "12");
        assert_eq!(text(&StringEncoder, &Value::Null), "");
    }
}
