//! Composite encoders: quoting, recursion and transformation around an
//! element encoder.
//!
//! The shared machinery is [`quote_elem`]: run phase 1 on the element
//! encoder, land the raw bytes at the end of the output buffer (either by
//! copying a materialized result or by running phase 2 there), then let the
//! quoting function rewrite them in place. Growing by the worst case first
//! and truncating after keeps it to one buffer operation per element.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::BytesMut;

use crate::error::EncodeError;
use crate::value::Value;

use super::quote::{QuoteFn, quote_array_elem, quote_identifier, quote_literal};
use super::scalar::StringEncoder;
use super::{Cached, Encode, Plan, grow};

/// Hard cap on array nesting. Recursion depth tracks the input's own
/// structure, so a bound keeps hostile input from exhausting the call stack.
pub const MAX_ARRAY_DEPTH: usize = 64;

/// Measure-then-write one element into `buf`, quoting per `quote_fn` when
/// `with_quote` is set.
fn quote_elem(
    elem: &dyn Encode,
    value: &Value,
    buf: &mut BytesMut,
    with_quote: bool,
    quote_fn: QuoteFn,
    delimiter: u8,
) -> Result<(), EncodeError> {
    match elem.measure(value)? {
        Plan::Materialized(bytes) => {
            if with_quote {
                let len = bytes.len();
                let start = grow(buf, 2 * len + 2);
                buf[start..start + len].copy_from_slice(&bytes);
                let quoted = quote_fn(&mut buf[start..], len, delimiter);
                buf.truncate(start + quoted);
            } else {
                buf.extend_from_slice(&bytes);
            }
        }
        Plan::Sized { bound, cached } => {
            let extra = if with_quote { 2 * bound + 2 } else { bound };
            let start = grow(buf, extra);
            let len = elem.write(value, &mut buf[start..], cached)?;
            if len > bound {
                return Err(EncodeError::Contract("write exceeded the measured bound"));
            }
            let total = if with_quote {
                quote_fn(&mut buf[start..], len, delimiter)
            } else {
                len
            };
            buf.truncate(start + total);
        }
    }
    Ok(())
}

/// Encoder for PostgreSQL array types.
///
/// Elements are encoded by the configured element encoder and quoted per
/// the array-literal rules; sub-arrays recurse, `NULL` elements are written
/// bare. The delimiter is `,` unless configured otherwise (`;` for the
/// geometric types).
pub struct ArrayEncoder {
    elem: Arc<dyn Encode>,
    delimiter: u8,
    needs_quotation: bool,
}

impl ArrayEncoder {
    pub fn new(elem: Arc<dyn Encode>) -> Self {
        Self {
            elem,
            delimiter: b',',
            needs_quotation: true,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn without_quotation(mut self) -> Self {
        self.needs_quotation = false;
        self
    }

    fn write_array(&self, value: &Value, buf: &mut BytesMut, depth: usize) -> Result<(), EncodeError> {
        let Value::Array(items) = value else {
            return Err(EncodeError::ExpectedArray(value.kind()));
        };
        if depth >= MAX_ARRAY_DEPTH {
            return Err(EncodeError::TooDeep {
                limit: MAX_ARRAY_DEPTH,
            });
        }

        buf.extend_from_slice(b"{");
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                buf.extend_from_slice(&[self.delimiter]);
            }
            match item {
                Value::Array(_) => self.write_array(item, buf, depth + 1)?,
                Value::Null => buf.extend_from_slice(b"NULL"),
                _ => quote_elem(
                    self.elem.as_ref(),
                    item,
                    buf,
                    self.needs_quotation,
                    quote_array_elem,
                    self.delimiter,
                )?,
            }
        }
        buf.extend_from_slice(b"}");
        Ok(())
    }
}

impl Default for ArrayEncoder {
    fn default() -> Self {
        Self::new(Arc::new(StringEncoder))
    }
}

impl Encode for ArrayEncoder {
    fn measure(&self, value: &Value) -> Result<Plan, EncodeError> {
        let mut out = BytesMut::new();
        self.write_array(value, &mut out, 0)?;
        Ok(Plan::Materialized(out.to_vec()))
    }
}

/// Encoder for PostgreSQL identifiers.
///
/// An array value becomes a qualified name: each segment quoted, joined
/// with `.`. A single value is quoted directly.
pub struct IdentifierEncoder {
    elem: Arc<dyn Encode>,
    needs_quotation: bool,
}

impl IdentifierEncoder {
    pub fn new(elem: Arc<dyn Encode>) -> Self {
        Self {
            elem,
            needs_quotation: true,
        }
    }

    pub fn without_quotation(mut self) -> Self {
        self.needs_quotation = false;
        self
    }
}

impl Default for IdentifierEncoder {
    fn default() -> Self {
        Self::new(Arc::new(StringEncoder))
    }
}

impl Encode for IdentifierEncoder {
    fn measure(&self, value: &Value) -> Result<Plan, EncodeError> {
        let mut out = BytesMut::new();
        match value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.extend_from_slice(b".");
                    }
                    quote_elem(
                        self.elem.as_ref(),
                        item,
                        &mut out,
                        self.needs_quotation,
                        quote_identifier,
                        0,
                    )?;
                }
            }
            single => quote_elem(
                self.elem.as_ref(),
                single,
                &mut out,
                self.needs_quotation,
                quote_identifier,
                0,
            )?,
        }
        Ok(Plan::Materialized(out.to_vec()))
    }
}

/// Encoder for single-quoted SQL literals.
pub struct QuotedLiteralEncoder {
    elem: Arc<dyn Encode>,
    needs_quotation: bool,
}

impl QuotedLiteralEncoder {
    pub fn new(elem: Arc<dyn Encode>) -> Self {
        Self {
            elem,
            needs_quotation: true,
        }
    }
}

impl Default for QuotedLiteralEncoder {
    fn default() -> Self {
        Self::new(Arc::new(StringEncoder))
    }
}

impl Encode for QuotedLiteralEncoder {
    fn measure(&self, value: &Value) -> Result<Plan, EncodeError> {
        let mut out = BytesMut::new();
        quote_elem(
            self.elem.as_ref(),
            value,
            &mut out,
            self.needs_quotation,
            quote_literal,
            0,
        )?;
        Ok(Plan::Materialized(out.to_vec()))
    }
}

/// Encoder that base64-transcodes the output of its element encoder.
///
/// Standard alphabet, `=` padding, no line breaks. Output length is always
/// `4 * ceil(n / 3)`.
pub struct Base64Encoder {
    elem: Arc<dyn Encode>,
}

impl Base64Encoder {
    pub fn new(elem: Arc<dyn Encode>) -> Self {
        Self { elem }
    }
}

impl Default for Base64Encoder {
    fn default() -> Self {
        Self::new(Arc::new(StringEncoder))
    }
}

fn base64_bound(raw: usize) -> Result<usize, EncodeError> {
    base64::encoded_len(raw, true).ok_or(EncodeError::Contract("base64 length overflow"))
}

impl Encode for Base64Encoder {
    fn measure(&self, value: &Value) -> Result<Plan, EncodeError> {
        match self.elem.measure(value)? {
            Plan::Materialized(bytes) => Ok(Plan::Materialized(BASE64.encode(&bytes).into_bytes())),
            Plan::Sized { bound, cached } => Ok(Plan::Sized {
                bound: base64_bound(bound)?,
                cached,
            }),
        }
    }

    fn write(
        &self,
        value: &Value,
        out: &mut [u8],
        cached: Option<Cached>,
    ) -> Result<usize, EncodeError> {
        // The transcode expands by 4/3, so the inner bytes always fit in a
        // scratch of the output's size. encode_slice cannot alias its
        // buffers, which rules out transcoding in place.
        let mut scratch = vec![0u8; out.len()];
        let raw = self.elem.write(value, &mut scratch, cached)?;
        BASE64
            .encode_slice(&scratch[..raw], out)
            .map_err(|_| EncodeError::Contract("base64 output undersized"))
    }
}
