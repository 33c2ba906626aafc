//! Text-format encoders (Layer: pure, sync).
//!
//! No async, no I/O - just value → literal bytes computation.
//!
//! Every encoder implements the two-phase [`Encode`] contract:
//!
//! 1. [`Encode::measure`] either returns an upper bound on the output size
//!    (optionally caching a coercion for reuse), or short-circuits with the
//!    fully materialized bytes.
//! 2. [`Encode::write`] runs only for the sized case, writing into a buffer
//!    of at least the measured bound and returning the exact length.
//!
//! The split lets callers size the destination once - no speculative
//! allocation, no post-hoc shrinking - while encoders that must materialize
//! anyway (strings, arrays) skip the second pass entirely.

mod buffer;
mod composite;
mod quote;
mod scalar;

pub use composite::{
    ArrayEncoder, Base64Encoder, IdentifierEncoder, QuotedLiteralEncoder, MAX_ARRAY_DEPTH,
};
pub use scalar::{BooleanEncoder, FloatEncoder, IntegerEncoder, StringEncoder, FLOAT_TEXT_MAX};

pub(crate) use buffer::grow;

use bytes::BytesMut;

use crate::error::EncodeError;
use crate::value::Value;

/// Coerced data carried from phase 1 to phase 2 to avoid recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cached {
    /// An integral coercion already performed by `measure`.
    Int(i64),
}

/// Result of the measuring pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Phase 2 must run; `bound` bytes of output are sufficient.
    Sized {
        bound: usize,
        cached: Option<Cached>,
    },
    /// Final bytes, to be copied verbatim. Phase 2 never runs.
    Materialized(Vec<u8>),
}

impl Plan {
    /// Sized plan with nothing cached.
    pub(crate) fn sized(bound: usize) -> Self {
        Plan::Sized {
            bound,
            cached: None,
        }
    }
}

/// The two-phase encode contract.
///
/// Implementations are immutable after construction and safe to share
/// across threads; composite encoders hold their element encoder behind an
/// `Arc` for exactly that reason.
pub trait Encode: Send + Sync {
    /// Phase 1: measure the output, or materialize it outright.
    fn measure(&self, value: &Value) -> Result<Plan, EncodeError>;

    /// Phase 2: write the final bytes into `out` and return the length.
    ///
    /// `out` is at least as large as the bound returned by [`measure`];
    /// `cached` is whatever phase 1 stashed. Encoders that always
    /// materialize never reach this.
    ///
    /// [`measure`]: Encode::measure
    fn write(
        &self,
        _value: &Value,
        _out: &mut [u8],
        _cached: Option<Cached>,
    ) -> Result<usize, EncodeError> {
        Err(EncodeError::Contract(
            "phase 2 invoked on an always-materializing encoder",
        ))
    }
}

/// Run the full contract against `coder`, appending the text to `buf`.
///
/// Returns the number of bytes appended. The buffer's prior contents are
/// preserved.
pub fn encode_to(
    coder: &dyn Encode,
    value: &Value,
    buf: &mut BytesMut,
) -> Result<usize, EncodeError> {
    match coder.measure(value)? {
        Plan::Materialized(bytes) => {
            buf.extend_from_slice(&bytes);
            Ok(bytes.len())
        }
        Plan::Sized { bound, cached } => {
            let start = grow(buf, bound);
            let written = coder.write(value, &mut buf[start..], cached)?;
            if written > bound {
                return Err(EncodeError::Contract("write exceeded the measured bound"));
            }
            buf.truncate(start + written);
            Ok(written)
        }
    }
}

/// Encode into a fresh buffer.
pub fn encode(coder: &dyn Encode, value: &Value) -> Result<BytesMut, EncodeError> {
    let mut buf = BytesMut::new();
    encode_to(coder, value, &mut buf)?;
    Ok(buf)
}
