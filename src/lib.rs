//! PostgreSQL text-format encoders.
//!
//! Converts application values into the exact literal syntax a
//! PostgreSQL-compatible server accepts: `t`/`f` booleans, decimal
//! integers, round-trippable floats, `{...}` arrays, `"a"."b"` qualified
//! identifiers, `'...'` literals and base64-wrapped binary.
//!
//! Pure, synchronous computation - no I/O, no async. Encoders are built
//! once and safely shared across threads.
//!
//! ```
//! use pgtext::{encode, registry, Value};
//!
//! let coder = registry::lookup("Array").unwrap();
//! let value = Value::Array(vec![Value::from("a,b"), Value::Null]);
//! let bytes = encode(coder.as_ref(), &value).unwrap();
//! assert_eq!(&bytes[..], b"{\"a,b\",NULL}");
//! ```

pub mod encoder;
pub mod error;
pub mod registry;
pub mod value;

pub use encoder::{
    ArrayEncoder, Base64Encoder, BooleanEncoder, Cached, Encode, FloatEncoder, IdentifierEncoder,
    IntegerEncoder, Plan, QuotedLiteralEncoder, StringEncoder, encode, encode_to,
    MAX_ARRAY_DEPTH,
};
pub use error::{EncodeError, EncodeResult};
pub use value::Value;
