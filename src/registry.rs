//! Built-in coder registry.
//!
//! Every encoder the crate ships enters the system here, under its
//! PostgreSQL-facing name and with its default configuration. Composite
//! defaults: string element encoder, `,` delimiter, quoting enabled.

use std::sync::Arc;

use crate::encoder::{
    ArrayEncoder, Base64Encoder, BooleanEncoder, Encode, FloatEncoder, IdentifierEncoder,
    IntegerEncoder, QuotedLiteralEncoder, StringEncoder,
};

/// PostgreSQL type OIDs the built-in text encoders bind to.
///
/// Reference: https://github.com/postgres/postgres/blob/master/src/include/catalog/pg_type.dat
pub mod oid {
    pub const BOOL: u32 = 16;
    pub const BYTEA: u32 = 17;
    pub const INT8: u32 = 20;
    pub const TEXT: u32 = 25;
    pub const FLOAT8: u32 = 701;
    pub const TEXT_ARRAY: u32 = 1009;
}

/// A registered coder: name, bound type OID (0 = untyped), and a factory
/// producing the default configuration.
pub struct CoderSpec {
    pub name: &'static str,
    pub oid: u32,
    factory: fn() -> Arc<dyn Encode>,
}

impl CoderSpec {
    /// Build a fresh coder in this entry's default configuration.
    pub fn instantiate(&self) -> Arc<dyn Encode> {
        (self.factory)()
    }
}

fn boolean() -> Arc<dyn Encode> {
    Arc::new(BooleanEncoder::new())
}

fn integer() -> Arc<dyn Encode> {
    Arc::new(IntegerEncoder)
}

fn float() -> Arc<dyn Encode> {
    Arc::new(FloatEncoder)
}

fn string() -> Arc<dyn Encode> {
    Arc::new(StringEncoder)
}

fn array() -> Arc<dyn Encode> {
    Arc::new(ArrayEncoder::default())
}

fn identifier() -> Arc<dyn Encode> {
    Arc::new(IdentifierEncoder::default())
}

fn quoted_literal() -> Arc<dyn Encode> {
    Arc::new(QuotedLiteralEncoder::default())
}

fn to_base64() -> Arc<dyn Encode> {
    Arc::new(Base64Encoder::default())
}

/// The built-in text encoders, in registration order.
pub static BUILTIN_CODERS: &[CoderSpec] = &[
    CoderSpec { name: "Boolean", oid: oid::BOOL, factory: boolean },
    CoderSpec { name: "Integer", oid: oid::INT8, factory: integer },
    CoderSpec { name: "Float", oid: oid::FLOAT8, factory: float },
    CoderSpec { name: "String", oid: oid::TEXT, factory: string },
    CoderSpec { name: "Array", oid: oid::TEXT_ARRAY, factory: array },
    CoderSpec { name: "Identifier", oid: 0, factory: identifier },
    CoderSpec { name: "QuotedLiteral", oid: 0, factory: quoted_literal },
    CoderSpec { name: "ToBase64", oid: oid::BYTEA, factory: to_base64 },
];

/// Look up a built-in encoder by name and build its default configuration.
pub fn lookup(name: &str) -> Option<Arc<dyn Encode>> {
    BUILTIN_CODERS
        .iter()
        .find(|spec| spec.name == name)
        .map(CoderSpec::instantiate)
}
