//! Canonical Tree Codec
//!
//! Encodes and decodes the variant settings tree to and from its compact
//! binary representation. Dictionary keys are always emitted in ascending
//! byte order, so encoding is a pure function of logical content: two trees
//! that compare equal produce identical bytes.

pub mod decode;
pub mod encode;
pub mod value;

pub use decode::{decode, decode_with_limits, DecodeLimits};
pub use encode::{encode, encode_into};
pub use value::{Dict, Value};
