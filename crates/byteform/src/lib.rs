//! # byteform
//!
//! Declarative parsing and writing of binary record layouts.
//!
//! Describe a record as an ordered list of named fields, then parse byte
//! slices into structured values and write values back byte-exactly. Fields
//! reference sibling values for lengths, counts, conditions, and switch
//! keys; length and count fields populate themselves on write. Sub-byte
//! fields cursor the stream at the bit level.
//!
//! ## Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use byteform::bytes::BytesField;
//! use byteform::field::Field;
//! use byteform::numeric::{Format, ScalarField};
//! use byteform::record::{Member, Record};
//! use byteform::value::Value;
//!
//! let record = Record::new(
//!     "packet",
//!     vec![
//!         Member::new("len", Field::Scalar(ScalarField::new(Format::UByte))),
//!         Member::new("body", Field::Bytes(BytesField::fixed("len"))),
//!     ],
//! )
//! .unwrap();
//!
//! let (values, consumed) = record.parse(b"\x03abc").unwrap();
//! assert_eq!(consumed, 4);
//! assert_eq!(values.get("body"), Some(&Value::Bytes(b"abc".to_vec())));
//!
//! // the length field fills itself in on write
//! let mut out = BTreeMap::new();
//! out.insert("body".to_string(), Value::Bytes(b"hello".to_vec()));
//! assert_eq!(record.to_bytes(&out).unwrap(), b"\x05hello");
//! ```

pub mod bytes;
pub mod compose;
pub mod context;
pub mod errors;
pub mod expr;
pub mod field;
pub mod numeric;
pub mod record;
#[cfg(feature = "serde")]
pub mod serde;
pub mod stream;
pub mod value;
