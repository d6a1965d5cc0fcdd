//! Error taxonomy for parsing and writing records.
//!
//! Every failure is one of the variants below. The engine wraps errors in
//! [`Error::At`] with a `record.field` path as they propagate, so callers
//! match on [`Error::root_cause`] to discriminate the failure kind.

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A read went past the end of the stream.
    #[error("unexpected end of stream: needed {needed} more byte(s), {available} available")]
    StreamExhausted { needed: usize, available: usize },

    /// The terminator was absent from a bounded region.
    #[error("terminator {terminator:?} not found in {searched} byte(s)")]
    TerminatorNotFound { terminator: Vec<u8>, searched: usize },

    /// Fixed magic bytes did not match.
    #[error("magic mismatch: expected {expected:?}, found {found:?}")]
    MagicMismatch { expected: Vec<u8>, found: Vec<u8> },

    /// Byte-oriented access while the bit cursor is mid-byte.
    #[error("byte access with {bits} bit(s) consumed of the current byte")]
    MisalignedBits { bits: u8 },

    /// A value longer than its declared width, in strict mode.
    #[error("value is {actual} byte(s), longer than the declared {declared}")]
    WriteOverflow { declared: usize, actual: usize },

    /// A value shorter than its declared width that cannot be padded, in
    /// strict mode.
    #[error("value is {actual} byte(s), shorter than the declared {declared}")]
    WriteUnderflow { declared: usize, actual: usize },

    /// A numeric value that does not fit the declared width or signedness.
    #[error("value {value} does not fit in {bits} bit(s)")]
    Overflow { value: i128, bits: u32 },

    /// An array bounded by a byte length did not consume it exactly.
    #[error("{remaining} byte(s) left over after the last array element")]
    TrailingBytes { remaining: usize },

    /// No switch case matched and no fallback was declared.
    #[error("no case matches switch value {value:?} and no fallback is set")]
    SwitchNoMatch { value: Value },

    /// An integer with no corresponding enumeration member.
    #[error("value {value} is not a member of the enumeration")]
    EnumNotFound { value: u64 },

    /// Text could not be decoded or encoded.
    #[error("invalid {encoding} data: {detail}")]
    Encoding {
        encoding: &'static str,
        detail: String,
    },

    /// Schema misconfiguration detected at construction, parse, or write
    /// time.
    #[error("{0}")]
    Config(String),

    /// A sibling reference to a field that is absent from the context.
    #[error("field {name:?} is not available in this context")]
    UnknownField { name: String },

    /// A failure wrapped with the `record.field` path it surfaced from.
    #[error("{path}: {source}")]
    At { path: String, source: Box<Error> },
}

impl Error {
    /// Wraps the error with a path segment, merging into an existing path.
    pub(crate) fn at(self, segment: &str) -> Error {
        match self {
            Error::At { path, source } => Error::At {
                path: format!("{segment}.{path}"),
                source,
            },
            other => Error::At {
                path: segment.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying failure with any path wrapping removed.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::At { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_merges_path_segments() {
        let err = Error::StreamExhausted {
            needed: 1,
            available: 0,
        };
        let wrapped = err.clone().at("inner.value").at("outer.child");

        assert_eq!(
            wrapped.to_string(),
            "outer.child.inner.value: unexpected end of stream: needed 1 more byte(s), 0 available"
        );
        assert_eq!(wrapped.root_cause(), &err);
    }

    #[test]
    fn test_root_cause_of_unwrapped_error() {
        let err = Error::Overflow { value: 256, bits: 8 };
        assert_eq!(err.root_cause(), &err);
    }
}
