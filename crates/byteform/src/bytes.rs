//! Byte-sequence fields: magic sentinels, raw bytes, and encoded text.

use crate::context::ParsingContext;
use crate::errors::Error;
use crate::expr::Expr;
use crate::stream::{BitReader, BitWriter};
use crate::value::Value;

/// A fixed byte sequence required at its position in the record.
#[derive(Debug, Clone)]
pub struct MagicField {
    pub value: Vec<u8>,
    pub strict: bool,
}

impl MagicField {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            strict: true,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.value.is_empty() {
            return Err(Error::Config("magic bytes must not be empty".to_string()));
        }
        Ok(())
    }

    pub(crate) fn parse(&self, reader: &mut BitReader<'_>) -> Result<Value, Error> {
        let found = reader.read_bytes(self.value.len())?;
        if found != self.value {
            return Err(Error::MagicMismatch {
                expected: self.value.clone(),
                found: found.to_vec(),
            });
        }
        Ok(Value::Bytes(found.to_vec()))
    }

    /// Emits the magic bytes regardless of the supplied value; in strict
    /// mode a supplied byte value must equal them.
    pub(crate) fn write(&self, writer: &mut BitWriter, value: &Value) -> Result<(), Error> {
        if self.strict {
            if let Value::Bytes(bytes) = value {
                if bytes != &self.value {
                    return Err(Error::MagicMismatch {
                        expected: self.value.clone(),
                        found: bytes.clone(),
                    });
                }
            }
        }
        writer.write_bytes(&self.value)
    }
}

/// Raw bytes bounded by a length, a terminator, or both.
///
/// With only `length`, exactly that many bytes are read (negative means
/// read-to-end) and trailing `padding` repetitions are stripped. With only
/// `terminator`, the stream is scanned in `step`-byte chunks. With both, the
/// terminator is searched inside the fixed-length region.
#[derive(Debug, Clone)]
pub struct BytesField {
    pub length: Option<Expr<i64>>,
    pub terminator: Option<Vec<u8>>,
    pub step: usize,
    pub padding: Option<Vec<u8>>,
    pub strict: bool,
}

impl Default for BytesField {
    fn default() -> Self {
        Self {
            length: None,
            terminator: None,
            step: 1,
            padding: None,
            strict: true,
        }
    }
}

impl BytesField {
    /// Length-only specialization.
    pub fn fixed(length: impl Into<Expr<i64>>) -> Self {
        Self {
            length: Some(length.into()),
            ..Default::default()
        }
    }

    /// Terminator-only specialization.
    pub fn terminated(terminator: impl Into<Vec<u8>>) -> Self {
        Self {
            terminator: Some(terminator.into()),
            ..Default::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.length.is_none() && self.terminator.is_none() {
            return Err(Error::Config(
                "bytes field needs a length or a terminator".to_string(),
            ));
        }
        if self.step == 0 {
            return Err(Error::Config("step must be at least 1".to_string()));
        }
        if let Some(terminator) = &self.terminator {
            if terminator.is_empty() {
                return Err(Error::Config("terminator must not be empty".to_string()));
            }
        }
        if let Some(padding) = &self.padding {
            if padding.is_empty() {
                return Err(Error::Config("padding must not be empty".to_string()));
            }
        }
        Ok(())
    }

    pub(crate) fn parse(
        &self,
        reader: &mut BitReader<'_>,
        ctx: &ParsingContext<'_>,
    ) -> Result<Value, Error> {
        let raw = match (&self.length, &self.terminator) {
            (Some(length), None) => {
                let mut out = self.read_region(reader, length, ctx)?.to_vec();
                if let Some(padding) = &self.padding {
                    strip_padding(&mut out, padding);
                }
                out
            }
            (None, Some(terminator)) => match reader.read_until(terminator, self.step) {
                Ok(bytes) => bytes.to_vec(),
                Err(err) => {
                    if self.strict || !matches!(err, Error::StreamExhausted { .. }) {
                        return Err(err);
                    }
                    reader.read_to_end()?.to_vec()
                }
            },
            (Some(length), Some(terminator)) => {
                let region = self.read_region(reader, length, ctx)?;
                match find_terminated(region, terminator, self.step) {
                    Some(content) => content.to_vec(),
                    None if self.strict => {
                        return Err(Error::TerminatorNotFound {
                            terminator: terminator.clone(),
                            searched: region.len(),
                        })
                    }
                    None => region.to_vec(),
                }
            }
            (None, None) => {
                return Err(Error::Config(
                    "bytes field needs a length or a terminator".to_string(),
                ))
            }
        };
        Ok(Value::Bytes(raw))
    }

    fn read_region<'a>(
        &self,
        reader: &mut BitReader<'a>,
        length: &Expr<i64>,
        ctx: &ParsingContext<'_>,
    ) -> Result<&'a [u8], Error> {
        let n = length.resolve(ctx)?;
        if n < 0 {
            reader.read_to_end()
        } else {
            reader.read_bytes(n as usize)
        }
    }

    pub(crate) fn write(
        &self,
        writer: &mut BitWriter,
        ctx: &ParsingContext<'_>,
        value: &Value,
    ) -> Result<(), Error> {
        let bytes = match value {
            Value::Bytes(b) => b.as_slice(),
            other => {
                return Err(Error::Config(format!(
                    "expected a bytes value, got {}",
                    other.type_name()
                )))
            }
        };

        match (&self.length, &self.terminator) {
            (Some(length), None) => {
                let n = length.resolve(ctx)?;
                if n < 0 {
                    return writer.write_bytes(bytes);
                }
                self.write_fixed(writer, bytes, n as usize)
            }
            (None, Some(terminator)) => {
                writer.write_bytes(bytes)?;
                writer.write_bytes(terminator)?;
                if let Some(padding) = &self.padding {
                    let total = bytes.len() + terminator.len();
                    let short = total % self.step;
                    if short != 0 {
                        writer.write_bytes(&repeat_padding(padding, self.step - short))?;
                    }
                }
                Ok(())
            }
            (Some(length), Some(terminator)) => {
                let n = length.resolve(ctx)?;
                if n < 0 {
                    writer.write_bytes(bytes)?;
                    return writer.write_bytes(terminator);
                }
                let n = n as usize;
                let total = bytes.len() + terminator.len();
                if total > n {
                    if self.strict {
                        return Err(Error::WriteOverflow {
                            declared: n,
                            actual: total,
                        });
                    }
                    writer.write_bytes(bytes)?;
                    return writer.write_bytes(terminator);
                }
                writer.write_bytes(bytes)?;
                writer.write_bytes(terminator)?;
                let remaining = n - total;
                if remaining > 0 {
                    match &self.padding {
                        Some(padding) => {
                            writer.write_bytes(&repeat_padding(padding, remaining))?
                        }
                        None if self.strict => {
                            return Err(Error::WriteUnderflow {
                                declared: n,
                                actual: total,
                            })
                        }
                        None => writer.write_bytes(&vec![0; remaining])?,
                    }
                }
                Ok(())
            }
            (None, None) => Err(Error::Config(
                "bytes field needs a length or a terminator".to_string(),
            )),
        }
    }

    fn write_fixed(
        &self,
        writer: &mut BitWriter,
        bytes: &[u8],
        declared: usize,
    ) -> Result<(), Error> {
        if bytes.len() == declared {
            return writer.write_bytes(bytes);
        }
        if bytes.len() > declared {
            if self.strict {
                return Err(Error::WriteOverflow {
                    declared,
                    actual: bytes.len(),
                });
            }
            return writer.write_bytes(bytes);
        }
        let missing = declared - bytes.len();
        match &self.padding {
            Some(padding) => {
                if self.strict && missing % padding.len() != 0 {
                    return Err(Error::WriteUnderflow {
                        declared,
                        actual: bytes.len(),
                    });
                }
                writer.write_bytes(bytes)?;
                writer.write_bytes(&repeat_padding(padding, missing))
            }
            None if self.strict => Err(Error::WriteUnderflow {
                declared,
                actual: bytes.len(),
            }),
            None => writer.write_bytes(bytes),
        }
    }
}

/// Strips whole trailing repetitions of `padding`.
fn strip_padding(out: &mut Vec<u8>, padding: &[u8]) {
    while out.len() >= padding.len() && out.ends_with(padding) {
        out.truncate(out.len() - padding.len());
    }
}

/// `count` bytes of `padding` repeated, truncated to fit.
fn repeat_padding(padding: &[u8], count: usize) -> Vec<u8> {
    padding.iter().cycle().take(count).copied().collect()
}

/// Searches `region` for `terminator` ending at a multiple of `step` from
/// the start, mirroring the streaming scan. Returns the content before it.
fn find_terminated<'a>(region: &'a [u8], terminator: &[u8], step: usize) -> Option<&'a [u8]> {
    let mut scanned = step;
    while scanned <= region.len() {
        let prefix = &region[..scanned];
        if prefix.len() >= terminator.len() && prefix.ends_with(terminator) {
            return Some(&prefix[..prefix.len() - terminator.len()]);
        }
        scanned += step;
    }
    None
}

/// Text encoding for [`TextField`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Ascii,
    Latin1,
}

impl Encoding {
    fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin-1",
        }
    }
}

/// How text that cannot be represented in the encoding is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    /// Fail with an encoding error.
    Strict,
    /// Substitute a replacement character or byte.
    Replace,
    /// Drop the offending input.
    Ignore,
}

/// A string field: a [`BytesField`] with a text encoding applied after
/// reading and before writing.
#[derive(Debug, Clone)]
pub struct TextField {
    pub inner: BytesField,
    /// Unset means the record-level encoding, falling back to UTF-8.
    pub encoding: Option<Encoding>,
    pub on_error: OnError,
}

impl TextField {
    pub fn new(inner: BytesField) -> Self {
        Self {
            inner,
            encoding: None,
            on_error: OnError::Strict,
        }
    }

    /// Length-only specialization.
    pub fn fixed(length: impl Into<Expr<i64>>) -> Self {
        Self::new(BytesField::fixed(length))
    }

    /// Terminator-only specialization.
    pub fn terminated(terminator: impl Into<Vec<u8>>) -> Self {
        Self::new(BytesField::terminated(terminator))
    }

    fn effective_encoding(&self) -> Encoding {
        self.encoding.unwrap_or(Encoding::Utf8)
    }

    pub(crate) fn parse(
        &self,
        reader: &mut BitReader<'_>,
        ctx: &ParsingContext<'_>,
    ) -> Result<Value, Error> {
        let raw = match self.inner.parse(reader, ctx)? {
            Value::Bytes(raw) => raw,
            other => return Ok(other),
        };
        Ok(Value::String(decode(
            self.effective_encoding(),
            self.on_error,
            &raw,
        )?))
    }

    pub(crate) fn write(
        &self,
        writer: &mut BitWriter,
        ctx: &ParsingContext<'_>,
        value: &Value,
    ) -> Result<(), Error> {
        let raw = match value {
            Value::String(s) => encode(self.effective_encoding(), self.on_error, s)?,
            Value::Bytes(b) => b.clone(),
            other => {
                return Err(Error::Config(format!(
                    "expected a string value, got {}",
                    other.type_name()
                )))
            }
        };
        self.inner.write(writer, ctx, &Value::Bytes(raw))
    }
}

fn decode(encoding: Encoding, on_error: OnError, raw: &[u8]) -> Result<String, Error> {
    match encoding {
        Encoding::Utf8 => match std::str::from_utf8(raw) {
            Ok(s) => Ok(s.to_string()),
            Err(err) => match on_error {
                OnError::Strict => Err(Error::Encoding {
                    encoding: encoding.name(),
                    detail: err.to_string(),
                }),
                OnError::Replace => Ok(String::from_utf8_lossy(raw).into_owned()),
                OnError::Ignore => Ok(decode_utf8_dropping(raw)),
            },
        },
        Encoding::Ascii => {
            let mut out = String::with_capacity(raw.len());
            for &b in raw {
                if b < 0x80 {
                    out.push(b as char);
                    continue;
                }
                match on_error {
                    OnError::Strict => {
                        return Err(Error::Encoding {
                            encoding: encoding.name(),
                            detail: format!("byte 0x{b:02x} is not ascii"),
                        })
                    }
                    OnError::Replace => out.push('\u{FFFD}'),
                    OnError::Ignore => {}
                }
            }
            Ok(out)
        }
        Encoding::Latin1 => Ok(raw.iter().map(|&b| b as char).collect()),
    }
}

fn decode_utf8_dropping(mut raw: &[u8]) -> String {
    let mut out = String::new();
    loop {
        match std::str::from_utf8(raw) {
            Ok(s) => {
                out.push_str(s);
                return out;
            }
            Err(err) => {
                let valid = err.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&raw[..valid]));
                let skip = err.error_len().unwrap_or(raw.len() - valid);
                raw = &raw[valid + skip..];
            }
        }
    }
}

fn encode(encoding: Encoding, on_error: OnError, s: &str) -> Result<Vec<u8>, Error> {
    match encoding {
        Encoding::Utf8 => Ok(s.as_bytes().to_vec()),
        Encoding::Ascii | Encoding::Latin1 => {
            let limit = if encoding == Encoding::Ascii { 0x80 } else { 0x100 };
            let mut out = Vec::with_capacity(s.len());
            for c in s.chars() {
                let code = c as u32;
                if code < limit {
                    out.push(code as u8);
                    continue;
                }
                match on_error {
                    OnError::Strict => {
                        return Err(Error::Encoding {
                            encoding: encoding.name(),
                            detail: format!("character {c:?} is out of range"),
                        })
                    }
                    OnError::Replace => out.push(b'?'),
                    OnError::Ignore => {}
                }
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(field: &BytesField, data: &[u8]) -> Result<Value, Error> {
        let mut reader = BitReader::new(data);
        field.parse(&mut reader, &ParsingContext::new())
    }

    fn write(field: &BytesField, value: Value) -> Result<Vec<u8>, Error> {
        let mut writer = BitWriter::new();
        field.write(&mut writer, &ParsingContext::new(), &value)?;
        Ok(writer.into_bytes())
    }

    #[test]
    fn test_magic_parse() {
        let field = MagicField::new(*b"PNG");
        let mut reader = BitReader::new(b"PNGrest");
        assert_eq!(
            field.parse(&mut reader).unwrap(),
            Value::Bytes(b"PNG".to_vec())
        );
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn test_magic_mismatch() {
        let field = MagicField::new(*b"PNG");
        let mut reader = BitReader::new(b"JPG");
        assert!(matches!(
            field.parse(&mut reader).unwrap_err(),
            Error::MagicMismatch { .. }
        ));
    }

    #[test]
    fn test_magic_write_ignores_absent_value() {
        let field = MagicField::new(*b"OK");
        let mut writer = BitWriter::new();
        field.write(&mut writer, &Value::Absent).unwrap();
        assert_eq!(writer.into_bytes(), b"OK");
    }

    #[test]
    fn test_magic_write_rejects_other_bytes_when_strict() {
        let field = MagicField::new(*b"OK");
        let mut writer = BitWriter::new();
        assert!(matches!(
            field
                .write(&mut writer, &Value::Bytes(b"NO".to_vec()))
                .unwrap_err(),
            Error::MagicMismatch { .. }
        ));
    }

    #[test]
    fn test_fixed_parse() {
        let field = BytesField::fixed(3);
        assert_eq!(
            parse(&field, b"abcdef").unwrap(),
            Value::Bytes(b"abc".to_vec())
        );
    }

    #[test]
    fn test_fixed_parse_strips_padding() {
        let field = BytesField {
            padding: Some(vec![0]),
            ..BytesField::fixed(6)
        };
        assert_eq!(
            parse(&field, b"ab\0\0\0\0").unwrap(),
            Value::Bytes(b"ab".to_vec())
        );
    }

    #[test]
    fn test_fixed_parse_strips_whole_padding_units() {
        let field = BytesField {
            padding: Some(b"xy".to_vec()),
            ..BytesField::fixed(6)
        };
        assert_eq!(
            parse(&field, b"abxyxy").unwrap(),
            Value::Bytes(b"ab".to_vec())
        );
        assert_eq!(
            parse(&field, b"abyxy\0").unwrap(),
            Value::Bytes(b"abyxy\0".to_vec())
        );
    }

    #[test]
    fn test_negative_length_reads_to_end() {
        let field = BytesField::fixed(-1);
        assert_eq!(
            parse(&field, b"abcdef").unwrap(),
            Value::Bytes(b"abcdef".to_vec())
        );
    }

    #[test]
    fn test_fixed_write_pads() {
        let field = BytesField {
            padding: Some(vec![0]),
            ..BytesField::fixed(4)
        };
        assert_eq!(
            write(&field, Value::Bytes(b"ab".to_vec())).unwrap(),
            b"ab\0\0"
        );
    }

    #[test]
    fn test_fixed_write_underflow_without_padding() {
        let field = BytesField::fixed(4);
        assert_eq!(
            write(&field, Value::Bytes(b"ab".to_vec())).unwrap_err(),
            Error::WriteUnderflow {
                declared: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn test_fixed_write_underflow_with_misfitting_padding() {
        let field = BytesField {
            padding: Some(b"xy".to_vec()),
            ..BytesField::fixed(5)
        };
        assert_eq!(
            write(&field, Value::Bytes(b"ab".to_vec())).unwrap_err(),
            Error::WriteUnderflow {
                declared: 5,
                actual: 2
            }
        );
    }

    #[test]
    fn test_fixed_write_overflow() {
        let field = BytesField::fixed(2);
        assert_eq!(
            write(&field, Value::Bytes(b"abc".to_vec())).unwrap_err(),
            Error::WriteOverflow {
                declared: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_fixed_write_lax() {
        let field = BytesField {
            strict: false,
            ..BytesField::fixed(2)
        };
        assert_eq!(write(&field, Value::Bytes(b"abc".to_vec())).unwrap(), b"abc");
        assert_eq!(write(&field, Value::Bytes(b"a".to_vec())).unwrap(), b"a");
    }

    #[test]
    fn test_terminated_parse_and_write() {
        let field = BytesField::terminated(*b"\0");
        assert_eq!(
            parse(&field, b"hi\0rest").unwrap(),
            Value::Bytes(b"hi".to_vec())
        );
        assert_eq!(write(&field, Value::Bytes(b"hi".to_vec())).unwrap(), b"hi\0");
    }

    #[test]
    fn test_terminated_parse_missing_terminator() {
        let field = BytesField::terminated(*b"\0");
        assert!(matches!(
            parse(&field, b"hi").unwrap_err(),
            Error::StreamExhausted { .. }
        ));

        let lax = BytesField {
            strict: false,
            ..BytesField::terminated(*b"\0")
        };
        assert_eq!(parse(&lax, b"hi").unwrap(), Value::Bytes(b"hi".to_vec()));
    }

    #[test]
    fn test_terminated_write_rounds_up_to_step() {
        let field = BytesField {
            step: 2,
            padding: Some(vec![0]),
            ..BytesField::terminated(vec![0xFF])
        };
        assert_eq!(
            write(&field, Value::Bytes(b"abc".to_vec())).unwrap(),
            b"abc\xFF"
        );
        assert_eq!(
            write(&field, Value::Bytes(b"ab".to_vec())).unwrap(),
            b"ab\xFF\0"
        );
    }

    #[test]
    fn test_length_and_terminator_parse() {
        let field = BytesField {
            terminator: Some(vec![0]),
            ..BytesField::fixed(6)
        };
        assert_eq!(
            parse(&field, b"ab\0xxxrest").unwrap(),
            Value::Bytes(b"ab".to_vec())
        );
    }

    #[test]
    fn test_length_and_terminator_consumes_whole_region() {
        let field = BytesField {
            terminator: Some(vec![0]),
            ..BytesField::fixed(6)
        };
        let mut reader = BitReader::new(b"ab\0xxxrest");
        field.parse(&mut reader, &ParsingContext::new()).unwrap();
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn test_length_and_terminator_not_found() {
        let field = BytesField {
            terminator: Some(vec![0]),
            ..BytesField::fixed(4)
        };
        assert_eq!(
            parse(&field, b"abcdef").unwrap_err(),
            Error::TerminatorNotFound {
                terminator: vec![0],
                searched: 4
            }
        );

        let lax = BytesField {
            strict: false,
            ..field
        };
        assert_eq!(parse(&lax, b"abcdef").unwrap(), Value::Bytes(b"abcd".to_vec()));
    }

    #[test]
    fn test_length_and_terminator_write() {
        let field = BytesField {
            terminator: Some(vec![0]),
            padding: Some(vec![0xAA]),
            ..BytesField::fixed(6)
        };
        assert_eq!(
            write(&field, Value::Bytes(b"ab".to_vec())).unwrap(),
            b"ab\0\xAA\xAA\xAA"
        );
    }

    #[test]
    fn test_length_and_terminator_write_overflow() {
        let field = BytesField {
            terminator: Some(vec![0]),
            ..BytesField::fixed(3)
        };
        assert_eq!(
            write(&field, Value::Bytes(b"abc".to_vec())).unwrap_err(),
            Error::WriteOverflow {
                declared: 3,
                actual: 4
            }
        );
    }

    #[test]
    fn test_text_utf8_roundtrip() {
        let field = TextField::fixed(6);
        let mut reader = BitReader::new("héllo".as_bytes());
        assert_eq!(
            field.parse(&mut reader, &ParsingContext::new()).unwrap(),
            Value::String("héllo".to_string())
        );

        let mut writer = BitWriter::new();
        field
            .write(&mut writer, &ParsingContext::new(), &Value::String("héllo".to_string()))
            .unwrap();
        assert_eq!(writer.into_bytes(), "héllo".as_bytes());
    }

    #[test]
    fn test_text_invalid_utf8_strict() {
        let field = TextField::fixed(2);
        let mut reader = BitReader::new(&[0xFF, 0xFE]);
        assert!(matches!(
            field.parse(&mut reader, &ParsingContext::new()).unwrap_err(),
            Error::Encoding { encoding: "utf-8", .. }
        ));
    }

    #[test]
    fn test_text_invalid_utf8_replace() {
        let field = TextField {
            on_error: OnError::Replace,
            ..TextField::fixed(3)
        };
        let mut reader = BitReader::new(&[b'a', 0xFF, b'b']);
        assert_eq!(
            field.parse(&mut reader, &ParsingContext::new()).unwrap(),
            Value::String("a\u{FFFD}b".to_string())
        );
    }

    #[test]
    fn test_text_invalid_utf8_ignore() {
        let field = TextField {
            on_error: OnError::Ignore,
            ..TextField::fixed(3)
        };
        let mut reader = BitReader::new(&[b'a', 0xFF, b'b']);
        assert_eq!(
            field.parse(&mut reader, &ParsingContext::new()).unwrap(),
            Value::String("ab".to_string())
        );
    }

    #[test]
    fn test_text_ascii() {
        let field = TextField {
            encoding: Some(Encoding::Ascii),
            ..TextField::fixed(2)
        };
        let mut reader = BitReader::new(&[b'h', 0xC3]);
        assert!(matches!(
            field.parse(&mut reader, &ParsingContext::new()).unwrap_err(),
            Error::Encoding { encoding: "ascii", .. }
        ));

        let mut writer = BitWriter::new();
        let lax = TextField {
            on_error: OnError::Replace,
            ..field
        };
        lax.write(&mut writer, &ParsingContext::new(), &Value::String("hé".to_string()))
            .unwrap();
        assert_eq!(writer.into_bytes(), b"h?");
    }

    #[test]
    fn test_text_latin1() {
        let field = TextField {
            encoding: Some(Encoding::Latin1),
            ..TextField::fixed(2)
        };
        let mut reader = BitReader::new(&[0x68, 0xE9]);
        assert_eq!(
            field.parse(&mut reader, &ParsingContext::new()).unwrap(),
            Value::String("hé".to_string())
        );

        let mut writer = BitWriter::new();
        field
            .write(&mut writer, &ParsingContext::new(), &Value::String("hé".to_string()))
            .unwrap();
        assert_eq!(writer.into_bytes(), vec![0x68, 0xE9]);
    }

    #[test]
    fn test_terminated_text() {
        let field = TextField::terminated(*b"\r\n");
        let mut reader = BitReader::new(b"world\r\nrest");
        assert_eq!(
            field.parse(&mut reader, &ParsingContext::new()).unwrap(),
            Value::String("world".to_string())
        );
    }
}
