//! Composite fields: repetition, presence, dispatch, enumerations, and
//! nested records.

use crate::context::ParsingContext;
use crate::errors::Error;
use crate::expr::Expr;
use crate::field::Field;
use crate::record::Record;
use crate::stream::{BitReader, BitWriter};
use crate::value::Value;

/// Repeats a base field, bounded by an element count or a byte length.
///
/// A negative byte length reads elements until the stream runs dry at an
/// element boundary; running dry inside an element is still an error.
#[derive(Debug, Clone)]
pub struct ArrayField {
    pub base: Box<Field>,
    pub count: Option<Expr<i64>>,
    pub length: Option<Expr<i64>>,
    pub strict: bool,
}

impl ArrayField {
    pub fn by_count(base: Field, count: impl Into<Expr<i64>>) -> Self {
        Self {
            base: Box::new(base),
            count: Some(count.into()),
            length: None,
            strict: true,
        }
    }

    pub fn by_length(base: Field, length: impl Into<Expr<i64>>) -> Self {
        Self {
            base: Box::new(base),
            count: None,
            length: Some(length.into()),
            strict: true,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        match (&self.count, &self.length) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(
                    "array cannot have both a count and a length".to_string(),
                ))
            }
            (None, None) => {
                return Err(Error::Config(
                    "array needs a count or a length".to_string(),
                ))
            }
            _ => {}
        }
        if self.length.is_some() && element_reads_to_end(&self.base) {
            return Err(Error::Config(
                "array with a byte length cannot hold read-to-end elements".to_string(),
            ));
        }
        self.base.validate()
    }

    pub(crate) fn parse(
        &self,
        reader: &mut BitReader<'_>,
        ctx: &ParsingContext<'_>,
    ) -> Result<Value, Error> {
        if let Some(count) = &self.count {
            let n = count.resolve(ctx)?;
            if n < 0 {
                return Err(Error::Config(format!("array count must not be negative, got {n}")));
            }
            let mut items = Vec::with_capacity(n as usize);
            for _ in 0..n {
                items.push(self.base.parse(reader, ctx)?);
            }
            return Ok(Value::List(items));
        }

        let length = self.length.as_ref().map(|l| l.resolve(ctx)).transpose()?;
        match length {
            Some(n) if n >= 0 => {
                let mut sub = reader.sub_reader(n as usize)?;
                let mut items = Vec::new();
                while !sub.at_end() {
                    let before = (sub.position(), sub.bit_position());
                    let remaining = sub.remaining();
                    match self.base.parse(&mut sub, ctx) {
                        Ok(item) => items.push(item),
                        Err(err) => {
                            if matches!(err.root_cause(), Error::StreamExhausted { .. }) {
                                return Err(Error::TrailingBytes { remaining });
                            }
                            return Err(err);
                        }
                    }
                    if (sub.position(), sub.bit_position()) == before {
                        break;
                    }
                }
                Ok(Value::List(items))
            }
            _ => {
                // negative length: until the stream runs dry between elements
                let mut items = Vec::new();
                loop {
                    if reader.at_end() {
                        break;
                    }
                    let before = (reader.position(), reader.bit_position());
                    items.push(self.base.parse(reader, ctx)?);
                    if (reader.position(), reader.bit_position()) == before {
                        break;
                    }
                }
                Ok(Value::List(items))
            }
        }
    }

    pub(crate) fn write(
        &self,
        writer: &mut BitWriter,
        ctx: &ParsingContext<'_>,
        value: &Value,
    ) -> Result<(), Error> {
        let empty = Vec::new();
        let items = match value {
            Value::List(items) => items,
            Value::Absent => &empty,
            other => {
                return Err(Error::Config(format!(
                    "expected a list value, got {}",
                    other.type_name()
                )))
            }
        };

        if self.count.is_some() {
            for item in items {
                self.base.write(writer, ctx, item)?;
            }
            return Ok(());
        }

        let length = self.length.as_ref().map(|l| l.resolve(ctx)).transpose()?;
        let mut scratch = BitWriter::new();
        for item in items {
            self.base.write(&mut scratch, ctx, item)?;
        }
        scratch.realign(0);
        if let Some(n) = length {
            if n >= 0 && self.strict && scratch.position() != n as usize {
                if scratch.position() > n as usize {
                    return Err(Error::WriteOverflow {
                        declared: n as usize,
                        actual: scratch.position(),
                    });
                }
                return Err(Error::WriteUnderflow {
                    declared: n as usize,
                    actual: scratch.position(),
                });
            }
        }
        writer.write_bytes(scratch.as_bytes())
    }
}

fn element_reads_to_end(field: &Field) -> bool {
    let length = match field {
        Field::Bytes(f) => &f.length,
        Field::Text(f) => &f.inner.length,
        _ => return false,
    };
    matches!(length, Some(Expr::Value(n)) if *n < 0)
}

/// Parses its base field only when the condition holds; otherwise the value
/// is [`Value::Absent`] and no bytes move.
#[derive(Debug, Clone)]
pub struct ConditionalField {
    pub base: Box<Field>,
    pub condition: Expr<bool>,
}

impl ConditionalField {
    pub fn new(base: Field, condition: impl Into<Expr<bool>>) -> Self {
        Self {
            base: Box::new(base),
            condition: condition.into(),
        }
    }

    pub(crate) fn parse(
        &self,
        reader: &mut BitReader<'_>,
        ctx: &ParsingContext<'_>,
    ) -> Result<Value, Error> {
        if self.condition.resolve(ctx)? {
            self.base.parse(reader, ctx)
        } else {
            Ok(Value::Absent)
        }
    }

    pub(crate) fn write(
        &self,
        writer: &mut BitWriter,
        ctx: &ParsingContext<'_>,
        value: &Value,
    ) -> Result<(), Error> {
        if self.condition.resolve(ctx)? {
            self.base.write(writer, ctx, value)
        } else {
            Ok(())
        }
    }
}

/// Dispatches to one of several fields keyed on a resolved switch value.
#[derive(Debug, Clone)]
pub struct SwitchField {
    pub cases: Vec<(Value, Field)>,
    pub switch: Expr<Value>,
    pub other: Option<Box<Field>>,
}

impl SwitchField {
    fn dispatch(&self, ctx: &ParsingContext<'_>) -> Result<&Field, Error> {
        let key = self.switch.resolve(ctx)?;
        for (case, field) in &self.cases {
            if *case == key {
                return Ok(field);
            }
        }
        match &self.other {
            Some(other) => Ok(other),
            None => Err(Error::SwitchNoMatch { value: key }),
        }
    }

    pub(crate) fn parse(
        &self,
        reader: &mut BitReader<'_>,
        ctx: &ParsingContext<'_>,
    ) -> Result<Value, Error> {
        self.dispatch(ctx)?.parse(reader, ctx)
    }

    pub(crate) fn write(
        &self,
        writer: &mut BitWriter,
        ctx: &ParsingContext<'_>,
        value: &Value,
    ) -> Result<(), Error> {
        self.dispatch(ctx)?.write(writer, ctx, value)
    }
}

/// Name-to-integer bindings backing an [`EnumField`]. In `flags` mode,
/// members combine by bitwise OR and parsed values decompose into the
/// matching members.
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub members: Vec<(String, u64)>,
    pub flags: bool,
    pub allow_unknown: bool,
}

impl Enumeration {
    pub fn new<N: Into<String>>(members: impl IntoIterator<Item = (N, u64)>) -> Self {
        Self {
            members: members
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
            flags: false,
            allow_unknown: false,
        }
    }

    pub fn flag_set<N: Into<String>>(members: impl IntoIterator<Item = (N, u64)>) -> Self {
        Self {
            flags: true,
            ..Self::new(members)
        }
    }

    fn name_of(&self, value: u64) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| name.as_str())
    }

    fn value_of(&self, name: &str) -> Option<u64> {
        self.members
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    fn decode(&self, raw: u64) -> Result<Value, Error> {
        if !self.flags {
            return match self.name_of(raw) {
                Some(name) => Ok(Value::Enum(name.to_string())),
                None if self.allow_unknown => Ok(Value::U64(raw)),
                None => Err(Error::EnumNotFound { value: raw }),
            };
        }

        if raw == 0 {
            return match self.name_of(0) {
                Some(name) => Ok(Value::Enum(name.to_string())),
                None => Ok(Value::List(Vec::new())),
            };
        }

        let mut parts = Vec::new();
        let mut covered = 0u64;
        for (name, bits) in &self.members {
            if *bits != 0 && raw & bits == *bits {
                parts.push(Value::Enum(name.clone()));
                covered |= bits;
            }
        }
        let residue = raw & !covered;
        if residue != 0 {
            if !self.allow_unknown {
                return Err(Error::EnumNotFound { value: residue });
            }
            parts.push(Value::U64(residue));
        }
        Ok(Value::List(parts))
    }

    fn encode(&self, value: &Value) -> Result<u64, Error> {
        match value {
            Value::Enum(name) => self.value_of(name).ok_or_else(|| {
                Error::Config(format!("unknown enumeration member {name:?}"))
            }),
            Value::List(parts) => {
                let mut raw = 0u64;
                for part in parts {
                    raw |= self.encode(part)?;
                }
                Ok(raw)
            }
            Value::U64(_) | Value::I64(_) => value.as_u64(),
            other => Err(Error::Config(format!(
                "expected an enumeration member, got {}",
                other.type_name()
            ))),
        }
    }
}

/// Maps an integer-producing base field through an [`Enumeration`].
#[derive(Debug, Clone)]
pub struct EnumField {
    pub base: Box<Field>,
    pub enumeration: Enumeration,
}

impl EnumField {
    pub fn new(base: Field, enumeration: Enumeration) -> Self {
        Self {
            base: Box::new(base),
            enumeration,
        }
    }

    pub(crate) fn parse(
        &self,
        reader: &mut BitReader<'_>,
        ctx: &ParsingContext<'_>,
    ) -> Result<Value, Error> {
        let raw = self.base.parse(reader, ctx)?.as_u64()?;
        self.enumeration.decode(raw)
    }

    pub(crate) fn write(
        &self,
        writer: &mut BitWriter,
        ctx: &ParsingContext<'_>,
        value: &Value,
    ) -> Result<(), Error> {
        let raw = self.enumeration.encode(value)?;
        self.base.write(writer, ctx, &Value::U64(raw))
    }
}

/// Embeds a nested record, optionally capped to a byte length. On read, the
/// capped region's unparsed tail is discarded; the nested record gets a
/// child context parented to the enclosing one.
#[derive(Debug, Clone)]
pub struct StructureField {
    pub record: Record,
    pub length: Option<Expr<i64>>,
    pub strict: bool,
}

impl StructureField {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            length: None,
            strict: true,
        }
    }

    pub(crate) fn parse(
        &self,
        reader: &mut BitReader<'_>,
        ctx: &ParsingContext<'_>,
    ) -> Result<Value, Error> {
        let mut child = ctx.child();
        match &self.length {
            Some(length) => {
                let n = length.resolve(ctx)?;
                let n = if n < 0 { reader.remaining() } else { n as usize };
                let mut sub = reader.sub_reader(n)?;
                Ok(Value::Record(self.record.parse_members(&mut sub, &mut child)?))
            }
            None => Ok(Value::Record(self.record.parse_members(reader, &mut child)?)),
        }
    }

    pub(crate) fn write(
        &self,
        writer: &mut BitWriter,
        ctx: &ParsingContext<'_>,
        value: &Value,
    ) -> Result<(), Error> {
        let map = match value {
            Value::Record(map) => map,
            other => {
                return Err(Error::Config(format!(
                    "expected a record value, got {}",
                    other.type_name()
                )))
            }
        };

        match &self.length {
            None => {
                let mut child = ctx.child();
                self.record.write_members(map, writer, &mut child)
            }
            Some(length) => {
                let n = length.resolve(ctx)?;
                let mut scratch = BitWriter::new();
                {
                    let mut child = ctx.child();
                    self.record.write_members(map, &mut scratch, &mut child)?;
                }
                if n >= 0 {
                    let n = n as usize;
                    if scratch.position() > n {
                        if self.strict {
                            return Err(Error::WriteOverflow {
                                declared: n,
                                actual: scratch.position(),
                            });
                        }
                    } else {
                        let missing = n - scratch.position();
                        scratch.write_bytes(&vec![0; missing])?;
                    }
                }
                writer.write_bytes(scratch.as_bytes())
            }
        }
    }
}
