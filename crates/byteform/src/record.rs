//! Record: an immutable ordered schema of named fields, and the engine that
//! drives one parse or write across it.
//!
//! Construction validates every field, propagates record-level defaults, and
//! wires synthetic overrides so that declaring `BytesField::fixed("len")`
//! makes the `len` field populate itself on write.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::bytes::Encoding;
use crate::context::ParsingContext;
use crate::errors::Error;
use crate::expr::{Expr, Override};
use crate::field::{AutoOverride, Field};
use crate::stream::{BitReader, BitWriter};
use crate::value::{ByteOrder, Value};

/// Record-level defaults filled into fields that leave the corresponding
/// attribute unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordOptions {
    pub byte_order: Option<ByteOrder>,
    pub encoding: Option<Encoding>,
}

/// One named slot of a record.
#[derive(Debug, Clone)]
pub struct Member {
    name: String,
    field: Field,
    default: Option<Expr<Value>>,
    override_: Option<Override>,
}

impl Member {
    pub fn new(name: impl Into<String>, field: Field) -> Self {
        Self {
            name: name.into(),
            field,
            default: None,
            override_: None,
        }
    }

    /// Value used when the member is unset at construction or write time.
    pub fn with_default(mut self, default: impl Into<Expr<Value>>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Hook replacing the member's value just before writing. Takes
    /// precedence over any synthetic override the record would install.
    pub fn with_override(mut self, override_: Override) -> Self {
        self.override_ = Some(override_);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    fn default_value(&self, ctx: &ParsingContext<'_>) -> Result<Value, Error> {
        if let Some(default) = &self.default {
            return default.resolve(ctx);
        }
        Ok(self.field.intrinsic_default().unwrap_or(Value::Absent))
    }
}

/// An immutable schema: named fields in stream order. Use [`Record::new`] to
/// build one, then [`Record::parse`] and [`Record::write`] to move values
/// through it.
#[derive(Debug, Clone)]
pub struct Record {
    name: String,
    members: Vec<Member>,
    options: RecordOptions,
}

impl Record {
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Result<Self, Error> {
        Self::with_options(name, members, RecordOptions::default())
    }

    pub fn with_options(
        name: impl Into<String>,
        mut members: Vec<Member>,
        options: RecordOptions,
    ) -> Result<Self, Error> {
        let name = name.into();

        let mut seen = BTreeSet::new();
        for member in &members {
            if !seen.insert(member.name.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate field name {:?} in record {name:?}",
                    member.name
                )));
            }
        }

        for member in &mut members {
            member.field.apply_options(&options);
        }
        for member in &members {
            member
                .field
                .validate()
                .map_err(|e| e.at(&format!("{name}.{}", member.name)))?;
        }

        let wirings: Vec<(String, String, AutoOverride)> = members
            .iter()
            .filter_map(|m| {
                m.field
                    .auto_override()
                    .map(|(target, kind)| (target.to_string(), m.name.clone(), kind))
            })
            .collect();
        // a reference that names no member here may still resolve through a
        // parent context, so it is wired only when the member exists
        for (target, source, kind) in wirings {
            if let Some(member) = members.iter_mut().find(|m| m.name == target) {
                if member.override_.is_none() {
                    member.override_ = Some(synthetic_override(source, kind));
                }
            }
        }

        Ok(Self {
            name,
            members,
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn options(&self) -> &RecordOptions {
        &self.options
    }

    /// Parses one record from the start of `data`. Returns the field values
    /// and the number of bytes consumed; a partially-consumed trailing byte
    /// counts as consumed.
    pub fn parse(&self, data: &[u8]) -> Result<(BTreeMap<String, Value>, usize), Error> {
        let mut reader = BitReader::new(data);
        let mut ctx = ParsingContext::new();
        let values = self.parse_members(&mut reader, &mut ctx)?;
        Ok((values, reader.position()))
    }

    pub(crate) fn parse_members(
        &self,
        reader: &mut BitReader<'_>,
        ctx: &mut ParsingContext<'_>,
    ) -> Result<BTreeMap<String, Value>, Error> {
        for member in &self.members {
            let value = member
                .field
                .parse(reader, ctx)
                .map_err(|e| e.at(&format!("{}.{}", self.name, member.name)))?;
            ctx.set(member.name.clone(), value);
        }
        Ok(ctx.take_values())
    }

    /// Writes one record to `writer`. Returns the number of bytes appended.
    pub fn write(
        &self,
        values: &BTreeMap<String, Value>,
        writer: &mut BitWriter,
    ) -> Result<usize, Error> {
        let start = writer.position();
        let mut ctx = ParsingContext::new();
        self.write_members(values, writer, &mut ctx)?;
        Ok(writer.position() - start)
    }

    pub fn to_bytes(&self, values: &BTreeMap<String, Value>) -> Result<Vec<u8>, Error> {
        let mut writer = BitWriter::new();
        self.write(values, &mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Two phases: finalize every value in declaration order (stored value,
    /// else default, then the override), then write them. Trailing bits are
    /// zero-padded to the byte boundary.
    pub(crate) fn write_members(
        &self,
        values: &BTreeMap<String, Value>,
        writer: &mut BitWriter,
        ctx: &mut ParsingContext<'_>,
    ) -> Result<(), Error> {
        ctx.set_pending(values.clone());

        let mut finals = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let path = || format!("{}.{}", self.name, member.name);
            let current = match values.get(&member.name) {
                Some(value) => value.clone(),
                None => member.default_value(ctx).map_err(|e| e.at(&path()))?,
            };
            let value = match &member.override_ {
                Some(override_) => override_
                    .apply(ctx, current)
                    .map_err(|e| e.at(&path()))?,
                None => current,
            };
            ctx.set(member.name.clone(), value.clone());
            finals.push(value);
        }

        for (member, value) in self.members.iter().zip(&finals) {
            member
                .field
                .write(writer, ctx, value)
                .map_err(|e| e.at(&format!("{}.{}", self.name, member.name)))?;
        }
        writer.realign(0);
        Ok(())
    }

    /// Explicit construction: completes a partial value map, resolving unset
    /// members to their defaults in declaration order.
    pub fn build(
        &self,
        values: BTreeMap<String, Value>,
    ) -> Result<BTreeMap<String, Value>, Error> {
        let mut ctx = ParsingContext::new();
        let mut out = BTreeMap::new();
        for member in &self.members {
            let value = match values.get(&member.name) {
                Some(value) => value.clone(),
                None => member
                    .default_value(&ctx)
                    .map_err(|e| e.at(&format!("{}.{}", self.name, member.name)))?,
            };
            ctx.set(member.name.clone(), value.clone());
            out.insert(member.name.clone(), value);
        }
        Ok(out)
    }
}

/// The override installed on a length, bit-length, or count field that a
/// sibling references by name: when the field is unset, its value is
/// computed from the sibling's.
fn synthetic_override(source: String, kind: AutoOverride) -> Override {
    Override::Fn(Arc::new(move |ctx: &ParsingContext, current: Value| {
        if !matches!(current, Value::Absent) {
            return Ok(current);
        }
        let value = ctx.get(&source)?;
        let n = match kind {
            AutoOverride::ByteLength | AutoOverride::Count => value.length()?,
            AutoOverride::BitLength => value.bit_length()?,
        };
        Ok(Value::U64(n))
    }))
}
