//! The field algebra: one declarative codec per record slot.
//!
//! [`Field`] is the closed set of primitives a record is built from. Each
//! variant knows how to parse itself from a [`BitReader`] and write itself
//! to a [`BitWriter`], resolving dynamic attributes against the
//! [`ParsingContext`].

use crate::bytes::{BytesField, MagicField, TextField};
use crate::compose::{
    ArrayField, ConditionalField, EnumField, StructureField, SwitchField,
};
use crate::context::ParsingContext;
use crate::errors::Error;
use crate::numeric::{BitField, IntegerField, ScalarField, VlqField};
use crate::record::RecordOptions;
use crate::stream::{BitReader, BitWriter};
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum Field {
    Magic(MagicField),
    Bytes(BytesField),
    Text(TextField),
    Integer(IntegerField),
    Vlq(VlqField),
    Bits(BitField),
    Scalar(ScalarField),
    Structure(StructureField),
    Array(ArrayField),
    Conditional(ConditionalField),
    Switch(SwitchField),
    Enum(EnumField),
}

/// What a synthetic override computes from the dependent field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoOverride {
    ByteLength,
    BitLength,
    Count,
}

impl Field {
    pub fn parse(
        &self,
        reader: &mut BitReader<'_>,
        ctx: &ParsingContext<'_>,
    ) -> Result<Value, Error> {
        match self {
            Field::Magic(f) => f.parse(reader),
            Field::Bytes(f) => f.parse(reader, ctx),
            Field::Text(f) => f.parse(reader, ctx),
            Field::Integer(f) => f.parse(reader),
            Field::Vlq(f) => f.parse(reader),
            Field::Bits(f) => f.parse(reader, ctx),
            Field::Scalar(f) => f.parse(reader),
            Field::Structure(f) => f.parse(reader, ctx),
            Field::Array(f) => f.parse(reader, ctx),
            Field::Conditional(f) => f.parse(reader, ctx),
            Field::Switch(f) => f.parse(reader, ctx),
            Field::Enum(f) => f.parse(reader, ctx),
        }
    }

    pub fn write(
        &self,
        writer: &mut BitWriter,
        ctx: &ParsingContext<'_>,
        value: &Value,
    ) -> Result<(), Error> {
        match self {
            Field::Magic(f) => f.write(writer, value),
            Field::Bytes(f) => f.write(writer, ctx, value),
            Field::Text(f) => f.write(writer, ctx, value),
            Field::Integer(f) => f.write(writer, value),
            Field::Vlq(f) => f.write(writer, value),
            Field::Bits(f) => f.write(writer, ctx, value),
            Field::Scalar(f) => f.write(writer, value),
            Field::Structure(f) => f.write(writer, ctx, value),
            Field::Array(f) => f.write(writer, ctx, value),
            Field::Conditional(f) => f.write(writer, ctx, value),
            Field::Switch(f) => f.write(writer, ctx, value),
            Field::Enum(f) => f.write(writer, ctx, value),
        }
    }

    /// Default supplied by the field itself when its member declares none.
    pub(crate) fn intrinsic_default(&self) -> Option<Value> {
        match self {
            Field::Magic(f) => Some(Value::Bytes(f.value.clone())),
            Field::Structure(_) => Some(Value::Record(Default::default())),
            _ => None,
        }
    }

    /// The sibling reference that should receive a synthetic override, with
    /// the quantity it computes.
    pub(crate) fn auto_override(&self) -> Option<(&str, AutoOverride)> {
        match self {
            Field::Bytes(f) => f
                .length
                .as_ref()
                .and_then(|e| e.field_ref())
                .map(|n| (n, AutoOverride::ByteLength)),
            Field::Text(f) => f
                .inner
                .length
                .as_ref()
                .and_then(|e| e.field_ref())
                .map(|n| (n, AutoOverride::ByteLength)),
            Field::Bits(f) => f
                .length
                .field_ref()
                .map(|n| (n, AutoOverride::BitLength)),
            Field::Array(f) => f
                .count
                .as_ref()
                .and_then(|e| e.field_ref())
                .map(|n| (n, AutoOverride::Count)),
            _ => None,
        }
    }

    /// Fills record-level defaults into fields that leave the corresponding
    /// attribute unset. Nested records keep their own options.
    pub(crate) fn apply_options(&mut self, options: &RecordOptions) {
        match self {
            Field::Integer(f) => {
                if f.byte_order.is_none() {
                    f.byte_order = options.byte_order;
                }
            }
            Field::Scalar(f) => {
                if f.byte_order.is_none() {
                    f.byte_order = options.byte_order;
                }
            }
            Field::Text(f) => {
                if f.encoding.is_none() {
                    f.encoding = options.encoding;
                }
            }
            Field::Array(f) => f.base.apply_options(options),
            Field::Conditional(f) => f.base.apply_options(options),
            Field::Enum(f) => f.base.apply_options(options),
            Field::Switch(f) => {
                for (_, case) in &mut f.cases {
                    case.apply_options(options);
                }
                if let Some(other) = &mut f.other {
                    other.apply_options(options);
                }
            }
            _ => {}
        }
    }

    /// Configuration checks performed once at record construction.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        match self {
            Field::Magic(f) => f.validate(),
            Field::Bytes(f) => f.validate(),
            Field::Text(f) => f.inner.validate(),
            Field::Integer(f) => f.validate(),
            Field::Scalar(f) => f.validate(),
            Field::Structure(_) => Ok(()),
            Field::Array(f) => f.validate(),
            Field::Conditional(f) => f.base.validate(),
            Field::Enum(f) => f.base.validate(),
            Field::Switch(f) => {
                for (_, case) in &f.cases {
                    case.validate()?;
                }
                match &f.other {
                    Some(other) => other.validate(),
                    None => Ok(()),
                }
            }
            Field::Vlq(_) | Field::Bits(_) => Ok(()),
        }
    }
}
