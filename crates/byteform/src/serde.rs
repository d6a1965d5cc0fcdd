//! JSON-deserializable record descriptions.
//!
//! These types describe the *shape* of a record layout. They are intended to
//! be constructed from JSON (for example a layout file shipped with your
//! application) and then compiled into core `byteform` types via `TryFrom`.
//!
//! Only the declarative subset of the field algebra is expressible here:
//! attributes are literals or sibling-name references, never callables.

use serde::{Deserialize, Serialize};

use crate::bytes::{BytesField, Encoding, MagicField, OnError, TextField};
use crate::compose::{
    ArrayField, ConditionalField, EnumField, Enumeration, StructureField, SwitchField,
};
use crate::errors::Error;
use crate::expr::Expr;
use crate::field::Field;
use crate::numeric::{BitField, Format, IntegerField, ScalarField, VlqField};
use crate::record::{Member, Record, RecordOptions};
use crate::value::{ByteOrder, Value};

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum ByteOrderDef {
    Big,
    Little,
}

impl From<ByteOrderDef> for ByteOrder {
    fn from(def: ByteOrderDef) -> Self {
        match def {
            ByteOrderDef::Big => ByteOrder::Big,
            ByteOrderDef::Little => ByteOrder::Little,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum EncodingDef {
    Utf8,
    Ascii,
    Latin1,
}

impl From<EncodingDef> for Encoding {
    fn from(def: EncodingDef) -> Self {
        match def {
            EncodingDef::Utf8 => Encoding::Utf8,
            EncodingDef::Ascii => Encoding::Ascii,
            EncodingDef::Latin1 => Encoding::Latin1,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default)]
pub enum OnErrorDef {
    #[default]
    Strict,
    Replace,
    Ignore,
}

impl From<OnErrorDef> for OnError {
    fn from(def: OnErrorDef) -> Self {
        match def {
            OnErrorDef::Strict => OnError::Strict,
            OnErrorDef::Replace => OnError::Replace,
            OnErrorDef::Ignore => OnError::Ignore,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub enum FormatDef {
    Char,
    Byte,
    UByte,
    Bool,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Size,
    USize,
    Half,
    Float,
    Double,
}

impl From<FormatDef> for Format {
    fn from(def: FormatDef) -> Self {
        match def {
            FormatDef::Char => Format::Char,
            FormatDef::Byte => Format::Byte,
            FormatDef::UByte => Format::UByte,
            FormatDef::Bool => Format::Bool,
            FormatDef::Short => Format::Short,
            FormatDef::UShort => Format::UShort,
            FormatDef::Int => Format::Int,
            FormatDef::UInt => Format::UInt,
            FormatDef::Long => Format::Long,
            FormatDef::ULong => Format::ULong,
            FormatDef::LongLong => Format::LongLong,
            FormatDef::ULongLong => Format::ULongLong,
            FormatDef::Size => Format::Size,
            FormatDef::USize => Format::USize,
            FormatDef::Half => Format::Half,
            FormatDef::Float => Format::Float,
            FormatDef::Double => Format::Double,
        }
    }
}

/// A literal or a sibling-name reference.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum ExprDef {
    Literal(i64),
    Field { field: String },
}

impl ExprDef {
    fn into_length(self) -> Expr<i64> {
        match self {
            ExprDef::Literal(n) => Expr::Value(n),
            ExprDef::Field { field } => Expr::Field(field),
        }
    }

    fn into_condition(self) -> Expr<bool> {
        match self {
            ExprDef::Literal(n) => Expr::Value(n != 0),
            ExprDef::Field { field } => Expr::Field(field),
        }
    }

    fn into_switch(self) -> Expr<Value> {
        match self {
            ExprDef::Literal(n) => Expr::Value(Value::I64(n)),
            ExprDef::Field { field } => Expr::Field(field),
        }
    }
}

/// A literal value, used for case keys and member defaults.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(untagged)]
pub enum ValueDef {
    Bool(bool),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
    /// An enumeration member, written as `{"member": "NAME"}`.
    Member { member: String },
}

impl From<ValueDef> for Value {
    fn from(def: ValueDef) -> Self {
        match def {
            ValueDef::Bool(b) => Value::Bool(b),
            ValueDef::Int(n) => Value::I64(n),
            ValueDef::Str(s) => Value::String(s),
            ValueDef::Bytes(b) => Value::Bytes(b),
            ValueDef::Member { member } => Value::Enum(member),
        }
    }
}

/// Description of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(tag = "type")]
pub enum FieldDef {
    Magic {
        value: Vec<u8>,
    },
    Bytes {
        #[serde(default)]
        length: Option<ExprDef>,
        #[serde(default)]
        terminator: Option<Vec<u8>>,
        #[serde(default = "default_step")]
        step: usize,
        #[serde(default)]
        padding: Option<Vec<u8>>,
        #[serde(default = "default_strict")]
        strict: bool,
    },
    Text {
        #[serde(default)]
        length: Option<ExprDef>,
        #[serde(default)]
        terminator: Option<Vec<u8>>,
        #[serde(default = "default_step")]
        step: usize,
        #[serde(default)]
        padding: Option<Vec<u8>>,
        #[serde(default = "default_strict")]
        strict: bool,
        #[serde(default)]
        encoding: Option<EncodingDef>,
        #[serde(default)]
        on_error: OnErrorDef,
    },
    Integer {
        length: usize,
        #[serde(default)]
        byte_order: Option<ByteOrderDef>,
        #[serde(default)]
        signed: bool,
    },
    Vlq,
    Bits {
        length: ExprDef,
        #[serde(default)]
        realign: bool,
    },
    Scalar {
        format: FormatDef,
        #[serde(default)]
        byte_order: Option<ByteOrderDef>,
        #[serde(default = "default_repeat")]
        repeat: usize,
    },
    Structure {
        record: RecordDef,
        #[serde(default)]
        length: Option<ExprDef>,
        #[serde(default = "default_strict")]
        strict: bool,
    },
    Array {
        base: Box<FieldDef>,
        #[serde(default)]
        count: Option<ExprDef>,
        #[serde(default)]
        length: Option<ExprDef>,
        #[serde(default = "default_strict")]
        strict: bool,
    },
    Conditional {
        base: Box<FieldDef>,
        condition: ExprDef,
    },
    Switch {
        cases: Vec<CaseDef>,
        switch: ExprDef,
        #[serde(default)]
        other: Option<Box<FieldDef>>,
    },
    Enum {
        base: Box<FieldDef>,
        members: Vec<EnumMemberDef>,
        #[serde(default)]
        flags: bool,
        #[serde(default)]
        allow_unknown: bool,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CaseDef {
    pub key: ValueDef,
    pub field: FieldDef,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EnumMemberDef {
    pub name: String,
    pub value: u64,
}

/// Description of a single named record slot.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MemberDef {
    pub name: String,
    pub field: FieldDef,
    #[serde(default)]
    pub default: Option<ValueDef>,
}

/// Top-level record description.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RecordDef {
    pub name: String,
    #[serde(default)]
    pub byte_order: Option<ByteOrderDef>,
    #[serde(default)]
    pub encoding: Option<EncodingDef>,
    pub fields: Vec<MemberDef>,
}

fn default_step() -> usize {
    1
}

fn default_strict() -> bool {
    true
}

fn default_repeat() -> usize {
    1
}

impl TryFrom<FieldDef> for Field {
    type Error = Error;

    fn try_from(def: FieldDef) -> Result<Self, Error> {
        Ok(match def {
            FieldDef::Magic { value } => Field::Magic(MagicField::new(value)),
            FieldDef::Bytes {
                length,
                terminator,
                step,
                padding,
                strict,
            } => Field::Bytes(BytesField {
                length: length.map(ExprDef::into_length),
                terminator,
                step,
                padding,
                strict,
            }),
            FieldDef::Text {
                length,
                terminator,
                step,
                padding,
                strict,
                encoding,
                on_error,
            } => Field::Text(TextField {
                inner: BytesField {
                    length: length.map(ExprDef::into_length),
                    terminator,
                    step,
                    padding,
                    strict,
                },
                encoding: encoding.map(Into::into),
                on_error: on_error.into(),
            }),
            FieldDef::Integer {
                length,
                byte_order,
                signed,
            } => Field::Integer(IntegerField {
                length,
                byte_order: byte_order.map(Into::into),
                signed,
            }),
            FieldDef::Vlq => Field::Vlq(VlqField),
            FieldDef::Bits { length, realign } => Field::Bits(BitField {
                length: length.into_length(),
                realign,
            }),
            FieldDef::Scalar {
                format,
                byte_order,
                repeat,
            } => Field::Scalar(ScalarField {
                format: format.into(),
                byte_order: byte_order.map(Into::into),
                repeat,
            }),
            FieldDef::Structure {
                record,
                length,
                strict,
            } => Field::Structure(StructureField {
                record: record.try_into()?,
                length: length.map(ExprDef::into_length),
                strict,
            }),
            FieldDef::Array {
                base,
                count,
                length,
                strict,
            } => Field::Array(ArrayField {
                base: Box::new((*base).try_into()?),
                count: count.map(ExprDef::into_length),
                length: length.map(ExprDef::into_length),
                strict,
            }),
            FieldDef::Conditional { base, condition } => {
                Field::Conditional(ConditionalField {
                    base: Box::new((*base).try_into()?),
                    condition: condition.into_condition(),
                })
            }
            FieldDef::Switch {
                cases,
                switch,
                other,
            } => Field::Switch(SwitchField {
                cases: cases
                    .into_iter()
                    .map(|c| Ok((c.key.into(), c.field.try_into()?)))
                    .collect::<Result<Vec<(Value, Field)>, Error>>()?,
                switch: switch.into_switch(),
                other: match other {
                    Some(other) => Some(Box::new((*other).try_into()?)),
                    None => None,
                },
            }),
            FieldDef::Enum {
                base,
                members,
                flags,
                allow_unknown,
            } => Field::Enum(EnumField {
                base: Box::new((*base).try_into()?),
                enumeration: Enumeration {
                    members: members.into_iter().map(|m| (m.name, m.value)).collect(),
                    flags,
                    allow_unknown,
                },
            }),
        })
    }
}

impl TryFrom<RecordDef> for Record {
    type Error = Error;

    fn try_from(def: RecordDef) -> Result<Self, Error> {
        let options = RecordOptions {
            byte_order: def.byte_order.map(Into::into),
            encoding: def.encoding.map(Into::into),
        };
        let mut members = Vec::with_capacity(def.fields.len());
        for member_def in def.fields {
            let mut member = Member::new(member_def.name, Field::try_from(member_def.field)?);
            if let Some(default) = member_def.default {
                member = member.with_default(Expr::Value(default.into()));
            }
            members.push(member);
        }
        Record::with_options(def.name, members, options)
    }
}
