//! Dynamic field attributes: literals, sibling references, and callables.
//!
//! A field attribute such as a length, count, condition, or switch key is an
//! [`Expr`] resolved against the [`ParsingContext`] when the field runs.

use std::fmt;
use std::sync::Arc;

use crate::context::ParsingContext;
use crate::errors::Error;
use crate::value::Value;

/// An attribute that resolves to a `T` at parse or write time.
#[derive(Clone)]
pub enum Expr<T> {
    /// A literal value.
    Value(T),
    /// The name of a sibling field whose value supplies the attribute.
    Field(String),
    /// A callable taking no arguments.
    Fn0(Arc<dyn Fn() -> T + Send + Sync>),
    /// A callable taking the parsing context.
    Fn1(Arc<dyn Fn(&ParsingContext) -> Result<T, Error> + Send + Sync>),
}

impl<T: FromValue + Clone> Expr<T> {
    pub fn resolve(&self, ctx: &ParsingContext) -> Result<T, Error> {
        match self {
            Expr::Value(v) => Ok(v.clone()),
            Expr::Field(name) => T::from_value(ctx.get(name)?),
            Expr::Fn0(f) => Ok(f()),
            Expr::Fn1(f) => f(ctx),
        }
    }
}

impl<T> Expr<T> {
    /// The sibling field this attribute references, if any.
    pub fn field_ref(&self) -> Option<&str> {
        match self {
            Expr::Field(name) => Some(name),
            _ => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Expr::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Expr::Fn0(_) => f.write_str("Fn0(..)"),
            Expr::Fn1(_) => f.write_str("Fn1(..)"),
        }
    }
}

impl<T> From<&str> for Expr<T> {
    fn from(name: &str) -> Self {
        Expr::Field(name.to_string())
    }
}

impl From<i64> for Expr<i64> {
    fn from(v: i64) -> Self {
        Expr::Value(v)
    }
}

impl From<i32> for Expr<i64> {
    fn from(v: i32) -> Self {
        Expr::Value(v as i64)
    }
}

impl From<bool> for Expr<bool> {
    fn from(v: bool) -> Self {
        Expr::Value(v)
    }
}

impl From<Value> for Expr<Value> {
    fn from(v: Value) -> Self {
        Expr::Value(v)
    }
}

/// Conversion applied when an attribute resolves through a sibling
/// reference.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, Error>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, Error> {
        value.as_i64()
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, Error> {
        value.as_u64()
    }
}

impl FromValue for usize {
    fn from_value(value: &Value) -> Result<Self, Error> {
        Ok(value.as_u64()? as usize)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, Error> {
        Ok(value.is_truthy())
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, Error> {
        Ok(value.clone())
    }
}

/// Write-time hook replacing a field's stored value just before writing.
#[derive(Clone)]
pub enum Override {
    /// A fixed replacement value.
    Value(Value),
    /// A callable taking the context and the current value.
    Fn(Arc<dyn Fn(&ParsingContext, Value) -> Result<Value, Error> + Send + Sync>),
}

impl Override {
    pub fn apply(&self, ctx: &ParsingContext, current: Value) -> Result<Value, Error> {
        match self {
            Override::Value(v) => Ok(v.clone()),
            Override::Fn(f) => f(ctx, current),
        }
    }
}

impl fmt::Debug for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Override::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Override::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_literal() {
        let ctx = ParsingContext::new();
        let expr: Expr<i64> = 6.into();
        assert_eq!(expr.resolve(&ctx).unwrap(), 6);
    }

    #[test]
    fn test_resolve_sibling_reference() {
        let mut ctx = ParsingContext::new();
        ctx.set("len", Value::U64(4));
        let expr: Expr<i64> = "len".into();
        assert_eq!(expr.resolve(&ctx).unwrap(), 4);
    }

    #[test]
    fn test_resolve_missing_sibling() {
        let ctx = ParsingContext::new();
        let expr: Expr<i64> = "len".into();
        assert!(matches!(
            expr.resolve(&ctx).unwrap_err(),
            Error::UnknownField { .. }
        ));
    }

    #[test]
    fn test_resolve_callables() {
        let mut ctx = ParsingContext::new();
        ctx.set("n", Value::U64(3));

        let zero_arg: Expr<i64> = Expr::Fn0(Arc::new(|| 9));
        assert_eq!(zero_arg.resolve(&ctx).unwrap(), 9);

        let with_ctx: Expr<i64> =
            Expr::Fn1(Arc::new(|ctx| Ok(ctx.get("n")?.as_i64()? * 2)));
        assert_eq!(with_ctx.resolve(&ctx).unwrap(), 6);
    }

    #[test]
    fn test_condition_resolves_truthiness() {
        let mut ctx = ParsingContext::new();
        ctx.set("flag", Value::Bytes(vec![0]));
        let expr: Expr<bool> = "flag".into();
        assert!(expr.resolve(&ctx).unwrap());
    }

    #[test]
    fn test_override_apply() {
        let ctx = ParsingContext::new();
        let fixed = Override::Value(Value::U64(1));
        assert_eq!(fixed.apply(&ctx, Value::U64(9)).unwrap(), Value::U64(1));

        let keep = Override::Fn(Arc::new(|_, current| Ok(current)));
        assert_eq!(keep.apply(&ctx, Value::U64(9)).unwrap(), Value::U64(9));
    }
}
