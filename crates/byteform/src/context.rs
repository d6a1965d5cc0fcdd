//! Per-record scratchpad exposing already-processed sibling values, with
//! parent chaining for nested records.

use std::collections::BTreeMap;

use crate::errors::Error;
use crate::value::Value;

/// Context for one parse or write of one record. Lookups check completed
/// values first, then pending caller-supplied values (write side), then the
/// parent chain.
#[derive(Debug, Default)]
pub struct ParsingContext<'p> {
    values: BTreeMap<String, Value>,
    pending: BTreeMap<String, Value>,
    parent: Option<&'p ParsingContext<'p>>,
}

impl<'p> ParsingContext<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A nested context with `self` as its parent.
    pub fn child(&self) -> ParsingContext<'_> {
        ParsingContext {
            values: BTreeMap::new(),
            pending: BTreeMap::new(),
            parent: Some(self),
        }
    }

    pub fn get(&self, name: &str) -> Result<&Value, Error> {
        if let Some(v) = self.values.get(name) {
            return Ok(v);
        }
        if let Some(v) = self.pending.get(name) {
            return Ok(v);
        }
        match self.parent {
            Some(parent) => parent.get(name),
            None => Err(Error::UnknownField {
                name: name.to_string(),
            }),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Seeds the caller-supplied values a write will finalize, so overrides
    /// can reference fields that have not completed yet.
    pub(crate) fn set_pending(&mut self, values: BTreeMap<String, Value>) {
        self.pending = values;
    }

    pub(crate) fn take_values(&mut self) -> BTreeMap<String, Value> {
        std::mem::take(&mut self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut ctx = ParsingContext::new();
        ctx.set("len", Value::U64(4));
        assert_eq!(ctx.get("len").unwrap(), &Value::U64(4));
    }

    #[test]
    fn test_unknown_field() {
        let ctx = ParsingContext::new();
        assert_eq!(
            ctx.get("missing").unwrap_err(),
            Error::UnknownField {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_completed_shadows_pending() {
        let mut ctx = ParsingContext::new();
        ctx.set_pending(BTreeMap::from([("n".to_string(), Value::U64(1))]));
        assert_eq!(ctx.get("n").unwrap(), &Value::U64(1));

        ctx.set("n", Value::U64(2));
        assert_eq!(ctx.get("n").unwrap(), &Value::U64(2));
    }

    #[test]
    fn test_child_walks_to_parent() {
        let mut parent = ParsingContext::new();
        parent.set("outer", Value::U64(7));

        let mut child = parent.child();
        child.set("inner", Value::U64(1));

        assert_eq!(child.get("inner").unwrap(), &Value::U64(1));
        assert_eq!(child.get("outer").unwrap(), &Value::U64(7));
    }

    #[test]
    fn test_innermost_wins() {
        let mut parent = ParsingContext::new();
        parent.set("n", Value::U64(1));

        let mut child = parent.child();
        child.set("n", Value::U64(2));

        assert_eq!(child.get("n").unwrap(), &Value::U64(2));
    }
}
