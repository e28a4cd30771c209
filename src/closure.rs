//! Closure form of a deferred cell
//!
//! Consumers that cannot hold scope-bearing cells directly receive a
//! [`Closure`] instead: a thunk whose body is the cell's expression, a record
//! of an already-forced cell, or the empty closure standing for a missing
//! argument. Converting a cell to a closure and back reproduces the cell.

use std::fmt;

use crate::chain::Slot;
use crate::promise::Promise;
use crate::runtime::{ScopeId, Value};

/// Owned snapshot of one argument slot
#[derive(Debug, Clone, PartialEq)]
pub enum Closure {
    /// Placeholder for a missing argument
    Empty,
    /// Unforced cell: evaluating `body` in `scope` yields the argument
    Thunk {
        /// The cell's expression
        body: Value,
        /// The scope the expression was written in
        scope: ScopeId,
    },
    /// Forced (or detached, when `scope` is `None`) cell
    Forced {
        /// The cell's expression
        expr: Value,
        /// The scope the expression was written in
        scope: Option<ScopeId>,
        /// The cached value
        value: Value,
    },
}

impl Closure {
    /// Closure for a literal value, as if detached
    pub fn literal(value: Value) -> Self {
        Closure::Forced {
            expr: value.clone(),
            scope: None,
            value,
        }
    }

    /// Snapshots a deferred cell
    pub fn from_promise(cell: &Promise) -> Self {
        match (cell.cached(), cell.scope()) {
            (Some(value), scope) => Closure::Forced {
                expr: cell.expr(),
                scope,
                value,
            },
            (None, Some(scope)) => Closure::Thunk {
                body: cell.expr(),
                scope,
            },
            // unforced cells always carry a scope
            (None, None) => Closure::Empty,
        }
    }

    /// Snapshots a chain slot; ordinary values become literals
    pub fn from_slot(slot: &Slot) -> Self {
        match slot {
            Slot::Missing => Closure::Empty,
            Slot::Deferred(cell) => Closure::from_promise(cell),
            Slot::Value(value) => Closure::literal(value.clone()),
        }
    }

    /// Rebuilds a fresh chain slot from the closure
    pub fn to_slot(&self) -> Slot {
        match self {
            Closure::Empty => Slot::Missing,
            Closure::Thunk { body, scope } => Slot::Deferred(Promise::new(body.clone(), *scope)),
            Closure::Forced { expr, scope, value } => {
                Slot::Deferred(Promise::forced(expr.clone(), *scope, value.clone()))
            }
        }
    }

    /// The expression this closure stands for
    pub fn expr(&self) -> Value {
        match self {
            Closure::Empty => Value::Missing,
            Closure::Thunk { body, .. } => body.clone(),
            Closure::Forced { expr, .. } => expr.clone(),
        }
    }

    /// Scope of the underlying cell, if any
    pub fn scope(&self) -> Option<ScopeId> {
        match self {
            Closure::Empty => None,
            Closure::Thunk { scope, .. } => Some(*scope),
            Closure::Forced { scope, .. } => *scope,
        }
    }

    /// Cached value of a forced closure
    pub fn value(&self) -> Option<&Value> {
        match self {
            Closure::Forced { value, .. } => Some(value),
            _ => None,
        }
    }

    /// True for forced and detached closures
    pub fn is_forced(&self) -> bool {
        matches!(self, Closure::Forced { .. })
    }

    /// True for the missing-argument placeholder
    pub fn is_empty(&self) -> bool {
        matches!(self, Closure::Empty)
    }
}

impl fmt::Display for Closure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Closure::Empty => write!(f, "<closure: missing>"),
            Closure::Thunk { body, .. } => write!(f, "<closure: {}>", body),
            Closure::Forced { expr, value, .. } => write!(f, "<closure: {} = {}>", expr, value),
        }
    }
}
