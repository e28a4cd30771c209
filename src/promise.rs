//! Deferred cells (promises)
//!
//! A [`Promise`] pairs an unevaluated expression with the scope it was
//! written in, plus the value once something outside this crate has forced
//! it. Handles are shared: cloning a `Promise` aliases the same cache slot,
//! so forcing through any clone is visible through all of them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::runtime::{ScopeId, Value};

#[derive(Debug, Clone)]
enum Cell {
    Unforced {
        expr: Value,
        scope: ScopeId,
    },
    /// `scope == None` is a detached cell wrapping an already evaluated value
    Forced {
        expr: Value,
        scope: Option<ScopeId>,
        value: Value,
    },
}

/// Lifecycle state of a deferred cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseState {
    /// Not yet evaluated
    Unforced,
    /// Evaluated by the host; the value is cached
    Forced,
    /// Built from a literal value; never had a scope
    Detached,
}

/// Shared handle to a deferred cell
#[derive(Debug, Clone)]
pub struct Promise(Rc<RefCell<Cell>>);

impl Promise {
    /// Creates an unforced cell for `expr` written in `scope`
    pub fn new(expr: Value, scope: ScopeId) -> Self {
        Promise(Rc::new(RefCell::new(Cell::Unforced { expr, scope })))
    }

    /// Embeds an ordinary value as an already-forced cell with no scope
    pub fn detach(value: Value) -> Self {
        Promise(Rc::new(RefCell::new(Cell::Forced {
            expr: value.clone(),
            scope: None,
            value,
        })))
    }

    /// Creates a cell that has already been forced to `value`
    pub fn forced(expr: Value, scope: Option<ScopeId>, value: Value) -> Self {
        Promise(Rc::new(RefCell::new(Cell::Forced { expr, scope, value })))
    }

    /// The cell's own expression (one hop: may itself be a promise)
    pub fn expr(&self) -> Value {
        match &*self.0.borrow() {
            Cell::Unforced { expr, .. } | Cell::Forced { expr, .. } => expr.clone(),
        }
    }

    /// Scope the expression was written in; `None` when detached
    pub fn scope(&self) -> Option<ScopeId> {
        match &*self.0.borrow() {
            Cell::Unforced { scope, .. } => Some(*scope),
            Cell::Forced { scope, .. } => *scope,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> PromiseState {
        match &*self.0.borrow() {
            Cell::Unforced { .. } => PromiseState::Unforced,
            Cell::Forced { scope: Some(_), .. } => PromiseState::Forced,
            Cell::Forced { scope: None, .. } => PromiseState::Detached,
        }
    }

    /// True once a value is cached (detached cells always are)
    pub fn is_forced(&self) -> bool {
        matches!(&*self.0.borrow(), Cell::Forced { .. })
    }

    /// True for cells built by [`Promise::detach`]
    pub fn is_detached(&self) -> bool {
        self.state() == PromiseState::Detached
    }

    /// Cached value, if forced
    pub fn cached(&self) -> Option<Value> {
        match &*self.0.borrow() {
            Cell::Unforced { .. } => None,
            Cell::Forced { value, .. } => Some(value.clone()),
        }
    }

    /// Cached value; never evaluates
    pub fn value(&self) -> Result<Value> {
        self.cached().ok_or(Error::UnboundValue)
    }

    /// Forces the cell in place using the host evaluator `eval`
    ///
    /// `eval` runs at most once per cell; later calls return the cache.
    /// No borrow of the cell is held while `eval` runs, so it may freely
    /// inspect this promise.
    pub fn force_with<F>(&self, eval: F) -> Result<Value>
    where
        F: FnOnce(&Value, ScopeId) -> Result<Value>,
    {
        let (expr, scope) = match &*self.0.borrow() {
            Cell::Forced { value, .. } => return Ok(value.clone()),
            Cell::Unforced { expr, scope } => (expr.clone(), *scope),
        };
        let value = eval(&expr, scope)?;
        Ok(self.resolve(value))
    }

    /// Caches `value` unless the cell is already forced; returns the cached value
    pub fn resolve(&self, value: Value) -> Value {
        let mut cell = self.0.borrow_mut();
        let (expr, scope) = match &*cell {
            Cell::Forced { value: existing, .. } => return existing.clone(),
            Cell::Unforced { expr, scope } => (expr.clone(), *scope),
        };
        *cell = Cell::Forced {
            expr,
            scope: Some(scope),
            value: value.clone(),
        };
        value
    }

    /// Follows promise-valued expressions to the ultimate source cell
    ///
    /// Stops at the first cell whose expression is not a promise, or at the
    /// first detached cell.
    pub fn unwrap_chain(&self) -> Promise {
        let mut current = self.clone();
        loop {
            let next = match &*current.0.borrow() {
                Cell::Forced { scope: None, .. } => None,
                Cell::Unforced {
                    expr: Value::Promise(inner),
                    ..
                }
                | Cell::Forced {
                    expr: Value::Promise(inner),
                    ..
                } => Some(inner.clone()),
                _ => None,
            };
            match next {
                Some(inner) => current = inner,
                None => return current,
            }
        }
    }

    /// True if both handles share one cell
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Same expression, scope and cache; aliased handles short-circuit
impl PartialEq for Promise {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (&*self.0.borrow(), &*other.0.borrow()) {
            (
                Cell::Unforced { expr: e1, scope: s1 },
                Cell::Unforced { expr: e2, scope: s2 },
            ) => s1 == s2 && e1 == e2,
            (
                Cell::Forced {
                    expr: e1,
                    scope: s1,
                    value: v1,
                },
                Cell::Forced {
                    expr: e2,
                    scope: s2,
                    value: v2,
                },
            ) => s1 == s2 && e1 == e2 && v1 == v2,
            _ => false,
        }
    }
}

impl fmt::Display for Promise {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &*self.0.borrow() {
            Cell::Unforced { expr, .. } => write!(f, "<promise: {}>", expr),
            Cell::Forced { expr, value, .. } => write!(f, "<promise: {} = {}>", expr, value),
        }
    }
}
