//! Conversions between chains, flat sequences and closure lists
//!
//! None of these conversions ever forces a deferred cell.

use serde::Serialize;

use crate::chain::{self, Chain, ChainBuilder, ChainKind, Slot};
use crate::closure::Closure;
use crate::error::{Error, Result};
use crate::promise::Promise;
use crate::runtime::{ScopeId, Symbol, Value};
use crate::sequence::IndexedSequence;

fn symbol_for(name: Option<&str>) -> Option<Symbol> {
    name.map(Symbol::new)
}

fn slot_for_element(value: &Value) -> Slot {
    match value {
        Value::Closure(closure) => closure.to_slot(),
        Value::Missing => Slot::Missing,
        Value::Promise(cell) => Closure::from_promise(cell).to_slot(),
        other => Closure::literal(other.clone()).to_slot(),
    }
}

/// Builds a variadic chain from a flat sequence
///
/// Closures are rebuilt into cells, promises are copied through their
/// closure form, the missing marker stays missing and any other value is
/// embedded as a detached cell. Blank names leave the node unnamed.
pub fn sequence_to_chain(seq: &IndexedSequence<Value>) -> Chain {
    let mut builder = ChainBuilder::dots();
    for (name, value) in seq.iter() {
        builder.append(symbol_for(name), slot_for_element(value));
    }
    builder.finish()
}

/// Rebuilds a variadic chain from its closure list
pub fn closures_to_chain(seq: &IndexedSequence<Closure>) -> Chain {
    let mut builder = ChainBuilder::dots();
    for (name, closure) in seq.iter() {
        builder.append(symbol_for(name), closure.to_slot());
    }
    builder.finish()
}

/// Closure list of a chain; names only if some node had one
pub fn chain_to_closures(chain: &Chain) -> IndexedSequence<Closure> {
    let closures = chain
        .iter()
        .map(|(_, slot)| Closure::from_slot(slot))
        .collect();
    IndexedSequence::from_parts(closures, chain::names_of(chain))
}

/// The chain's slots as a flat list, sharing the cells rather than copying
pub fn chain_to_cells(chain: &Chain) -> IndexedSequence<Slot> {
    let cells = chain.iter().map(|(_, slot)| slot.clone()).collect();
    IndexedSequence::from_parts(cells, chain::names_of(chain))
}

/// Links a flat list of slots into a variadic chain, sharing the cells
pub fn cells_to_chain(seq: &IndexedSequence<Slot>) -> Chain {
    let mut builder = ChainBuilder::dots();
    for (name, slot) in seq.iter() {
        builder.append(symbol_for(name), slot.clone());
    }
    builder.finish()
}

/// Builds a variadic chain whose every node is a detached cell
///
/// An empty input gives the empty variadic chain, which is a present (if
/// empty) argument list rather than an absent one.
pub fn literals_to_chain(values: &IndexedSequence<Value>) -> Chain {
    let mut builder = ChainBuilder::dots();
    for (name, value) in values.iter() {
        builder.append(symbol_for(name), Slot::Deferred(Promise::detach(value.clone())));
    }
    tracing::debug!(count = builder.len(), "embedding literals as variadic arguments");
    builder.finish()
}

/// One row of the diagnostic table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnpackedRow {
    /// Node name, blank if unnamed
    pub name: String,
    /// Defining scope; `None` for detached cells and missing arguments
    #[serde(rename = "envir")]
    pub scope: Option<ScopeId>,
    /// The cell's own expression, unwrapped one hop only
    pub expr: Value,
    /// Cached value; `None` while unforced
    pub value: Option<Value>,
}

impl UnpackedRow {
    fn from_closure(name: Option<&str>, closure: &Closure) -> Self {
        UnpackedRow {
            name: name.unwrap_or_default().to_string(),
            scope: closure.scope(),
            expr: closure.expr(),
            value: closure.value().cloned(),
        }
    }
}

/// Diagnostic table with columns `name`, `envir`, `expr`, `value`
///
/// Unlike [`chain::expressions_of`], expressions here are not followed
/// through promise chains, so forwarding between cells stays visible.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Unpacked {
    rows: Vec<UnpackedRow>,
}

impl Unpacked {
    /// Column names in order
    pub const COLUMNS: [&'static str; 4] = ["name", "envir", "expr", "value"];

    /// Rows in chain order
    pub fn rows(&self) -> &[UnpackedRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `name` column
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.name.as_str()).collect()
    }

    /// The `value` column
    pub fn values(&self) -> Vec<Option<&Value>> {
        self.rows.iter().map(|row| row.value.as_ref()).collect()
    }

    /// Serializes the rows for display code
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.rows)
    }
}

/// Diagnostic table of a chain
pub fn unpack(chain: &Chain) -> Unpacked {
    let rows = chain
        .iter()
        .map(|(name, slot)| {
            UnpackedRow::from_closure(name.map(Symbol::as_str), &Closure::from_slot(slot))
        })
        .collect();
    Unpacked { rows }
}

/// Diagnostic table of a closure list
pub fn unpack_closures(seq: &IndexedSequence<Closure>) -> Unpacked {
    let rows = seq
        .iter()
        .map(|(name, closure)| UnpackedRow::from_closure(name, closure))
        .collect();
    Unpacked { rows }
}

// Host-value entry points. These dispatch on the runtime shape of a value
// and reject anything that is not a chain (or the empty list / null, which
// stand for "no arguments").

/// Number of arguments in a chain value
pub fn dots_length(value: &Value) -> Result<usize> {
    match value {
        Value::Pairlist(chain) => Ok(chain.len()),
        Value::Array(items) if items.is_empty() => Ok(0),
        Value::Null => Ok(0),
        other => Err(Error::type_error("dots", other.type_name())),
    }
}

/// Names of a chain value, `None` if nobody named anything
pub fn dots_names(value: &Value) -> Result<Option<Vec<String>>> {
    match value {
        Value::Pairlist(chain) => Ok(chain::names_of(chain)),
        Value::Array(items) if items.is_empty() => Ok(None),
        Value::Null => Ok(None),
        other => Err(Error::type_error("dots or pairlist", other.type_name())),
    }
}

/// Source expressions of a chain value
pub fn dots_exprs(value: &Value) -> Result<IndexedSequence<Value>> {
    match value {
        Value::Pairlist(chain) => Ok(chain::expressions_of(chain)),
        Value::Array(items) if items.is_empty() => Ok(IndexedSequence::default()),
        Value::Null => Ok(IndexedSequence::default()),
        other => Err(Error::type_error("dots or pairlist", other.type_name())),
    }
}

/// Concatenates two chain values; null stands for an absent chain
pub fn concat_values(a: &Value, b: &Value) -> Result<Value> {
    match (a, b) {
        (Value::Null, Value::Pairlist(_)) | (Value::Null, Value::Null) => Ok(b.clone()),
        (Value::Pairlist(_), Value::Null) => Ok(a.clone()),
        (Value::Pairlist(x), Value::Pairlist(y)) => Ok(Value::Pairlist(chain::concat(x, y)?)),
        (Value::Pairlist(_), other) | (Value::Null, other) | (other, _) => {
            Err(Error::type_error("dots or pairlist", other.type_name()))
        }
    }
}

/// Closure list of a chain value; null and the missing marker give an empty list
pub fn to_closure_list(value: &Value) -> Result<IndexedSequence<Closure>> {
    match value {
        Value::Pairlist(chain) => Ok(chain_to_closures(chain)),
        Value::Null | Value::Missing => Ok(IndexedSequence::default()),
        other => Err(Error::type_error("dots", other.type_name())),
    }
}

/// Flat host list holding a chain's closures
pub fn closure_list_value(seq: &IndexedSequence<Closure>) -> Value {
    Value::array(seq.values().iter().cloned().map(Value::closure).collect())
}

/// Rebuilds a chain from a host list of closures
///
/// Every element must be a closure.
pub fn from_closure_list(items: &[Value], names: Option<&[String]>) -> Result<Chain> {
    let closures = items
        .iter()
        .map(|item| match item {
            Value::Closure(c) => Ok((**c).clone()),
            other => Err(Error::type_error("closure", other.type_name())),
        })
        .collect::<Result<Vec<_>>>()?;
    let seq = match names {
        Some(names) => IndexedSequence::with_names(closures, names.to_vec())?,
        None => IndexedSequence::new(closures),
    };
    Ok(closures_to_chain(&seq))
}

/// Generic pairlist of ordinary values
pub fn values_to_pairlist(seq: &IndexedSequence<Value>) -> Chain {
    let mut builder = ChainBuilder::new(ChainKind::List);
    for (name, value) in seq.iter() {
        builder.append(symbol_for(name), Slot::Value(value.clone()));
    }
    builder.finish()
}
