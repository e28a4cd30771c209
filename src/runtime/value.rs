use std::fmt;
use std::rc::Rc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::chain::Chain;
use crate::closure::Closure;
use crate::error::{Error, Result};
use crate::promise::Promise;
use crate::runtime::ScopeId;

/// Interned-by-value symbol name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Name of the variadic ("rest arguments") parameter
    pub const DOTS: &'static str = "...";

    /// Creates a symbol from a name
    pub fn new(name: impl AsRef<str>) -> Self {
        Symbol(Rc::from(name.as_ref()))
    }

    /// The variadic parameter symbol `...`
    pub fn dots() -> Self {
        Symbol::new(Self::DOTS)
    }

    /// The missing-argument symbol (the empty name)
    pub fn missing_arg() -> Self {
        Symbol::new("")
    }

    /// Returns the symbol's print name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `...`
    pub fn is_dots(&self) -> bool {
        &*self.0 == Self::DOTS
    }

    /// True for the empty (missing-argument) symbol
    pub fn is_missing_arg(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime value representation
///
/// Values double as expressions: an unevaluated call is a [`Value::Call`]
/// whose first element is the callee, and a bare variable reference is a
/// [`Value::Symbol`].
#[derive(Debug, Clone)]
pub enum Value {
    // Primitives
    /// Null value (also the "absent" sentinel at host boundaries)
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer value
    Int(i64),
    /// 64-bit floating-point value
    Float(f64),
    /// String value
    String(String),

    // Language objects
    /// Symbol (variable reference)
    Symbol(Symbol),
    /// Unevaluated call: callee followed by arguments
    Call(Rc<Vec<Value>>),
    /// The missing-argument marker
    Missing,

    // Collections
    /// Host-visible flat list of values
    Array(Rc<Vec<Value>>),

    // Lazy arguments
    /// Deferred cell
    Promise(Promise),
    /// Closure standing in for a deferred cell
    Closure(Rc<Closure>),
    /// Variadic chain or generic pairlist
    Pairlist(Chain),
    /// Non-owning scope handle
    Scope(ScopeId),
}

impl Value {
    /// Creates an array value from a vector of values
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(Rc::new(values))
    }

    /// Creates a call expression from a callee and arguments
    pub fn call(callee: Value, args: Vec<Value>) -> Self {
        let mut items = Vec::with_capacity(args.len() + 1);
        items.push(callee);
        items.extend(args);
        Value::Call(Rc::new(items))
    }

    /// Creates a symbol value
    pub fn symbol(name: impl AsRef<str>) -> Self {
        Value::Symbol(Symbol::new(name))
    }

    /// Creates a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Wraps a closure
    pub fn closure(closure: Closure) -> Self {
        Value::Closure(Rc::new(closure))
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Symbol(_) => "symbol".to_string(),
            Value::Call(_) => "call".to_string(),
            Value::Missing => "missing".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Promise(_) => "promise".to_string(),
            Value::Closure(_) => "closure".to_string(),
            Value::Pairlist(chain) => chain.kind().type_name().to_string(),
            Value::Scope(_) => "scope".to_string(),
        }
    }

    /// True for the missing-argument marker
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// True for null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the chain inside a pairlist value
    pub fn as_chain(&self) -> Result<&Chain> {
        match self {
            Value::Pairlist(chain) => Ok(chain),
            _ => Err(Error::type_error("pairlist", self.type_name())),
        }
    }

    /// Returns the deferred cell inside a promise value
    pub fn as_promise(&self) -> Result<&Promise> {
        match self {
            Value::Promise(p) => Ok(p),
            _ => Err(Error::type_error("promise", self.type_name())),
        }
    }

    /// Returns the scope handle inside a scope value
    pub fn as_scope(&self) -> Result<ScopeId> {
        match self {
            Value::Scope(id) => Ok(*id),
            _ => Err(Error::type_error("scope", self.type_name())),
        }
    }

    /// Returns a reference to the array value
    pub fn as_array(&self) -> Result<&Vec<Value>> {
        match self {
            Value::Array(arr) => Ok(arr),
            _ => Err(Error::type_error("array", self.type_name())),
        }
    }

    /// Returns the symbol inside a symbol value
    pub fn as_symbol(&self) -> Result<&Symbol> {
        match self {
            Value::Symbol(sym) => Ok(sym),
            _ => Err(Error::type_error("symbol", self.type_name())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Symbol(sym) => write!(f, "{}", sym),
            Value::Call(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Value::Missing => write!(f, "<missing>"),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            Value::Promise(p) => write!(f, "{}", p),
            Value::Closure(c) => write!(f, "{}", c),
            Value::Pairlist(chain) => write!(f, "{}", chain),
            Value::Scope(id) => write!(f, "{}", id),
        }
    }
}

// Deferred cells compare structurally so that a chain rebuilt from its
// closure list equals the original.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Call(a), Value::Call(b)) => a == b,
            (Value::Missing, Value::Missing) => true,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Promise(a), Value::Promise(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => a == b,
            (Value::Pairlist(a), Value::Pairlist(b)) => a == b,
            (Value::Scope(a), Value::Scope(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(fl) => serializer.serialize_f64(*fl),
            Value::String(s) => serializer.serialize_str(s),
            Value::Call(items) | Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Scope(id) => id.serialize(serializer),
            // Symbols and lazy-argument objects are shown by their printed form
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}
