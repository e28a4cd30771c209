//! Host runtime objects: values, symbols and the scope table

mod environment;
mod value;

pub use environment::{Environment, ScopeId, ScopeStore, VariadicBinding};
pub use value::{Symbol, Value};
