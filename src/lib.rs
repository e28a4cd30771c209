//! # lazydots - lazy arguments and rest-argument lists
//!
//! Data structures and conversions for an interpreter's non-standard
//! evaluation machinery: capture unevaluated argument expressions together
//! with the scope they were written in, inspect or rewrite them without
//! forcing evaluation, splice argument lists together, and move named
//! bindings in and out of scopes.
//!
//! ## Representations
//!
//! - [`Promise`] - a deferred cell: expression, defining scope, cached value
//! - [`Chain`] - a variadic chain (`...`) or generic pairlist of optionally
//!   named [`Slot`]s
//! - [`IndexedSequence`] - flat, host-visible array form with optional names
//! - [`Closure`] - owned snapshot of a cell, for consumers that cannot hold
//!   scope references
//!
//! ## Quick Start
//!
//! ```rust
//! use lazydots::{
//!     extract_from_scope, inject_into_scope, read, ChainBuilder, Environment,
//!     ExtractOptions, Promise, Slot, Symbol, Value,
//! };
//!
//! # fn main() -> lazydots::Result<()> {
//! let mut env = Environment::new();
//! let caller = env.global();
//! let callee = env.new_scope(caller)?;
//!
//! // f(x + 1, y = 2) called from `caller`
//! let mut args = ChainBuilder::dots();
//! args.append(None, Slot::Deferred(Promise::new(read("(+ x 1)")?, caller)))
//!     .append(Some(Symbol::new("y")), Slot::Deferred(Promise::detach(Value::Int(2))));
//! env.define(callee, "...", Value::Pairlist(args.finish()))?;
//!
//! let closures = extract_from_scope(&env, callee, &["..."], &ExtractOptions::default())?;
//! assert_eq!(closures.len(), 2);
//! assert_eq!(closures.names().unwrap(), &["".to_string(), "y".to_string()]);
//!
//! // rebind `y` as an ordinary variable somewhere else
//! let named = lazydots::closures_to_chain(&closures).nth_tail(1);
//! let target = env.new_scope(caller)?;
//! inject_into_scope(&mut env, Some(&named), target, None)?;
//! assert!(env.exists(target, "y"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Forcing
//!
//! Nothing in this crate evaluates an expression. Hosts force a cell through
//! [`Promise::force_with`], which runs their evaluator once and caches the
//! value in place for every handle sharing the cell.

// Module declarations
/// Version of the lazydots crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod chain;
pub mod closure;
pub mod convert;
pub mod error;
#[cfg(feature = "reader")]
pub mod lexer;
#[cfg(feature = "reader")]
pub mod parser;
pub mod promise;
pub mod runtime;
pub mod scope;
pub mod sequence;

// Re-export main types
pub use chain::{
    concat, expressions_of, names_of, CellShape, Chain, ChainBuilder, ChainKind, Slot,
};
pub use closure::Closure;
pub use convert::{
    cells_to_chain, chain_to_cells, chain_to_closures, closure_list_value, closures_to_chain,
    concat_values, dots_exprs, dots_length, dots_names, from_closure_list, literals_to_chain,
    sequence_to_chain, to_closure_list, unpack, unpack_closures, values_to_pairlist, Unpacked,
    UnpackedRow,
};
pub use error::{Error, Result};
#[cfg(feature = "reader")]
pub use parser::{read, read_all, MAX_READ_DEPTH};
pub use promise::{Promise, PromiseState};
pub use runtime::{Environment, ScopeId, ScopeStore, Symbol, Value, VariadicBinding};
pub use scope::{
    extract_from_scope, get_dots, inject_into_scope, set_dots, ExtractOptions, VariadicPolicy,
};
pub use sequence::IndexedSequence;
