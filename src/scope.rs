//! Moving bindings between scopes and variadic chains

use crate::chain::{self, Chain, ChainBuilder, Slot};
use crate::closure::Closure;
use crate::error::{Error, Result};
use crate::promise::Promise;
use crate::runtime::{ScopeId, ScopeStore, Symbol, Value, VariadicBinding};
use crate::sequence::IndexedSequence;

/// What [`extract_from_scope`] does with `...` when it is not expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariadicPolicy {
    /// Skip the variadic parameter
    #[default]
    Drop,
    /// Fail with [`Error::ReservedName`]
    Reject,
}

/// Options for [`extract_from_scope`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Keep names bound to the missing marker (as missing slots)
    pub include_missing: bool,
    /// Splice the nodes of `...` in place
    pub expand_variadic: bool,
    /// Handling of `...` when `expand_variadic` is false
    pub variadic_policy: VariadicPolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            include_missing: false,
            expand_variadic: true,
            variadic_policy: VariadicPolicy::Drop,
        }
    }
}

// A binding counts as missing if it is the marker itself or a cell whose
// source expression is the marker, forced or not.
fn is_missing_binding(found: &Value) -> bool {
    match found {
        Value::Missing => true,
        Value::Promise(cell) => cell.expr().is_missing(),
        _ => false,
    }
}

fn binding_to_slot(found: Value) -> Slot {
    match found {
        Value::Promise(cell) => Slot::Deferred(cell),
        Value::Missing => Slot::Missing,
        other => Slot::Deferred(Promise::detach(other)),
    }
}

/// Collects the named bindings of `scope` into a closure list
///
/// Every name must be bound (searching enclosing scopes). Promise bindings
/// are followed to their source cell first. Names bound to a missing
/// argument are skipped unless `include_missing` is set. `...` is spliced
/// node by node when `expand_variadic` is set; otherwise it is handled per
/// `variadic_policy`. Any other value is embedded as a detached cell.
pub fn extract_from_scope<S, N>(
    store: &S,
    scope: ScopeId,
    names: &[N],
    options: &ExtractOptions,
) -> Result<IndexedSequence<Closure>>
where
    S: ScopeStore + ?Sized,
    N: AsRef<str>,
{
    let mut builder = ChainBuilder::dots();

    for name in names {
        let name = name.as_ref();
        let mut found = store
            .lookup(scope, name)?
            .ok_or_else(|| Error::UndefinedVariable {
                name: name.to_string(),
            })?;
        if let Value::Promise(cell) = &found {
            found = Value::Promise(cell.unwrap_chain());
        }

        if !options.include_missing && is_missing_binding(&found) {
            tracing::trace!(name, "skipping missing binding");
            continue;
        }

        if name == Symbol::DOTS {
            if !options.expand_variadic {
                match options.variadic_policy {
                    VariadicPolicy::Drop => {
                        tracing::debug!("dropping unexpanded variadic parameter");
                        continue;
                    }
                    VariadicPolicy::Reject => {
                        return Err(Error::ReservedName {
                            name: Symbol::DOTS.to_string(),
                        })
                    }
                }
            }
            match &found {
                Value::Missing => {}
                Value::Pairlist(dots) if dots.is_dots() => {
                    tracing::trace!(count = dots.len(), "splicing variadic parameter");
                    builder.splice(dots);
                }
                other => return Err(Error::type_error("dots", other.type_name())),
            }
            continue;
        }

        let slot = if is_missing_binding(&found) {
            Slot::Missing
        } else {
            binding_to_slot(found)
        };
        builder.append(Some(Symbol::new(name)), slot);
    }

    tracing::debug!(count = builder.len(), "extracted bindings from scope");
    Ok(crate::convert::chain_to_closures(&builder.finish()))
}

fn check_injectable(chain: &Chain) -> Result<()> {
    chain.expect_dots()?;
    for (position, (name, _)) in chain.iter().enumerate() {
        let name = name.ok_or(Error::UnnamedBinding { position })?;
        if name.is_dots() {
            return Err(Error::ReservedName {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Defines every node of `chain` in `scope` by name
///
/// All nodes must be named and no name may be `...` (nodes given the empty
/// symbol are unnamed); the whole chain is checked before anything is
/// defined. If `extra` is given it is
/// appended to the scope's current variadic parameter (or becomes it, when
/// `...` is absent or missing). Returns `scope`.
pub fn inject_into_scope<S>(
    store: &mut S,
    chain: Option<&Chain>,
    scope: ScopeId,
    extra: Option<&Chain>,
) -> Result<ScopeId>
where
    S: ScopeStore + ?Sized,
{
    if let Some(chain) = chain {
        check_injectable(chain)?;
    }

    let new_dots = match extra {
        Some(extra) => {
            extra.expect_dots()?;
            Some(match store.variadic_of(scope)? {
                VariadicBinding::Chain(old) => chain::concat(&old, extra)?,
                VariadicBinding::Absent | VariadicBinding::Missing => extra.clone(),
            })
        }
        None => None,
    };

    if let Some(chain) = chain {
        for (name, slot) in chain.iter() {
            // names were checked above
            if let Some(name) = name {
                store.define(scope, name.as_str(), slot.to_value())?;
            }
        }
        tracing::debug!(count = chain.len(), "injected bindings into scope");
    }

    if let Some(dots) = new_dots {
        tracing::debug!(count = dots.len(), "replacing variadic parameter");
        store.define(scope, Symbol::DOTS, Value::Pairlist(dots))?;
    }

    Ok(scope)
}

/// The scope's variadic chain; `None` when `...` is absent or missing
pub fn get_dots<S>(store: &S, scope: ScopeId) -> Result<Option<Chain>>
where
    S: ScopeStore + ?Sized,
{
    match store.variadic_of(scope)? {
        VariadicBinding::Chain(chain) => Ok(Some(chain)),
        VariadicBinding::Absent | VariadicBinding::Missing => Ok(None),
    }
}

/// Binds the scope's variadic parameter; `None` binds the missing marker
pub fn set_dots<S>(store: &mut S, scope: ScopeId, dots: Option<&Chain>) -> Result<()>
where
    S: ScopeStore + ?Sized,
{
    match dots {
        Some(chain) => {
            chain.expect_dots()?;
            store.define(scope, Symbol::DOTS, Value::Pairlist(chain.clone()))
        }
        None => store.define(scope, Symbol::DOTS, Value::Missing),
    }
}
