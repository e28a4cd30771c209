use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::chain::Chain;
use crate::error::{Error, Result};
use crate::runtime::{Symbol, Value};

/// Non-owning handle to a scope in an [`Environment`]
///
/// Handles stay valid only while the scope is live; a released slot bumps
/// its generation so stale handles fail instead of aliasing a new scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeId {
    index: usize,
    generation: u32,
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<scope:{}>", self.index)
    }
}

/// What a scope's variadic parameter is currently bound to
#[derive(Debug, Clone, PartialEq)]
pub enum VariadicBinding {
    /// `...` is not bound anywhere on the scope chain
    Absent,
    /// `...` is bound to the missing-argument marker
    Missing,
    /// `...` is bound to a variadic chain (possibly empty)
    Chain(Chain),
}

/// Symbol lookup and definition over scopes
///
/// This is the boundary to the host's scope store: the conversion code only
/// ever reads and writes bindings through it.
pub trait ScopeStore {
    /// Looks `name` up starting at `scope` and walking enclosing scopes
    fn lookup(&self, scope: ScopeId, name: &str) -> Result<Option<Value>>;

    /// Binds `name` in `scope` itself, overwriting any existing binding
    fn define(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<()>;

    /// Current binding of the variadic parameter visible from `scope`
    fn variadic_of(&self, scope: ScopeId) -> Result<VariadicBinding> {
        match self.lookup(scope, Symbol::DOTS)? {
            None => Ok(VariadicBinding::Absent),
            Some(Value::Missing) => Ok(VariadicBinding::Missing),
            Some(Value::Pairlist(chain)) if chain.is_dots() => Ok(VariadicBinding::Chain(chain)),
            Some(other) => Err(Error::type_error("dots", other.type_name())),
        }
    }
}

/// Single scope in the environment
#[derive(Debug, Clone)]
struct Scope {
    /// Variables defined in this scope
    variables: HashMap<String, Value>,
    /// Enclosing scope (None for the global scope)
    parent: Option<ScopeId>,
}

#[derive(Debug, Clone)]
struct Entry {
    generation: u32,
    scope: Option<Scope>,
}

/// Table of scopes addressed by [`ScopeId`]
#[derive(Debug, Clone)]
pub struct Environment {
    entries: Vec<Entry>,
    free: Vec<usize>,
}

impl Environment {
    /// Creates a new environment with a global scope
    pub fn new() -> Self {
        Environment {
            entries: vec![Entry {
                generation: 0,
                scope: Some(Scope {
                    variables: HashMap::new(),
                    parent: None,
                }),
            }],
            free: Vec::new(),
        }
    }

    /// Handle of the global scope
    pub fn global(&self) -> ScopeId {
        ScopeId {
            index: 0,
            generation: self.entries[0].generation,
        }
    }

    /// Creates a new scope enclosed by `parent`
    pub fn new_scope(&mut self, parent: ScopeId) -> Result<ScopeId> {
        self.scope(parent)?;
        let scope = Scope {
            variables: HashMap::new(),
            parent: Some(parent),
        };
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index];
            entry.scope = Some(scope);
            return Ok(ScopeId {
                index,
                generation: entry.generation,
            });
        }
        self.entries.push(Entry {
            generation: 0,
            scope: Some(scope),
        });
        Ok(ScopeId {
            index: self.entries.len() - 1,
            generation: 0,
        })
    }

    /// Releases a scope; its handles (and cells pointing at it) go stale
    pub fn release(&mut self, id: ScopeId) -> Result<()> {
        if id.index == 0 {
            return Err(Error::type_error("non-global scope", "global scope"));
        }
        self.scope(id)?;
        let entry = &mut self.entries[id.index];
        entry.scope = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
        Ok(())
    }

    /// True while `id` refers to a live scope
    pub fn is_live(&self, id: ScopeId) -> bool {
        self.scope(id).is_ok()
    }

    /// Enclosing scope of `id`
    pub fn parent(&self, id: ScopeId) -> Result<Option<ScopeId>> {
        Ok(self.scope(id)?.parent)
    }

    /// Defines a variable directly in `id`
    pub fn define(&mut self, id: ScopeId, name: impl Into<String>, value: Value) -> Result<()> {
        self.scope_mut(id)?.variables.insert(name.into(), value);
        Ok(())
    }

    /// Gets the value of a variable by name, walking enclosing scopes
    pub fn get(&self, id: ScopeId, name: &str) -> Result<Value> {
        self.find(id, name)?.ok_or_else(|| Error::UndefinedVariable {
            name: name.to_string(),
        })
    }

    /// Binding of `name` in `id` alone, without walking enclosing scopes
    pub fn get_local(&self, id: ScopeId, name: &str) -> Result<Option<Value>> {
        Ok(self.scope(id)?.variables.get(name).cloned())
    }

    /// Checks if a variable exists anywhere on the scope chain
    pub fn exists(&self, id: ScopeId, name: &str) -> bool {
        matches!(self.find(id, name), Ok(Some(_)))
    }

    /// Names bound directly in `id`, sorted
    pub fn local_names(&self, id: ScopeId) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.scope(id)?.variables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn find(&self, id: ScopeId, name: &str) -> Result<Option<Value>> {
        let mut current = id;
        loop {
            let scope = self.scope(current)?;
            if let Some(val) = scope.variables.get(name) {
                return Ok(Some(val.clone()));
            }
            match scope.parent {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
    }

    fn scope(&self, id: ScopeId) -> Result<&Scope> {
        self.entries
            .get(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.scope.as_ref())
            .ok_or_else(|| Error::type_error("scope", "released scope"))
    }

    fn scope_mut(&mut self, id: ScopeId) -> Result<&mut Scope> {
        self.entries
            .get_mut(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.scope.as_mut())
            .ok_or_else(|| Error::type_error("scope", "released scope"))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStore for Environment {
    fn lookup(&self, scope: ScopeId, name: &str) -> Result<Option<Value>> {
        self.find(scope, name)
    }

    fn define(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<()> {
        Environment::define(self, scope, name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainBuilder, Slot};

    #[test]
    fn test_basic_define_and_get() {
        let mut env = Environment::new();
        let global = env.global();
        env.define(global, "x", Value::Int(42)).unwrap();

        assert_eq!(env.get(global, "x").unwrap(), Value::Int(42));
    }

    #[test]
    fn test_undefined_variable() {
        let env = Environment::new();
        let result = env.get(env.global(), "undefined");
        assert_eq!(
            result.unwrap_err(),
            Error::UndefinedVariable {
                name: "undefined".to_string()
            }
        );
    }

    #[test]
    fn test_nested_scopes() {
        let mut env = Environment::new();
        let global = env.global();
        env.define(global, "x", Value::Int(1)).unwrap();

        let inner = env.new_scope(global).unwrap();
        env.define(inner, "y", Value::Int(2)).unwrap();

        assert_eq!(env.get(inner, "x").unwrap(), Value::Int(1));
        assert_eq!(env.get(inner, "y").unwrap(), Value::Int(2));
        assert!(env.get(global, "y").is_err());
        assert_eq!(env.get_local(inner, "x").unwrap(), None);
        assert_eq!(env.parent(inner).unwrap(), Some(global));
    }

    #[test]
    fn test_variable_shadowing() {
        let mut env = Environment::new();
        let global = env.global();
        env.define(global, "x", Value::Int(10)).unwrap();

        let inner = env.new_scope(global).unwrap();
        env.define(inner, "x", Value::string("shadowed")).unwrap();

        assert_eq!(env.get(inner, "x").unwrap(), Value::string("shadowed"));
        assert_eq!(env.get(global, "x").unwrap(), Value::Int(10));
    }

    #[test]
    fn test_released_scope_goes_stale() {
        let mut env = Environment::new();
        let global = env.global();
        let inner = env.new_scope(global).unwrap();
        env.release(inner).unwrap();

        assert!(!env.is_live(inner));
        assert_eq!(
            env.get(inner, "x").unwrap_err(),
            Error::type_error("scope", "released scope")
        );

        // the slot is reused under a new generation
        let reused = env.new_scope(global).unwrap();
        assert!(env.is_live(reused));
        assert!(!env.is_live(inner));
        assert!(env.release(global).is_err());
    }

    #[test]
    fn test_variadic_of() {
        let mut env = Environment::new();
        let global = env.global();
        assert_eq!(env.variadic_of(global).unwrap(), VariadicBinding::Absent);

        env.define(global, "...", Value::Missing).unwrap();
        assert_eq!(env.variadic_of(global).unwrap(), VariadicBinding::Missing);

        let mut builder = ChainBuilder::dots();
        builder.append(None, Slot::Missing);
        let chain = builder.finish();
        env.define(global, "...", Value::Pairlist(chain.clone())).unwrap();
        assert_eq!(
            env.variadic_of(global).unwrap(),
            VariadicBinding::Chain(chain)
        );

        env.define(global, "...", Value::Int(3)).unwrap();
        assert!(env.variadic_of(global).is_err());
    }

    #[test]
    fn test_local_names() {
        let mut env = Environment::new();
        let global = env.global();
        env.define(global, "b", Value::Null).unwrap();
        env.define(global, "a", Value::Null).unwrap();
        assert_eq!(env.local_names(global).unwrap(), vec!["a", "b"]);
        assert!(env.exists(global, "a"));
        assert!(!env.exists(global, "c"));
    }
}
