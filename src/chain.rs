//! Variadic chains and generic pairlists
//!
//! A [`Chain`] is an immutable singly linked list of optionally named
//! [`Slot`]s. Nodes are reference counted so that a chain can share its tail
//! with another chain; the only way to create nodes is [`ChainBuilder`] (and
//! [`concat`], which copies its left operand). Cloning a `Chain` is O(1) and
//! never copies nodes.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::promise::Promise;
use crate::runtime::{Symbol, Value};
use crate::sequence::IndexedSequence;

/// Which kind of cells a chain is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    /// Ordinary list cells
    List,
    /// Rest-argument cells
    Dots,
}

impl ChainKind {
    /// Host-facing type name
    pub fn type_name(self) -> &'static str {
        match self {
            ChainKind::List => "pairlist",
            ChainKind::Dots => "dots",
        }
    }
}

/// Contents of one chain position
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Ordinary value (pairlist cells)
    Value(Value),
    /// Deferred cell, forced or not
    Deferred(Promise),
    /// Explicitly absent argument
    Missing,
}

/// Runtime shape of a slot, for exhaustive dispatch at conversion boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellShape {
    /// Ordinary value
    Ordinary,
    /// Deferred cell with a scope
    Deferred,
    /// Deferred cell built from a literal
    Detached,
    /// Missing argument
    Missing,
}

impl Slot {
    /// Classifies a host value: promises and the missing marker keep their meaning
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Promise(p) => Slot::Deferred(p),
            Value::Missing => Slot::Missing,
            other => Slot::Value(other),
        }
    }

    /// Host value stored at this position
    pub fn to_value(&self) -> Value {
        match self {
            Slot::Value(v) => v.clone(),
            Slot::Deferred(p) => Value::Promise(p.clone()),
            Slot::Missing => Value::Missing,
        }
    }

    /// Runtime shape
    pub fn shape(&self) -> CellShape {
        match self {
            Slot::Value(_) => CellShape::Ordinary,
            Slot::Deferred(p) if p.is_detached() => CellShape::Detached,
            Slot::Deferred(_) => CellShape::Deferred,
            Slot::Missing => CellShape::Missing,
        }
    }

    /// True for the missing marker
    pub fn is_missing(&self) -> bool {
        matches!(self, Slot::Missing)
    }

    /// Source expression: deferred cells are followed through promise chains
    pub fn source_expr(&self) -> Value {
        match self {
            Slot::Value(v) => v.clone(),
            Slot::Deferred(p) => p.unwrap_chain().expr(),
            Slot::Missing => Value::Missing,
        }
    }
}

type Link = Option<Rc<Node>>;

struct Node {
    name: Option<Symbol>,
    slot: Slot,
    next: Link,
}

// Long chains would otherwise drop recursively, one stack frame per node.
impl Drop for Node {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(mut node) => next = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

/// Ordered, optionally named sequence of slots
#[derive(Clone)]
pub struct Chain {
    kind: ChainKind,
    head: Link,
}

impl Chain {
    /// Empty chain of the given kind
    pub fn empty(kind: ChainKind) -> Self {
        Chain { kind, head: None }
    }

    /// The canonical empty variadic chain
    pub fn empty_dots() -> Self {
        Chain::empty(ChainKind::Dots)
    }

    /// Empty generic pairlist
    pub fn empty_list() -> Self {
        Chain::empty(ChainKind::List)
    }

    /// Builds a chain from `(name, slot)` pairs in order
    pub fn from_entries<I>(kind: ChainKind, entries: I) -> Self
    where
        I: IntoIterator<Item = (Option<Symbol>, Slot)>,
    {
        let mut builder = ChainBuilder::new(kind);
        for (name, slot) in entries {
            builder.append(name, slot);
        }
        builder.finish()
    }

    /// Kind of cells
    pub fn kind(&self) -> ChainKind {
        self.kind
    }

    /// True for variadic chains
    pub fn is_dots(&self) -> bool {
        self.kind == ChainKind::Dots
    }

    /// Counts nodes by traversal
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True if the chain has no nodes
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Iterates `(name, slot)` in order
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            next: self.head.as_deref(),
        }
    }

    /// The chain after dropping the first `n` nodes, sharing structure
    pub fn nth_tail(&self, n: usize) -> Chain {
        let mut link = self.head.clone();
        for _ in 0..n {
            link = match link {
                Some(node) => node.next.clone(),
                None => break,
            };
        }
        Chain {
            kind: self.kind,
            head: link,
        }
    }

    /// True if both chains start at the same node (or are both empty)
    pub fn ptr_eq(&self, other: &Chain) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Fails with a type error unless this is a variadic chain
    pub fn expect_dots(&self) -> Result<&Chain> {
        if self.is_dots() {
            Ok(self)
        } else {
            Err(Error::type_error("dots", self.kind.type_name()))
        }
    }
}

impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        let mut a = self.iter();
        let mut b = other.iter();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some(x), Some(y)) if x == y => {}
                _ => return false,
            }
        }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}", self.kind.type_name())?;
        for (name, slot) in self.iter() {
            write!(f, " ")?;
            if let Some(name) = name {
                write!(f, "{}=", name)?;
            }
            write!(f, "{}", slot.to_value())?;
        }
        write!(f, ">")
    }
}

/// Iterator over a chain's nodes
pub struct ChainIter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (Option<&'a Symbol>, &'a Slot);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some((node.name.as_ref(), &node.slot))
    }
}

/// Append-only builder for a chain
///
/// Entries stay private to the builder until [`ChainBuilder::finish`], so a
/// failure part-way through building never exposes a partial chain.
pub struct ChainBuilder {
    kind: ChainKind,
    entries: Vec<(Option<Symbol>, Slot)>,
}

impl ChainBuilder {
    /// Builder for a chain of `kind`
    pub fn new(kind: ChainKind) -> Self {
        ChainBuilder {
            kind,
            entries: Vec::new(),
        }
    }

    /// Builder for a variadic chain
    pub fn dots() -> Self {
        ChainBuilder::new(ChainKind::Dots)
    }

    /// Appends one node; the empty symbol leaves it unnamed
    pub fn append(&mut self, name: Option<Symbol>, slot: Slot) -> &mut Self {
        let name = name.filter(|n| !n.is_missing_arg());
        self.entries.push((name, slot));
        self
    }

    /// Appends every node of `chain`, keeping names and order
    pub fn splice(&mut self, chain: &Chain) -> &mut Self {
        self.entries
            .extend(chain.iter().map(|(name, slot)| (name.cloned(), slot.clone())));
        self
    }

    /// Nodes appended so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was appended
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Links the nodes into a chain
    pub fn finish(self) -> Chain {
        self.finish_onto(None)
    }

    fn finish_onto(self, tail: Link) -> Chain {
        let mut head = tail;
        for (name, slot) in self.entries.into_iter().rev() {
            head = Some(Rc::new(Node {
                name,
                slot,
                next: head,
            }));
        }
        Chain {
            kind: self.kind,
            head,
        }
    }
}

/// Concatenates two chains of the same kind
///
/// An empty operand returns the other unchanged. Otherwise the nodes of `a`
/// are copied and the copy's last node links to `b`'s first node, so the
/// result shares `b` rather than duplicating it.
pub fn concat(a: &Chain, b: &Chain) -> Result<Chain> {
    if a.kind != b.kind {
        return Err(Error::type_error(a.kind.type_name(), b.kind.type_name()));
    }
    if a.is_empty() {
        return Ok(b.clone());
    }
    if b.is_empty() {
        return Ok(a.clone());
    }
    let mut builder = ChainBuilder::new(a.kind);
    builder.splice(a);
    tracing::trace!(prefix = builder.len(), "concatenating chains");
    Ok(builder.finish_onto(b.head.clone()))
}

/// Names of the nodes, or `None` when no node carries a name
///
/// Unnamed positions are blank in a returned vector.
pub fn names_of(chain: &Chain) -> Option<Vec<String>> {
    if chain.iter().all(|(name, _)| name.is_none()) {
        return None;
    }
    Some(
        chain
            .iter()
            .map(|(name, _)| name.map(|n| n.as_str().to_string()).unwrap_or_default())
            .collect(),
    )
}

/// Source expression of every node, named like the chain
pub fn expressions_of(chain: &Chain) -> IndexedSequence<Value> {
    let values = chain.iter().map(|(_, slot)| slot.source_expr()).collect();
    IndexedSequence::from_parts(values, names_of(chain))
}
