//! Flat, optionally named sequences
//!
//! An [`IndexedSequence`] is the host-visible array form of a chain. When
//! names are present there is one per value; a blank entry means that
//! position is unnamed. Names are omitted entirely only when no position
//! carries one.

use serde::Serialize;

use crate::error::{Error, Result};

/// Values with an optional parallel name vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedSequence<T> {
    values: Vec<T>,
    names: Option<Vec<String>>,
}

impl<T> IndexedSequence<T> {
    /// Unnamed sequence
    pub fn new(values: Vec<T>) -> Self {
        IndexedSequence {
            values,
            names: None,
        }
    }

    /// Named sequence; `names` must have one entry per value
    pub fn with_names(values: Vec<T>, names: Vec<String>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(Error::type_error(
                format!("{} names", values.len()),
                format!("{} names", names.len()),
            ));
        }
        Ok(IndexedSequence {
            values,
            names: Some(names),
        })
    }

    /// Builds from `(name, value)` pairs; names are dropped if none is given
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Option<String>, T)>,
    {
        let (names, values): (Vec<Option<String>>, Vec<T>) = pairs.into_iter().unzip();
        let names = if names.iter().any(Option::is_some) {
            Some(names.into_iter().map(Option::unwrap_or_default).collect())
        } else {
            None
        };
        IndexedSequence { values, names }
    }

    // Callers guarantee matching lengths.
    pub(crate) fn from_parts(values: Vec<T>, names: Option<Vec<String>>) -> Self {
        debug_assert!(names.as_ref().map_or(true, |n| n.len() == values.len()));
        IndexedSequence { values, names }
    }

    /// Number of positions
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no positions
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values in order
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The name vector, if any position was named
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Name at `index`; blank entries read as unnamed
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names
            .as_ref()
            .and_then(|names| names.get(index))
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Iterates `(name, value)` with blank names read as `None`
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, value)| (self.name_at(i), value))
    }

    /// Applies `f` to every value, keeping the names
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> IndexedSequence<U> {
        IndexedSequence {
            values: self.values.iter().map(f).collect(),
            names: self.names.clone(),
        }
    }

    /// Splits into values and names
    pub fn into_parts(self) -> (Vec<T>, Option<Vec<String>>) {
        (self.values, self.names)
    }
}

impl<T> Default for IndexedSequence<T> {
    fn default() -> Self {
        IndexedSequence::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_names_checks_length() {
        let err = IndexedSequence::with_names(vec![1, 2], vec!["a".to_string()]).unwrap_err();
        assert_eq!(err, Error::type_error("2 names", "1 names"));
    }

    #[test]
    fn test_from_pairs_drops_absent_names() {
        let seq = IndexedSequence::from_pairs(vec![(None, 1), (None, 2)]);
        assert_eq!(seq.names(), None);

        let seq = IndexedSequence::from_pairs(vec![(None, 1), (Some("b".to_string()), 2)]);
        assert_eq!(seq.names().unwrap(), &["".to_string(), "b".to_string()]);
        assert_eq!(seq.name_at(0), None);
        assert_eq!(seq.name_at(1), Some("b"));
    }

    #[test]
    fn test_iter_and_map() {
        let seq = IndexedSequence::with_names(vec![1, 2], vec!["x".into(), "".into()]).unwrap();
        let pairs: Vec<_> = seq.iter().collect();
        assert_eq!(pairs, vec![(Some("x"), &1), (None, &2)]);

        let doubled = seq.map(|v| v * 2);
        assert_eq!(doubled.values(), &[2, 4]);
        assert_eq!(doubled.names(), seq.names());
    }
}
