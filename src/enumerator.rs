//! Enumerators returned by `each` and `each_pair` when no consumer is given.
//!
//! An enumerator knows its size up front and can be iterated any number of
//! times; every pass starts over at the first member and reads the instance's
//! values as they are at that point. Sequence algorithms (map, filter, fold
//! and friends) come from [`Iterator`].

use std::iter::FusedIterator;

use crate::{instance::Instance, symbols::Symbol, value::Value};

pub struct Enumerator<T> {
    source: Instance,
    project: fn(Symbol, Value) -> T,
}

pub type Values = Enumerator<Value>;
pub type Pairs = Enumerator<(Symbol, Value)>;

impl<T> Enumerator<T> {
    pub(crate) fn new(source: Instance, project: fn(Symbol, Value) -> T) -> Self {
        Self { source, project }
    }

    /// Number of items a pass yields, known without iterating.
    pub fn size(&self) -> usize {
        self.source.len()
    }

    pub fn source(&self) -> &Instance {
        &self.source
    }

    /// Start a new pass.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            enumerator: self,
            next: 0,
        }
    }
}

impl<T> Clone for Enumerator<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            project: self.project,
        }
    }
}

impl<T> std::fmt::Debug for Enumerator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#<Enumerator: {}>", self.source)
    }
}

impl<'a, T> IntoIterator for &'a Enumerator<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a, T> {
    enumerator: &'a Enumerator<T>,
    next: usize,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let source = &self.enumerator.source;
        let member = source.schema().member(self.next)?;
        let value = source.slot(self.next);
        self.next += 1;
        Some((self.enumerator.project)(member, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.enumerator.size() - self.next;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
