// src/stream/nested.rs

//! Nested producers and their flattening.
//!
//! A [`Nested`] value describes where leaves come from: nothing, a single
//! leaf, an ordered sequence of further producers, a lazy stream of
//! producers, or a deferred computation yielding a producer. [`flatten`]
//! walks that structure depth-first and yields the leaves in order, doing no
//! work until the resulting stream is polled.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::hash::Hash;

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};

use crate::errors::Result;

pub enum Nested<T> {
    /// Absence: contributes nothing.
    Empty,
    Leaf(T),
    Seq(Vec<Nested<T>>),
    Lazy(BoxStream<'static, Result<Nested<T>>>),
    Deferred(BoxFuture<'static, Result<Nested<T>>>),
}

impl<T: Send + 'static> Nested<T> {
    pub fn lazy<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Nested<T>>> + Send + 'static,
    {
        Nested::Lazy(stream.boxed())
    }

    pub fn deferred<F>(fut: F) -> Self
    where
        F: Future<Output = Result<Nested<T>>> + Send + 'static,
    {
        Nested::Deferred(fut.boxed())
    }

    /// A lazy stream of plain leaves.
    pub fn leaves<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        Nested::Lazy(stream.map_ok(Nested::Leaf).boxed())
    }
}

impl<T> Default for Nested<T> {
    fn default() -> Self {
        Nested::Empty
    }
}

impl<T> FromIterator<Nested<T>> for Nested<T> {
    fn from_iter<I: IntoIterator<Item = Nested<T>>>(iter: I) -> Self {
        Nested::Seq(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for Nested<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nested::Empty => f.write_str("Empty"),
            Nested::Leaf(v) => f.debug_tuple("Leaf").field(v).finish(),
            Nested::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
            Nested::Lazy(_) => f.write_str("Lazy(..)"),
            Nested::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Yield every leaf of `input`, depth-first, in producer order.
pub fn flatten<T: Send + 'static>(input: Nested<T>) -> BoxStream<'static, Result<T>> {
    match input {
        Nested::Empty => stream::empty().boxed(),
        Nested::Leaf(value) => stream::once(future::ready(Ok(value))).boxed(),
        Nested::Seq(items) => stream::iter(items).flat_map(flatten::<T>).boxed(),
        Nested::Lazy(inner) => inner.flat_map(flatten_result::<T>).boxed(),
        Nested::Deferred(fut) => fut.into_stream().flat_map(flatten_result::<T>).boxed(),
    }
}

fn flatten_result<T: Send + 'static>(item: Result<Nested<T>>) -> BoxStream<'static, Result<T>> {
    match item {
        Ok(nested) => flatten(nested),
        Err(err) => stream::once(future::ready(Err(err))).boxed(),
    }
}

/// Like [`flatten`], but each distinct leaf is yielded only the first time it
/// is seen.
pub fn unique<T>(input: Nested<T>) -> BoxStream<'static, Result<T>>
where
    T: Eq + Hash + Clone + Send + 'static,
{
    let mut seen = HashSet::new();
    flatten(input)
        .try_filter(move |value| future::ready(seen.insert(value.clone())))
        .boxed()
}
