//! Fan-out of one cursor into many independently paced cursors.
//!
//! Values pulled from the source are cached in a shared, append-only,
//! singly linked chain. Every [`TeeCursor`] holds a pointer to its current
//! node; nodes no cursor can reach any more are freed, so the retained
//! buffer spans from the slowest live cursor to the fastest one.

use crate::io::base::Cursor;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

struct Node<T> {
    /// `None` only for the head sentinel every cursor starts on.
    value: Option<T>,
    /// Written at most once, under the source lock.
    next: OnceLock<Arc<Node<T>>>,
}

impl<T> Node<T> {
    fn head() -> Self {
        Self {
            value: None,
            next: OnceLock::new(),
        }
    }

    fn new(value: T) -> Self {
        Self {
            value: Some(value),
            next: OnceLock::new(),
        }
    }
}

impl<T> Drop for Node<T> {
    // Unlink iteratively; a long uniquely owned tail would otherwise be
    // dropped recursively.
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(node) = next {
            match Arc::into_inner(node) {
                Some(mut node) => next = node.next.take(),
                None => break,
            }
        }
    }
}

/// The one source cursor all tee cursors read from.
///
/// The cursor is only touched under the mutex, so it needs to be `Send`
/// but not `Sync` for the tee cursors to cross threads.
struct TeeState<C> {
    source: Mutex<C>,
    /// Set once, under the mutex, when the source reports the end.
    exhausted: AtomicBool,
}

impl<C> TeeState<C>
where
    C: Cursor,
    C::Item: Clone,
{
    fn new(cursor: C) -> Self {
        Self {
            source: Mutex::new(cursor),
            exhausted: AtomicBool::new(false),
        }
    }

    /// Successor of `cur`, pulling it from the source if no cursor has yet.
    fn advance(&self, cur: &Node<C::Item>) -> Option<Arc<Node<C::Item>>> {
        if let Some(next) = cur.next.get() {
            return Some(next.clone());
        }
        // Without a successor `cur` is the chain tail, so a finished source
        // has nothing more for it.
        if self.exhausted.load(Ordering::Acquire) {
            return None;
        }

        let mut src = self.source.lock();
        // Another cursor may have extended the chain while we waited.
        if let Some(next) = cur.next.get() {
            return Some(next.clone());
        }
        if self.exhausted.load(Ordering::Relaxed) {
            return None;
        }

        if !src.next() {
            self.exhausted.store(true, Ordering::Release);
            tracing::trace!("[Tee] source exhausted");
            return None;
        }

        let node = Arc::new(Node::new(src.value().clone()));
        let _ = cur.next.set(node.clone());
        tracing::trace!("[Tee] chain extended");
        Some(node)
    }
}

/// One of several cursors replaying the same source sequence.
///
/// Cloning a `TeeCursor` yields a cursor at the same position; the two
/// advance independently from then on. All cursors of one fan-out may be used
/// from different threads as long as the source is `Send` and its items are
/// `Send + Sync`; the source is advanced exactly once per position however
/// many cursors race for it.
pub struct TeeCursor<C: Cursor> {
    st: Arc<TeeState<C>>,
    cur: Arc<Node<C::Item>>,
}

impl<C> TeeCursor<C>
where
    C: Cursor,
    C::Item: Clone,
{
    fn new(source: C) -> Self {
        Self {
            st: Arc::new(TeeState::new(source)),
            cur: Arc::new(Node::head()),
        }
    }
}

impl<C> Cursor for TeeCursor<C>
where
    C: Cursor,
    C::Item: Clone,
{
    type Item = C::Item;

    fn next(&mut self) -> bool {
        match self.st.advance(&self.cur) {
            Some(node) => {
                self.cur = node;
                true
            }
            None => false,
        }
    }

    fn value(&self) -> &Self::Item {
        match self.cur.value.as_ref() {
            Some(v) => v,
            None => panic!("TeeCursor::value called before the first successful next"),
        }
    }
}

impl<C: Cursor> Clone for TeeCursor<C> {
    fn clone(&self) -> Self {
        Self {
            st: self.st.clone(),
            cur: self.cur.clone(),
        }
    }
}

impl<C: Cursor> fmt::Debug for TeeCursor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeeCursor")
            .field("started", &self.cur.value.is_some())
            .finish()
    }
}

/// Splits `source` into two cursors. The source must not be used elsewhere
/// afterwards, which taking it by value enforces.
pub fn tee<C>(source: C) -> (TeeCursor<C>, TeeCursor<C>)
where
    C: Cursor,
    C::Item: Clone,
{
    let first = TeeCursor::new(source);
    let second = first.clone();
    (first, second)
}

/// Splits `source` into `n` cursors. Returns an empty vector for `n == 0`,
/// dropping the source.
pub fn tee_n<C>(source: C, n: usize) -> Vec<TeeCursor<C>>
where
    C: Cursor,
    C::Item: Clone,
{
    if n == 0 {
        return Vec::new();
    }

    let first = TeeCursor::new(source);
    let mut out = Vec::with_capacity(n);
    for _ in 1..n {
        out.push(first.clone());
    }
    out.push(first);
    out
}
