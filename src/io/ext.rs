use crate::io::base::Cursor;
use crate::tee::{self, TeeCursor};

/// Stops after `n` items. Never pulls the inner cursor past the limit.
#[derive(Debug, Clone)]
pub struct Limit<C> {
    inner: C,
    left: usize,
}

impl<C: Cursor> Cursor for Limit<C> {
    type Item = C::Item;

    fn next(&mut self) -> bool {
        if self.left == 0 {
            return false;
        }
        self.left -= 1;
        self.inner.next()
    }

    #[inline]
    fn value(&self) -> &Self::Item {
        self.inner.value()
    }
}

/// Pairs of items from two cursors, until either runs dry.
pub struct Zip<L: Cursor, R: Cursor> {
    left: L,
    right: R,
    cur: Option<(L::Item, R::Item)>,
}

impl<L, R> Cursor for Zip<L, R>
where
    L: Cursor,
    R: Cursor,
    L::Item: Clone,
    R::Item: Clone,
{
    type Item = (L::Item, R::Item);

    fn next(&mut self) -> bool {
        self.cur = if self.left.next() && self.right.next() {
            Some((self.left.value().clone(), self.right.value().clone()))
        } else {
            None
        };
        self.cur.is_some()
    }

    fn value(&self) -> &Self::Item {
        match self.cur.as_ref() {
            Some(v) => v,
            None => panic!("Zip::value called without a current item"),
        }
    }
}

/// A cursor as a std [`Iterator`] of cloned items.
#[derive(Debug, Clone)]
pub struct CursorIter<C>(C);

impl<C> Iterator for CursorIter<C>
where
    C: Cursor,
    C::Item: Clone,
{
    type Item = C::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if Cursor::next(&mut self.0) {
            Some(self.0.value().clone())
        } else {
            None
        }
    }
}

/// Combinators available on every [`Cursor`].
pub trait CursorExt: Cursor + Sized {
    fn limit(self, n: usize) -> Limit<Self> {
        Limit {
            inner: self,
            left: n,
        }
    }

    fn zip<R: Cursor>(self, right: R) -> Zip<Self, R> {
        Zip {
            left: self,
            right,
            cur: None,
        }
    }

    fn into_std_iter(self) -> CursorIter<Self> {
        CursorIter(self)
    }

    /// Drains the cursor into a vector.
    fn to_vec(mut self) -> Vec<Self::Item>
    where
        Self::Item: Clone,
    {
        let mut out = Vec::new();
        while self.next() {
            out.push(self.value().clone());
        }
        out
    }

    /// Advances once and returns the item, or `default` if exhausted.
    fn head_or(&mut self, default: Self::Item) -> Self::Item
    where
        Self::Item: Clone,
    {
        if self.next() {
            self.value().clone()
        } else {
            default
        }
    }

    /// Calls `f` with every remaining item.
    fn apply<F: FnMut(&Self::Item)>(&mut self, mut f: F) {
        while self.next() {
            f(self.value());
        }
    }

    /// Calls `f` with items until it returns true. Returns whether it did.
    fn each<F: FnMut(&Self::Item) -> bool>(&mut self, mut f: F) -> bool {
        while self.next() {
            if f(self.value()) {
                return true;
            }
        }
        false
    }

    fn tee(self) -> (TeeCursor<Self>, TeeCursor<Self>)
    where
        Self::Item: Clone,
    {
        tee::tee(self)
    }

    fn tee_n(self, n: usize) -> Vec<TeeCursor<Self>>
    where
        Self::Item: Clone,
    {
        tee::tee_n(self, n)
    }
}

impl<C: Cursor> CursorExt for C {}
