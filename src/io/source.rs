use crate::io::base::Cursor;

/// Cursor over any std iterator: slices, ranges, vectors, maps.
#[derive(Debug, Clone)]
pub struct IterCursor<I: Iterator> {
    iter: I,
    cur: Option<I::Item>,
}

impl<I: Iterator> IterCursor<I> {
    pub fn new<S: IntoIterator<IntoIter = I>>(src: S) -> Self {
        Self {
            iter: src.into_iter(),
            cur: None,
        }
    }
}

impl<I: Iterator> Cursor for IterCursor<I> {
    type Item = I::Item;

    #[inline]
    fn next(&mut self) -> bool {
        self.cur = self.iter.next();
        self.cur.is_some()
    }

    fn value(&self) -> &Self::Item {
        match self.cur.as_ref() {
            Some(v) => v,
            None => panic!("IterCursor::value called without a current item"),
        }
    }
}

/// Shorthand for [`IterCursor::new`].
pub fn from_iter<S: IntoIterator>(src: S) -> IterCursor<S::IntoIter> {
    IterCursor::new(src)
}

/// Cursor calling a pull function until it returns `None`.
pub struct FnCursor<T, F> {
    pull: F,
    cur: Option<T>,
}

impl<T, F> FnCursor<T, F>
where
    F: FnMut() -> Option<T>,
{
    pub fn new(pull: F) -> Self {
        Self { pull, cur: None }
    }
}

impl<T, F> Cursor for FnCursor<T, F>
where
    F: FnMut() -> Option<T>,
{
    type Item = T;

    #[inline]
    fn next(&mut self) -> bool {
        self.cur = (self.pull)();
        self.cur.is_some()
    }

    fn value(&self) -> &Self::Item {
        match self.cur.as_ref() {
            Some(v) => v,
            None => panic!("FnCursor::value called without a current item"),
        }
    }
}

/// Shorthand for [`FnCursor::new`].
pub fn pull_fn<T, F: FnMut() -> Option<T>>(pull: F) -> FnCursor<T, F> {
    FnCursor::new(pull)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iter_cursor_walks_slice() {
        let data = [3, 1, 4];
        let mut c = from_iter(data.iter().copied());
        let mut seen = Vec::new();
        while c.next() {
            seen.push(*c.value());
        }
        assert_eq!(seen, data);
        assert!(!c.next());
    }

    #[test]
    fn fn_cursor_stops_on_none() {
        let mut n = 0;
        let mut c = pull_fn(|| {
            n += 1;
            (n <= 2).then_some(n)
        });
        assert!(c.next());
        assert_eq!(*c.value(), 1);
        assert!(c.next());
        assert_eq!(*c.value(), 2);
        assert!(!c.next());
    }
}
