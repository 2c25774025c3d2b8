use std::marker::PhantomData;

/// The pull protocol shared by every cursor in the crate.
///
/// A cursor starts positioned before its first item. Each successful
/// [`next`](Cursor::next) moves it onto a new item which then stays readable
/// through [`value`](Cursor::value) until the following `next`.
///
/// Calling `value` before the first successful `next`, or after `next`
/// returned false, is a precondition violation; implementations may panic.
pub trait Cursor {
    /// Item type yielded by this cursor.
    type Item;

    /// Advances to the next item. Returns false once the cursor is exhausted.
    fn next(&mut self) -> bool;

    /// Current item.
    fn value(&self) -> &Self::Item;
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    type Item = C::Item;

    #[inline]
    fn next(&mut self) -> bool {
        (**self).next()
    }

    #[inline]
    fn value(&self) -> &Self::Item {
        (**self).value()
    }
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    type Item = C::Item;

    #[inline]
    fn next(&mut self) -> bool {
        (**self).next()
    }

    #[inline]
    fn value(&self) -> &Self::Item {
        (**self).value()
    }
}

/// Cursor that never yields anything.
#[derive(Debug)]
pub struct NullCursor<T>(PhantomData<fn() -> T>);

impl<T> NullCursor<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for NullCursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NullCursor<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Cursor for NullCursor<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> bool {
        false
    }

    fn value(&self) -> &Self::Item {
        panic!("NullCursor::value called on an empty cursor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_cursor_is_exhausted() {
        let mut c = NullCursor::<u8>::new();
        assert!(!c.next());
        assert!(!c.next());
    }

    #[test]
    fn boxed_and_borrowed_cursors_forward() {
        let mut inner = NullCursor::<u8>::default();
        let mut by_ref: &mut NullCursor<u8> = &mut inner;
        assert!(!Cursor::next(&mut by_ref));

        let mut boxed: Box<dyn Cursor<Item = u8>> = Box::new(NullCursor::new());
        assert!(!boxed.next());
    }
}
