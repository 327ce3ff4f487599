//! Forward iteration over an RLP array's children.

use crate::rlp::cursor::Cursor;
use crate::error::{Error, Result};

/// A forward-only iterator over an RLP array's children.
///
/// Invariant: `next_offset <= container_end` always holds; a child whose
/// encoded size would cross `container_end` is reported as
/// [`Error::BadData`].
pub struct Iter<'a> {
    child: Cursor<'a>,
    next_offset: usize,
    container_end: usize,
    error: Option<Error>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(container: Cursor<'a>) -> Self {
        match container.head() {
            Ok(head) => Iter {
                child: container,
                next_offset: head.content_offset,
                container_end: head.content_offset + head.content_length,
                error: None,
            },
            Err(e) => Iter { child: container, next_offset: 0, container_end: 0, error: Some(e) },
        }
    }

    /// The sticky error, if iteration has failed.
    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// Advances to the next child, returning `None` once the container is
    /// exhausted (or immediately, if already in an error state).
    pub fn next_child(&mut self) -> Option<Result<Cursor<'a>>> {
        if self.error.is_some() {
            return None;
        }
        if self.next_offset >= self.container_end {
            return None;
        }

        let cursor = Cursor::at(self.child.data, self.next_offset);
        let head = match cursor.head() {
            Ok(h) => h,
            Err(e) => {
                self.error = Some(e);
                return Some(Err(e));
            }
        };

        let end = self.next_offset + head.item_size;
        if end > self.container_end {
            self.error = Some(Error::BadData);
            return Some(Err(Error::BadData));
        }

        self.next_offset = end;
        self.child = cursor;
        Some(Ok(cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterate_visits_each_child_once() {
        let bytes = hex_literal::hex!("c8 83 63 61 74 83 64 6f 67");
        let cursor = Cursor::walk(&bytes);
        let mut iter = cursor.iterate();
        let mut items = vec![];
        while let Some(c) = iter.next_child() {
            items.push(c.unwrap().get_data().unwrap().to_vec());
        }
        assert_eq!(items, vec![b"cat".to_vec(), b"dog".to_vec()]);
        assert!(iter.error().is_none());
        assert_eq!(iter.next_offset, iter.container_end);
    }
}
