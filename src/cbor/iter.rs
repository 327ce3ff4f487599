//! Single-pass forward iteration over CBOR arrays and maps.

use crate::cbor::cursor::{Cursor, Type};
use crate::error::{Error, Result};

/// A forward-only iterator over an array's or map's children.
///
/// The first call to [`Iter::next_child`] enters the first element; each
/// subsequent call steps over the previous value, descending into nested
/// containers to skip exactly their `count` (arrays) or `2*count` (maps)
/// nested items so the walk never misparses a sibling as a child.
pub struct Iter<'a> {
    container: Cursor<'a>,
    child: Cursor<'a>,
    key: Result<Cursor<'a>>,
    container_count: usize,
    container_index: usize,
    started: bool,
    error: Option<Error>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(container: Cursor<'a>) -> Self {
        Iter {
            child: container,
            key: Err(Error::NotFound),
            container,
            container_count: 0,
            container_index: 0,
            started: false,
            error: None,
        }
    }

    /// The key cursor for the most recently visited map entry, or
    /// `Err(Error::NotFound)` when iterating an array.
    pub fn key(&self) -> Result<Cursor<'a>> {
        self.key
    }

    /// The sticky error, if iteration has failed.
    pub fn error(&self) -> Option<Error> {
        self.error
    }

    fn first(&mut self) -> Option<Result<Cursor<'a>>> {
        let info = match self.container.info() {
            Ok(info) => info,
            Err(e) => {
                self.error = Some(e);
                return Some(Err(e));
            }
        };

        if info.value == 0 {
            return None;
        }

        let mut follow = self.container;
        match info.ty {
            Type::Array => {
                if let Err(e) = follow.step() {
                    self.error = Some(e);
                    return Some(Err(e));
                }
                self.container_count = info.value as usize;
                self.container_index = 0;
                self.key = Err(Error::NotFound);
                self.child = follow;
                Some(Ok(follow))
            }
            Type::Map => {
                if let Err(e) = follow.step() {
                    self.error = Some(e);
                    return Some(Err(e));
                }
                if !follow.check_type(&[Type::String]) {
                    self.error = Some(Error::BadData);
                    return Some(Err(Error::BadData));
                }
                self.key = Ok(follow);
                if let Err(e) = follow.step() {
                    self.error = Some(e);
                    return Some(Err(e));
                }
                self.container_count = info.value as usize;
                self.container_index = 0;
                self.child = follow;
                Some(Ok(follow))
            }
            _ => {
                self.error = Some(Error::InvalidOperation);
                Some(Err(Error::InvalidOperation))
            }
        }
    }

    fn next(&mut self) -> Option<Result<Cursor<'a>>> {
        let has_key = self.container.get_type() == Type::Map;

        if self.container_count == 0 {
            self.error = Some(Error::InvalidOperation);
            return Some(Err(Error::InvalidOperation));
        }

        if self.container_index + 1 == self.container_count {
            return None;
        }
        self.container_index += 1;

        let mut follow = self.child;

        let mut skip: i64 = 1;
        while skip != 0 {
            match follow.get_type() {
                Type::Array => match follow.get_length() {
                    Ok(n) => skip += n as i64,
                    Err(e) => {
                        self.error = Some(e);
                        return Some(Err(e));
                    }
                },
                Type::Map => match follow.get_length() {
                    Ok(n) => skip += 2 * n as i64,
                    Err(e) => {
                        self.error = Some(e);
                        return Some(Err(e));
                    }
                },
                _ => {}
            }

            if let Err(e) = follow.step() {
                self.error = Some(e);
                return Some(Err(e));
            }
            skip -= 1;
        }

        if has_key {
            if !follow.check_type(&[Type::String]) {
                self.error = Some(Error::BadData);
                return Some(Err(Error::BadData));
            }
            self.key = Ok(follow);
            if let Err(e) = follow.step() {
                self.error = Some(e);
                return Some(Err(e));
            }
        } else {
            self.key = Err(Error::NotFound);
        }

        self.child = follow;
        Some(Ok(follow))
    }

    /// Advances to the next child, returning `None` once the container is
    /// exhausted (or immediately, if already in an error state).
    pub fn next_child(&mut self) -> Option<Result<Cursor<'a>>> {
        if self.error.is_some() {
            return None;
        }
        if !self.started {
            self.started = true;
            return self.first();
        }
        self.next()
    }
}
