//! Green tree iterators.

use std::{iter::FusedIterator, slice};

use super::{GreenElement, GreenElementRef};

/// An iterator over a [`GreenNode`](crate::GreenNode)'s children.
#[derive(Debug, Clone)]
pub struct GreenNodeChildren<'a> {
    pub(super) inner: slice::Iter<'a, GreenElement>,
}

impl ExactSizeIterator for GreenNodeChildren<'_> {
    #[inline(always)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<'a> Iterator for GreenNodeChildren<'a> {
    type Item = GreenElementRef<'a>;

    #[inline]
    fn next(&mut self) -> Option<GreenElementRef<'a>> {
        self.inner.next().map(GreenElement::as_deref)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.inner.nth(n).map(GreenElement::as_deref)
    }
}

impl<'a> DoubleEndedIterator for GreenNodeChildren<'a> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(GreenElement::as_deref)
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.inner.nth_back(n).map(GreenElement::as_deref)
    }
}

impl FusedIterator for GreenNodeChildren<'_> {}
