use std::{fmt, hash};

use lasso::{Resolver, Spur};
use text_size::TextSize;
use triomphe::Arc;

use crate::kind::{RawKind, TemplateKind};

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub(super) struct GreenTokenData {
    pub(super) kind:     RawKind,
    pub(super) text:     Spur,
    pub(super) text_len: TextSize,
}

/// Leaf token in the immutable "green" tree.
///
/// Stores an interned key for its source text instead of the text itself;
/// resolving the key requires the interner the token was built with.
#[derive(Clone)]
pub struct GreenToken {
    data: Arc<GreenTokenData>,
}

impl GreenToken {
    #[inline]
    pub(super) fn new(data: GreenTokenData) -> GreenToken {
        GreenToken { data: Arc::new(data) }
    }

    /// [`TemplateKind`] of this token.
    #[inline]
    pub fn kind(&self) -> TemplateKind {
        TemplateKind::from_raw(self.data.kind)
    }

    /// The raw kind tag of this token.
    #[inline]
    pub fn raw_kind(&self) -> RawKind {
        self.data.kind
    }

    /// The original source text of this token.
    #[inline]
    pub fn text<'i, I>(&self, resolver: &'i I) -> &'i str
    where
        I: Resolver + ?Sized,
    {
        resolver.resolve(&self.data.text)
    }

    /// The interned key of this token's text.
    ///
    /// Keys of strings interned by the same interner compare equal iff the
    /// strings are equal, which lets the blender compare token text without
    /// resolving it.
    #[inline]
    pub fn text_key(&self) -> Spur {
        self.data.text
    }

    /// Returns the length of text covered by this token.
    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.data.text_len
    }

    /// Whether two green tokens are the same allocation.
    #[inline]
    pub fn ptr_eq(this: &GreenToken, other: &GreenToken) -> bool {
        Arc::ptr_eq(&this.data, &other.data)
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenToken")
            .field("kind", &self.kind())
            .field("text", &self.data.text)
            .field("text_len", &self.data.text_len)
            .finish()
    }
}

impl Eq for GreenToken {}
impl PartialEq for GreenToken {
    fn eq(&self, other: &Self) -> bool {
        *self.data == *other.data
    }
}

impl hash::Hash for GreenToken {
    fn hash<H>(&self, state: &mut H)
    where
        H: hash::Hasher,
    {
        self.data.hash(state)
    }
}
