use text_size::TextSize;

use crate::{
    green::{GreenNode, GreenToken},
    kind::RawKind,
    utility_types::NodeOrToken,
};

/// An owned child of a green node.
pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// A borrowed child of a green node.
pub type GreenElementRef<'a> = NodeOrToken<&'a GreenNode, &'a GreenToken>;

impl From<GreenNode> for GreenElement {
    #[inline]
    fn from(node: GreenNode) -> GreenElement {
        NodeOrToken::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    #[inline]
    fn from(token: GreenToken) -> GreenElement {
        NodeOrToken::Token(token)
    }
}

impl GreenElement {
    /// The raw kind tag of this element.
    #[inline]
    pub fn raw_kind(&self) -> RawKind {
        self.as_deref().raw_kind()
    }

    /// The length of text covered by this element.
    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.as_deref().text_len()
    }
}

impl GreenElementRef<'_> {
    /// The raw kind tag of this element.
    #[inline]
    pub fn raw_kind(&self) -> RawKind {
        match self {
            NodeOrToken::Node(node) => node.raw_kind(),
            NodeOrToken::Token(token) => token.raw_kind(),
        }
    }

    /// The length of text covered by this element.
    #[inline]
    pub fn text_len(&self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.text_len(),
            NodeOrToken::Token(token) => token.text_len(),
        }
    }
}
