//! The outer, "red" tree: position-aware cursors over green trees.
//!
//! A cursor pairs a green element with the absolute offset it sits at and a
//! link to its parent cursor. Cursors own no tree data and are rebuilt on
//! demand during traversal; green nodes stay position-free and shareable.
//! Cursors are single-threaded (`Rc`); hand the green root across threads
//! instead and attach a new cursor on the other side.

use std::{fmt, hash, iter, rc::Rc};

use lasso::Resolver;
use text_size::{TextRange, TextSize};

use crate::{
    green::{GreenNode, GreenNodeChildren, GreenToken},
    kind::TemplateKind,
    utility_types::{NodeOrToken, TokenAtOffset, WalkEvent},
};

/// A node cursor: a green node plus where it sits in the document.
#[derive(Clone)]
pub struct SyntaxNode {
    data: Rc<NodeData>,
}

struct NodeData {
    green:  GreenNode,
    offset: TextSize,
    parent: Option<SyntaxNode>,
}

/// A token cursor; always has a parent node.
#[derive(Clone)]
pub struct SyntaxToken {
    green:  GreenToken,
    offset: TextSize,
    parent: SyntaxNode,
}

/// An element of the red tree, node or token.
pub type SyntaxElement = NodeOrToken<SyntaxNode, SyntaxToken>;

impl SyntaxNode {
    /// Attaches a cursor to the root of a green tree, at offset zero.
    pub fn new_root(green: GreenNode) -> SyntaxNode {
        SyntaxNode {
            data: Rc::new(NodeData {
                green,
                offset: 0.into(),
                parent: None,
            }),
        }
    }

    fn new_child(green: GreenNode, parent: &SyntaxNode, offset: TextSize) -> SyntaxNode {
        SyntaxNode {
            data: Rc::new(NodeData {
                green,
                offset,
                parent: Some(parent.clone()),
            }),
        }
    }

    /// [`TemplateKind`] of this node.
    #[inline]
    pub fn kind(&self) -> TemplateKind {
        self.data.green.kind()
    }

    /// The green node this cursor views.
    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    /// The range this node covers in the source text.
    #[inline]
    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.data.offset, self.data.green.text_len())
    }

    /// The parent node, unless this is the root.
    #[inline]
    pub fn parent(&self) -> Option<SyntaxNode> {
        self.data.parent.clone()
    }

    /// This node and then the chain of its parents, root last.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        iter::successors(Some(self.clone()), SyntaxNode::parent)
    }

    /// Child nodes, skipping tokens.
    pub fn children(&self) -> SyntaxNodeChildren<'_> {
        SyntaxNodeChildren {
            inner: self.children_with_tokens(),
        }
    }

    /// All children, tokens included.
    pub fn children_with_tokens(&self) -> SyntaxElementChildren<'_> {
        SyntaxElementChildren {
            parent: self,
            green:  self.data.green.children(),
            offset: self.data.offset,
        }
    }

    /// Depth-first traversal of this subtree, tokens included, as
    /// enter/leave events.
    pub fn preorder_with_tokens(&self) -> impl Iterator<Item = WalkEvent<SyntaxElement>> {
        Preorder {
            pending: vec![WalkEvent::Enter(SyntaxElement::Node(self.clone()))],
        }
    }

    /// The token(s) at `offset`: one inside a token, two at the boundary
    /// between tokens.
    ///
    /// # Panics
    /// Panics if `offset` lies outside this node's range.
    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        let range = self.text_range();
        assert!(
            range.start() <= offset && offset <= range.end(),
            "offset {offset:?} out of node range {range:?}"
        );
        if range.is_empty() {
            return TokenAtOffset::None;
        }

        let mut covering = self.children_with_tokens().filter(|child| {
            let child_range = child.text_range();
            !child_range.is_empty() && child_range.start() <= offset && offset <= child_range.end()
        });
        let Some(left) = covering.next() else {
            return TokenAtOffset::None;
        };
        let right = covering.next();
        debug_assert!(covering.next().is_none());

        match right {
            Some(right) => match (
                element_token_at_offset(left, offset),
                element_token_at_offset(right, offset),
            ) {
                (TokenAtOffset::Single(left), TokenAtOffset::Single(right)) => {
                    TokenAtOffset::Between(left, right)
                }
                // At most two non-empty children can cover one offset.
                _ => TokenAtOffset::None,
            },
            None => element_token_at_offset(left, offset),
        }
    }

    /// The full text under this node as a fresh string.
    pub fn resolve_text<I>(&self, resolver: &I) -> String
    where
        I: Resolver + ?Sized,
    {
        self.data.green.to_text(resolver)
    }

    /// An indented kind/range dump of this subtree, token text included.
    pub fn debug<I>(&self, resolver: &I) -> String
    where
        I: Resolver + ?Sized,
    {
        use std::fmt::Write;

        let mut out = String::new();
        let mut depth = 0usize;
        for event in self.preorder_with_tokens() {
            match event {
                WalkEvent::Enter(element) => {
                    for _ in 0..depth {
                        out.push_str("  ");
                    }
                    match &element {
                        NodeOrToken::Node(node) => {
                            writeln!(out, "{:?}@{:?}", node.kind(), node.text_range()).unwrap();
                        }
                        NodeOrToken::Token(token) => {
                            writeln!(
                                out,
                                "{:?}@{:?} {:?}",
                                token.kind(),
                                token.text_range(),
                                token.text(resolver)
                            )
                            .unwrap();
                        }
                    }
                    depth += 1;
                }
                WalkEvent::Leave(_) => depth -= 1,
            }
        }
        out
    }
}

fn element_token_at_offset(element: SyntaxElement, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
    match element {
        NodeOrToken::Token(token) => TokenAtOffset::Single(token),
        NodeOrToken::Node(node) => node.token_at_offset(offset),
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &SyntaxNode) -> bool {
        GreenNode::ptr_eq(&self.data.green, &other.data.green) && self.data.offset == other.data.offset
    }
}

impl Eq for SyntaxNode {}

impl hash::Hash for SyntaxNode {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.data.green.hash(state);
        self.data.offset.hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl SyntaxToken {
    /// [`TemplateKind`] of this token.
    #[inline]
    pub fn kind(&self) -> TemplateKind {
        self.green.kind()
    }

    /// The green token this cursor views.
    #[inline]
    pub fn green(&self) -> &GreenToken {
        &self.green
    }

    /// The range this token covers in the source text.
    #[inline]
    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.offset, self.green.text_len())
    }

    /// The node this token sits under.
    #[inline]
    pub fn parent(&self) -> &SyntaxNode {
        &self.parent
    }

    /// This token's parent and its ancestors, root last.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> {
        self.parent.ancestors()
    }

    /// The source text of this token.
    pub fn text<'i, I>(&self, resolver: &'i I) -> &'i str
    where
        I: Resolver + ?Sized,
    {
        self.green.text(resolver)
    }
}

impl PartialEq for SyntaxToken {
    fn eq(&self, other: &SyntaxToken) -> bool {
        GreenToken::ptr_eq(&self.green, &other.green) && self.offset == other.offset
    }
}

impl Eq for SyntaxToken {}

impl hash::Hash for SyntaxToken {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.green.hash(state);
        self.offset.hash(state);
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl SyntaxElement {
    /// [`TemplateKind`] of this element.
    pub fn kind(&self) -> TemplateKind {
        match self {
            NodeOrToken::Node(it) => it.kind(),
            NodeOrToken::Token(it) => it.kind(),
        }
    }

    /// The range this element covers in the source text.
    pub fn text_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(it) => it.text_range(),
            NodeOrToken::Token(it) => it.text_range(),
        }
    }

    /// The parent node of this element, except if this element is the root.
    pub fn parent(&self) -> Option<SyntaxNode> {
        match self {
            NodeOrToken::Node(it) => it.parent(),
            NodeOrToken::Token(it) => Some(it.parent().clone()),
        }
    }
}

/// Iterator over all children of a node, tokens included.
#[derive(Clone)]
pub struct SyntaxElementChildren<'a> {
    parent: &'a SyntaxNode,
    green:  GreenNodeChildren<'a>,
    offset: TextSize,
}

impl Iterator for SyntaxElementChildren<'_> {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<SyntaxElement> {
        let child = self.green.next()?;
        let offset = self.offset;
        self.offset += child.text_len();
        Some(match child {
            NodeOrToken::Node(node) => {
                NodeOrToken::Node(SyntaxNode::new_child(node.clone(), self.parent, offset))
            }
            NodeOrToken::Token(token) => NodeOrToken::Token(SyntaxToken {
                green: token.clone(),
                offset,
                parent: self.parent.clone(),
            }),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.green.size_hint()
    }
}

/// Iterator over the child nodes of a node.
#[derive(Clone)]
pub struct SyntaxNodeChildren<'a> {
    inner: SyntaxElementChildren<'a>,
}

impl Iterator for SyntaxNodeChildren<'_> {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<SyntaxNode> {
        self.inner.by_ref().find_map(SyntaxElement::into_node)
    }
}

struct Preorder {
    pending: Vec<WalkEvent<SyntaxElement>>,
}

impl Iterator for Preorder {
    type Item = WalkEvent<SyntaxElement>;

    fn next(&mut self) -> Option<WalkEvent<SyntaxElement>> {
        let event = self.pending.pop()?;
        if let WalkEvent::Enter(element) = &event {
            self.pending.push(WalkEvent::Leave(element.clone()));
            if let NodeOrToken::Node(node) = element {
                // Children are entered left to right, so they go on the
                // stack in reverse.
                let children: Vec<_> = node.children_with_tokens().collect();
                self.pending
                    .extend(children.into_iter().rev().map(WalkEvent::Enter));
            }
        }
        Some(event)
    }
}
