use std::{
    fmt,
    hash::{Hash, Hasher},
};

use fxhash::FxHasher32;
use lasso::Resolver;
use text_size::TextSize;
use triomphe::Arc;

use crate::{
    green::{iter::GreenNodeChildren, GreenElement, GreenElementRef},
    kind::{RawKind, TemplateKind},
    pooled::ScratchPool,
    utility_types::NodeOrToken,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct GreenNodeHead {
    pub(super) kind:       RawKind,
    pub(super) text_len:   TextSize,
    pub(super) child_hash: u32,
}

struct GreenNodeData {
    head:     GreenNodeHead,
    children: Box<[GreenElement]>,
}

/// Interior node in the immutable "green" tree.
///
/// A green node never stores an absolute position; where it sits in a
/// document is always derived from the widths of its left siblings. This is
/// what lets one node instance appear in many tree versions.
#[derive(Clone)]
pub struct GreenNode {
    data: Arc<GreenNodeData>,
}

impl GreenNode {
    /// Creates a new node, computing the covered text length from the
    /// children.
    #[inline]
    pub fn new<I>(kind: TemplateKind, children: I) -> GreenNode
    where
        I: IntoIterator<Item = GreenElement>,
    {
        let children: Box<[GreenElement]> = children.into_iter().collect();
        let mut hasher = FxHasher32::default();
        let mut text_len: TextSize = 0.into();
        for child in children.iter() {
            text_len += child.text_len();
            child.hash(&mut hasher);
        }
        let head = GreenNodeHead {
            kind: kind.into_raw(),
            text_len,
            child_hash: hasher.finish() as u32,
        };
        GreenNode {
            data: Arc::new(GreenNodeData { head, children }),
        }
    }

    #[inline]
    pub(super) fn from_head_and_children<I>(head: GreenNodeHead, children: I) -> GreenNode
    where
        I: IntoIterator<Item = GreenElement>,
    {
        let children: Box<[GreenElement]> = children.into_iter().collect();
        debug_assert_eq!(
            head.text_len,
            children.iter().map(GreenElement::text_len).sum::<TextSize>(),
            "inconsistent text_len for green node"
        );
        GreenNode {
            data: Arc::new(GreenNodeData { head, children }),
        }
    }

    /// [`TemplateKind`] of this node.
    #[inline]
    pub fn kind(&self) -> TemplateKind {
        TemplateKind::from_raw(self.data.head.kind)
    }

    /// The raw kind tag of this node.
    #[inline]
    pub fn raw_kind(&self) -> RawKind {
        self.data.head.kind
    }

    /// Returns the length of text covered by this node.
    ///
    /// Computed once at construction from the children; the only derived
    /// value a green node stores.
    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.data.head.text_len
    }

    pub(super) fn child_hash(&self) -> u32 {
        self.data.head.child_hash
    }

    /// Number of child slots of this node.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.data.children.len()
    }

    /// The child at `slot`, or `None` for an absent slot.
    ///
    /// Never panics; indices past the stored children are absent.
    #[inline]
    pub fn get_slot(&self, slot: usize) -> Option<GreenElementRef<'_>> {
        self.data.children.get(slot).map(|it| it.as_deref())
    }

    /// The child at `slot`, which must be present.
    ///
    /// # Panics
    /// Panics on an absent slot; asking for a required slot that is absent is
    /// a bug in the caller, not a property of the input text.
    #[inline]
    pub fn get_required_slot(&self, slot: usize) -> GreenElementRef<'_> {
        match self.get_slot(slot) {
            Some(it) => it,
            None => panic!("required slot {slot} of {:?} node is absent", self.kind()),
        }
    }

    /// Text offset of the child at `slot` relative to the start of this node.
    pub(crate) fn slot_offset(&self, slot: usize) -> TextSize {
        self.data.children[..slot]
            .iter()
            .map(GreenElement::text_len)
            .sum()
    }

    /// Iterator over all children of this node.
    #[inline]
    pub fn children(&self) -> GreenNodeChildren<'_> {
        GreenNodeChildren {
            inner: self.data.children.iter(),
        }
    }

    /// Writes the full text under this node to `sink`, depth-first, left to
    /// right.
    ///
    /// Iterative over a pooled work stack: template documents can nest deep
    /// enough that recursing per node risks the call stack.
    pub fn write_to<W, I>(&self, sink: &mut W, resolver: &I) -> fmt::Result
    where
        W: fmt::Write,
        I: Resolver + ?Sized,
    {
        static WRITE_STACK: ScratchPool<GreenElement> = ScratchPool::new();

        // Returned to the pool on drop, early `?` exits included.
        let mut stack = WRITE_STACK.lease();
        for child in self.children().rev() {
            stack.push(child.cloned());
        }
        while let Some(element) = stack.pop() {
            match element {
                NodeOrToken::Token(token) => sink.write_str(token.text(resolver))?,
                NodeOrToken::Node(node) => {
                    for child in node.children().rev() {
                        stack.push(child.cloned());
                    }
                }
            }
        }
        Ok(())
    }

    /// The full text under this node as a fresh string.
    pub fn to_text<I>(&self, resolver: &I) -> String
    where
        I: Resolver + ?Sized,
    {
        let mut text = String::with_capacity(self.text_len().into());
        self.write_to(&mut text, resolver)
            .expect("writing to a String cannot fail");
        text
    }

    /// Whether two green nodes are the same allocation.
    #[inline]
    pub fn ptr_eq(this: &GreenNode, other: &GreenNode) -> bool {
        Arc::ptr_eq(&this.data, &other.data)
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("text_len", &self.text_len())
            .field("children", &self.data.children)
            .finish()
    }
}

impl Hash for GreenNode {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.head.hash(state);
    }
}

impl PartialEq for GreenNode {
    fn eq(&self, other: &Self) -> bool {
        self.data.head == other.data.head && self.data.children == other.data.children
    }
}

impl Eq for GreenNode {}
