use std::hash::{Hash, Hasher};

use fxhash::{FxHashMap, FxHasher32};
use lasso::{Rodeo, Spur};
use text_size::TextSize;

use crate::{
    green::{GreenElement, GreenNode, GreenToken},
    kind::TemplateKind,
    utility_types::{MaybeOwned, NodeOrToken},
};

use super::{node::GreenNodeHead, token::GreenTokenData};

/// If `node.children() <= CHILDREN_CACHE_THRESHOLD`, we will not create
/// a new [`GreenNode`], but instead lookup in the cache if this node is
/// already present. If so we use the one in the cache, otherwise we insert
/// this node into the cache.
const CHILDREN_CACHE_THRESHOLD: usize = 3;

/// A `NodeCache` deduplicates identical tokens and small nodes during tree
/// construction, and owns (or borrows) the interner for token text.
///
/// Re-using one cache across successive parses of the same document is what
/// makes blended reparses share structure with the previous tree: an
/// unchanged token or block resolves to the same allocation.
#[derive(Debug)]
pub struct NodeCache<'i> {
    nodes:    FxHashMap<GreenNodeHead, GreenNode>,
    tokens:   FxHashMap<GreenTokenData, GreenToken>,
    interner: MaybeOwned<'i, Rodeo>,
}

impl NodeCache<'static> {
    /// Constructs a new, empty cache with its own interner.
    pub fn new() -> Self {
        Self {
            nodes:    FxHashMap::default(),
            tokens:   FxHashMap::default(),
            interner: MaybeOwned::Owned(Rodeo::new()),
        }
    }
}

impl Default for NodeCache<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'i> NodeCache<'i> {
    /// Constructs a new, empty cache around an existing interner.
    #[inline]
    pub fn with_interner(interner: &'i mut Rodeo) -> Self {
        Self {
            nodes:    FxHashMap::default(),
            tokens:   FxHashMap::default(),
            interner: MaybeOwned::Borrowed(interner),
        }
    }

    /// Get a reference to the interner used to deduplicate token text.
    #[inline]
    pub fn interner(&self) -> &Rodeo {
        &self.interner
    }

    /// Get a mutable reference to the interner used to deduplicate token
    /// text.
    #[inline]
    pub fn interner_mut(&mut self) -> &mut Rodeo {
        &mut self.interner
    }

    /// If this cache owns its interner, returns it to allow resolving tree
    /// tokens back to text.
    #[inline]
    pub fn into_interner(self) -> Option<Rodeo> {
        self.interner.into_owned()
    }

    pub(crate) fn intern(&mut self, text: &str) -> Spur {
        self.interner.get_or_intern(text)
    }

    pub(crate) fn node(
        &mut self,
        kind: TemplateKind,
        all_children: &mut Vec<GreenElement>,
        first_child: usize,
    ) -> GreenNode {
        // NOTE: this fn must remove all children starting at `first_child`
        // from `all_children` before returning
        let mut hasher = FxHasher32::default();
        let mut text_len: TextSize = 0.into();
        for child in &all_children[first_child..] {
            text_len += child.text_len();
            child.hash(&mut hasher);
        }
        let child_hash = hasher.finish() as u32;

        // Green nodes are fully immutable, so it's ok to deduplicate them.
        // Small nodes (a block is at most three children) are the common
        // case, so most interior nodes of a template go through the cache.
        let children = all_children.drain(first_child..);
        if children.len() <= CHILDREN_CACHE_THRESHOLD {
            let head = GreenNodeHead {
                kind: kind.into_raw(),
                text_len,
                child_hash,
            };
            self.nodes
                .entry(head)
                .or_insert_with_key(|head| GreenNode::from_head_and_children(head.clone(), children))
                .clone()
        } else {
            GreenNode::new(kind, children)
        }
    }

    pub(crate) fn token(&mut self, kind: TemplateKind, text: &str) -> GreenToken {
        if let Some(static_text) = kind.static_text() {
            debug_assert_eq!(
                static_text, text,
                "a {kind:?} token must have text {static_text:?}, got {text:?}"
            );
        }
        let text_len = TextSize::of(text);
        let text = self.intern(text);
        let data = GreenTokenData {
            kind: kind.into_raw(),
            text,
            text_len,
        };
        self.tokens
            .entry(data)
            .or_insert_with_key(|data| GreenToken::new(*data))
            .clone()
    }
}

/// A checkpoint for maybe wrapping a node. See [`GreenNodeBuilder::checkpoint`] for details.
#[derive(Clone, Copy, Debug)]
pub struct Checkpoint(usize);

/// A builder for green trees.
///
/// To add tree nodes, start them with [`start_node`](GreenNodeBuilder::start_node),
/// add [`token`](GreenNodeBuilder::token)s and then
/// [`finish_node`](GreenNodeBuilder::finish_node). When the whole tree is
/// constructed, call [`finish`](GreenNodeBuilder::finish) to obtain the root.
#[derive(Debug)]
pub struct GreenNodeBuilder<'cache, 'interner> {
    cache:    MaybeOwned<'cache, NodeCache<'interner>>,
    parents:  Vec<(TemplateKind, usize)>,
    children: Vec<GreenElement>,
}

impl GreenNodeBuilder<'static, 'static> {
    /// Creates new builder with an empty [`NodeCache`].
    pub fn new() -> Self {
        Self {
            cache:    MaybeOwned::Owned(NodeCache::new()),
            parents:  Vec::with_capacity(8),
            children: Vec::with_capacity(8),
        }
    }
}

impl Default for GreenNodeBuilder<'static, 'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'cache, 'interner> GreenNodeBuilder<'cache, 'interner> {
    /// Reusing a [`NodeCache`] between multiple builders saves memory, as it
    /// allows to structurally share underlying trees.
    pub fn with_cache(cache: &'cache mut NodeCache<'interner>) -> Self {
        Self {
            cache:    MaybeOwned::Borrowed(cache),
            parents:  Vec::with_capacity(8),
            children: Vec::with_capacity(8),
        }
    }

    /// Like [`with_cache`](GreenNodeBuilder::with_cache), but takes ownership;
    /// the cache is returned from [`finish`](GreenNodeBuilder::finish).
    pub fn from_cache(cache: NodeCache<'interner>) -> Self {
        Self {
            cache:    MaybeOwned::Owned(cache),
            parents:  Vec::with_capacity(8),
            children: Vec::with_capacity(8),
        }
    }

    /// Get a reference to the interner used to deduplicate token text.
    #[inline]
    pub fn interner(&self) -> &Rodeo {
        self.cache.interner()
    }

    /// Get a mutable reference to the interner used to deduplicate token
    /// text.
    #[inline]
    pub fn interner_mut(&mut self) -> &mut Rodeo {
        self.cache.interner_mut()
    }

    pub(crate) fn cache_mut(&mut self) -> &mut NodeCache<'interner> {
        &mut self.cache
    }

    /// Add a new token to the current branch.
    #[inline]
    pub fn token(&mut self, kind: TemplateKind, text: &str) {
        let token = self.cache.token(kind, text);
        self.children.push(token.into());
    }

    /// Add an already-built green token to the current branch.
    ///
    /// This is the blender's reuse path: a token lifted out of a previous
    /// tree is attached unchanged, keeping the allocation shared between the
    /// old and the new tree.
    #[inline]
    pub fn token_raw(&mut self, token: GreenToken) {
        self.children.push(token.into());
    }

    /// Start new node of the given `kind` and make it current.
    #[inline]
    pub fn start_node(&mut self, kind: TemplateKind) {
        let len = self.children.len();
        self.parents.push((kind, len));
    }

    /// Finish the current branch and restore the previous branch as current.
    #[inline]
    pub fn finish_node(&mut self) {
        let (kind, first_child) = self.parents.pop().unwrap();
        // NOTE: we rely on the node cache to remove all children starting at
        // `first_child` from `self.children`
        let node = self.cache.node(kind, &mut self.children, first_child);
        self.children.push(node.into());
    }

    /// Prepare for maybe wrapping the next node with a surrounding node.
    ///
    /// The way wrapping works is that you first get a checkpoint, then you
    /// add nodes and tokens as normal, and then you *maybe* call
    /// [`start_node_at`](GreenNodeBuilder::start_node_at).
    #[inline]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.children.len())
    }

    /// Wrap the previous branch marked by [`checkpoint`](GreenNodeBuilder::checkpoint)
    /// in a new branch and make it current.
    #[inline]
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: TemplateKind) {
        let Checkpoint(checkpoint) = checkpoint;
        assert!(
            checkpoint <= self.children.len(),
            "checkpoint no longer valid, was finish_node called early?"
        );

        if let Some(&(_, first_child)) = self.parents.last() {
            assert!(
                checkpoint >= first_child,
                "checkpoint no longer valid, was an unmatched start_node_at called?"
            );
        }

        self.parents.push((kind, checkpoint));
    }

    /// Complete building the tree.
    ///
    /// Make sure that calls to [`start_node`](GreenNodeBuilder::start_node) /
    /// [`start_node_at`](GreenNodeBuilder::start_node_at) and
    /// [`finish_node`](GreenNodeBuilder::finish_node) are balanced, i.e. that
    /// every started node has been completed!
    ///
    /// If this builder owns its cache, the cache is returned as the second
    /// value to allow re-using it or extracting the interner.
    #[inline]
    pub fn finish(mut self) -> (GreenNode, Option<NodeCache<'interner>>) {
        assert_eq!(self.children.len(), 1);
        let cache = self.cache.into_owned();
        match self.children.pop().unwrap() {
            NodeOrToken::Node(node) => (node, cache),
            NodeOrToken::Token(_) => {
                panic!("called `finish` on a `GreenNodeBuilder` which only contained a token")
            }
        }
    }
}
