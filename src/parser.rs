//! The parser: a small state machine over block delimiters.
//!
//! Outside of blocks the parser collects literal text; a start delimiter
//! switches it into the matching block mode until that block's own end
//! delimiter (and no other) closes it. Malformed input degrades into
//! diagnostics plus a tree with absent slots, never into an error return.

use std::collections::VecDeque;

use lasso::Rodeo;
use text_size::TextRange;

use crate::{
    blender::{BlendedToken, Blender, TextEdit},
    diagnostics::{Diagnostic, DiagnosticKind},
    green::{GreenNode, GreenNodeBuilder, NodeCache},
    kind::TemplateKind,
    syntax::SyntaxNode,
};

/// The result of parsing one revision of a template document.
///
/// Always produced, malformed input included; syntax problems surface in
/// [`errors`](Parse::errors). Owns the node cache (and with it the interner)
/// so that tokens can be resolved back to text and follow-up reparses share
/// structure with this tree.
#[derive(Debug)]
pub struct Parse {
    green:  GreenNode,
    errors: Vec<Diagnostic>,
    cache:  NodeCache<'static>,
}

impl Parse {
    /// The root green node. Its kind is [`TemplateKind::Document`].
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// A red cursor over the root, carrying absolute positions.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// Diagnostics recorded while parsing, in source order.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    /// Resolver for token text of this tree.
    pub fn resolver(&self) -> &Rodeo {
        self.cache.interner()
    }

    /// Reconstructs the full source text, byte for byte.
    pub fn text(&self) -> String {
        self.green.to_text(self.resolver())
    }

    /// An indented kind/range/text dump of the tree, for tests and debugging.
    pub fn debug_dump(&self) -> String {
        self.syntax().debug(self.resolver())
    }

    /// Parses the next revision of this document, reusing unaffected tokens
    /// of this tree.
    ///
    /// `edits` describe how this revision's text became `new_text`, sorted
    /// and non-overlapping, in this revision's coordinates. Consumes the
    /// parse to carry the cache and interner forward; clone the green root
    /// first if the old tree is still needed.
    pub fn reparse(self, edits: &[TextEdit], new_text: &str) -> Parse {
        let Parse {
            green, mut cache, ..
        } = self;
        let (green, errors) = reparse_with_cache(&green, edits, new_text, &mut cache);
        Parse { green, errors, cache }
    }
}

/// Parses a template document from scratch.
pub fn parse(text: &str) -> Parse {
    let mut cache = NodeCache::new();
    let (green, errors) = parse_with_cache(text, &mut cache);
    Parse { green, errors, cache }
}

/// Parses a template document from scratch into a caller-owned cache.
pub fn parse_with_cache(text: &str, cache: &mut NodeCache<'_>) -> (GreenNode, Vec<Diagnostic>) {
    tracing::debug!(len = text.len(), "full parse");
    Parser::new(Blender::new(text), cache).run()
}

/// Parses the post-edit text of a document incrementally.
///
/// `old_root` must be the tree previously built through `cache` for the
/// pre-edit text; tokens outside the edits are lifted from it unchanged.
/// Produces the same tree a full parse of `new_text` would.
pub fn reparse_with_cache(
    old_root: &GreenNode,
    edits: &[TextEdit],
    new_text: &str,
    cache: &mut NodeCache<'_>,
) -> (GreenNode, Vec<Diagnostic>) {
    tracing::debug!(len = new_text.len(), edits = edits.len(), "incremental parse");
    Parser::new(Blender::with_history(new_text, old_root, edits), cache).run()
}

/// Pull interface between the blender and the parser, with lookahead.
struct TokenSource<'text> {
    blender:   Blender<'text>,
    lookahead: VecDeque<BlendedToken>,
}

impl<'text> TokenSource<'text> {
    fn new(blender: Blender<'text>) -> Self {
        Self {
            blender,
            lookahead: VecDeque::new(),
        }
    }

    fn peek(&mut self, cache: &mut NodeCache<'_>) -> &BlendedToken {
        if self.lookahead.is_empty() {
            let token = self.blender.next_token(cache);
            self.lookahead.push_back(token);
        }
        self.lookahead.front().unwrap()
    }

    fn bump(&mut self, cache: &mut NodeCache<'_>) -> BlendedToken {
        self.peek(cache);
        self.lookahead.pop_front().unwrap()
    }
}

struct Parser<'text, 'cache, 'interner> {
    source:  TokenSource<'text>,
    builder: GreenNodeBuilder<'cache, 'interner>,
    errors:  Vec<Diagnostic>,
}

impl<'text, 'cache, 'interner> Parser<'text, 'cache, 'interner> {
    fn new(blender: Blender<'text>, cache: &'cache mut NodeCache<'interner>) -> Self {
        Self {
            source:  TokenSource::new(blender),
            builder: GreenNodeBuilder::with_cache(cache),
            errors:  Vec::new(),
        }
    }

    fn run(mut self) -> (GreenNode, Vec<Diagnostic>) {
        self.builder.start_node(TemplateKind::Document);
        loop {
            let kind = self.peek_kind();
            match kind {
                TemplateKind::Eof => break,
                k if k.is_block_start() => self.block(k),
                _ => self.literal_run(),
            }
        }
        self.builder.finish_node();
        let (green, cache) = self.builder.finish();
        debug_assert!(cache.is_none());
        (green, self.errors)
    }

    /// Text mode: literal text, plus any end delimiter with no open block
    /// (kept in the run, reported as stray).
    fn literal_run(&mut self) {
        self.builder.start_node(TemplateKind::LiteralRun);
        loop {
            let kind = self.peek_kind();
            match kind {
                TemplateKind::LiteralText => {
                    self.bump_into_tree();
                }
                k if k.is_block_end() => {
                    let range = self.peek_range();
                    self.error(DiagnosticKind::StrayEndDelimiter { found: k }, range);
                    self.bump_into_tree();
                }
                _ => break,
            }
        }
        self.builder.finish_node();
    }

    /// Block mode: `[start, ContentRun?, end?]`. Only the end delimiter of
    /// this block's own kind closes it; wrong-kind ends stay in the content.
    fn block(&mut self, start_kind: TemplateKind) {
        let end_kind = start_kind.matching_end();
        self.builder.start_node(start_kind.block_node());
        let start_range = self.bump_into_tree();

        let checkpoint = self.builder.checkpoint();
        let mut content_end = start_range.end();
        let mut has_content = false;
        loop {
            let kind = self.peek_kind();
            match kind {
                TemplateKind::Eof => {
                    if has_content {
                        self.builder.start_node_at(checkpoint, TemplateKind::ContentRun);
                        self.builder.finish_node();
                    }
                    self.error(
                        DiagnosticKind::UnterminatedBlock {
                            block: start_kind.block_node(),
                        },
                        TextRange::new(start_range.start(), content_end),
                    );
                    // End slot stays absent.
                    self.builder.finish_node();
                    return;
                }
                k if k == end_kind => {
                    if has_content {
                        self.builder.start_node_at(checkpoint, TemplateKind::ContentRun);
                        self.builder.finish_node();
                    }
                    self.bump_into_tree();
                    self.builder.finish_node();
                    return;
                }
                k => {
                    if k.is_block_end() {
                        let range = self.peek_range();
                        self.error(
                            DiagnosticKind::MismatchedDelimiter {
                                found:    k,
                                expected: end_kind,
                            },
                            range,
                        );
                    }
                    // Literal text, a wrong-kind end, or a nested start: all
                    // raw content of this block.
                    content_end = self.bump_into_tree().end();
                    has_content = true;
                }
            }
        }
    }

    fn peek_kind(&mut self) -> TemplateKind {
        self.source.peek(self.builder.cache_mut()).kind
    }

    fn peek_range(&mut self) -> TextRange {
        self.source.peek(self.builder.cache_mut()).range
    }

    fn bump_into_tree(&mut self) -> TextRange {
        let blended = self.source.bump(self.builder.cache_mut());
        debug_assert_ne!(blended.kind, TemplateKind::Eof);
        self.builder.token_raw(blended.token);
        blended.range
    }

    fn error(&mut self, kind: DiagnosticKind, range: TextRange) {
        tracing::debug!(?kind, ?range, "syntax error");
        self.errors.push(Diagnostic::new(kind, range));
    }
}
