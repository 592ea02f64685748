//! The blender: incremental re-lexing against a previous tree.
//!
//! Given the tree built for the previous revision of a document and the
//! edits that produced the current text, the blender walks the old tree's
//! tokens alongside the new text and decides, token by token, whether the
//! old token can be lifted into the new tree or the lexer has to run.
//!
//! A token is only reused if the lexer, run at the token's position in the
//! *new* text, would provably produce it again. Reuse is an optimization the
//! parser never depends on: with no previous tree the blender is a plain
//! pass-through to the lexer.

use text_size::{TextRange, TextSize};

use crate::{
    green::{GreenNode, GreenToken, NodeCache},
    kind::TemplateKind,
    lexer::{delimiter_at, Lexer, MAX_DELIMITER_LEN},
    pooled::{ScratchPool, ScratchVec},
    utility_types::NodeOrToken,
};

/// A single replacement of a span of old text with new text.
///
/// `old_range` is in old-text coordinates; the replacement occupies
/// `new_len` bytes in the new text. A pure insertion has an empty
/// `old_range`, a pure deletion a zero `new_len`. Offsets must lie on
/// character boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub old_range: TextRange,
    pub new_len:   TextSize,
}

impl TextEdit {
    pub fn replace(old_range: TextRange, new_len: TextSize) -> Self {
        Self { old_range, new_len }
    }

    pub fn insert(offset: TextSize, len: TextSize) -> Self {
        Self {
            old_range: TextRange::empty(offset),
            new_len:   len,
        }
    }

    pub fn delete(old_range: TextRange) -> Self {
        Self {
            old_range,
            new_len: 0.into(),
        }
    }
}

/// A token handed from the blender to the parser: the green token to attach,
/// its range in the new text, and whether it was lifted from the old tree.
#[derive(Debug, Clone)]
pub struct BlendedToken {
    pub token:  GreenToken,
    pub kind:   TemplateKind,
    pub range:  TextRange,
    pub reused: bool,
}

static CURSOR_STACK: ScratchPool<(GreenNode, usize)> = ScratchPool::new();

/// Depth-first walk over the leaf tokens of an old green tree, tracking each
/// token's absolute offset in the old text.
struct OldTokenCursor {
    stack:  ScratchVec<(GreenNode, usize)>,
    offset: TextSize,
    peeked: Option<(GreenToken, TextSize)>,
}

impl OldTokenCursor {
    fn new(root: &GreenNode) -> Self {
        let mut stack = CURSOR_STACK.lease();
        stack
            .try_set_capacity(4)
            .expect("a fresh scratch vector is empty");
        stack.push((root.clone(), 0));
        Self {
            stack,
            offset: 0.into(),
            peeked: None,
        }
    }

    /// The next old token and its old-text start offset, without consuming.
    fn peek(&mut self) -> Option<&(GreenToken, TextSize)> {
        if self.peeked.is_none() {
            self.peeked = self.advance();
        }
        self.peeked.as_ref()
    }

    fn bump(&mut self) {
        let taken = self.peeked.take();
        debug_assert!(taken.is_some(), "bumped the old cursor without peeking");
    }

    fn advance(&mut self) -> Option<(GreenToken, TextSize)> {
        while let Some((node, slot)) = self.stack.last_mut() {
            let Some(child) = node.get_slot(*slot) else {
                self.stack.pop();
                continue;
            };
            *slot += 1;
            match child.cloned() {
                NodeOrToken::Token(token) => {
                    let start = self.offset;
                    self.offset += token.text_len();
                    return Some((token, start));
                }
                NodeOrToken::Node(node) => self.stack.push((node, 0)),
            }
        }
        None
    }
}

/// State for one incremental (or fresh) lex of a document.
pub struct Blender<'text> {
    text:  &'text str,
    lexer: Lexer<'text>,
    old:   Option<OldTree>,
}

struct OldTree {
    cursor: OldTokenCursor,
    edits:  Vec<TextEdit>,
}

impl<'text> Blender<'text> {
    /// A blender with no history: every token comes from the lexer.
    pub fn new(text: &'text str) -> Self {
        Self {
            text,
            lexer: Lexer::new(text),
            old: None,
        }
    }

    /// A blender replaying `old_root` (the tree for the pre-edit text)
    /// against the post-edit `text`.
    ///
    /// `edits` must be sorted by position and non-overlapping, in old-text
    /// coordinates.
    pub fn with_history(text: &'text str, old_root: &GreenNode, edits: &[TextEdit]) -> Self {
        debug_assert!(
            edits
                .windows(2)
                .all(|pair| pair[0].old_range.end() <= pair[1].old_range.start()),
            "edits must be sorted and non-overlapping"
        );
        Self {
            text,
            lexer: Lexer::new(text),
            old: Some(OldTree {
                cursor: OldTokenCursor::new(old_root),
                edits:  edits.to_vec(),
            }),
        }
    }

    /// Produces the next token of the new text.
    ///
    /// `cache` must be the node cache the old tree was built with, so that
    /// old token text resolves through it and fresh tokens dedup against it.
    pub fn next_token(&mut self, cache: &mut NodeCache<'_>) -> BlendedToken {
        let pos = self.lexer.position();

        if let Some(reused) = self.try_reuse(pos, cache) {
            return reused;
        }

        let lexed = self.lexer.next_token();
        if lexed.kind == TemplateKind::Eof {
            // The sentinel is edit-sensitive by construction, always fresh.
            let token = cache.token(TemplateKind::Eof, "");
            return BlendedToken {
                token,
                kind: TemplateKind::Eof,
                range: lexed.range,
                reused: false,
            };
        }
        let text = slice(self.text, lexed.range);
        let token = cache.token(lexed.kind, text);
        tracing::trace!(kind = ?lexed.kind, range = ?lexed.range, "lexed fresh token");
        BlendedToken {
            token,
            kind: lexed.kind,
            range: lexed.range,
            reused: false,
        }
    }

    fn try_reuse(&mut self, pos: TextSize, cache: &NodeCache<'_>) -> Option<BlendedToken> {
        let text = self.text;
        let old = self.old.as_mut()?;
        loop {
            let &(ref token, old_start) = old.cursor.peek()?;
            let old_range = TextRange::at(old_start, token.text_len());

            if touches_edit(&old.edits, old_range) {
                tracing::trace!(?old_range, "discarding edited old token");
                old.cursor.bump();
                continue;
            }
            let Some(new_start) = map_old_position(&old.edits, old_start) else {
                old.cursor.bump();
                continue;
            };
            if new_start < pos {
                // Already covered by fresher output; drop and realign.
                old.cursor.bump();
                continue;
            }
            if new_start > pos {
                // Not yet realigned after a resync; keep lexing fresh.
                return None;
            }

            let token = token.clone();
            if !rederivable(text, &token, pos, cache) {
                // Old and new token boundaries disagree here. Fall back to
                // the lexer; the stale token is discarded once the fresh
                // output has moved past its mapped position.
                tracing::trace!(kind = ?token.kind(), ?pos, "old token not re-derivable, re-lexing");
                return None;
            }

            old.cursor.bump();
            let range = TextRange::at(pos, token.text_len());
            self.lexer.advance_to(range.end());
            tracing::trace!(kind = ?token.kind(), ?range, "reused old token");
            return Some(BlendedToken {
                kind: token.kind(),
                token,
                range,
                reused: true,
            });
        }
    }
}

/// Would the lexer, run at `pos` on the new text, produce exactly `token`
/// again?
fn rederivable(text: &str, token: &GreenToken, pos: TextSize, cache: &NodeCache<'_>) -> bool {
    let kind = token.kind();
    match kind {
        TemplateKind::Eof => false,
        k if k.static_text().is_some() => {
            // Longest-match aware: an old `<#` in front of a freshly
            // inserted `=` must lose to `<#=`.
            delimiter_at(text, pos) == Some(k)
        }
        _ => {
            let end = pos + token.text_len();
            if end > TextSize::of(text) {
                return false;
            }
            if token.text(cache.interner()) != slice(text, TextRange::new(pos, end)) {
                return false;
            }
            // The run must still terminate here, or a full lex would have
            // produced a longer literal.
            if end < TextSize::of(text) && delimiter_at(text, end).is_none() {
                return false;
            }
            // Matching bytes rule out delimiters wholly inside the span, but
            // an edit next to it can form one reaching across either
            // boundary.
            !delimiter_straddles(text, pos, end)
        }
    }
}

/// Does a delimiter start at `pos`, or start inside `pos..end` close enough
/// to `end` to reach past it into the following text?
fn delimiter_straddles(text: &str, pos: TextSize, end: TextSize) -> bool {
    if delimiter_at(text, pos).is_some() {
        return true;
    }
    let first = u32::from(end)
        .saturating_sub(MAX_DELIMITER_LEN - 1)
        .max(u32::from(pos) + 1);
    (first..u32::from(end))
        .any(|p| text.is_char_boundary(p as usize) && delimiter_at(text, p.into()).is_some())
}

fn slice(text: &str, range: TextRange) -> &str {
    &text[usize::from(range.start())..usize::from(range.end())]
}

/// Does `range` overlap any edit? Zero-width edits strictly inside the range
/// count; edits merely touching its boundary do not.
fn touches_edit(edits: &[TextEdit], range: TextRange) -> bool {
    edits
        .iter()
        .any(|edit| edit.old_range.start() < range.end() && edit.old_range.end() > range.start())
}

/// Maps an old-text position that lies outside every edit into the new text.
fn map_old_position(edits: &[TextEdit], pos: TextSize) -> Option<TextSize> {
    let mut delta: i64 = 0;
    for edit in edits {
        if edit.old_range.end() <= pos {
            delta += i64::from(u32::from(edit.new_len)) - i64::from(u32::from(edit.old_range.len()));
        } else if edit.old_range.start() > pos {
            break;
        } else if !edit.old_range.is_empty() {
            // Inside an edited span; not mappable.
            return None;
        }
    }
    let mapped = i64::from(u32::from(pos)) + delta;
    debug_assert!(mapped >= 0, "edit deltas mapped {pos:?} to a negative offset");
    u32::try_from(mapped).ok().map(TextSize::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_mapping_accumulates_deltas() {
        let edits = vec![
            TextEdit::insert(2.into(), 3.into()),
            TextEdit::delete(TextRange::new(5.into(), 7.into())),
        ];
        assert_eq!(map_old_position(&edits, 0.into()), Some(0.into()));
        assert_eq!(map_old_position(&edits, 2.into()), Some(5.into()));
        assert_eq!(map_old_position(&edits, 6.into()), None);
        assert_eq!(map_old_position(&edits, 7.into()), Some(8.into()));
        assert_eq!(map_old_position(&edits, 10.into()), Some(11.into()));
    }

    #[test]
    fn boundary_delimiters_straddle_a_span() {
        let text = "a<#>b";
        // "<#" starts one byte before the span's end.
        assert!(delimiter_straddles(text, 0.into(), 2.into()));
        // "<#" starts right at the span.
        assert!(delimiter_straddles("<#>", 0.into(), 1.into()));
        assert!(!delimiter_straddles(text, 3.into(), 5.into()));
    }

    #[test]
    fn insertions_inside_a_span_touch_it() {
        let edits = vec![TextEdit::insert(3.into(), 1.into())];
        assert!(touches_edit(&edits, TextRange::new(2.into(), 4.into())));
        assert!(!touches_edit(&edits, TextRange::new(0.into(), 3.into())));
        assert!(!touches_edit(&edits, TextRange::new(3.into(), 5.into())));
    }
}
