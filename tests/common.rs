#![allow(unused)]

use templar::{parse, parse_with_cache, Blender, NodeCache, TemplateKind, TextEdit};

/// Full-parse dump of `text`, for structural comparison.
pub fn dump(text: &str) -> String {
    parse(text).debug_dump()
}

/// Lexes `new_text` through a blender primed with the tree for `old_text`,
/// returning each non-sentinel token with its text and whether it was lifted
/// from the old tree. Checks along the way that every token's interned text
/// matches the new text at the token's position.
pub fn blend_tokens(
    old_text: &str,
    new_text: &str,
    edits: &[TextEdit],
) -> Vec<(TemplateKind, String, bool)> {
    let mut cache = NodeCache::new();
    let (old_root, _) = parse_with_cache(old_text, &mut cache);
    let mut blender = Blender::with_history(new_text, &old_root, edits);
    let mut tokens = Vec::new();
    loop {
        let blended = blender.next_token(&mut cache);
        if blended.kind == TemplateKind::Eof {
            break;
        }
        let text = &new_text[usize::from(blended.range.start())..usize::from(blended.range.end())];
        assert_eq!(
            blended.token.text(cache.interner()),
            text,
            "token text must match its position in the new text"
        );
        tokens.push((blended.kind, text.to_string(), blended.reused));
    }
    tokens
}
