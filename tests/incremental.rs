mod common;

use common::blend_tokens;
use pretty_assertions::assert_eq;
use templar::{
    parse, parse_with_cache, Blender, GreenNode, NodeCache, TemplateKind, TextEdit, TextRange,
};

fn tokens(pairs: &[(TemplateKind, &str, bool)]) -> Vec<(TemplateKind, String, bool)> {
    pairs
        .iter()
        .map(|&(kind, text, reused)| (kind, text.to_string(), reused))
        .collect()
}

#[test]
fn edit_in_leading_literal_keeps_the_rest() {
    use TemplateKind::*;
    let blended = blend_tokens(
        "a<#b#>c",
        "ax<#b#>c",
        &[TextEdit::insert(1.into(), 1.into())],
    );
    // The literal around the edit is re-lexed; everything after it is lifted
    // from the old tree.
    assert_eq!(
        blended,
        tokens(&[
            (LiteralText, "ax", false),
            (StandardBlockStart, "<#", true),
            (LiteralText, "b", true),
            (StandardBlockEnd, "#>", true),
            (LiteralText, "c", true),
        ])
    );
}

#[test]
fn insertion_splitting_a_delimiter_is_re_lexed() {
    use TemplateKind::*;
    // Inserting "=" right after "<#" turns it into the longer "<#=".
    let blended = blend_tokens("a<#b#>", "a<#=b#>", &[TextEdit::insert(3.into(), 1.into())]);
    assert_eq!(
        blended,
        tokens(&[
            (LiteralText, "a", true),
            (ExpressionBlockStart, "<#=", false),
            (LiteralText, "b", true),
            (StandardBlockEnd, "#>", true),
        ])
    );
}

#[test]
fn deleting_a_delimiter_merges_literals() {
    use TemplateKind::*;
    // Deleting "<#" makes "a" and "b" one literal run; the old "a" token must
    // not be reused even though its own text is untouched.
    let blended = blend_tokens(
        "a<#b#>",
        "ab#>",
        &[TextEdit::delete(TextRange::new(1.into(), 3.into()))],
    );
    assert_eq!(
        blended,
        tokens(&[(LiteralText, "ab", false), (StandardBlockEnd, "#>", true)])
    );
}

#[test]
fn delimiter_forming_across_a_literal_boundary_is_re_lexed() {
    use TemplateKind::*;
    // Replacing the "<#" after "a<" with "#>" forms a new "<#" straddling
    // the old literal's end; reusing "a<" would desync the token stream.
    let blended = blend_tokens(
        "a<<#b#>",
        "a<#>b#>",
        &[TextEdit::replace(TextRange::new(2.into(), 4.into()), 2.into())],
    );
    assert_eq!(
        blended,
        tokens(&[
            (LiteralText, "a", false),
            (StandardBlockStart, "<#", false),
            (LiteralText, ">b", false),
            (StandardBlockEnd, "#>", true),
        ])
    );
}

#[test]
fn unchanged_text_reuses_every_token() {
    let text = "a<#b#><#=c=#>";
    let mut cache = NodeCache::new();
    let (root, _) = parse_with_cache(text, &mut cache);
    let mut blender = Blender::with_history(text, &root, &[]);
    loop {
        let blended = blender.next_token(&mut cache);
        if blended.kind == TemplateKind::Eof {
            // The sentinel is never lifted from the old tree.
            assert!(!blended.reused);
            break;
        }
        assert!(blended.reused, "{:?} should have been reused", blended.kind);
    }
}

#[test]
fn untouched_blocks_are_shared_across_revisions() {
    let old = parse("a<#b#>c");
    let old_block = old
        .syntax()
        .children()
        .find(|node| node.kind() == TemplateKind::StandardBlock)
        .unwrap()
        .green()
        .clone();

    let new = old.reparse(&[TextEdit::insert(1.into(), 1.into())], "ax<#b#>c");
    let new_block = new
        .syntax()
        .children()
        .find(|node| node.kind() == TemplateKind::StandardBlock)
        .unwrap()
        .green()
        .clone();

    assert!(GreenNode::ptr_eq(&old_block, &new_block));
}

#[test]
fn incremental_parses_match_full_parses() {
    let cases: &[(&str, &[TextEdit], &str)] = &[
        (
            "a<#b#>c",
            &[TextEdit::insert(1.into(), 1.into())],
            "aX<#b#>c",
        ),
        (
            "<#=x=#>tail",
            &[TextEdit::replace(
                TextRange::new(3.into(), 4.into()),
                3.into(),
            )],
            "<#=abc=#>tail",
        ),
        (
            "a<#b#>c",
            &[TextEdit::delete(TextRange::new(1.into(), 6.into()))],
            "ac",
        ),
        (
            "a<#b#>c<#d#>e",
            &[
                TextEdit::insert(0.into(), 1.into()),
                TextEdit::delete(TextRange::new(7.into(), 12.into())),
            ],
            "Xa<#b#>ce",
        ),
        // An unterminated block healed by the edit.
        ("<#x", &[TextEdit::insert(3.into(), 2.into())], "<#x#>"),
        // A block broken by the edit.
        (
            "a<#b#>",
            &[TextEdit::delete(TextRange::new(4.into(), 6.into()))],
            "a<#b",
        ),
        // Multi-byte literals around the edit.
        (
            "höhe<#x#>",
            &[TextEdit::delete(TextRange::new(0.into(), 3.into()))],
            "he<#x#>",
        ),
        // Edits to an adjacent token forming a delimiter across the
        // untouched literal's boundary.
        (
            "a<<#b#>",
            &[TextEdit::replace(TextRange::new(2.into(), 4.into()), 2.into())],
            "a<#>b#>",
        ),
        (
            "<<#",
            &[TextEdit::replace(TextRange::new(1.into(), 3.into()), 2.into())],
            "<#>",
        ),
        ("a<#b#>c", &[], "a<#b#>c"),
    ];

    for &(old_text, edits, new_text) in cases {
        let incremental = parse(old_text).reparse(edits, new_text);
        let full = parse(new_text);
        assert_eq!(
            incremental.debug_dump(),
            full.debug_dump(),
            "{old_text:?} -> {new_text:?}"
        );
        assert_eq!(incremental.errors(), full.errors());
        assert_eq!(incremental.text(), new_text);
    }
}

#[test]
fn reparses_chain_across_revisions() {
    let r0 = parse("x");
    let r1 = r0.reparse(&[TextEdit::insert(1.into(), 4.into())], "x<##>");
    assert_eq!(r1.text(), "x<##>");
    let r2 = r1.reparse(&[TextEdit::insert(3.into(), 1.into())], "x<#y#>");
    assert_eq!(r2.text(), "x<#y#>");
    assert!(r2.errors().is_empty());
    assert_eq!(r2.debug_dump(), parse("x<#y#>").debug_dump());
}
