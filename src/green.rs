//! Implementation of the inner, "green" tree.
//! Green nodes are immutable and position-independent: the same node
//! allocation can appear in any number of tree versions. The
//! [`GreenNodeBuilder`] is the main entry point to constructing
//! [`GreenNode`]s and [`GreenToken`]s.

mod builder;
mod element;
mod iter;
mod node;
mod token;

pub use self::{
    builder::{Checkpoint, GreenNodeBuilder, NodeCache},
    element::{GreenElement, GreenElementRef},
    iter::GreenNodeChildren,
    node::GreenNode,
    token::GreenToken,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::TemplateKind;

    #[test]
    fn assert_send_sync() {
        fn f<T: Send + Sync>() {}
        f::<GreenNode>();
        f::<GreenToken>();
        f::<GreenElement>();
    }

    fn standard_block(cache: &mut NodeCache<'_>, content: &str) -> GreenNode {
        let mut builder = GreenNodeBuilder::with_cache(cache);
        builder.start_node(TemplateKind::StandardBlock);
        builder.token(TemplateKind::StandardBlockStart, "<#");
        builder.start_node(TemplateKind::ContentRun);
        builder.token(TemplateKind::LiteralText, content);
        builder.finish_node();
        builder.token(TemplateKind::StandardBlockEnd, "#>");
        builder.finish_node();
        let (node, cache) = builder.finish();
        assert!(cache.is_none());
        node
    }

    #[test]
    fn slots_and_widths() {
        let mut cache = NodeCache::new();
        let block = standard_block(&mut cache, "code");
        assert_eq!(block.kind(), TemplateKind::StandardBlock);
        assert_eq!(block.slot_count(), 3);
        assert_eq!(block.text_len(), 8.into());

        let start = block.get_required_slot(0).into_token().unwrap().clone();
        assert_eq!(start.kind(), TemplateKind::StandardBlockStart);
        assert_eq!(start.text_len(), 2.into());

        let content = block.get_required_slot(1).into_node().unwrap().clone();
        assert_eq!(content.kind(), TemplateKind::ContentRun);
        assert_eq!(block.slot_offset(1), 2.into());
        assert_eq!(block.slot_offset(2), 6.into());

        assert!(block.get_slot(3).is_none());

        let widths: text_size::TextSize = block.children().map(|child| child.text_len()).sum();
        assert_eq!(widths, block.text_len());
    }

    #[test]
    #[should_panic(expected = "required slot")]
    fn required_slot_on_absent_slot_panics() {
        let mut cache = NodeCache::new();
        let block = standard_block(&mut cache, "code");
        block.get_required_slot(3);
    }

    #[test]
    fn write_to_round_trips() {
        let mut cache = NodeCache::new();
        let block = standard_block(&mut cache, "code");
        let mut text = String::new();
        block.write_to(&mut text, cache.interner()).unwrap();
        assert_eq!(text, "<#code#>");
        assert_eq!(block.to_text(cache.interner()), "<#code#>");
    }

    #[test]
    fn identical_small_trees_share_nodes() {
        let mut cache = NodeCache::new();
        let first = standard_block(&mut cache, "same");
        let second = standard_block(&mut cache, "same");
        assert!(GreenNode::ptr_eq(&first, &second));
        let third = standard_block(&mut cache, "other");
        assert!(!GreenNode::ptr_eq(&first, &third));
        assert_ne!(first, third);
    }

    #[test]
    fn tokens_are_deduplicated() {
        let mut cache = NodeCache::new();
        let first = cache.token(TemplateKind::LiteralText, "abc");
        let second = cache.token(TemplateKind::LiteralText, "abc");
        assert!(GreenToken::ptr_eq(&first, &second));
        assert_eq!(first.text(cache.interner()), "abc");
    }
}
