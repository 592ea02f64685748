//! The token and node kinds of the templating language.
//!
//! Kinds are carried in trees as [`RawKind`], a bare numeric tag. The
//! templating kinds are allocated past the host language's reserved kind
//! range (see [`KIND_BASE`]), so a template tree can be embedded into a host
//! toolchain without tag collisions.

/// First raw value used for templating kinds.
///
/// Embedders that reserve a different host range must rebuild with an
/// adjusted base; the crate never computes this value.
pub const KIND_BASE: u16 = 24_058;

/// A numeric kind tag, as stored in green nodes and tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawKind(pub u16);

/// The lexical and syntactic categories of a template document.
///
/// Declaration order is load-bearing for the delimiter tokens: every end
/// delimiter immediately follows its start delimiter, so
/// `end == start + 1` in raw value. [`TemplateKind::matching_end`] relies on
/// this.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateKind {
    /// A run of text without any delimiter in it.
    LiteralText = 0,
    /// `<#@`
    DirectiveStart,
    /// `@#>`
    DirectiveEnd,
    /// `<#`
    StandardBlockStart,
    /// `#>`
    StandardBlockEnd,
    /// `<#=`
    ExpressionBlockStart,
    /// `=#>`
    ExpressionBlockEnd,
    /// `<#+`
    ClassFeatureBlockStart,
    /// `+#>`
    ClassFeatureBlockEnd,
    /// End-of-input sentinel; zero width, never part of the tree.
    Eof,

    // Node kinds.
    Document,
    LiteralRun,
    ContentRun,
    DirectiveBlock,
    StandardBlock,
    ExpressionBlock,
    ClassFeatureBlock,
}

impl TemplateKind {
    /// Converts into the raw tag stored in the tree.
    #[inline]
    pub fn into_raw(self) -> RawKind {
        RawKind(KIND_BASE + self as u16)
    }

    /// Converts back from a raw tag.
    ///
    /// # Panics
    /// Panics if `raw` does not denote a templating kind. Raw tags inside a
    /// template tree always do; anything else is a usage error.
    #[inline]
    pub fn from_raw(raw: RawKind) -> Self {
        use TemplateKind::*;
        match raw.0.checked_sub(KIND_BASE) {
            Some(0) => LiteralText,
            Some(1) => DirectiveStart,
            Some(2) => DirectiveEnd,
            Some(3) => StandardBlockStart,
            Some(4) => StandardBlockEnd,
            Some(5) => ExpressionBlockStart,
            Some(6) => ExpressionBlockEnd,
            Some(7) => ClassFeatureBlockStart,
            Some(8) => ClassFeatureBlockEnd,
            Some(9) => Eof,
            Some(10) => Document,
            Some(11) => LiteralRun,
            Some(12) => ContentRun,
            Some(13) => DirectiveBlock,
            Some(14) => StandardBlock,
            Some(15) => ExpressionBlock,
            Some(16) => ClassFeatureBlock,
            _ => panic!("raw kind {} is not a templating kind", raw.0),
        }
    }

    /// Is this a block or directive start delimiter?
    #[inline]
    pub fn is_block_start(self) -> bool {
        matches!(
            self,
            TemplateKind::DirectiveStart
                | TemplateKind::StandardBlockStart
                | TemplateKind::ExpressionBlockStart
                | TemplateKind::ClassFeatureBlockStart
        )
    }

    /// Is this a block or directive end delimiter?
    #[inline]
    pub fn is_block_end(self) -> bool {
        matches!(
            self,
            TemplateKind::DirectiveEnd
                | TemplateKind::StandardBlockEnd
                | TemplateKind::ExpressionBlockEnd
                | TemplateKind::ClassFeatureBlockEnd
        )
    }

    /// The end delimiter closing a block opened by `self`.
    ///
    /// # Panics
    /// Panics if `self` is not a start delimiter.
    #[inline]
    pub fn matching_end(self) -> TemplateKind {
        assert!(self.is_block_start(), "{self:?} does not open a block");
        // Start/end pairs are raw-adjacent.
        TemplateKind::from_raw(RawKind(self.into_raw().0 + 1))
    }

    /// The node kind produced for a block opened by `self`.
    ///
    /// # Panics
    /// Panics if `self` is not a start delimiter.
    #[inline]
    pub fn block_node(self) -> TemplateKind {
        match self {
            TemplateKind::DirectiveStart => TemplateKind::DirectiveBlock,
            TemplateKind::StandardBlockStart => TemplateKind::StandardBlock,
            TemplateKind::ExpressionBlockStart => TemplateKind::ExpressionBlock,
            TemplateKind::ClassFeatureBlockStart => TemplateKind::ClassFeatureBlock,
            _ => panic!("{self:?} does not open a block"),
        }
    }

    /// The fixed spelling of a delimiter kind; `None` for everything else.
    #[inline]
    pub fn static_text(self) -> Option<&'static str> {
        let text = match self {
            TemplateKind::DirectiveStart => "<#@",
            TemplateKind::DirectiveEnd => "@#>",
            TemplateKind::StandardBlockStart => "<#",
            TemplateKind::StandardBlockEnd => "#>",
            TemplateKind::ExpressionBlockStart => "<#=",
            TemplateKind::ExpressionBlockEnd => "=#>",
            TemplateKind::ClassFeatureBlockStart => "<#+",
            TemplateKind::ClassFeatureBlockEnd => "+#>",
            _ => return None,
        };
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARTS: [TemplateKind; 4] = [
        TemplateKind::DirectiveStart,
        TemplateKind::StandardBlockStart,
        TemplateKind::ExpressionBlockStart,
        TemplateKind::ClassFeatureBlockStart,
    ];

    #[test]
    fn end_kinds_are_adjacent_to_their_starts() {
        for start in STARTS {
            let end = start.matching_end();
            assert!(end.is_block_end());
            assert_eq!(end.into_raw().0, start.into_raw().0 + 1);
        }
    }

    #[test]
    fn raw_round_trip() {
        for raw in KIND_BASE..KIND_BASE + 17 {
            let kind = TemplateKind::from_raw(RawKind(raw));
            assert_eq!(kind.into_raw(), RawKind(raw));
        }
    }

    #[test]
    fn delimiters_have_static_text() {
        for start in STARTS {
            assert!(start.static_text().is_some());
            assert!(start.matching_end().static_text().is_some());
        }
        assert_eq!(TemplateKind::LiteralText.static_text(), None);
        assert_eq!(TemplateKind::Eof.static_text(), None);
    }
}
