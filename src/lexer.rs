//! The lexer: turns template text into delimiter and literal tokens.
//!
//! Delimiter recognition is purely textual. Which block kind is currently
//! open is the parser's business; the lexer will happily emit a `#>` inside
//! an expression block and leave the complaint to the parser.

use text_size::{TextRange, TextSize};

use crate::kind::TemplateKind;

/// All delimiter kinds, longest spelling first, so that scanning the table
/// in order gives the longest match (`<#=` before `<#`).
const DELIMITERS: [TemplateKind; 8] = [
    TemplateKind::DirectiveStart,
    TemplateKind::ExpressionBlockStart,
    TemplateKind::ClassFeatureBlockStart,
    TemplateKind::DirectiveEnd,
    TemplateKind::ExpressionBlockEnd,
    TemplateKind::ClassFeatureBlockEnd,
    TemplateKind::StandardBlockStart,
    TemplateKind::StandardBlockEnd,
];

/// Byte length of the longest delimiter spelling in [`DELIMITERS`].
pub(crate) const MAX_DELIMITER_LEN: u32 = 3;

/// The delimiter starting at `pos`, if any, preferring the longest spelling.
pub(crate) fn delimiter_at(text: &str, pos: TextSize) -> Option<TemplateKind> {
    let rest = &text[usize::from(pos)..];
    DELIMITERS
        .into_iter()
        .find(|kind| rest.starts_with(kind.static_text().unwrap()))
}

/// A single lexed token: its kind and the source range it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexedToken {
    pub kind:  TemplateKind,
    pub range: TextRange,
}

/// A character cursor producing one token per call.
pub struct Lexer<'text> {
    text: &'text str,
    pos:  TextSize,
}

impl<'text> Lexer<'text> {
    pub fn new(text: &'text str) -> Self {
        Self { text, pos: 0.into() }
    }

    pub fn position(&self) -> TextSize {
        self.pos
    }

    /// Skips ahead to `pos` without producing tokens; used when the blender
    /// covers the skipped span with a reused token.
    pub(crate) fn advance_to(&mut self, pos: TextSize) {
        debug_assert!(pos >= self.pos && self.text.is_char_boundary(pos.into()));
        self.pos = pos;
    }

    /// The source text slice covered by `token`.
    pub fn token_text(&self, token: &LexedToken) -> &'text str {
        &self.text[usize::from(token.range.start())..usize::from(token.range.end())]
    }

    /// Produces exactly one token.
    ///
    /// At a delimiter sequence, that delimiter; otherwise the longest literal
    /// run reaching up to the next delimiter or end of input. Once the end of
    /// input is reached, keeps returning the zero-width `Eof` sentinel.
    pub fn next_token(&mut self) -> LexedToken {
        let text_len = TextSize::of(self.text);
        if self.pos >= text_len {
            return LexedToken {
                kind:  TemplateKind::Eof,
                range: TextRange::empty(text_len),
            };
        }

        if let Some(kind) = delimiter_at(self.text, self.pos) {
            let len = TextSize::of(kind.static_text().unwrap());
            let range = TextRange::at(self.pos, len);
            self.pos = range.end();
            return LexedToken { kind, range };
        }

        let start = self.pos;
        let mut end = text_len;
        let rest = &self.text[usize::from(start)..];
        for (i, _) in rest.char_indices() {
            if i == 0 {
                // No delimiter here, the first character belongs to the run.
                continue;
            }
            let boundary = start + TextSize::from(i as u32);
            if delimiter_at(self.text, boundary).is_some() {
                end = boundary;
                break;
            }
        }
        self.pos = end;
        LexedToken {
            kind:  TemplateKind::LiteralText,
            range: TextRange::new(start, end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Vec<(TemplateKind, &str)> {
        let mut lexer = Lexer::new(text);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.kind == TemplateKind::Eof {
                break;
            }
            tokens.push((token.kind, lexer.token_text(&token)));
        }
        tokens
    }

    #[test]
    fn literal_and_standard_block() {
        assert_eq!(
            lex("a<#b#>c"),
            vec![
                (TemplateKind::LiteralText, "a"),
                (TemplateKind::StandardBlockStart, "<#"),
                (TemplateKind::LiteralText, "b"),
                (TemplateKind::StandardBlockEnd, "#>"),
                (TemplateKind::LiteralText, "c"),
            ]
        );
    }

    #[test]
    fn longest_delimiter_wins() {
        assert_eq!(
            lex("<#=x=#>"),
            vec![
                (TemplateKind::ExpressionBlockStart, "<#="),
                (TemplateKind::LiteralText, "x"),
                (TemplateKind::ExpressionBlockEnd, "=#>"),
            ]
        );
        assert_eq!(
            lex("<#@ t #><#+f+#>"),
            vec![
                (TemplateKind::DirectiveStart, "<#@"),
                (TemplateKind::LiteralText, " t "),
                (TemplateKind::StandardBlockEnd, "#>"),
                (TemplateKind::ClassFeatureBlockStart, "<#+"),
                (TemplateKind::LiteralText, "f"),
                (TemplateKind::ClassFeatureBlockEnd, "+#>"),
            ]
        );
    }

    #[test]
    fn near_delimiters_are_literal() {
        assert_eq!(lex("< # x >"), vec![(TemplateKind::LiteralText, "< # x >")]);
        assert_eq!(
            lex("a<b#c>d"),
            vec![(TemplateKind::LiteralText, "a<b#c>d")]
        );
    }

    #[test]
    fn adjacent_delimiters() {
        assert_eq!(
            lex("<#<#"),
            vec![
                (TemplateKind::StandardBlockStart, "<#"),
                (TemplateKind::StandardBlockStart, "<#"),
            ]
        );
    }

    #[test]
    fn multibyte_literals() {
        assert_eq!(
            lex("höhe<#タグ#>"),
            vec![
                (TemplateKind::LiteralText, "höhe"),
                (TemplateKind::StandardBlockStart, "<#"),
                (TemplateKind::LiteralText, "タグ"),
                (TemplateKind::StandardBlockEnd, "#>"),
            ]
        );
    }

    #[test]
    fn max_delimiter_len_covers_the_table() {
        let longest = DELIMITERS
            .iter()
            .map(|kind| kind.static_text().unwrap().len())
            .max()
            .unwrap();
        assert_eq!(longest as u32, MAX_DELIMITER_LEN);
    }

    #[test]
    fn eof_is_idempotent() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TemplateKind::LiteralText);
        let first_eof = lexer.next_token();
        let second_eof = lexer.next_token();
        assert_eq!(first_eof.kind, TemplateKind::Eof);
        assert_eq!(first_eof, second_eof);
        assert!(first_eof.range.is_empty());
    }
}
