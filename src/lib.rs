//! `templar` is an incremental lexer and parser for T4-style template
//! documents: literal text interleaved with `<# .. #>` control blocks,
//! `<#= .. =#>` expression blocks, `<#+ .. +#>` class feature blocks and
//! `<#@ .. @#>` directives.
//!
//! The crate is built around the "green tree / red tree" split known from
//! Roslyn and `rust-analyzer`: the [`GreenNode`]s of a parse are immutable,
//! position-free, and shared between document revisions, while [`SyntaxNode`]
//! cursors lay absolute text ranges over them on demand. Token text lives in
//! a [`lasso`] string interner owned by the [`NodeCache`], so equal tokens
//! are a single allocation no matter how often they appear.
//!
//! Parsing never fails: malformed templates produce a tree with absent slots
//! plus [`Diagnostic`]s on the [`Parse`].
//!
//! ```
//! use templar::{parse, TemplateKind};
//!
//! let parse = parse("Hello <#= name =#>!");
//! assert!(parse.errors().is_empty());
//! let document = parse.syntax();
//! assert_eq!(document.kind(), TemplateKind::Document);
//! assert_eq!(parse.text(), "Hello <#= name =#>!");
//! ```
//!
//! ## Incremental reparsing
//!
//! After an edit, [`Parse::reparse`] (or [`reparse_with_cache`]) re-lexes
//! only around the edited spans and lifts every other token from the
//! previous tree. Unchanged template blocks come back as the same green
//! nodes, pointer-equal across revisions:
//!
//! ```
//! use templar::{parse, TextEdit};
//!
//! let old = parse("a<#b#>c");
//! // "a" -> "ax": insert one byte at offset 1.
//! let new = old.reparse(&[TextEdit::insert(1.into(), 1.into())], "ax<#b#>c");
//! assert_eq!(new.text(), "ax<#b#>c");
//! assert!(new.errors().is_empty());
//! ```

#![forbid(unconditional_recursion, future_incompatible)]
#![deny(unsafe_code)]

pub mod blender;
pub mod diagnostics;
pub mod green;
mod kind;
pub mod lexer;
mod parser;
mod pooled;
pub mod syntax;
mod utility_types;

pub use crate::{
    blender::{BlendedToken, Blender, TextEdit},
    diagnostics::{Diagnostic, DiagnosticKind},
    green::{
        Checkpoint, GreenElement, GreenElementRef, GreenNode, GreenNodeBuilder, GreenNodeChildren,
        GreenToken, NodeCache,
    },
    kind::{RawKind, TemplateKind, KIND_BASE},
    lexer::{LexedToken, Lexer},
    parser::{parse, parse_with_cache, reparse_with_cache, Parse},
    pooled::ScratchError,
    syntax::{SyntaxElement, SyntaxElementChildren, SyntaxNode, SyntaxNodeChildren, SyntaxToken},
    utility_types::{NodeOrToken, TokenAtOffset, WalkEvent},
};

/// Convenience re-exports of the interning traits and types token text
/// resolution is built on.
pub mod interning {
    pub use lasso::{Interner, Key, Resolver, Rodeo, Spur};
}

pub use text_size::{TextLen, TextRange, TextSize};
