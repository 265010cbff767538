// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `SourceFile` / `Node` AST model.
//!
//! A `SourceFile` owns its source bytes and its parsed `tree-sitter` tree
//! and is immutable after construction. `Node` is a thin, borrowed facade
//! over `tree_sitter::Node` that exposes exactly the shape  names:
//! `{ kind, byte_range, line_range, children }`, with `line_range` always
//! 1-indexed and inclusive.

use std::ops::Range;
use std::path::{Path, PathBuf};

use simtree_languages::LanguageTag;
use thiserror::Error;
use tree_sitter::{Parser, Tree};

#[derive(Debug, Error)]
pub enum AstError {
    #[error("failed to construct a tree-sitter parser for {0}")]
    ParserSetup(LanguageTag),
    #[error("tree-sitter failed to parse {path}")]
    ParseFailed { path: PathBuf },
}

/// An immutable parsed source file: path, detected language, the source
/// text (after lossy UTF-8 repair — : "invalid byte sequences are
/// replaced, never fatal"), and its `tree-sitter` AST.
pub struct SourceFile {
    path: PathBuf,
    language: LanguageTag,
    source: String,
    tree: Tree,
}

impl SourceFile {
    /// Parses `bytes` as `language`. Invalid UTF-8 is replaced with
    /// U+FFFD rather than rejected.
    pub fn parse(path: impl Into<PathBuf>, language: LanguageTag, bytes: &[u8]) -> Result<Self, AstError> {
        let path = path.into();
        let source = String::from_utf8_lossy(bytes).into_owned();
        let ts_language = language
            .ts_language()
            .map_err(|_| AstError::ParserSetup(language))?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|_| AstError::ParserSetup(language))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| AstError::ParseFailed { path: path.clone() })?;
        Ok(Self {
            path,
            language,
            source,
            tree,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn language(&self) -> LanguageTag {
        self.language
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Total number of lines in the source, used to bound-check region
    /// line ranges (`R.end_line <= file_line_count(R.path)`).
    #[must_use]
    pub fn line_count(&self) -> usize {
        // `lines()` drops a single trailing newline's empty tail the way
        // editors count lines; an empty file still has one (empty) line.
        self.source.lines().count().max(1)
    }

    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            inner: self.tree.root_node(),
            source: self.source.as_bytes(),
        }
    }
}

/// A node in a parsed AST: `{ kind, byte_range, line_range, children }`
///, borrowed from its owning `SourceFile`.
#[derive(Clone, Copy)]
pub struct Node<'tree> {
    inner: tree_sitter::Node<'tree>,
    source: &'tree [u8],
}

impl<'tree> Node<'tree> {
    /// Wraps a raw `tree-sitter` node captured out of a query match (used
    /// by `simtree-rules`' rule engine, which works directly with query
    /// captures rather than tree traversal).
    #[must_use]
    pub fn from_raw(inner: tree_sitter::Node<'tree>, source: &'tree [u8]) -> Self {
        Self { inner, source }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    #[must_use]
    pub fn is_named(&self) -> bool {
        self.inner.is_named()
    }

    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.inner.byte_range()
    }

    /// 1-indexed, inclusive `(start_line, end_line)`.
    #[must_use]
    pub fn line_range(&self) -> (usize, usize) {
        let start = self.inner.start_position().row + 1;
        let end = self.inner.end_position().row + 1;
        (start, end)
    }

    /// The node's source text. Invariant: a node's `byte_range`
    /// covers every child's `byte_range`, so this always contains the text
    /// of every descendant.
    #[must_use]
    pub fn text(&self) -> &'tree str {
        self.inner
            .utf8_text(self.source)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn children(&self) -> impl Iterator<Item = Node<'tree>> + '_ {
        let source = self.source;
        let mut cursor = self.inner.walk();
        let children: Vec<_> = self.inner.children(&mut cursor).collect();
        children
            .into_iter()
            .map(move |inner| Node { inner, source })
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.inner.child_count()
    }

    #[must_use]
    pub fn child_by_field_name(&self, field: &str) -> Option<Node<'tree>> {
        self.inner
            .child_by_field_name(field)
            .map(|inner| Node { inner, source: self.source })
    }

    /// The node's parent, if any. Used by the region extractor to walk
    /// ancestor chains (e.g. distinguishing a top-level function from one
    /// nested inside another, or a method from a free function).
    #[must_use]
    pub fn parent(&self) -> Option<Node<'tree>> {
        self.inner
            .parent()
            .map(|inner| Node { inner, source: self.source })
    }

    /// A stable identity for this node within its tree, suitable as a
    /// cache key ("caches matches by `(byte_range) -> ...`").
    #[must_use]
    pub fn cache_key(&self) -> (usize, usize) {
        let r = self.byte_range();
        (r.start, r.end)
    }

    #[must_use]
    pub fn inner(&self) -> tree_sitter::Node<'tree> {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_range_covers_children() {
        let src = b"def f():\n    return 1\n";
        let file = SourceFile::parse("t.py", LanguageTag::Python, src).unwrap();
        let root = file.root();
        fn check(n: Node<'_>) {
            for child in n.children() {
                assert!(n.byte_range().start <= child.byte_range().start);
                assert!(n.byte_range().end >= child.byte_range().end);
                check(child);
            }
        }
        check(root);
    }

    #[test]
    fn line_range_is_one_indexed() {
        let src = b"x = 1\n";
        let file = SourceFile::parse("t.py", LanguageTag::Python, src).unwrap();
        let (start, end) = file.root().line_range();
        assert!(start >= 1);
        assert!(end >= start);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let src = [b'x', b'=', 0xFF, 0xFE, b'\n'];
        let file = SourceFile::parse("t.py", LanguageTag::Python, &src).unwrap();
        assert!(file.source().contains('\u{FFFD}'));
    }
}
