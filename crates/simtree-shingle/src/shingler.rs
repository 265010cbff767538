// SPDX-License-Identifier: MIT OR Apache-2.0

//! Depth-first k-gram shingling over a rule-normalized AST.

use simtree_ast::Node;
use simtree_rules::{Applied, RuleEngine};

use crate::repr::{represent, SEPARATOR};

/// One k-gram: the joined representation string of the last `k` nodes on
/// the traversal's ancestor-to-self path stack, plus the line range of the
/// deepest (most recently pushed) node in that k-gram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shingle {
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// k-gram size and value-truncation length.
#[derive(Debug, Clone, Copy)]
pub struct ShingleConfig {
    pub k: usize,
    pub value_limit: usize,
}

impl Default for ShingleConfig {
    fn default() -> Self {
        Self { k: 3, value_limit: 50 }
    }
}

pub struct Shingler {
    config: ShingleConfig,
}

impl Shingler {
    #[must_use]
    pub fn new(config: ShingleConfig) -> Self {
        Self { config }
    }

    /// Shingles the subtree rooted at `node` (a function/class/method/
    /// chunk region's own AST node). Resets the engine's anonymization
    /// counters first, so the same code anonymizes identically regardless
    /// of what ran before it.
    pub fn shingle_node(&self, node: Node<'_>, engine: &mut RuleEngine<'_>) -> Vec<Shingle> {
        engine.reset_identifiers();
        let mut stack: Vec<(String, (usize, usize))> = Vec::new();
        let mut out = Vec::new();
        walk(node, engine, &mut stack, self.config, &mut out, None);
        out
    }

    /// Shingles a `lines`-typed region: traverses from the file's root,
    /// skipping any node whose line range falls entirely outside
    /// `(start_line, end_line)` ("the shingler skips nodes
    /// whose line_range is entirely outside the window").
    pub fn shingle_window(&self, root: Node<'_>, window: (usize, usize), engine: &mut RuleEngine<'_>) -> Vec<Shingle> {
        engine.reset_identifiers();
        let mut stack: Vec<(String, (usize, usize))> = Vec::new();
        let mut out = Vec::new();
        walk(root, engine, &mut stack, self.config, &mut out, Some(window));
        out
    }
}

fn walk<'tree>(
    node: Node<'tree>,
    engine: &mut RuleEngine<'_>,
    stack: &mut Vec<(String, (usize, usize))>,
    config: ShingleConfig,
    out: &mut Vec<Shingle>,
    window: Option<(usize, usize)>,
) {
    if let Some((window_start, window_end)) = window {
        let (start, end) = node.line_range();
        if end < window_start || start > window_end {
            return;
        }
    }

    match engine.apply(node) {
        Applied::Skip => {}
        Applied::Keep { name, value } => {
            let entry = represent(&name, value.as_deref(), config.value_limit);
            stack.push((entry, node.line_range()));

            if stack.len() >= config.k {
                let window_start = stack.len() - config.k;
                let content = stack[window_start..]
                    .iter()
                    .map(|(repr, _)| repr.as_str())
                    .collect::<Vec<_>>()
                    .join(&SEPARATOR.to_string());
                let (_, (deepest_start, deepest_end)) = stack[stack.len() - 1];
                out.push(Shingle { content, start_line: deepest_start, end_line: deepest_end });
            }

            for child in node.children() {
                walk(child, engine, stack, config, out, window);
            }
            stack.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtree_ast::SourceFile;
    use simtree_languages::LanguageTag;
    use simtree_rules::RuleCatalog;
    use simtree_rules::RuleSet;

    #[test]
    fn identical_functions_produce_identical_shingles() {
        let catalog = RuleCatalog::build().unwrap();
        let src_a = "def f(x):\n    return x + 1\n";
        let src_b = "def g(y):\n    return y + 1\n";
        let file_a = SourceFile::parse("a.py", LanguageTag::Python, src_a.as_bytes()).unwrap();
        let file_b = SourceFile::parse("b.py", LanguageTag::Python, src_b.as_bytes()).unwrap();

        let mut engine = RuleEngine::new(&catalog, RuleSet::Default);
        engine.precompute_queries(file_a.root(), LanguageTag::Python, file_a.source());
        let shingler = Shingler::new(ShingleConfig::default());
        let shingles_a = shingler.shingle_node(file_a.root(), &mut engine);

        engine.precompute_queries(file_b.root(), LanguageTag::Python, file_b.source());
        let shingles_b = shingler.shingle_node(file_b.root(), &mut engine);

        let contents_a: Vec<_> = shingles_a.iter().map(|s| s.content.clone()).collect();
        let contents_b: Vec<_> = shingles_b.iter().map(|s| s.content.clone()).collect();
        assert_eq!(contents_a, contents_b);
    }

    #[test]
    fn window_excludes_nodes_entirely_outside_range() {
        let catalog = RuleCatalog::build().unwrap();
        let src = "a = 1\nb = 2\nc = 3\nd = 4\n";
        let file = SourceFile::parse("t.py", LanguageTag::Python, src.as_bytes()).unwrap();
        let mut engine = RuleEngine::new(&catalog, RuleSet::Default);
        engine.precompute_queries(file.root(), LanguageTag::Python, file.source());
        let shingler = Shingler::new(ShingleConfig { k: 1, value_limit: 50 });

        let shingles = shingler.shingle_window(file.root(), (1, 2), &mut engine);
        assert!(shingles.iter().all(|s| s.start_line <= 2));
        assert!(shingles.iter().any(|s| s.start_line <= 2));
    }
}
