// SPDX-License-Identifier: MIT OR Apache-2.0

//! The rule engine: matches every rule against an AST once per root, then
//! answers cheap per-node queries during shingling.

use simtree_ast::Node;
use simtree_languages::LanguageTag;
use simtree_utils::FastMap;
use tree_sitter::QueryCursor;

use crate::catalog::{RuleCatalog, RuleSet};
use crate::rule::{Rule, RuleAction};

/// The result of applying every active rule to one node (modeled
/// as a sum type rather than an exception, to avoid exception-as-control-flow
/// on the hot traversal path).
#[derive(Debug, Clone)]
pub enum Applied {
    /// Descend into the node's children with this normalized label.
    Keep { name: String, value: Option<String> },
    /// Prune the entire subtree (a `remove` rule matched).
    Skip,
}

type NodeKey = (usize, usize);

/// One worker's view of the rule catalog for a single ruleset. Owns a
/// per-root query-match cache and a per-region anonymization counter
/// table; both must be scoped to a single thread.
pub struct RuleEngine<'c> {
    catalog: &'c RuleCatalog,
    ruleset: RuleSet,
    /// node byte-range -> indices (into `active_rules`) of rules matching
    /// that node, in catalog declaration order. Populated once per root by
    /// [`Self::precompute_queries`] ("amortized to O(N*R) per
    /// region").
    match_cache: FastMap<NodeKey, Vec<usize>>,
    anonymize_counters: FastMap<String, u32>,
}

impl<'c> RuleEngine<'c> {
    #[must_use]
    pub fn new(catalog: &'c RuleCatalog, ruleset: RuleSet) -> Self {
        Self {
            catalog,
            ruleset,
            match_cache: FastMap::default(),
            anonymize_counters: FastMap::default(),
        }
    }

    fn active_rules(&self) -> Vec<&'c Rule> {
        self.catalog.rules_for(self.ruleset)
    }

    /// Runs every active rule's query against `root` once, caching which
    /// rules match which node. Must be called before `apply` for a new
    /// root; `source` must be the same bytes `root` was parsed from.
    pub fn precompute_queries(&mut self, root: Node<'_>, language: LanguageTag, source: &str) {
        self.match_cache.clear();
        let active = self.active_rules();
        let mut cursor = QueryCursor::new();
        let bytes = source.as_bytes();

        for (rule_idx, rule) in active.iter().enumerate() {
            if !rule.languages.applies_to(language) {
                continue;
            }
            let Some(compiled) = rule.query_for(language) else {
                continue;
            };
            let target = compiled.target_capture_index();
            let matches = cursor.matches(compiled.query(), root.inner(), bytes);
            for m in matches {
                for capture in m.captures {
                    if capture.index != target {
                        continue;
                    }
                    let r = capture.node.byte_range();
                    self.match_cache.entry((r.start, r.end)).or_default().push(rule_idx);
                }
            }
        }
    }

    /// Looks up which rules matched `node` (from the cache built by
    /// [`Self::precompute_queries`]) and applies the ordering semantics of
    /// : a `remove` match dominates; otherwise the last matching
    /// rule (in catalog order) wins.
    #[must_use]
    pub fn apply(&mut self, node: Node<'_>) -> Applied {
        let active = self.active_rules();
        let key = node.cache_key();
        let Some(rule_indices) = self.match_cache.get(&key) else {
            return self.default_representation(node);
        };

        if rule_indices.iter().any(|&i| active[i].action == RuleAction::Remove) {
            return Applied::Skip;
        }

        let Some(&winner_idx) = rule_indices
            .iter()
            .rev()
            .find(|&&i| active[i].action != RuleAction::Remove)
        else {
            return self.default_representation(node);
        };
        let rule = active[winner_idx];

        match rule.action {
            RuleAction::Remove => unreachable!("filtered above"),
            RuleAction::Rename => Applied::Keep {
                name: rule.params.token.clone().unwrap_or_else(|| node.kind().to_string()),
                value: None,
            },
            RuleAction::ReplaceValue => Applied::Keep {
                name: node.kind().to_string(),
                value: rule.params.value.clone(),
            },
            RuleAction::Canonicalize => Applied::Keep {
                name: rule.params.token.clone().unwrap_or_else(|| node.kind().to_string()),
                value: None,
            },
            RuleAction::Anonymize => {
                let prefix = rule.params.prefix.clone().unwrap_or_else(|| "ID".to_string());
                let counter = self.anonymize_counters.entry(prefix.clone()).or_insert(0);
                *counter += 1;
                Applied::Keep {
                    name: format!("{prefix}_{counter}"),
                    value: None,
                }
            }
            RuleAction::ExtractRegion => self.default_representation(node),
        }
    }

    fn default_representation(&self, node: Node<'_>) -> Applied {
        let value = if node.child_count() == 0 {
            Some(node.text().to_string())
        } else {
            None
        };
        Applied::Keep { name: node.kind().to_string(), value }
    }

    /// Clears anonymization counters. Must be called at every region
    /// boundary so identical regions in different files
    /// produce identical anonymized token streams.
    pub fn reset_identifiers(&mut self) {
        self.anonymize_counters.clear();
    }

    /// Finds every node matched by `rule`'s query for `language` — used by
    /// the region extractor to find explicit region boundaries.
    /// Region-extraction rules never affect shingle content.
    #[must_use]
    pub fn nodes_matching<'tree>(
        rule: &Rule,
        root: Node<'tree>,
        language: LanguageTag,
        source: &str,
    ) -> Vec<Node<'tree>> {
        let Some(compiled) = rule.query_for(language) else {
            return Vec::new();
        };
        let target = compiled.target_capture_index();
        let mut cursor = QueryCursor::new();
        let bytes = source.as_bytes();
        let matches = cursor.matches(compiled.query(), root.inner(), bytes);
        let mut out = Vec::new();
        for m in matches {
            for capture in m.captures {
                if capture.index == target {
                    out.push(wrap(capture.node, bytes));
                }
            }
        }
        out
    }
}

/// Rebuilds a `simtree_ast::Node` facade from a raw `tree_sitter::Node`
/// captured out of a query match.
fn wrap<'tree>(inner: tree_sitter::Node<'tree>, source: &'tree [u8]) -> Node<'tree> {
    // `simtree_ast::Node` fields are private by design; this helper lives
    // here because only the rule engine needs to reconstruct a facade
    // from a raw capture instead of from tree traversal.
    Node::from_raw(inner, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simtree_ast::SourceFile;

    #[test]
    fn remove_dominates_other_matches() {
        let catalog = RuleCatalog::build().unwrap();
        let mut engine = RuleEngine::new(&catalog, RuleSet::Default);
        let src = "# a comment\nx = 1\n";
        let file = SourceFile::parse("t.py", LanguageTag::Python, src.as_bytes()).unwrap();
        let root = file.root();
        engine.precompute_queries(root, LanguageTag::Python, file.source());

        fn find_comment<'t>(n: Node<'t>) -> Option<Node<'t>> {
            if n.kind() == "comment" {
                return Some(n);
            }
            for c in n.children() {
                if let Some(found) = find_comment(c) {
                    return Some(found);
                }
            }
            None
        }
        let comment = find_comment(root).expect("fixture has a comment node");
        assert!(matches!(engine.apply(comment), Applied::Skip));
    }

    #[test]
    fn anonymize_counters_reset_between_regions() {
        let catalog = RuleCatalog::build().unwrap();
        let mut engine = RuleEngine::new(&catalog, RuleSet::Default);
        let src = "foo = 1\nbar = 2\n";
        let file = SourceFile::parse("t.py", LanguageTag::Python, src.as_bytes()).unwrap();
        let root = file.root();
        engine.precompute_queries(root, LanguageTag::Python, file.source());

        fn find_identifiers<'t>(n: Node<'t>, out: &mut Vec<Node<'t>>) {
            if n.kind() == "identifier" {
                out.push(n);
            }
            for c in n.children() {
                find_identifiers(c, out);
            }
        }
        let mut ids = Vec::new();
        find_identifiers(root, &mut ids);
        assert!(ids.len() >= 2);

        let Applied::Keep { name: first, .. } = engine.apply(ids[0]) else { panic!("expected keep") };
        engine.reset_identifiers();
        let Applied::Keep { name: second, .. } = engine.apply(ids[1]) else { panic!("expected keep") };
        assert_eq!(first, second, "counter reset should make both the first anonymized identifier");
    }
}
