// SPDX-License-Identifier: MIT OR Apache-2.0

//! The rule data model: a `Rule` as compiled-query-plus-action data.

use simtree_languages::LanguageTag;
use simtree_utils::FastSet;
use thiserror::Error;
use tree_sitter::{Language as TsLanguage, Query};

/// Which region kind an extraction rule tags a matched node with.
/// `Chunk` is never produced by a rule — it is only assigned by the
/// statistical extractor — but lives here so `Region` (in
/// `simtree-regions`) and `Rule` share one enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Function,
    Class,
    Method,
    Heading,
    CodeBlock,
    Lines,
    Chunk,
    ShingleWindow,
}

impl RegionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Method => "method",
            Self::Heading => "heading",
            Self::CodeBlock => "code_block",
            Self::Lines => "lines",
            Self::Chunk => "chunk",
            Self::ShingleWindow => "shingle_window",
        }
    }
}

/// The set of languages a rule applies to: either an explicit set, or the
/// `*` wildcard sentinel meaning "all languages".
#[derive(Debug, Clone)]
pub enum LanguageScope {
    Wildcard,
    Specific(FastSet<LanguageTag>),
}

impl LanguageScope {
    #[must_use]
    pub fn one(lang: LanguageTag) -> Self {
        let mut set = FastSet::default();
        set.insert(lang);
        Self::Specific(set)
    }

    #[must_use]
    pub fn applies_to(&self, lang: LanguageTag) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Specific(set) => set.contains(&lang),
        }
    }
}

/// What a matched rule does to a node (`Rule.action`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    /// Prune the subtree rooted at the matched node.
    Remove,
    /// Replace the node's normalized name.
    Rename,
    /// Replace the node's normalized value, keeping its name.
    ReplaceValue,
    /// Replace the node's name with `prefix_<n>` for a monotonic per-region
    /// counter keyed by `params.prefix`.
    Anonymize,
    /// Replace the node's name with a single canonical token regardless of
    /// its original spelling (e.g. collapsing `List`/`Vec`/`Array` to one
    /// normalized type label under the `loose` ruleset).
    Canonicalize,
    /// Mark the node as a region boundary; never affects shingle content
    ///.
    ExtractRegion,
}

/// Parameters a rule's action draws on ( `Rule.params`).
#[derive(Debug, Clone, Default)]
pub struct RuleParams {
    /// Anonymization counter key (`anonymize`).
    pub prefix: Option<String>,
    /// Canonical replacement token (`rename`/`canonicalize`).
    pub token: Option<String>,
    /// Canonical replacement value (`replace_value`).
    pub value: Option<String>,
    /// Region kind to tag (`extract_region`).
    pub region_kind: Option<RegionKind>,
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule `{name}`: invalid tree-sitter query: {source}")]
    InvalidQuery {
        name: String,
        #[source]
        source: tree_sitter::QueryError,
    },
}

/// A compiled tree-sitter query plus the capture simtree treats as the
/// match target (`query (tree pattern)`).
pub struct CompiledQuery {
    query: Query,
    target_capture: u32,
}

impl CompiledQuery {
    /// Compiles `pattern` against `language`. The pattern must contain a
    /// capture named `@target` identifying the node the rule acts on.
    pub fn compile(rule_name: &str, language: &TsLanguage, pattern: &str) -> Result<Self, RuleError> {
        let query = Query::new(language, pattern).map_err(|source| RuleError::InvalidQuery {
            name: rule_name.to_string(),
            source,
        })?;
        let target_capture = query
            .capture_names()
            .iter()
            .position(|name| *name == "target")
            .unwrap_or(0) as u32;
        Ok(Self { query, target_capture })
    }

    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn target_capture_index(&self) -> u32 {
        self.target_capture
    }
}

/// One compiled, per-language rule ( `Rule`).
pub struct Rule {
    pub name: String,
    pub languages: LanguageScope,
    /// Queries are per-language: the same logical rule ("remove comments")
    /// is compiled once for every language it targets, since tree-sitter
    /// queries are tied to a single grammar.
    pub queries: Vec<(LanguageTag, CompiledQuery)>,
    pub action: RuleAction,
    pub params: RuleParams,
}

impl Rule {
    #[must_use]
    pub fn query_for(&self, lang: LanguageTag) -> Option<&CompiledQuery> {
        self.queries
            .iter()
            .find_map(|(l, q)| if *l == lang { Some(q) } else { None })
    }
}
