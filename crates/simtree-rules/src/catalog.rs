// SPDX-License-Identifier: MIT OR Apache-2.0

//! The rule registry: per-language configuration providing a `default`
//! rule list, a `loose` rule list (`default` ∪ extra rules), and a list
//! of region-extraction rules.
//!
//! Per-language detail (which node kinds are comments, identifiers,
//! functions, ...) is data, not code, driven by [`LangProfile`] — this
//! keeps every later pipeline stage entirely language-agnostic. The rule
//! *catalog* is project-owned data; the grammars it queries are not.

use simtree_languages::LanguageTag;
use tree_sitter::Language as TsLanguage;

use crate::rule::{CompiledQuery, LanguageScope, RegionKind, Rule, RuleAction, RuleError, RuleParams};

/// Which named-node kinds play which structural role for one language.
/// Empty slices are valid — e.g. Go has no class-like construct.
struct LangProfile {
    lang: LanguageTag,
    comment_kinds: &'static [&'static str],
    import_kinds: &'static [&'static str],
    identifier_kinds: &'static [&'static str],
    literal_kinds: &'static [&'static str],
    type_identifier_kinds: &'static [&'static str],
    function_kinds: &'static [&'static str],
    class_kinds: &'static [&'static str],
    heading_kinds: &'static [&'static str],
}

const PROFILES: &[LangProfile] = &[
    LangProfile {
        lang: LanguageTag::Python,
        comment_kinds: &["comment"],
        import_kinds: &["import_statement", "import_from_statement"],
        identifier_kinds: &["identifier"],
        literal_kinds: &["string", "integer", "float"],
        type_identifier_kinds: &["type"],
        function_kinds: &["function_definition"],
        class_kinds: &["class_definition"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Javascript,
        comment_kinds: &["comment"],
        import_kinds: &["import_statement"],
        identifier_kinds: &["identifier", "property_identifier", "shorthand_property_identifier"],
        literal_kinds: &["string", "template_string", "number"],
        type_identifier_kinds: &[],
        function_kinds: &["function_declaration", "method_definition", "arrow_function", "function_expression"],
        class_kinds: &["class_declaration"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Typescript,
        comment_kinds: &["comment"],
        import_kinds: &["import_statement"],
        identifier_kinds: &["identifier", "property_identifier", "shorthand_property_identifier"],
        literal_kinds: &["string", "template_string", "number"],
        type_identifier_kinds: &["type_identifier", "predefined_type"],
        function_kinds: &["function_declaration", "method_definition", "arrow_function", "function_expression"],
        class_kinds: &["class_declaration", "interface_declaration"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Tsx,
        comment_kinds: &["comment"],
        import_kinds: &["import_statement"],
        identifier_kinds: &["identifier", "property_identifier", "shorthand_property_identifier"],
        literal_kinds: &["string", "template_string", "number"],
        type_identifier_kinds: &["type_identifier", "predefined_type"],
        function_kinds: &["function_declaration", "method_definition", "arrow_function", "function_expression"],
        class_kinds: &["class_declaration", "interface_declaration"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Java,
        comment_kinds: &["line_comment", "block_comment"],
        import_kinds: &["import_declaration"],
        identifier_kinds: &["identifier"],
        literal_kinds: &["string_literal", "decimal_integer_literal", "decimal_floating_point_literal"],
        type_identifier_kinds: &["type_identifier"],
        function_kinds: &["method_declaration", "constructor_declaration"],
        class_kinds: &["class_declaration", "interface_declaration"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Kotlin,
        comment_kinds: &["line_comment", "multiline_comment"],
        import_kinds: &["import_header"],
        identifier_kinds: &["simple_identifier"],
        literal_kinds: &["string_literal", "integer_literal", "real_literal"],
        type_identifier_kinds: &["type_identifier", "user_type"],
        function_kinds: &["function_declaration"],
        class_kinds: &["class_declaration"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Go,
        comment_kinds: &["comment"],
        import_kinds: &["import_declaration"],
        identifier_kinds: &["identifier", "field_identifier"],
        literal_kinds: &["interpreted_string_literal", "raw_string_literal", "int_literal", "float_literal"],
        type_identifier_kinds: &["type_identifier"],
        function_kinds: &["function_declaration", "method_declaration"],
        class_kinds: &[],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Rust,
        comment_kinds: &["line_comment", "block_comment"],
        import_kinds: &["use_declaration"],
        identifier_kinds: &["identifier", "field_identifier"],
        literal_kinds: &["string_literal", "integer_literal", "float_literal"],
        type_identifier_kinds: &["type_identifier", "primitive_type"],
        function_kinds: &["function_item"],
        class_kinds: &["impl_item", "struct_item", "enum_item", "trait_item"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Ruby,
        comment_kinds: &["comment"],
        import_kinds: &[],
        identifier_kinds: &["identifier"],
        literal_kinds: &["string", "integer", "float"],
        type_identifier_kinds: &["constant"],
        function_kinds: &["method", "singleton_method"],
        class_kinds: &["class", "module"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Csharp,
        comment_kinds: &["comment"],
        import_kinds: &["using_directive"],
        identifier_kinds: &["identifier"],
        literal_kinds: &["string_literal", "integer_literal", "real_literal"],
        type_identifier_kinds: &["predefined_type", "identifier"],
        function_kinds: &["method_declaration", "constructor_declaration"],
        class_kinds: &["class_declaration", "interface_declaration", "struct_declaration"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Bash,
        comment_kinds: &["comment"],
        import_kinds: &[],
        identifier_kinds: &["variable_name"],
        literal_kinds: &["string", "raw_string", "number"],
        type_identifier_kinds: &[],
        function_kinds: &["function_definition"],
        class_kinds: &[],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Sql,
        comment_kinds: &["comment", "marginalia"],
        import_kinds: &[],
        identifier_kinds: &["identifier"],
        literal_kinds: &["string", "literal"],
        type_identifier_kinds: &[],
        function_kinds: &[],
        class_kinds: &[],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Css,
        comment_kinds: &["comment"],
        import_kinds: &["import_statement"],
        identifier_kinds: &["property_name", "class_name", "id_name"],
        literal_kinds: &["string_value", "integer_value", "float_value"],
        type_identifier_kinds: &[],
        function_kinds: &[],
        class_kinds: &["rule_set"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Html,
        comment_kinds: &["comment"],
        import_kinds: &[],
        identifier_kinds: &["tag_name", "attribute_name"],
        literal_kinds: &["attribute_value", "quoted_attribute_value"],
        type_identifier_kinds: &[],
        function_kinds: &[],
        class_kinds: &["element"],
        heading_kinds: &[],
    },
    LangProfile {
        lang: LanguageTag::Markdown,
        comment_kinds: &["html_block"],
        import_kinds: &[],
        identifier_kinds: &[],
        literal_kinds: &[],
        type_identifier_kinds: &[],
        function_kinds: &[],
        class_kinds: &[],
        heading_kinds: &["atx_heading", "setext_heading"],
    },
];

fn profile_for(lang: LanguageTag) -> &'static LangProfile {
    PROFILES
        .iter()
        .find(|p| p.lang == lang)
        .expect("every LanguageTag variant has a LangProfile entry")
}

/// Per-node-kind lookup the region extractor uses to reclassify
/// `function`-tagged nodes into `Function` vs `Method` and to detect
/// nesting (nested functions are not separate regions).
#[derive(Debug, Clone, Copy)]
pub struct RegionProfile {
    pub function_kinds: &'static [&'static str],
    pub class_kinds: &'static [&'static str],
}

#[must_use]
pub fn region_profile(lang: LanguageTag) -> RegionProfile {
    let p = profile_for(lang);
    RegionProfile {
        function_kinds: p.function_kinds,
        class_kinds: p.class_kinds,
    }
}

fn kind_query(kinds: &[&str]) -> Option<String> {
    match kinds.len() {
        0 => None,
        1 => Some(format!("({}) @target", kinds[0])),
        _ => {
            let alts = kinds
                .iter()
                .map(|k| format!("({k})"))
                .collect::<Vec<_>>()
                .join(" ");
            Some(format!("[{alts}] @target"))
        }
    }
}

/// `ruleset ∈ {none, default, loose}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    None,
    #[default]
    Default,
    Loose,
}

/// The compiled rule registry: default rules, loose-only extra rules, and
/// region-extraction rules, each compiled once per language at
/// construction time ("malformed queries raise a
/// construction-time error, not a runtime one").
pub struct RuleCatalog {
    default_rules: Vec<Rule>,
    loose_extra_rules: Vec<Rule>,
    region_rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Builds and compiles the catalog for every language in
    /// [`LanguageTag::ALL`]. Fatal on any malformed query.
    pub fn build() -> Result<Self, RuleError> {
        let mut default_rules = Vec::new();
        let mut loose_extra_rules = Vec::new();
        let mut region_rules = Vec::new();

        for &lang in LanguageTag::ALL {
            let profile = profile_for(lang);
            let ts = lang.ts_language().expect("LanguageTag::ts_language is infallible for all variants");

            if let Some(q) = kind_query(profile.comment_kinds) {
                push_rule(&mut default_rules, "remove-comments", &q, lang, &ts, RuleAction::Remove, RuleParams::default())?;
            }
            if let Some(q) = kind_query(profile.import_kinds) {
                push_rule(&mut default_rules, "remove-imports", &q, lang, &ts, RuleAction::Remove, RuleParams::default())?;
            }
            if let Some(q) = kind_query(profile.identifier_kinds) {
                push_rule(
                    &mut default_rules,
                    "anonymize-identifiers",
                    &q,
                    lang,
                    &ts,
                    RuleAction::Anonymize,
                    RuleParams { prefix: Some("ID".to_string()), ..Default::default() },
                )?;
            }

            if let Some(q) = kind_query(profile.literal_kinds) {
                push_rule(
                    &mut loose_extra_rules,
                    "replace-literal-values",
                    &q,
                    lang,
                    &ts,
                    RuleAction::ReplaceValue,
                    RuleParams { value: Some("LIT".to_string()), ..Default::default() },
                )?;
            }
            if let Some(q) = kind_query(profile.type_identifier_kinds) {
                push_rule(
                    &mut loose_extra_rules,
                    "canonicalize-types",
                    &q,
                    lang,
                    &ts,
                    RuleAction::Canonicalize,
                    RuleParams { token: Some("TYPE".to_string()), ..Default::default() },
                )?;
            }

            if let Some(q) = kind_query(profile.function_kinds) {
                push_rule(
                    &mut region_rules,
                    "extract-function",
                    &q,
                    lang,
                    &ts,
                    RuleAction::ExtractRegion,
                    RuleParams { region_kind: Some(RegionKind::Function), ..Default::default() },
                )?;
            }
            if let Some(q) = kind_query(profile.class_kinds) {
                push_rule(
                    &mut region_rules,
                    "extract-class",
                    &q,
                    lang,
                    &ts,
                    RuleAction::ExtractRegion,
                    RuleParams { region_kind: Some(RegionKind::Class), ..Default::default() },
                )?;
            }
            if let Some(q) = kind_query(profile.heading_kinds) {
                push_rule(
                    &mut region_rules,
                    "extract-heading",
                    &q,
                    lang,
                    &ts,
                    RuleAction::ExtractRegion,
                    RuleParams { region_kind: Some(RegionKind::Heading), ..Default::default() },
                )?;
            }
        }

        Ok(Self { default_rules, loose_extra_rules, region_rules })
    }

    /// Rules active for `ruleset` against `lang` (`loose` =
    /// `default` ∪ extra rules; `none` is an empty list).
    #[must_use]
    pub fn rules_for(&self, ruleset: RuleSet) -> Vec<&Rule> {
        match ruleset {
            RuleSet::None => Vec::new(),
            RuleSet::Default => self.default_rules.iter().collect(),
            RuleSet::Loose => self
                .default_rules
                .iter()
                .chain(self.loose_extra_rules.iter())
                .collect(),
        }
    }

    #[must_use]
    pub fn region_rules(&self) -> &[Rule] {
        &self.region_rules
    }
}

#[allow(clippy::too_many_arguments)]
fn push_rule(
    out: &mut Vec<Rule>,
    name: &str,
    query_text: &str,
    lang: LanguageTag,
    ts: &TsLanguage,
    action: RuleAction,
    params: RuleParams,
) -> Result<(), RuleError> {
    // A logical rule may already exist for a different language; merge the
    // compiled query in rather than creating a duplicate Rule entry.
    if let Some(existing) = out.iter_mut().find(|r| r.name == name) {
        let compiled = CompiledQuery::compile(name, ts, query_text)?;
        if let LanguageScope::Specific(set) = &mut existing.languages {
            set.insert(lang);
        }
        existing.queries.push((lang, compiled));
        return Ok(());
    }
    let compiled = CompiledQuery::compile(name, ts, query_text)?;
    out.push(Rule {
        name: name.to_string(),
        languages: LanguageScope::one(lang),
        queries: vec![(lang, compiled)],
        action,
        params,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_ruleset_is_empty() {
        let catalog = RuleCatalog::build().unwrap();
        assert!(catalog.rules_for(RuleSet::None).is_empty());
    }

    #[test]
    fn loose_is_superset_of_default() {
        let catalog = RuleCatalog::build().unwrap();
        let default_names: Vec<_> = catalog.rules_for(RuleSet::Default).iter().map(|r| r.name.clone()).collect();
        let loose_names: Vec<_> = catalog.rules_for(RuleSet::Loose).iter().map(|r| r.name.clone()).collect();
        for name in default_names {
            assert!(loose_names.contains(&name));
        }
        assert!(loose_names.len() >= catalog.rules_for(RuleSet::Default).len());
    }

    #[test]
    fn every_language_has_region_rules_or_relies_on_chunking() {
        let catalog = RuleCatalog::build().unwrap();
        // css/html/sql/bash rely on statistical chunking; python/js/...
        // have explicit function/class extraction rules.
        assert!(catalog.region_rules().iter().any(|r| r.name == "extract-function"));
        assert!(catalog.region_rules().iter().any(|r| r.name == "extract-class"));
        assert!(catalog.region_rules().iter().any(|r| r.name == "extract-heading"));
    }
}
