// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed set of languages simtree understands (`language_tag`
//! "is one of a closed enumerated set"), and the `tree-sitter` grammars
//! backing each one.
//!
//! Grammars are consumed as-is from their published crates — the parser
//! itself is out of scope; only the rule *catalog* per language (in
//! `simtree-rules`) is project-owned data.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tree_sitter::Language as TsLanguage;

/// The languages simtree can parse and compare. New variants require a
/// matching grammar dependency and rule catalog entry; see `simtree-rules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    Python,
    Javascript,
    Typescript,
    /// TypeScript with TSX support (`.tsx`/`.jsx`).
    Tsx,
    Java,
    Kotlin,
    Go,
    Rust,
    Ruby,
    Csharp,
    Bash,
    Sql,
    Css,
    Html,
    Markdown,
}

impl LanguageTag {
    /// All variants, in a fixed order. Used by the region extractor's
    /// sample pre-pass, which groups files by
    /// language before sampling.
    pub const ALL: &'static [LanguageTag] = &[
        LanguageTag::Python,
        LanguageTag::Javascript,
        LanguageTag::Typescript,
        LanguageTag::Tsx,
        LanguageTag::Java,
        LanguageTag::Kotlin,
        LanguageTag::Go,
        LanguageTag::Rust,
        LanguageTag::Ruby,
        LanguageTag::Csharp,
        LanguageTag::Bash,
        LanguageTag::Sql,
        LanguageTag::Css,
        LanguageTag::Html,
        LanguageTag::Markdown,
    ];

    /// Maps a file extension (without the leading dot) to a language tag.
    /// Returns `None` for anything outside the closed set; callers treat
    /// that file as unsupported (non-fatal, falls back to a
    /// whole-file region with no normalization, or is skipped entirely
    /// by file discovery upstream).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        Some(match ext.to_ascii_lowercase().as_str() {
            "py" | "pyi" => Self::Python,
            "js" | "mjs" | "cjs" | "jsx" => Self::Javascript,
            "ts" | "mts" | "cts" => Self::Typescript,
            "tsx" => Self::Tsx,
            "java" => Self::Java,
            "kt" | "kts" => Self::Kotlin,
            "go" => Self::Go,
            "rs" => Self::Rust,
            "rb" => Self::Ruby,
            "cs" => Self::Csharp,
            "sh" | "bash" => Self::Bash,
            "sql" => Self::Sql,
            "css" => Self::Css,
            "html" | "htm" => Self::Html,
            "md" | "markdown" => Self::Markdown,
            _ => return None,
        })
    }

    /// Convenience wrapper around [`Self::from_extension`] for a file path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// The `tree-sitter` grammar for this language.
    ///
    /// # Errors
    /// Never actually errors for a variant in the closed set; returns a
    /// `Result` rather than an infallible value so a future variant can be
    /// added ahead of wiring its grammar without a signature change.
    pub fn ts_language(self) -> Result<TsLanguage, LanguageError> {
        Ok(match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Javascript => tree_sitter_javascript::LANGUAGE.into(),
            Self::Typescript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::Kotlin => tree_sitter_kotlin_sg::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Ruby => tree_sitter_ruby::LANGUAGE.into(),
            Self::Csharp => tree_sitter_c_sharp::LANGUAGE.into(),
            Self::Bash => tree_sitter_bash::LANGUAGE.into(),
            Self::Sql => tree_sitter_sequel::LANGUAGE.into(),
            Self::Css => tree_sitter_css::LANGUAGE.into(),
            Self::Html => tree_sitter_html::LANGUAGE.into(),
            Self::Markdown => tree_sitter_md::LANGUAGE.into(),
        })
    }

    /// The canonical lowercase name, matching its enumeration and
    /// used as the `languages` set member in rule configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Javascript => "javascript",
            Self::Typescript => "typescript",
            Self::Tsx => "tsx",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Ruby => "ruby",
            Self::Csharp => "csharp",
            Self::Bash => "bash",
            Self::Sql => "sql",
            Self::Css => "css",
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LanguageTag {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageTag::ALL
            .iter()
            .copied()
            .find(|lang| lang.name() == s.to_ascii_lowercase())
            .ok_or_else(|| LanguageError::Unrecognized(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("`{0}` is not a language simtree recognizes")]
    Unrecognized(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extension_roundtrip() {
        for lang in LanguageTag::ALL {
            let s = lang.name();
            assert_eq!(LanguageTag::from_str(s).unwrap(), *lang);
        }
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(LanguageTag::from_path(&PathBuf::from("noext.xyz")), None);
    }

    #[test]
    fn tsx_and_jsx_both_resolve() {
        assert_eq!(
            LanguageTag::from_path(&PathBuf::from("a.tsx")),
            Some(LanguageTag::Tsx)
        );
        assert_eq!(
            LanguageTag::from_path(&PathBuf::from("a.jsx")),
            Some(LanguageTag::Javascript)
        );
    }

    #[test]
    fn every_language_has_a_grammar() {
        for lang in LanguageTag::ALL {
            assert!(lang.ts_language().is_ok());
        }
    }
}
