use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A parsed stylesheet: ordered rules plus the originating file path.
///
/// This is also the `css` half of the object-artifact wire format, so
/// the whole tree is serde-derived.
#[derive(Debug, Serialize, Deserialize)]
pub struct Stylesheet {
    pub source: PathBuf,
    pub rules: Vec<Rule>,
}

/// One top-level rule. Declaration blocks and at-rule bodies are held
/// as opaque text; only style-rule selectors are ever inspected.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Rule {
    Style {
        /// Comma-separated alternatives, one string per selector.
        selectors: Vec<String>,
        declarations: String,
    },
    Comment {
        /// Text between `/*` and `*/`, delimiters excluded.
        text: String,
    },
    Keyframes {
        /// `@keyframes spin` (vendor prefixes included).
        prelude: String,
        body: String,
    },
    AtRule {
        prelude: String,
        /// `None` for statement at-rules such as `@import ...;`.
        body: Option<String>,
    },
}
