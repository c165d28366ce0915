use std::collections::BTreeMap;
use std::path::Path;

use log::debug;

use crate::artifact::ObjectArtifact;
use crate::ast::Rule;
use crate::error::{Error, Result};
use crate::selector::{self, SelectorPart};
use crate::token::TokenGenerator;

/// Compile one stylesheet source into an object artifact: every
/// class-attribute selector component is rewritten to a unique token,
/// and the original-to-token mapping is collected alongside.
///
/// Comments and keyframes blocks are never rewritten; other at-rule
/// bodies are opaque text and pass through untouched. Any parse
/// failure aborts the whole file, so no partial artifact is produced.
pub fn compile(source: &str, source_path: &Path) -> Result<ObjectArtifact> {
    let mut stylesheet =
        crate::parser::parse(source, source_path).map_err(|e| Error::parse(source_path, e))?;

    let mut tokens = TokenGenerator::new();
    let mut class_map = BTreeMap::new();

    for rule in &mut stylesheet.rules {
        let Rule::Style { selectors, .. } = rule else {
            continue;
        };
        for slot in selectors.iter_mut() {
            let mut parsed =
                selector::parse_selector(slot).map_err(|e| Error::parse(source_path, e))?;
            for part in &mut parsed.parts {
                if let SelectorPart::Class(name) = part {
                    // A fresh token per occurrence; repeated names
                    // overwrite their map entry with the latest token.
                    let token = tokens.token(name);
                    class_map.insert(name.clone(), token.clone());
                    *name = token;
                }
            }
            *slot = parsed.to_string();
        }
    }

    debug!(
        "compiled {}: {} class names rewritten",
        source_path.display(),
        class_map.len()
    );

    Ok(ObjectArtifact {
        css: stylesheet,
        json: class_map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::emit_css;

    fn compile_str(source: &str) -> ObjectArtifact {
        compile(source, Path::new("/src/test.css")).expect("compile")
    }

    #[test]
    fn empty_stylesheet() {
        let artifact = compile_str("");
        assert!(artifact.css.rules.is_empty());
        assert!(artifact.json.is_empty());
    }

    #[test]
    fn rewrites_class_selectors_and_records_mapping() {
        let artifact = compile_str(".Foo { color: red; }");
        let Rule::Style { selectors, .. } = &artifact.css.rules[0] else {
            panic!("expected style rule");
        };
        let token = artifact.json.get("Foo").expect("mapping for Foo");
        assert!(token.ends_with("_Foo"));
        assert_eq!(selectors[0], format!(".{token}"));
    }

    #[test]
    fn end_to_end_scenario() {
        let artifact = compile_str(".Foo { color: red; } .Bar .Foo { color: blue; }");
        assert_eq!(artifact.css.rules.len(), 2);
        assert!(artifact.json.contains_key("Foo"));
        assert!(artifact.json.contains_key("Bar"));
        assert!(artifact.json["Foo"].ends_with("_Foo"));
        assert!(artifact.json["Bar"].ends_with("_Bar"));

        let css = emit_css(&artifact.css);
        assert!(!css.contains(".Foo"));
        assert!(!css.contains(".Bar"));
    }

    #[test]
    fn repeated_class_name_gets_fresh_token_each_occurrence() {
        let artifact = compile_str(".Foo { color: red; } .Bar .Foo { color: blue; }");
        let css = emit_css(&artifact.css);

        let foo_tokens: Vec<&str> = css
            .split('.')
            .filter(|part| part.contains("_Foo"))
            .collect();
        assert_eq!(foo_tokens.len(), 2);
        assert_ne!(foo_tokens[0], foo_tokens[1]);

        // The map holds the latest token for the repeated name.
        let mapped = &artifact.json["Foo"];
        assert!(css.contains(mapped.as_str()));
    }

    #[test]
    fn non_class_components_are_untouched() {
        let artifact = compile_str("div#main > p:hover { color: red; }");
        let Rule::Style { selectors, .. } = &artifact.css.rules[0] else {
            panic!("expected style rule");
        };
        assert_eq!(selectors[0], "div#main>p:hover");
        assert!(artifact.json.is_empty());
    }

    #[test]
    fn comma_alternatives_each_rewritten() {
        let artifact = compile_str(".A, .B { color: red; }");
        let Rule::Style { selectors, .. } = &artifact.css.rules[0] else {
            panic!("expected style rule");
        };
        assert_eq!(selectors.len(), 2);
        assert_eq!(selectors[0], format!(".{}", artifact.json["A"]));
        assert_eq!(selectors[1], format!(".{}", artifact.json["B"]));
    }

    #[test]
    fn keyframes_are_not_rewritten() {
        let artifact =
            compile_str("@keyframes spin { from { opacity: 0; } } .Foo { color: red; }");
        let Rule::Keyframes { body, .. } = &artifact.css.rules[0] else {
            panic!("expected keyframes rule");
        };
        assert!(body.contains("opacity: 0"));
        assert_eq!(artifact.json.len(), 1);
    }

    #[test]
    fn comments_are_not_rewritten() {
        let artifact = compile_str("/* .Foo */ .Bar { color: red; }");
        assert_eq!(
            artifact.css.rules[0],
            Rule::Comment {
                text: " .Foo ".to_string()
            }
        );
        assert!(!artifact.json.contains_key("Foo"));
        assert!(artifact.json.contains_key("Bar"));
    }

    #[test]
    fn token_uniqueness_across_many_occurrences() {
        let source: String = (0..40).map(|i| format!(".C{i} {{ margin: 0; }}\n")).collect();
        let artifact = compile(&source, Path::new("/src/many.css")).expect("compile");
        let tokens: std::collections::HashSet<&String> = artifact.json.values().collect();
        assert_eq!(tokens.len(), 40);
    }

    #[test]
    fn malformed_selector_aborts_compilation() {
        let err = compile(".Foo { color: red; } .. { }", Path::new("/src/bad.css")).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn parse_error_carries_source_path() {
        let err = compile(".Foo { color: red;", Path::new("/src/bad.css")).unwrap_err();
        assert!(format!("{err}").contains("/src/bad.css"));
    }
}
