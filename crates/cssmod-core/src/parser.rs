use std::path::Path;

use crate::ast::{Rule, Stylesheet};
use crate::error::{ParseError, Position};

/// Parse a stylesheet into its top-level rule list.
///
/// Declaration blocks and at-rule bodies are captured as raw text;
/// selectors are comma-split here so the rewriting pass sees one
/// selector string at a time.
pub fn parse(input: &str, source: &Path) -> Result<Stylesheet, ParseError> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut rules = Vec::new();
    let mut pos = 0;

    while pos < len {
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= len {
            break;
        }

        if input[pos..].starts_with("/*") {
            let rel = input[pos + 2..].find("*/").ok_or(ParseError::UnterminatedComment {
                position: Position::at(input, pos),
            })?;
            rules.push(Rule::Comment {
                text: input[pos + 2..pos + 2 + rel].to_string(),
            });
            pos = pos + 2 + rel + 2;
            continue;
        }

        if bytes[pos] == b'@' {
            let start = pos;
            let i = scan_for(input, pos, &[b'{', b';'])?.ok_or(ParseError::UnexpectedEof)?;
            let prelude = input[start..i].trim().to_string();
            if bytes[i] == b';' {
                rules.push(Rule::AtRule {
                    prelude,
                    body: None,
                });
                pos = i + 1;
                continue;
            }
            let (body, next) = read_block(input, i)?;
            let keyword = prelude[1..].split_whitespace().next().unwrap_or("");
            if keyword.ends_with("keyframes") {
                rules.push(Rule::Keyframes { prelude, body });
            } else {
                rules.push(Rule::AtRule {
                    prelude,
                    body: Some(body),
                });
            }
            pos = next;
            continue;
        }

        if bytes[pos] == b'}' {
            return Err(ParseError::UnexpectedChar {
                character: '}',
                position: Position::at(input, pos),
            });
        }

        // Style rule: selector text up to '{', then a brace-matched body.
        let open = scan_for(input, pos, &[b'{'])?.ok_or(ParseError::UnexpectedEof)?;
        let selector_text = input[pos..open].trim();
        if selector_text.is_empty() {
            return Err(ParseError::MissingSelector {
                position: Position::at(input, open),
            });
        }
        let selectors = split_selector_list(selector_text);
        if selectors.iter().any(String::is_empty) {
            return Err(ParseError::MissingSelector {
                position: Position::at(input, open),
            });
        }
        let (body, next) = read_block(input, open)?;
        rules.push(Rule::Style {
            selectors,
            declarations: body,
        });
        pos = next;
    }

    Ok(Stylesheet {
        source: source.to_path_buf(),
        rules,
    })
}

/// Read a `{...}` block starting at `open` (which must index a `{`).
/// Returns the raw body and the position just past the closing brace.
/// Braces inside quoted strings or comments do not count.
fn read_block(input: &str, open: usize) -> Result<(String, usize), ParseError> {
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_string(input, i)?;
                continue;
            }
            b'/' if input[i..].starts_with("/*") => {
                i = skip_comment(input, i)?;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    let body = input[open + 1..i].to_string();
                    return Ok((body, i + 1));
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(ParseError::UnbalancedBraces {
        position: Position::at(input, open),
    })
}

/// Scan forward from `from` for the first of `stops`, skipping quoted
/// strings and comments so their contents stay opaque.
fn scan_for(input: &str, from: usize, stops: &[u8]) -> Result<Option<usize>, ParseError> {
    let bytes = input.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_string(input, i)?,
            b'/' if input[i..].starts_with("/*") => i = skip_comment(input, i)?,
            b if stops.contains(&b) => return Ok(Some(i)),
            _ => i += 1,
        }
    }
    Ok(None)
}

/// Skip a quoted string starting at `start` (which must index a quote).
/// Returns the position just past the closing quote; `\` escapes the
/// next character.
fn skip_string(input: &str, start: usize) -> Result<usize, ParseError> {
    let bytes = input.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(ParseError::UnterminatedString {
        position: Position::at(input, start),
    })
}

/// Skip a `/* ... */` comment starting at `start`.
fn skip_comment(input: &str, start: usize) -> Result<usize, ParseError> {
    match input[start + 2..].find("*/") {
        Some(rel) => Ok(start + 2 + rel + 2),
        None => Err(ParseError::UnterminatedComment {
            position: Position::at(input, start),
        }),
    }
}

/// Split a selector list on top-level commas. Commas inside parens or
/// brackets (`:is(a, b)`, `[data-x=","]`) do not separate alternatives.
fn split_selector_list(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(text[start..idx].trim().to_string());
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim().to_string());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_rules(input: &str) -> Vec<Rule> {
        parse(input, Path::new("test.css")).expect("parse").rules
    }

    #[test]
    fn empty_input() {
        let sheet = parse("", Path::new("empty.css")).expect("parse");
        assert!(sheet.rules.is_empty());
        assert_eq!(sheet.source, Path::new("empty.css"));
    }

    #[test]
    fn style_rule_with_selector_list() {
        let rules = parse_rules(".a, .b > .c { color: red; }");
        assert_eq!(rules.len(), 1);
        let Rule::Style { selectors, declarations } = &rules[0] else {
            panic!("expected style rule");
        };
        assert_eq!(selectors, &[".a".to_string(), ".b > .c".to_string()]);
        assert!(declarations.contains("color: red"));
    }

    #[test]
    fn commas_inside_functional_pseudo_do_not_split() {
        let rules = parse_rules(":is(.a, .b) { margin: 0; }");
        let Rule::Style { selectors, .. } = &rules[0] else {
            panic!("expected style rule");
        };
        assert_eq!(selectors, &[":is(.a, .b)".to_string()]);
    }

    #[test]
    fn comment_rule() {
        let rules = parse_rules("/* header */ .a { color: red; }");
        assert_eq!(
            rules[0],
            Rule::Comment {
                text: " header ".to_string()
            }
        );
        assert!(matches!(rules[1], Rule::Style { .. }));
    }

    #[test]
    fn keyframes_rule() {
        let rules = parse_rules("@keyframes spin { from { opacity: 0; } to { opacity: 1; } }");
        let Rule::Keyframes { prelude, body } = &rules[0] else {
            panic!("expected keyframes rule");
        };
        assert_eq!(prelude, "@keyframes spin");
        assert!(body.contains("from { opacity: 0; }"));
    }

    #[test]
    fn vendor_prefixed_keyframes() {
        let rules = parse_rules("@-webkit-keyframes spin { from { opacity: 0; } }");
        assert!(matches!(rules[0], Rule::Keyframes { .. }));
    }

    #[test]
    fn statement_at_rule() {
        let rules = parse_rules("@import url(\"base.css\");");
        assert_eq!(
            rules[0],
            Rule::AtRule {
                prelude: "@import url(\"base.css\")".to_string(),
                body: None,
            }
        );
    }

    #[test]
    fn block_at_rule_body_is_opaque() {
        let rules = parse_rules("@media screen { .a { color: red; } }");
        let Rule::AtRule { prelude, body } = &rules[0] else {
            panic!("expected at-rule");
        };
        assert_eq!(prelude, "@media screen");
        assert!(body.as_deref().is_some_and(|b| b.contains(".a")));
    }

    #[test]
    fn brace_inside_string_value_stays_opaque() {
        let rules = parse_rules(".a { content: \"}\"; }");
        let Rule::Style { declarations, .. } = &rules[0] else {
            panic!("expected style rule");
        };
        assert!(declarations.contains("content: \"}\""));
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn brace_inside_comment_stays_opaque() {
        let rules = parse_rules(".a { /* } */ color: red; }");
        let Rule::Style { declarations, .. } = &rules[0] else {
            panic!("expected style rule");
        };
        assert!(declarations.contains("/* } */"));
        assert!(declarations.contains("color: red"));
    }

    #[test]
    fn escaped_quote_inside_string_value() {
        let rules = parse_rules(".a { content: \"\\\"}\"; }");
        assert_eq!(rules.len(), 1);
        assert!(matches!(rules[0], Rule::Style { .. }));
    }

    #[test]
    fn semicolon_inside_at_rule_string() {
        let rules = parse_rules("@import \"a;b\";");
        assert_eq!(
            rules[0],
            Rule::AtRule {
                prelude: "@import \"a;b\"".to_string(),
                body: None,
            }
        );
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let err = parse(".a { content: \"no end; }", Path::new("t.css")).unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedString { .. }));
    }

    #[test]
    fn unterminated_comment_is_fatal() {
        let err = parse("/* no end", Path::new("t.css")).unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedComment { .. }));
    }

    #[test]
    fn unbalanced_braces_are_fatal() {
        let err = parse(".a { color: red;", Path::new("t.css")).unwrap_err();
        assert!(matches!(err, ParseError::UnbalancedBraces { .. }));
    }

    #[test]
    fn missing_selector_is_fatal() {
        let err = parse("{ color: red; }", Path::new("t.css")).unwrap_err();
        assert!(matches!(err, ParseError::MissingSelector { .. }));
    }

    #[test]
    fn stray_close_brace_is_fatal() {
        let err = parse(".a { color: red; } }", Path::new("t.css")).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedChar { character: '}', .. }));
    }
}
