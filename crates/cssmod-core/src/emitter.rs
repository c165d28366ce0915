use crate::ast::{Rule, Stylesheet};

/// Serialize a stylesheet to compact CSS text.
pub fn emit_css(stylesheet: &Stylesheet) -> String {
    let mut out = String::new();
    for rule in &stylesheet.rules {
        emit_rule(rule, &mut out);
    }
    out
}

fn emit_rule(rule: &Rule, out: &mut String) {
    match rule {
        Rule::Style {
            selectors,
            declarations,
        } => {
            out.push_str(&selectors.join(","));
            out.push('{');
            out.push_str(&compact_declarations(declarations));
            out.push('}');
        }
        Rule::Comment { text } => {
            out.push_str("/*");
            out.push_str(text);
            out.push_str("*/");
        }
        Rule::Keyframes { prelude, body }
        | Rule::AtRule {
            prelude,
            body: Some(body),
        } => {
            out.push_str(prelude);
            out.push('{');
            out.push_str(&collapse_whitespace(body));
            out.push('}');
        }
        Rule::AtRule {
            prelude,
            body: None,
        } => {
            out.push_str(prelude);
            out.push(';');
        }
    }
}

/// `color: red;\n  margin: 0` -> `color: red;margin: 0`. Separators
/// inside quoted strings or comments are not split points.
fn compact_declarations(declarations: &str) -> String {
    split_declarations(declarations)
        .into_iter()
        .map(|fragment| collapse_whitespace(fragment.trim()))
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(";")
}

/// Split a declaration block on top-level `;`.
fn split_declarations(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b if b == quote => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
            }
            b'/' if text[i..].starts_with("/*") => {
                i = match text[i + 2..].find("*/") {
                    Some(rel) => i + 2 + rel + 2,
                    None => bytes.len(),
                };
            }
            b';' => {
                parts.push(&text[start..i]);
                start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Collapse runs of structural whitespace to one space. Quoted strings
/// and comments pass through verbatim.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut pending_space = false;
    while let Some(ch) = chars.next() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match ch {
            '"' | '\'' => {
                out.push(ch);
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    if inner == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if inner == ch {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                out.push('/');
                if let Some(star) = chars.next() {
                    out.push(star);
                }
                let mut prev = '\0';
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            _ => out.push(ch),
        }
    }
    out
}
