//! Doc-comment harvesting.
//!
//! Collects the `//`, `///`, and `/** */` comments preceding a declaration
//! and splits them into a brief (first paragraph) and the long remainder.

use tree_sitter::Node;

/// Extracted documentation for one declaration.
#[derive(Debug, Clone, Default)]
pub struct DocComment {
    pub brief: String,
    pub docs: String,
}

/// Harvest the doc comment attached above `node`.
///
/// Declarations wrapped in `template_declaration` nodes carry their comment
/// above the template keyword, so the sibling walk starts from the outermost
/// wrapper.
pub fn doc_comment_for(node: Node, source: &[u8]) -> DocComment {
    let mut anchor = node;
    while let Some(parent) = anchor.parent() {
        match parent.kind() {
            "template_declaration" | "type_definition" | "declaration" | "field_declaration" => {
                anchor = parent;
            }
            _ => break,
        }
    }

    let lines = preceding_comment_lines(anchor, source);
    split_brief(&lines)
}

/// Documentation for a member (field, enumerator): the preceding comment, or
/// a trailing `///<` / `//!<` comment on the same line.
pub fn member_doc(node: Node, source: &[u8]) -> String {
    let lines = preceding_comment_lines(node, source);
    if !lines.is_empty() {
        return lines.join("\n");
    }

    let mut next = node.next_sibling();
    // Enumerators are separated from their trailing comment by a comma.
    while let Some(sibling) = next {
        match sibling.kind() {
            "," => next = sibling.next_sibling(),
            "comment" if sibling.start_position().row == node.start_position().row => {
                let text = node_text(sibling, source);
                let stripped = text
                    .trim_start_matches('/')
                    .trim_start_matches('!')
                    .trim_start_matches('<');
                return stripped.trim().to_string();
            }
            _ => break,
        }
    }
    String::new()
}

/// Collect the contiguous run of comment siblings directly above `node`,
/// stripped of their comment markers, in source order.
fn preceding_comment_lines(node: Node, source: &[u8]) -> Vec<String> {
    let mut comment_lines = Vec::new();
    let mut prev = node.prev_sibling();

    while let Some(sibling) = prev {
        if sibling.kind() != "comment" {
            break;
        }
        let text = node_text(sibling, source);
        if let Some(rest) = text.strip_prefix("//") {
            let stripped = rest
                .trim_start_matches('/')
                .trim_start_matches('!')
                .strip_prefix(' ')
                .unwrap_or_else(|| rest.trim_start_matches('/').trim_start_matches('!'));
            comment_lines.push(stripped.trim_end().to_string());
        } else if text.starts_with("/*") {
            let inner = text
                .strip_prefix("/*")
                .and_then(|s| s.strip_suffix("*/"))
                .unwrap_or(&text);
            let mut block_lines = Vec::new();
            for line in inner.lines() {
                let trimmed = line.trim().trim_start_matches('*').trim_start();
                block_lines.push(trimmed.trim_end().to_string());
            }
            while block_lines.first().is_some_and(|l| l.is_empty()) {
                block_lines.remove(0);
            }
            while block_lines.last().is_some_and(|l| l.is_empty()) {
                block_lines.pop();
            }
            block_lines.reverse();
            comment_lines.extend(block_lines);
        } else {
            break;
        }
        prev = sibling.prev_sibling();
    }

    comment_lines.reverse();
    comment_lines
}

/// Split comment lines into (brief, long): the first paragraph is the brief,
/// remaining paragraphs the long description. A `\brief` or `@brief` marker
/// on the first line is stripped.
fn split_brief(lines: &[String]) -> DocComment {
    if lines.is_empty() {
        return DocComment::default();
    }

    let split = lines
        .iter()
        .position(|l| l.trim().is_empty())
        .unwrap_or(lines.len());

    let mut brief = lines[..split].join("\n");
    for marker in ["\\brief", "@brief"] {
        if let Some(rest) = brief.strip_prefix(marker) {
            brief = rest.trim_start().to_string();
            break;
        }
    }

    let docs = if split < lines.len() {
        lines[split + 1..].join("\n").trim().to_string()
    } else {
        String::new()
    };

    DocComment { brief, docs }
}

fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}
