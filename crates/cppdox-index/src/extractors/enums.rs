//! Enum extraction, with enumerator value evaluation.

use crate::comments;
use crate::usr;
use crate::walker::{node_text, Scope, Walker};
use cppdox_core::{EnumKind, EnumMember, EnumSymbol};
use std::collections::HashMap;
use tree_sitter::Node;

pub fn extract(
    w: &mut Walker,
    node: Node,
    src: &[u8],
    scope: &Scope,
    recovered_name: Option<String>,
) {
    w.index.enums.count_match();

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };

    // Anonymous enums are dropped unless a typedef names them.
    let name = match node.child_by_field_name("name") {
        Some(n) => node_text(n, src),
        None => match recovered_name {
            Some(recovered) => recovered,
            None => return,
        },
    };
    if name.is_empty() {
        return;
    }

    let qualified = scope.qualified(&name);
    let id = usr::enum_id(&qualified);
    w.registry.register(&qualified, id);

    if w.filter().ignores_decl(
        &scope.file,
        &scope.namespaces,
        scope.in_anonymous_namespace,
        scope.access,
    ) {
        return;
    }

    if w.index.enums.contains(id) {
        return;
    }
    if !w.index.enums.reserve(id) {
        return;
    }

    // `enum class` / `enum struct` show up as keyword tokens after `enum`.
    let mut kind = EnumKind::Plain;
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        match child.kind() {
            "class" => kind = EnumKind::Class,
            "struct" => kind = EnumKind::Struct,
            _ => {}
        }
    }

    let mut display = name.clone();
    if let Some(rc) = &scope.record {
        display = format!("{}::{}", rc.plain_name, display);
    }

    let mut members = Vec::new();
    let mut seen: HashMap<String, i64> = HashMap::new();
    let mut previous: i64 = -1;
    for i in 0..body.child_count() {
        let Some(child) = body.child(i) else { continue };
        if child.kind() != "enumerator" {
            continue;
        }
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        let member_name = node_text(name_node, src);
        let value = match child.child_by_field_name("value") {
            Some(value_node) => {
                let text = node_text(value_node, src);
                eval_enumerator(&text, &seen).unwrap_or(previous + 1)
            }
            None => previous + 1,
        };
        seen.insert(member_name.clone(), value);
        previous = value;
        members.push(EnumMember {
            name: member_name,
            value,
            doc_comment: comments::member_doc(child, src),
        });
    }

    let doc = comments::doc_comment_for(node, src);
    let mut symbol = EnumSymbol::default();
    symbol.info.id = id;
    symbol.info.name = display;
    symbol.info.qualified_name = qualified;
    symbol.info.decl_file = scope.file.clone();
    symbol.info.decl_line = node.start_position().row + 1;
    symbol.info.parent_namespace_id = scope
        .record
        .as_ref()
        .map(|rc| rc.id)
        .unwrap_or(scope.parent_id);
    symbol.info.brief_comment = doc.brief;
    symbol.info.doc_comment = doc.docs;
    symbol.info.access = scope.access;
    symbol.kind = kind;
    symbol.members = members;

    w.index.enums.update(id, symbol);
}

/// Evaluate an enumerator initializer: integer literals (decimal, hex,
/// octal, binary, with suffixes), unary minus, and references to previously
/// seen enumerators of the same enum. Anything else falls back to the
/// implicit previous-plus-one.
fn eval_enumerator(text: &str, seen: &HashMap<String, i64>) -> Option<i64> {
    let t = text.trim();
    if let Some(rest) = t.strip_prefix('-') {
        return eval_enumerator(rest, seen).map(|v| -v);
    }
    if let Some(value) = seen.get(t) {
        return Some(*value);
    }

    let digits: String = t
        .trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L' | 'z' | 'Z'))
        .replace('\'', "");
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        return i64::from_str_radix(bin, 2).ok();
    }
    if digits.len() > 1 && digits.starts_with('0') && digits.chars().all(|c| c.is_ascii_digit()) {
        return i64::from_str_radix(&digits[1..], 8).ok();
    }
    digits.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_in_all_bases() {
        let seen = HashMap::new();
        assert_eq!(eval_enumerator("42", &seen), Some(42));
        assert_eq!(eval_enumerator("-1", &seen), Some(-1));
        assert_eq!(eval_enumerator("0x10", &seen), Some(16));
        assert_eq!(eval_enumerator("0b101", &seen), Some(5));
        assert_eq!(eval_enumerator("010", &seen), Some(8));
        assert_eq!(eval_enumerator("100u", &seen), Some(100));
        assert_eq!(eval_enumerator("1'000", &seen), Some(1000));
    }

    #[test]
    fn references_to_prior_enumerators() {
        let mut seen = HashMap::new();
        seen.insert("value2".to_string(), 7);
        assert_eq!(eval_enumerator("value2", &seen), Some(7));
        assert_eq!(eval_enumerator("-value2", &seen), Some(-7));
    }

    #[test]
    fn expressions_fall_back_to_none() {
        let seen = HashMap::new();
        assert_eq!(eval_enumerator("1 << 4", &seen), None);
        assert_eq!(eval_enumerator("SOME_MACRO", &seen), None);
    }
}
