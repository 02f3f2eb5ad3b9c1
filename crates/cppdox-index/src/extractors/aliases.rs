//! Alias extraction: `using X = ...` type aliases and `using ns::name`
//! using-declarations. `typedef` names are not documented as aliases (they
//! only feed anonymous-record name recovery), and neither are
//! using-directives (`using namespace ...`).

use crate::comments;
use crate::resolve;
use crate::usr;
use crate::walker::{node_text, Scope, Walker};
use cppdox_core::{AliasSymbol, SymbolId, TypeRef};
use tree_sitter::Node;

/// Extract one alias candidate; returns its ID so records can link member
/// aliases.
pub fn extract(w: &mut Walker, node: Node, src: &[u8], scope: &Scope) -> Option<SymbolId> {
    w.index.aliases.count_match();

    let (name, target_name) = match node.kind() {
        "alias_declaration" => {
            let name = node
                .child_by_field_name("name")
                .map(|n| node_text(n, src))?;
            let target = node
                .child_by_field_name("type")
                .map(|t| node_text(t, src))
                .unwrap_or_default();
            (name, target)
        }
        "using_declaration" => {
            // `using namespace ns;` is a directive, not an alias.
            for i in 0..node.child_count() {
                if let Some(child) = node.child(i) {
                    if child.kind() == "namespace" {
                        return None;
                    }
                }
            }
            let target_node = (0..node.child_count())
                .filter_map(|i| node.child(i))
                .find(|c| matches!(c.kind(), "qualified_identifier" | "identifier"))?;
            let written = node_text(target_node, src);
            let name = usr::strip_template_args(&written)
                .rsplit("::")
                .next()
                .unwrap_or_default()
                .to_string();
            (name, written)
        }
        _ => return None,
    };
    if name.is_empty() {
        return None;
    }

    if w.filter().ignores_decl(
        &scope.file,
        &scope.namespaces,
        scope.in_anonymous_namespace,
        scope.access,
    ) {
        return None;
    }

    let qualified = scope.qualified(&name);
    let id = usr::alias_id(&qualified);

    let mut lookup_path = scope.path.clone();
    if node.kind() == "using_declaration" && scope.record.is_some() {
        // `using Base::member` resolves against the record's surroundings.
        lookup_path.pop();
    }
    let target_id = resolve::type_symbol_id(&target_name, &lookup_path, &w.registry);
    // The alias name itself becomes resolvable, looking through to the
    // underlying tag the way type sugar does.
    if !target_id.is_null() {
        w.registry.register(&qualified, target_id);
    }

    if w.index.aliases.contains(id) {
        return Some(id);
    }
    if !w.index.aliases.reserve(id) {
        return Some(id);
    }

    let doc = comments::doc_comment_for(node, src);
    let mut symbol = AliasSymbol::default();
    symbol.info.id = id;
    symbol.info.name = name;
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
    symbol.is_record_member = scope.record.is_some();
    if symbol.is_record_member {
        symbol.info.access = scope.access;
    }
    symbol.target = TypeRef {
        name: target_name,
        id: target_id,
    };

    w.index.aliases.update(id, symbol);
    Some(id)
}
