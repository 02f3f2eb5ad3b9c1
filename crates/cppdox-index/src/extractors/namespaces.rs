//! Namespace extraction.
//!
//! The extractor itself is trivial; the interesting work (building the
//! child lists) happens in the resolve-namespaces post-pass once every
//! translation unit has drained.

use crate::comments;
use crate::usr;
use crate::walker::{Scope, Walker};
use cppdox_core::{Access, NamespaceSymbol, SymbolId};
use tree_sitter::Node;

/// Extract one namespace level. Returns its ID regardless of whether the
/// namespace was indexed, so children can always point at their parent.
pub fn extract(
    w: &mut Walker,
    node: Node,
    src: &[u8],
    enclosing: &Scope,
    segment: &str,
) -> SymbolId {
    w.index.namespaces.count_match();

    let qualified = enclosing.qualified(segment);
    let id = usr::namespace_id(&qualified);
    w.registry.register_namespace(&qualified, id);

    if w.filter().ignores_decl(
        &enclosing.file,
        &enclosing.namespaces,
        enclosing.in_anonymous_namespace,
        Access::None,
    ) {
        return id;
    }

    if w.index.namespaces.contains(id) {
        return id;
    }
    if !w.index.namespaces.reserve(id) {
        return id;
    }

    let doc = comments::doc_comment_for(node, src);
    let mut symbol = NamespaceSymbol::default();
    symbol.info.id = id;
    symbol.info.name = segment.to_string();
    symbol.info.qualified_name = qualified;
    symbol.info.decl_file = enclosing.file.clone();
    symbol.info.decl_line = node.start_position().row + 1;
    symbol.info.parent_namespace_id = enclosing.parent_id;
    symbol.info.brief_comment = doc.brief;
    symbol.info.doc_comment = doc.docs;

    w.index.namespaces.update(id, symbol);
    id
}
