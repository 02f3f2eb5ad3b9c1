//! Record extraction: classes, structs, and unions, including their member
//! lists, base classes, and member variables.

use crate::comments;
use crate::extractors::enums;
use crate::resolve;
use crate::signature;
use crate::usr;
use crate::walker::{
    find_function_declarator, node_text, type_spelling, unwrap_declarator, Member, RecordScope,
    Scope, Walker,
};
use cppdox_core::{
    Access, BaseRecord, MemberVariable, RecordKind, RecordSymbol, SymbolId, TemplateParam, TypeRef,
};
use tree_sitter::Node;

pub fn extract(
    w: &mut Walker,
    node: Node,
    src: &[u8],
    scope: &Scope,
    templates: &[Vec<TemplateParam>],
    recovered_name: Option<String>,
) {
    w.index.records.count_match();

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };

    let kind = match node.kind() {
        "class_specifier" => RecordKind::Class,
        "union_specifier" => RecordKind::Union,
        _ => RecordKind::Struct,
    };

    // Name recovery, in order: written name, typedef-for-anonymous name,
    // otherwise the record stays undocumented.
    let name_node = node.child_by_field_name("name");
    let (plain_name, spec_args) = match name_node {
        Some(n) if n.kind() == "template_type" => {
            let base = n
                .child_by_field_name("name")
                .map(|x| node_text(x, src))
                .unwrap_or_default();
            (base, n.child_by_field_name("arguments"))
        }
        Some(n) => (node_text(n, src), None),
        None => match &recovered_name {
            Some(recovered) => (recovered.clone(), None),
            None => return,
        },
    };
    if plain_name.is_empty() {
        return;
    }

    let qualified = scope.qualified(&plain_name);
    let id = usr::record_id(&qualified);
    // Registered before any filtering so out-of-line members and type
    // references resolve even when the record itself is not documented.
    w.registry.register(&qualified, id);

    if w.filter().ignores_decl(
        &scope.file,
        &scope.namespaces,
        scope.in_anonymous_namespace,
        scope.access,
    ) {
        return;
    }

    if w.index.records.contains(id) {
        return;
    }
    if !w.index.records.reserve(id) {
        return;
    }

    let own_params: Vec<TemplateParam> = templates.iter().flatten().cloned().collect();

    let mut display = plain_name.clone();
    if let Some(rc) = &scope.record {
        display = format!("{}::{}", rc.plain_name, display);
    }
    if let Some(args) = spec_args {
        display.push_str(&specialization_suffix(args, src, &own_params));
    }

    let base_records = collect_bases(w, node, src, scope);

    // Walk the body once: collect member variables and surface member
    // symbols (methods, nested types, aliases) through their extractors.
    let mut member_scope = scope.clone();
    member_scope.path.push(plain_name.clone());
    member_scope.parent_id = id;
    member_scope.record = Some(RecordScope {
        id,
        plain_name: plain_name.clone(),
        template_params: own_params.clone(),
    });
    member_scope.access = match kind {
        RecordKind::Class => Access::Private,
        _ => Access::Public,
    };

    let mut method_ids = Vec::new();
    let mut alias_ids = Vec::new();
    let mut vars = Vec::new();

    for i in 0..body.child_count() {
        let Some(child) = body.child(i) else { continue };
        match child.kind() {
            "access_specifier" => {
                let text = node_text(child, src);
                member_scope.access = if text.contains("public") {
                    Access::Public
                } else if text.contains("protected") {
                    Access::Protected
                } else {
                    Access::Private
                };
            }
            "friend_declaration" | "comment" => {}
            "field_declaration" | "declaration" if find_function_declarator(child).is_none() => {
                // A member whose type is a nested definition surfaces the
                // nested type too.
                if let Some(type_node) = child.child_by_field_name("type") {
                    if type_node.child_by_field_name("body").is_some() {
                        match type_node.kind() {
                            "struct_specifier" | "class_specifier" | "union_specifier" => {
                                extract(w, type_node, src, &member_scope, &[], None);
                            }
                            "enum_specifier" => {
                                enums::extract(w, type_node, src, &member_scope, None);
                            }
                            _ => {}
                        }
                    }
                }
                if w.filter().ignores_access(member_scope.access) {
                    continue;
                }
                if let Some(var) = member_variable(w, child, src, &member_scope) {
                    vars.push(var);
                }
            }
            _ => match w.walk_member(child, src, &member_scope, &[]) {
                Some(Member::Method(method_id)) => method_ids.push(method_id),
                Some(Member::Alias(alias_id)) => alias_ids.push(alias_id),
                None => {}
            },
        }
    }

    let doc = comments::doc_comment_for(node, src);
    let mut record = RecordSymbol::default();
    record.info.id = id;
    record.info.name = display;
    record.info.qualified_name = qualified;
    record.info.decl_file = scope.file.clone();
    record.info.decl_line = node.start_position().row + 1;
    record.info.parent_namespace_id = scope
        .record
        .as_ref()
        .map(|rc| rc.id)
        .unwrap_or(scope.parent_id);
    record.info.brief_comment = doc.brief;
    record.info.doc_comment = doc.docs;
    record.info.access = scope.access;
    record.kind = kind;
    record.template_params = own_params;
    record.base_records = base_records;
    record.method_ids = method_ids;
    record.alias_ids = alias_ids;
    record.vars = vars;
    record.proto = signature::record_proto(&record);

    w.index.records.update(id, record);
}

/// Render a specialization's `<arg, ...>` suffix. Arguments that name one of
/// the record's own template parameters are kept verbatim; nested
/// angle-bracketed groups are elided to `<...>` for readability.
fn specialization_suffix(args: Node, src: &[u8], own_params: &[TemplateParam]) -> String {
    let mut parts = Vec::new();
    for i in 0..args.child_count() {
        let Some(child) = args.child(i) else { continue };
        if !child.is_named() {
            continue;
        }
        let text = node_text(child, src);
        let rendered = if own_params.iter().any(|p| p.name == text) {
            text
        } else if let (Some(open), Some(close)) = (text.find('<'), text.rfind('>')) {
            format!("{}<...>{}", &text[..open], &text[close + 1..])
        } else {
            text
        };
        parts.push(rendered);
    }
    format!("<{}>", parts.join(", "))
}

/// Collect direct bases with their written access specifier; the name keeps
/// a written `std::` prefix and drops template arguments.
fn collect_bases(w: &Walker, node: Node, src: &[u8], scope: &Scope) -> Vec<BaseRecord> {
    let mut bases = Vec::new();
    let Some(clause) = (0..node.child_count())
        .filter_map(|i| node.child(i))
        .find(|c| c.kind() == "base_class_clause")
    else {
        return bases;
    };

    let mut pending = Access::None;
    for i in 0..clause.child_count() {
        let Some(child) = clause.child(i) else { continue };
        match child.kind() {
            "access_specifier" => pending = parse_access_text(&node_text(child, src)),
            "," => pending = Access::None,
            "type_identifier" | "qualified_identifier" | "template_type" => {
                bases.push(make_base(w, scope, child, src, pending));
                pending = Access::None;
            }
            _ => {
                let text = node_text(child, src);
                match text.as_str() {
                    "public" | "private" | "protected" => pending = parse_access_text(&text),
                    ":" | "virtual" => {}
                    _ => {
                        // Wrapped base specifier: one level down.
                        for j in 0..child.child_count() {
                            let Some(grandchild) = child.child(j) else { continue };
                            match grandchild.kind() {
                                "access_specifier" => {
                                    pending = parse_access_text(&node_text(grandchild, src));
                                }
                                "type_identifier" | "qualified_identifier" | "template_type" => {
                                    bases.push(make_base(w, scope, grandchild, src, pending));
                                    pending = Access::None;
                                }
                                _ => {}
                            }
                        }
                    }
                }
            }
        }
    }
    bases
}

fn make_base(w: &Walker, scope: &Scope, node: Node, src: &[u8], access: Access) -> BaseRecord {
    let written = node_text(node, src);
    let id = resolve::type_symbol_id(&written, &scope.path, &w.registry);
    BaseRecord {
        id,
        access,
        name: usr::strip_template_args(&written).trim().to_string(),
    }
}

fn parse_access_text(text: &str) -> Access {
    if text.contains("public") {
        Access::Public
    } else if text.contains("protected") {
        Access::Protected
    } else if text.contains("private") {
        Access::Private
    } else {
        Access::None
    }
}

fn member_variable(
    w: &Walker,
    node: Node,
    src: &[u8],
    scope: &Scope,
) -> Option<MemberVariable> {
    let type_node = node.child_by_field_name("type")?;
    let name = node
        .child_by_field_name("declarator")
        .and_then(|d| unwrap_declarator(d).1)
        .filter(|core| matches!(core.kind(), "identifier" | "field_identifier"))
        .map(|core| node_text(core, src))
        .unwrap_or_default();

    let (ty_name, ty_id) = match type_node.kind() {
        "struct_specifier" | "class_specifier" | "union_specifier" | "enum_specifier" => {
            match type_node.child_by_field_name("name") {
                Some(n) => {
                    let written = node_text(n, src);
                    let id = resolve::type_symbol_id(&written, &scope.path, &w.registry);
                    (written, id)
                }
                None => ("anonymous struct/union".to_string(), SymbolId::NULL),
            }
        }
        _ => {
            let spelling = type_spelling(node, src);
            if spelling.contains("anonymous ") {
                ("anonymous struct/union".to_string(), SymbolId::NULL)
            } else {
                let id = resolve::type_symbol_id(&spelling, &scope.path, &w.registry);
                (spelling, id)
            }
        }
    };

    if name.is_empty() && ty_name != "anonymous struct/union" {
        return None;
    }

    let is_static = (0..node.child_count())
        .filter_map(|i| node.child(i))
        .any(|c| c.end_byte() - c.start_byte() <= 8 && node_text(c, src) == "static");
    let default_value = node
        .child_by_field_name("default_value")
        .map(|d| node_text(d, src))
        .unwrap_or_default();

    Some(MemberVariable {
        name,
        ty: TypeRef {
            name: ty_name,
            id: ty_id,
        },
        default_value,
        access: scope.access,
        is_static,
        doc_comment: comments::member_doc(node, src),
    })
}
