//! Function extraction: free functions, methods, constructors, destructors,
//! operators, and conversion operators.
//!
//! Member functions of class templates have the record's template-parameter
//! names canonicalized to positional `type-parameter-0-i` placeholders in
//! their rendered types, so an out-of-line definition spelled with different
//! parameter names deduplicates against the in-class declaration. The
//! member-function post-pass restores the record's own names afterwards.

use crate::comments;
use crate::resolve::{self, TagRegistry};
use crate::signature;
use crate::usr;
use crate::walker::{self, Scope, Walker};
use cppdox_core::{
    Access, FunctionParam, FunctionSymbol, RefQualifier, StorageClass, SymbolId, TemplateParam,
    TypeRef,
};
use tree_sitter::Node;

/// Extract one function candidate. Returns the candidate's ID whenever it is
/// computable, even when the function itself is not indexed (deleted
/// functions, duplicates), so records can link their methods.
pub fn extract(
    w: &mut Walker,
    node: Node,
    src: &[u8],
    scope: &Scope,
    templates: &[Vec<TemplateParam>],
) -> Option<SymbolId> {
    w.index.functions.count_match();

    let fdecl = walker::find_function_declarator(node)?;
    let is_conversion_op = fdecl.kind() == "operator_cast";
    let (mut name, qualifier) = declared_name(fdecl, src)?;
    if name.is_empty() {
        return None;
    }

    let trailing = trailing_return(fdecl, src);

    // Deduction guides document nothing: a namespace-scope declarator whose
    // trailing return names the declarator itself.
    if scope.record.is_none() && qualifier.is_none() {
        if let Some(tr) = &trailing {
            if usr::strip_template_args(tr).trim() == name {
                return None;
            }
        }
    }

    // Resolve member-ness and the scope the function is qualified into.
    let member = resolve_member(scope, qualifier.as_deref(), templates, &w.registry);
    let (qualified, lookup_path, parent_id, is_record_member, record_param_names) = match &member {
        MemberCtx::InClass { record_id, params } => (
            scope.qualified(&name),
            scope.path.clone(),
            *record_id,
            true,
            params.clone(),
        ),
        MemberCtx::OutOfLine {
            record_id,
            record_qualified,
            params,
        } => (
            format!("{record_qualified}::{name}"),
            record_qualified.split("::").map(str::to_string).collect(),
            *record_id,
            true,
            params.clone(),
        ),
        MemberCtx::Namespace { namespace_id, qualified } => (
            format!("{qualified}::{name}"),
            qualified.split("::").map(str::to_string).collect(),
            *namespace_id,
            false,
            Vec::new(),
        ),
        MemberCtx::Free => (
            scope.qualified(&name),
            scope.path.clone(),
            scope.parent_id,
            false,
            Vec::new(),
        ),
    };

    let canonicalize = |s: &str| -> String {
        let mut out = s.to_string();
        for (i, pname) in record_param_names.iter().enumerate() {
            if !pname.is_empty() {
                out = walker::replace_ident(&out, pname, &format!("type-parameter-0-{i}"));
            }
        }
        out
    };

    // Declaration-level specifiers.
    let mut f = FunctionSymbol::default();
    for text in short_child_texts(node, src) {
        match text.as_str() {
            "static" => f.storage_class = StorageClass::Static,
            "extern" => f.storage_class = StorageClass::Extern,
            "inline" => f.is_inline = true,
            "virtual" => f.is_virtual = true,
            "constexpr" => f.is_constexpr = true,
            "consteval" => f.is_consteval = true,
            _ => {
                if text.starts_with("explicit") {
                    f.is_explicit = true;
                } else if text.contains("nodiscard") {
                    f.is_nodiscard = true;
                } else if text.contains("noreturn") {
                    f.is_noreturn = true;
                }
            }
        }
    }

    // Trailing qualifiers live on the function declarator itself; for a
    // conversion operator they sit on the inner abstract declarator.
    let qual_host = if is_conversion_op {
        inner_function_declarator(fdecl).unwrap_or(fdecl)
    } else {
        fdecl
    };
    for text in short_child_texts(qual_host, src) {
        match text.as_str() {
            "const" => f.is_const = true,
            "volatile" => f.is_volatile = true,
            "restrict" | "__restrict" | "__restrict__" => f.is_restrict = true,
            "&" => f.ref_qualifier = RefQualifier::LValue,
            "&&" => f.ref_qualifier = RefQualifier::RValue,
            // Only an unconditional written `noexcept`; `noexcept(expr)` is
            // longer than the bare keyword and stays false.
            "noexcept" => f.is_noexcept = true,
            _ => {}
        }
    }

    // Parameters.
    let mut usr_params: Vec<String> = Vec::new();
    if let Some(list) = qual_host.child_by_field_name("parameters") {
        for i in 0..list.child_count() {
            let Some(child) = list.child(i) else { continue };
            match child.kind() {
                "parameter_declaration"
                | "optional_parameter_declaration"
                | "variadic_parameter_declaration" => {
                    let raw_ty = walker::type_spelling(child, src);
                    let param_name = child
                        .child_by_field_name("declarator")
                        .and_then(|d| walker::unwrap_declarator(d).1)
                        .filter(|core| {
                            matches!(core.kind(), "identifier" | "field_identifier")
                        })
                        .map(|core| walker::node_text(core, src))
                        .unwrap_or_default();
                    let default_value = child
                        .child_by_field_name("default_value")
                        .map(|d| walker::node_text(d, src))
                        .unwrap_or_default();
                    let ty_id = resolve::type_symbol_id(&raw_ty, &lookup_path, &w.registry);
                    let ty_name = canonicalize(&raw_ty);
                    usr_params.push(ty_name.clone());
                    f.params.push(FunctionParam {
                        name: param_name,
                        ty: TypeRef { name: ty_name, id: ty_id },
                        default_value: canonicalize(&default_value),
                    });
                }
                "..." => f.is_variadic = true,
                _ => {}
            }
        }
    }
    // `f(void)` declares no parameters.
    if f.params.len() == 1 && f.params[0].ty.name == "void" && f.params[0].name.is_empty() {
        f.params.clear();
        usr_params.clear();
    }

    // Constructors and destructors render no return type; specialization
    // arguments are stripped from constructor names.
    let record_plain = match &member {
        MemberCtx::InClass { .. } => scope
            .record
            .as_ref()
            .map(|rc| rc.plain_name.clone())
            .unwrap_or_default(),
        MemberCtx::OutOfLine { record_qualified, .. } => record_qualified
            .rsplit("::")
            .next()
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    };
    f.is_ctor_or_dtor = is_record_member
        && !is_conversion_op
        && (usr::strip_template_args(&name) == record_plain || name.starts_with('~'));
    if f.is_ctor_or_dtor {
        name = usr::strip_template_args(&name);
    }
    f.is_conversion_op = is_conversion_op;

    f.has_trailing_return = trailing.is_some();
    if !f.is_ctor_or_dtor {
        let raw_return = if is_conversion_op {
            fdecl
                .child_by_field_name("type")
                .map(|t| walker::node_text(t, src))
                .unwrap_or_default()
        } else if let Some(tr) = &trailing {
            tr.clone()
        } else {
            walker::type_spelling(node, src)
        };
        f.return_type = TypeRef {
            name: canonicalize(&raw_return),
            id: resolve::type_symbol_id(&raw_return, &lookup_path, &w.registry),
        };
    }

    let name = canonicalize(&name);
    let id = usr::function_id(&qualified, &usr_params, f.is_const);

    // Deleted functions stay linkable from their record but are never
    // documented as defined.
    if is_deleted(node, src) {
        return Some(id);
    }

    let access = if scope.record.is_some() { scope.access } else { Access::None };
    if w.filter().ignores_decl(
        &scope.file,
        &scope.namespaces,
        scope.in_anonymous_namespace,
        access,
    ) {
        return None;
    }

    // File-scope static functions are internal linkage, not API.
    if !is_record_member && f.storage_class == StorageClass::Static {
        return None;
    }

    if w.index.functions.contains(id) {
        return Some(id);
    }
    if !w.index.functions.reserve(id) {
        return Some(id);
    }

    f.template_params = own_template_params(&member, templates);
    f.is_record_member = is_record_member;

    let doc = comments::doc_comment_for(node, src);
    f.info.id = id;
    f.info.name = name;
    f.info.qualified_name = qualified;
    f.info.decl_file = scope.file.clone();
    f.info.decl_line = node.start_position().row + 1;
    f.info.parent_namespace_id = parent_id;
    f.info.brief_comment = doc.brief;
    f.info.doc_comment = doc.docs;
    f.info.access = access;

    let (proto, post_template, name_start) = signature::function_signature(&f);
    f.proto = proto;
    f.post_template = post_template;
    f.name_start = name_start;

    w.index.functions.update(id, f);
    Some(id)
}

enum MemberCtx {
    InClass {
        record_id: SymbolId,
        params: Vec<String>,
    },
    OutOfLine {
        record_id: SymbolId,
        record_qualified: String,
        params: Vec<String>,
    },
    Namespace {
        namespace_id: SymbolId,
        qualified: String,
    },
    Free,
}

fn resolve_member(
    scope: &Scope,
    qualifier: Option<&str>,
    templates: &[Vec<TemplateParam>],
    registry: &TagRegistry,
) -> MemberCtx {
    if let Some(rc) = &scope.record {
        return MemberCtx::InClass {
            record_id: rc.id,
            params: rc.template_params.iter().map(|p| p.name.clone()).collect(),
        };
    }
    let Some(q) = qualifier else {
        return MemberCtx::Free;
    };

    let tag = usr::strip_template_args(q.trim_start_matches("::"));
    for depth in (0..=scope.path.len()).rev() {
        let candidate = if depth == 0 {
            tag.clone()
        } else {
            format!("{}::{}", scope.path[..depth].join("::"), tag)
        };
        if let Some(id) = registry.lookup(&candidate) {
            return MemberCtx::OutOfLine {
                record_id: id,
                record_qualified: candidate,
                params: class_template_param_names(q, templates),
            };
        }
        if let Some(id) = registry.lookup_namespace(&candidate) {
            return MemberCtx::Namespace {
                namespace_id: id,
                qualified: candidate,
            };
        }
    }

    // Unseen qualifier: assume an out-of-line member of a record that was
    // filtered or lives in an unparsed header; pruning settles it later.
    let qualified = scope.qualified(&tag);
    MemberCtx::OutOfLine {
        record_id: usr::record_id(&qualified),
        record_qualified: qualified,
        params: class_template_param_names(q, templates),
    }
}

/// For `template <class U> void S<U>::f(U x)` the outermost template list
/// belongs to the class; its names map onto `type-parameter-0-i`.
fn class_template_param_names(qualifier: &str, templates: &[Vec<TemplateParam>]) -> Vec<String> {
    if qualifier.contains('<') {
        templates
            .first()
            .map(|list| list.iter().map(|p| p.name.clone()).collect())
            .unwrap_or_default()
    } else {
        Vec::new()
    }
}

fn own_template_params(member: &MemberCtx, templates: &[Vec<TemplateParam>]) -> Vec<TemplateParam> {
    let skip = match member {
        MemberCtx::OutOfLine { params, .. } if !params.is_empty() => 1,
        _ => 0,
    };
    templates.iter().skip(skip).flatten().cloned().collect()
}

/// Pull the declared name out of a function declarator; for qualified
/// declarators also the written record/namespace qualifier.
fn declared_name(fdecl: Node, src: &[u8]) -> Option<(String, Option<String>)> {
    if fdecl.kind() == "operator_cast" {
        let ty = fdecl
            .child_by_field_name("type")
            .map(|t| walker::node_text(t, src))?;
        return Some((format!("operator {ty}"), None));
    }

    let inner = fdecl.child_by_field_name("declarator")?;
    match inner.kind() {
        "identifier" | "field_identifier" | "type_identifier" | "operator_name"
        | "destructor_name" => Some((walker::node_text(inner, src), None)),
        "qualified_identifier" => {
            let mut qualifier_parts = Vec::new();
            let mut current = inner;
            loop {
                if let Some(scope_node) = current.child_by_field_name("scope") {
                    let text = walker::node_text(scope_node, src);
                    if !text.is_empty() {
                        qualifier_parts.push(text);
                    }
                }
                let name_node = current.child_by_field_name("name")?;
                if name_node.kind() == "qualified_identifier" {
                    current = name_node;
                    continue;
                }
                let name = if name_node.kind() == "operator_cast" {
                    let ty = name_node
                        .child_by_field_name("type")
                        .map(|t| walker::node_text(t, src))
                        .unwrap_or_default();
                    format!("operator {ty}")
                } else {
                    walker::node_text(name_node, src)
                };
                let qualifier = if qualifier_parts.is_empty() {
                    None
                } else {
                    Some(qualifier_parts.join("::"))
                };
                return Some((name, qualifier));
            }
        }
        _ => None,
    }
}

fn inner_function_declarator(node: Node) -> Option<Node> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind().ends_with("function_declarator") {
                return Some(child);
            }
        }
    }
    None
}

fn trailing_return(fdecl: Node, src: &[u8]) -> Option<String> {
    for i in 0..fdecl.child_count() {
        if let Some(child) = fdecl.child(i) {
            if child.kind() == "trailing_return_type" {
                let text = walker::node_text(child, src);
                return Some(text.trim_start_matches("->").trim().to_string());
            }
        }
    }
    None
}

fn is_deleted(node: Node, src: &[u8]) -> bool {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == "delete_method_clause" {
                return true;
            }
            let len = child.end_byte().saturating_sub(child.start_byte());
            if len <= 16 {
                let text = walker::node_text(child, src);
                if text == "delete" || text == "= delete" {
                    return true;
                }
            }
        }
    }
    false
}

/// Texts of short direct children, for specifier scanning; long children
/// (declarators, bodies, parameter lists) never hold a bare specifier.
fn short_child_texts(node: Node, src: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            let len = child.end_byte().saturating_sub(child.start_byte());
            if len <= 64 {
                out.push(walker::node_text(child, src));
            }
        }
    }
    out
}
