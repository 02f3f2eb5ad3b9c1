//! Per-TU AST traversal.
//!
//! Walks a parsed file top-down, tracking the lexical context (namespace
//! stack, record nesting, access specifier state, pending template parameter
//! lists) and dispatching each documentable declaration to its extractor.
//! Function bodies are never descended into.

use crate::extractors;
use crate::filter::IgnoreFilter;
use crate::parser::ParsedFile;
use crate::resolve::TagRegistry;
use cppdox_core::{
    Access, Config, Index, SymbolId, TemplateParam, TemplateParamKind,
};
use tree_sitter::Node;

/// Lexical context threaded through the walk.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Repo-relative path of the file being walked.
    pub file: String,
    /// Full lexical path (namespace and record names), outermost first.
    pub path: Vec<String>,
    /// Enclosing named namespace names only, for ignore-namespace matching.
    pub namespaces: Vec<String>,
    /// ID of the nearest enclosing namespace or record; null at TU scope.
    pub parent_id: SymbolId,
    /// Set while walking inside a record body.
    pub record: Option<RecordScope>,
    /// Current member access inside a record body.
    pub access: Access,
    pub in_anonymous_namespace: bool,
}

impl Scope {
    /// Qualify a name with the current lexical path.
    pub fn qualified(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self.path.join("::"), name)
        }
    }
}

/// The record whose body is currently being walked.
#[derive(Debug, Clone)]
pub struct RecordScope {
    pub id: SymbolId,
    /// Plain name without nesting prefix or specialization arguments.
    pub plain_name: String,
    pub template_params: Vec<TemplateParam>,
}

/// A member symbol surfaced while walking a record body.
pub(crate) enum Member {
    Method(SymbolId),
    Alias(SymbolId),
}

/// Walks one translation unit's files against the shared index.
pub struct Walker<'a> {
    pub index: &'a Index,
    pub cfg: &'a Config,
    pub registry: TagRegistry,
}

impl<'a> Walker<'a> {
    pub fn new(index: &'a Index, cfg: &'a Config) -> Self {
        Self {
            index,
            cfg,
            registry: TagRegistry::new(),
        }
    }

    pub(crate) fn filter(&self) -> IgnoreFilter<'a> {
        IgnoreFilter::new(self.cfg)
    }

    pub fn walk_file(&mut self, file: &ParsedFile) {
        let scope = Scope {
            file: file.relative.clone(),
            ..Scope::default()
        };
        self.walk_children(file.tree.root_node(), &file.source, &scope, &[]);
    }

    pub(crate) fn walk_children(
        &mut self,
        node: Node,
        src: &[u8],
        scope: &Scope,
        templates: &[Vec<TemplateParam>],
    ) {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                self.walk_node(child, src, scope, templates);
            }
        }
    }

    fn walk_node(&mut self, node: Node, src: &[u8], scope: &Scope, templates: &[Vec<TemplateParam>]) {
        match node.kind() {
            "namespace_definition" => self.walk_namespace(node, src, scope),
            "template_declaration" => {
                let mut stack = templates.to_vec();
                stack.push(parse_template_params(node, src));
                self.walk_children(node, src, scope, &stack);
            }
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                if node.child_by_field_name("body").is_some() {
                    extractors::records::extract(self, node, src, scope, templates, None);
                }
            }
            "enum_specifier" => {
                if node.child_by_field_name("body").is_some() {
                    extractors::enums::extract(self, node, src, scope, None);
                }
            }
            "function_definition" => {
                extractors::functions::extract(self, node, src, scope, templates);
            }
            "declaration" => {
                if find_function_declarator(node).is_some() {
                    extractors::functions::extract(self, node, src, scope, templates);
                } else {
                    // `struct S { ... } s;` surfaces the specifier through the
                    // recursion below; namespace-scope variables themselves are
                    // not documented.
                    self.walk_children(node, src, scope, templates);
                }
            }
            "type_definition" => self.walk_typedef(node, src, scope),
            "alias_declaration" | "using_declaration" => {
                extractors::aliases::extract(self, node, src, scope);
            }
            // Transparent containers.
            "preproc_if" | "preproc_ifdef" | "preproc_else" | "linkage_specification"
            | "declaration_list" => self.walk_children(node, src, scope, templates),
            _ => {}
        }
    }

    fn walk_namespace(&mut self, node: Node, src: &[u8], scope: &Scope) {
        let mut inner = scope.clone();
        inner.record = None;
        inner.access = Access::None;

        match node.child_by_field_name("name") {
            None => {
                // Anonymous namespace: nothing inside is documented, but the
                // walk continues so match counters stay honest.
                inner.in_anonymous_namespace = true;
            }
            Some(name_node) => {
                // `namespace a::b` introduces one level per segment.
                let full = node_text(name_node, src);
                for segment in full.split("::").map(str::trim).filter(|s| !s.is_empty()) {
                    let id = extractors::namespaces::extract(self, node, src, &inner, segment);
                    inner.path.push(segment.to_string());
                    inner.namespaces.push(segment.to_string());
                    inner.parent_id = id;
                }
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.walk_children(body, src, &inner, &[]);
        }
    }

    /// `typedef struct { ... } Name;` names an otherwise anonymous record;
    /// the same idiom applies to enums. Plain `typedef int X;` is not a
    /// documented alias.
    fn walk_typedef(&mut self, node: Node, src: &[u8], scope: &Scope) {
        let Some(type_node) = node.child_by_field_name("type") else {
            return;
        };
        if type_node.child_by_field_name("body").is_none() {
            return;
        }
        let recovered = if type_node.child_by_field_name("name").is_none() {
            node.child_by_field_name("declarator")
                .map(|d| node_text(d, src))
        } else {
            None
        };
        match type_node.kind() {
            "struct_specifier" | "class_specifier" | "union_specifier" => {
                extractors::records::extract(self, type_node, src, scope, &[], recovered);
            }
            "enum_specifier" => {
                extractors::enums::extract(self, type_node, src, scope, recovered);
            }
            _ => {}
        }
    }

    /// Dispatch one record-body member. Returns the surfaced method or alias
    /// ID so the record can link it.
    pub(crate) fn walk_member(
        &mut self,
        node: Node,
        src: &[u8],
        scope: &Scope,
        templates: &[Vec<TemplateParam>],
    ) -> Option<Member> {
        match node.kind() {
            "function_definition" => {
                extractors::functions::extract(self, node, src, scope, templates).map(Member::Method)
            }
            "field_declaration" | "declaration" => {
                if find_function_declarator(node).is_some() {
                    extractors::functions::extract(self, node, src, scope, templates)
                        .map(Member::Method)
                } else {
                    None
                }
            }
            "template_declaration" => {
                let mut stack = templates.to_vec();
                stack.push(parse_template_params(node, src));
                for i in 0..node.child_count() {
                    let Some(child) = node.child(i) else { continue };
                    match child.kind() {
                        "function_definition" | "declaration" | "field_declaration"
                        | "class_specifier" | "struct_specifier" | "union_specifier"
                        | "alias_declaration" => {
                            return self.walk_member(child, src, scope, &stack);
                        }
                        _ => {}
                    }
                }
                None
            }
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                if node.child_by_field_name("body").is_some() {
                    extractors::records::extract(self, node, src, scope, templates, None);
                }
                None
            }
            "enum_specifier" => {
                if node.child_by_field_name("body").is_some() {
                    extractors::enums::extract(self, node, src, scope, None);
                }
                None
            }
            "alias_declaration" | "using_declaration" => {
                extractors::aliases::extract(self, node, src, scope).map(Member::Alias)
            }
            "type_definition" => {
                self.walk_typedef(node, src, scope);
                None
            }
            _ => None,
        }
    }
}

// ── Node helpers ──────────────────────────────────────────────────────────

pub(crate) fn node_text(node: Node, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}

const DECLARATOR_KINDS: &[&str] = &[
    "function_declarator",
    "pointer_declarator",
    "reference_declarator",
    "parenthesized_declarator",
    "abstract_function_declarator",
    "abstract_pointer_declarator",
    "abstract_reference_declarator",
    "variadic_declarator",
    "array_declarator",
    "identifier",
    "field_identifier",
    "type_identifier",
    "qualified_identifier",
    "destructor_name",
    "operator_name",
    "operator_cast",
    "structured_binding_declarator",
];

fn inner_declarator(node: Node) -> Option<Node> {
    if let Some(d) = node.child_by_field_name("declarator") {
        return Some(d);
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if DECLARATOR_KINDS.contains(&child.kind()) {
                return Some(child);
            }
        }
    }
    None
}

/// Peel pointer/reference wrappers off a declarator, collecting their sigils.
/// Returns the accumulated sigils and the core declarator, if any.
pub(crate) fn unwrap_declarator(node: Node) -> (String, Option<Node>) {
    let mut sigils = String::new();
    let mut current = Some(node);
    while let Some(n) = current {
        match n.kind() {
            "pointer_declarator" | "abstract_pointer_declarator" => {
                sigils.push('*');
                current = inner_declarator(n);
            }
            "reference_declarator" | "abstract_reference_declarator" => {
                let amp = n
                    .child(0)
                    .map(|c| c.kind().to_string())
                    .unwrap_or_default();
                sigils.push_str(if amp == "&&" { "&&" } else { "&" });
                current = inner_declarator(n);
            }
            "parenthesized_declarator" | "variadic_declarator" | "array_declarator" => {
                current = inner_declarator(n);
            }
            _ => return (sigils, Some(n)),
        }
    }
    (sigils, None)
}

/// Find the function declarator (or conversion-operator declarator) of a
/// declaration-ish node, peeling pointer/reference wrappers on the way.
pub(crate) fn find_function_declarator(node: Node) -> Option<Node> {
    let declarator = node.child_by_field_name("declarator")?;
    let (_, core) = unwrap_declarator(declarator);
    let core = core?;
    match core.kind() {
        "function_declarator" | "operator_cast" => Some(core),
        _ => None,
    }
}

/// Declaration specifiers that are not part of the rendered type.
const NON_TYPE_SPECIFIERS: &[&str] = &[
    "virtual",
    "static",
    "extern",
    "inline",
    "constexpr",
    "consteval",
    "constinit",
    "explicit",
    "friend",
    "mutable",
    "thread_local",
    "typedef",
    "register",
];

/// Rendered type of a declaration-ish node: the written type tokens up to
/// the declarator, with pointer/reference sigils from the declarator
/// appended (`const Foo *`).
pub(crate) fn type_spelling(node: Node, src: &[u8]) -> String {
    let declarator = node.child_by_field_name("declarator");
    let declarator_id = declarator.map(|d| d.id());

    let mut parts: Vec<String> = Vec::new();
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        if Some(child.id()) == declarator_id {
            break;
        }
        let kind = child.kind();
        if kind.starts_with("attribute") || kind == "comment" {
            continue;
        }
        let text = node_text(child, src);
        if NON_TYPE_SPECIFIERS.contains(&text.as_str()) {
            continue;
        }
        if matches!(text.as_str(), ";" | "=" | ",") {
            continue;
        }
        parts.push(text);
    }

    let mut spelling = parts.join(" ");
    if let Some(d) = declarator {
        let (sigils, _) = unwrap_declarator(d);
        if !sigils.is_empty() {
            spelling.push(' ');
            spelling.push_str(&sigils);
        }
    }
    spelling
}

/// Replace whole-identifier occurrences of `from` with `to`.
pub(crate) fn replace_ident(s: &str, from: &str, to: &str) -> String {
    if from.is_empty() || !s.contains(from) {
        return s.to_string();
    }
    let bytes = s.as_bytes();
    let is_ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if s[i..].starts_with(from) {
            let before_ok = i == 0 || !is_ident(bytes[i - 1]);
            let end = i + from.len();
            let after_ok = end == s.len() || !is_ident(bytes[end]);
            if before_ok && after_ok {
                out.push_str(to);
                i = end;
                continue;
            }
        }
        // Advance one UTF-8 character.
        let step = s[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        out.push_str(&s[i..i + step]);
        i += step;
    }
    out
}

fn first_child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                return Some(child);
            }
        }
    }
    None
}

fn last_descendant_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut found = None;
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                found = Some(child);
            }
            if let Some(inner) = last_descendant_of_kind(child, kind) {
                found = Some(inner);
            }
        }
    }
    found
}

/// Parse the parameter list of a `template_declaration` node.
pub(crate) fn parse_template_params(node: Node, src: &[u8]) -> Vec<TemplateParam> {
    let Some(list) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut params = Vec::new();
    for i in 0..list.child_count() {
        let Some(child) = list.child(i) else { continue };
        let text = node_text(child, src);
        match child.kind() {
            "type_parameter_declaration"
            | "variadic_type_parameter_declaration"
            | "optional_type_parameter_declaration" => {
                let name = first_child_of_kind(child, "type_identifier")
                    .map(|n| node_text(n, src))
                    .unwrap_or_default();
                let default_value = text
                    .split_once('=')
                    .map(|(_, d)| d.trim().to_string())
                    .unwrap_or_default();
                params.push(TemplateParam {
                    kind: TemplateParamKind::TypeParam,
                    name,
                    ty: String::new(),
                    default_value,
                    is_typename: text.trim_start().starts_with("typename"),
                    is_parameter_pack: text.contains("..."),
                });
            }
            "parameter_declaration"
            | "optional_parameter_declaration"
            | "variadic_parameter_declaration" => {
                let name = child
                    .child_by_field_name("declarator")
                    .and_then(|d| unwrap_declarator(d).1)
                    .filter(|core| {
                        matches!(core.kind(), "identifier" | "field_identifier" | "type_identifier")
                    })
                    .map(|core| node_text(core, src))
                    .unwrap_or_default();
                let default_value = child
                    .child_by_field_name("default_value")
                    .map(|d| node_text(d, src))
                    .unwrap_or_default();
                params.push(TemplateParam {
                    kind: TemplateParamKind::NonType,
                    name,
                    ty: type_spelling(child, src),
                    default_value,
                    is_typename: false,
                    is_parameter_pack: text.contains("..."),
                });
            }
            "template_template_parameter_declaration" => {
                // The whole written parameter is kept as the type, the way a
                // renderer would want to show it.
                let name = last_descendant_of_kind(child, "type_identifier")
                    .map(|n| node_text(n, src))
                    .unwrap_or_default();
                params.push(TemplateParam {
                    kind: TemplateParamKind::TemplateTemplate,
                    name,
                    ty: text.clone(),
                    default_value: String::new(),
                    is_typename: false,
                    is_parameter_pack: text.contains("..."),
                });
            }
            _ => {}
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse_cpp(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .expect("failed to set C++ language");
        parser
            .parse(source.as_bytes(), None)
            .expect("failed to parse")
    }

    #[test]
    fn scope_qualification() {
        let mut scope = Scope::default();
        assert_eq!(scope.qualified("Foo"), "Foo");
        scope.path = vec!["a".into(), "b".into()];
        assert_eq!(scope.qualified("Foo"), "a::b::Foo");
    }

    #[test]
    fn replace_ident_respects_token_boundaries() {
        assert_eq!(replace_ident("T x", "T", "P"), "P x");
        assert_eq!(replace_ident("Tree x", "T", "P"), "Tree x");
        assert_eq!(replace_ident("Vec<T> &", "T", "P"), "Vec<P> &");
        assert_eq!(replace_ident("T, T", "T", "P"), "P, P");
        assert_eq!(replace_ident("aTb", "T", "P"), "aTb");
    }

    #[test]
    fn template_params_are_parsed() {
        let source = "template <typename T, class U, int N, typename... Rest> void f();\n";
        let tree = parse_cpp(source);
        let root = tree.root_node();
        let template = (0..root.child_count())
            .filter_map(|i| root.child(i))
            .find(|c| c.kind() == "template_declaration")
            .unwrap();
        let params = parse_template_params(template, source.as_bytes());
        assert_eq!(params.len(), 4);
        assert_eq!(params[0].name, "T");
        assert!(params[0].is_typename);
        assert_eq!(params[1].name, "U");
        assert!(!params[1].is_typename);
        assert_eq!(params[2].name, "N");
        assert_eq!(params[2].kind, TemplateParamKind::NonType);
        assert_eq!(params[2].ty, "int");
        assert_eq!(params[3].name, "Rest");
        assert!(params[3].is_parameter_pack);
    }

    #[test]
    fn function_declarator_found_through_pointers() {
        let source = "int* f(int a);\nint x;\n";
        let tree = parse_cpp(source);
        let root = tree.root_node();
        let decls: Vec<Node> = (0..root.child_count())
            .filter_map(|i| root.child(i))
            .filter(|c| c.kind() == "declaration")
            .collect();
        assert!(find_function_declarator(decls[0]).is_some());
        assert!(find_function_declarator(decls[1]).is_none());
    }

    #[test]
    fn type_spelling_keeps_cv_and_sigils() {
        let source = "const Foo* p;\n";
        let tree = parse_cpp(source);
        let root = tree.root_node();
        let decl = (0..root.child_count())
            .filter_map(|i| root.child(i))
            .find(|c| c.kind() == "declaration")
            .unwrap();
        assert_eq!(type_spelling(decl, source.as_bytes()), "const Foo *");
    }
}
