//! Type-reference resolution.
//!
//! Walks a type spelling down to its tag name, then resolves that name
//! lexically through the enclosing scope chain against the tags seen so far
//! in the current translation unit. Pointers, references, cv qualifiers, and
//! template argument lists all collapse onto the same referent, so `T*`,
//! `T&`, `const T`, and `T<A, B>` link to the same documented entity as `T`.

use crate::usr::strip_template_args;
use cppdox_core::SymbolId;
use std::collections::HashMap;

/// Per-TU registry of tag declarations (records, enums) and type aliases,
/// keyed by qualified name with template arguments stripped. Namespaces are
/// tracked separately so qualified declarators can tell a record qualifier
/// from a namespace qualifier.
#[derive(Debug, Default)]
pub struct TagRegistry {
    by_qualified: HashMap<String, SymbolId>,
    namespaces: HashMap<String, SymbolId>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag under its qualified name. Later registrations of the
    /// same name win, matching redeclaration order within a TU.
    pub fn register(&mut self, qualified: &str, id: SymbolId) {
        self.by_qualified
            .insert(strip_template_args(qualified), id);
    }

    pub fn register_namespace(&mut self, qualified: &str, id: SymbolId) {
        self.namespaces.insert(qualified.to_string(), id);
    }

    pub fn lookup(&self, qualified: &str) -> Option<SymbolId> {
        self.by_qualified.get(qualified).copied()
    }

    pub fn lookup_namespace(&self, qualified: &str) -> Option<SymbolId> {
        self.namespaces.get(qualified).copied()
    }

    pub fn len(&self) -> usize {
        self.by_qualified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_qualified.is_empty()
    }
}

const BUILTIN_TOKENS: &[&str] = &[
    "void", "bool", "char", "wchar_t", "char8_t", "char16_t", "char32_t", "short", "int", "long",
    "signed", "unsigned", "float", "double", "auto", "decltype(auto)", "size_t", "std::size_t",
    "ptrdiff_t", "nullptr_t",
];

/// Reduce a type spelling to its tag name: drop cv qualifiers, elaborated
/// keywords, pointer/reference sigils, and every template argument list.
/// Returns `None` for builtins and spellings with no tag.
pub fn canonical_tag_name(spelling: &str) -> Option<String> {
    let mut s = spelling.trim();

    loop {
        let before = s;
        s = s.trim_end();
        for suffix in ["&&", "&", "*"] {
            if let Some(rest) = s.strip_suffix(suffix) {
                s = rest.trim_end();
            }
        }
        for suffix in ["const", "volatile"] {
            if let Some(rest) = s.strip_suffix(suffix) {
                // Only a whole trailing token counts.
                if rest.is_empty() || rest.ends_with([' ', '*', '&']) {
                    s = rest.trim_end();
                }
            }
        }
        if s == before {
            break;
        }
    }

    loop {
        let before = s;
        for prefix in [
            "const ", "volatile ", "struct ", "class ", "union ", "enum ", "typename ",
        ] {
            if let Some(rest) = s.strip_prefix(prefix) {
                s = rest.trim_start();
            }
        }
        if s == before {
            break;
        }
    }
    s = s.trim_start_matches("::");

    let stripped = strip_template_args(s);
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return None;
    }
    let is_builtin = stripped
        .split_whitespace()
        .all(|token| BUILTIN_TOKENS.contains(&token));
    if is_builtin {
        return None;
    }
    Some(stripped.to_string())
}

/// Resolve a type spelling to a documented tag's ID, or null.
///
/// `scope` is the lexical path (namespace and record names, outermost
/// first) of the declaration the spelling appears in; lookup walks from the
/// innermost scope outward so inner names shadow outer ones.
pub fn type_symbol_id(spelling: &str, scope: &[String], registry: &TagRegistry) -> SymbolId {
    let Some(tag) = canonical_tag_name(spelling) else {
        return SymbolId::NULL;
    };
    lookup_in_scope(&tag, scope, registry).unwrap_or(SymbolId::NULL)
}

/// Scope-chain lookup of a (possibly already qualified) tag name.
pub fn lookup_in_scope(tag: &str, scope: &[String], registry: &TagRegistry) -> Option<SymbolId> {
    for depth in (0..=scope.len()).rev() {
        let candidate = if depth == 0 {
            tag.to_string()
        } else {
            format!("{}::{}", scope[..depth].join("::"), tag)
        };
        if let Some(id) = registry.lookup(&candidate) {
            return Some(id);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usr;

    fn registry_with(names: &[&str]) -> TagRegistry {
        let mut registry = TagRegistry::new();
        for name in names {
            registry.register(name, usr::record_id(name));
        }
        registry
    }

    #[test]
    fn pointers_references_and_cv_collapse() {
        let registry = registry_with(&["T"]);
        let expect = usr::record_id("T");
        for spelling in ["T", "T*", "T *", "T&", "T &&", "const T", "const T &", "T const"] {
            assert_eq!(
                type_symbol_id(spelling, &[], &registry),
                expect,
                "spelling {spelling:?} should resolve to T"
            );
        }
    }

    #[test]
    fn template_arguments_collapse_onto_primary() {
        let registry = registry_with(&["Vec"]);
        assert_eq!(
            type_symbol_id("Vec<int>", &[], &registry),
            usr::record_id("Vec")
        );
        assert_eq!(
            type_symbol_id("const Vec<A, B> &", &[], &registry),
            usr::record_id("Vec")
        );
    }

    #[test]
    fn builtins_resolve_to_null() {
        let registry = registry_with(&["T"]);
        for spelling in ["int", "const unsigned long", "void", "bool", "double *", ""] {
            assert!(type_symbol_id(spelling, &[], &registry).is_null());
        }
    }

    #[test]
    fn scope_chain_prefers_inner_names() {
        let mut registry = TagRegistry::new();
        registry.register("Item", usr::record_id("Item"));
        registry.register("ns::Item", usr::record_id("ns::Item"));
        let scope = vec!["ns".to_string()];
        assert_eq!(
            type_symbol_id("Item", &scope, &registry),
            usr::record_id("ns::Item")
        );
        assert_eq!(type_symbol_id("Item", &[], &registry), usr::record_id("Item"));
    }

    #[test]
    fn qualified_spellings_resolve_directly() {
        let registry = registry_with(&["ns::Foo"]);
        assert_eq!(
            type_symbol_id("ns::Foo", &[], &registry),
            usr::record_id("ns::Foo")
        );
        assert_eq!(
            type_symbol_id("::ns::Foo", &[], &registry),
            usr::record_id("ns::Foo")
        );
    }

    #[test]
    fn unknown_tags_resolve_to_null() {
        let registry = registry_with(&["T"]);
        assert!(type_symbol_id("Unknown", &[], &registry).is_null());
        assert!(type_symbol_id("std::string", &[], &registry).is_null());
    }

    #[test]
    fn elaborated_keywords_are_dropped() {
        let registry = registry_with(&["Point"]);
        assert_eq!(
            type_symbol_id("struct Point", &[], &registry),
            usr::record_id("Point")
        );
    }
}
