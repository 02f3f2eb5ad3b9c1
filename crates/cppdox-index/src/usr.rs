//! Canonical cross-TU identifier synthesis.
//!
//! A USR is the stable spelling of a declaration's identity: the same
//! declaration seen from any translation unit produces the same string, and
//! template specializations reduce to their primary template. Hashing the
//! USR yields the [`cppdox_core::SymbolId`].

use cppdox_core::SymbolId;

/// Remove every angle-bracketed template argument group from a name, so
/// `Vec<int>` and `Outer<T>::Inner` reduce to `Vec` and `Outer::Inner`.
/// `operator<`, `operator<<`, and `operator<=` keep their brackets.
pub fn strip_template_args(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let chars: Vec<char> = name.chars().collect();
    let mut depth = 0usize;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '<' {
            if depth == 0 && out.ends_with("operator") {
                out.push('<');
                match chars.get(i + 1) {
                    Some('<') => {
                        out.push('<');
                        i += 1;
                    }
                    Some('=') => {
                        out.push('=');
                        i += 1;
                    }
                    _ => {}
                }
            } else {
                depth += 1;
            }
        } else if c == '>' && depth > 0 {
            depth -= 1;
        } else if depth == 0 {
            out.push(c);
        }
        i += 1;
    }
    out
}

/// Collapse whitespace and drop spaces around punctuation so that
/// `const  int &` and `const int&` spell the same parameter.
pub fn normalize_spelling(spelling: &str) -> String {
    let collapsed: Vec<&str> = spelling.split_whitespace().collect();
    let mut out = String::with_capacity(spelling.len());
    for (i, token) in collapsed.iter().enumerate() {
        if i > 0
            && !token.starts_with(['*', '&', '<', '>', ',', '(', ')'])
            && !out.ends_with(['<', '(', ':'])
        {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

pub fn namespace_usr(qualified: &str) -> String {
    format!("c:N:{qualified}")
}

pub fn record_usr(qualified: &str) -> String {
    format!("c:R:{}", strip_template_args(qualified))
}

pub fn enum_usr(qualified: &str) -> String {
    format!("c:E:{qualified}")
}

pub fn alias_usr(qualified: &str) -> String {
    format!("c:A:{qualified}")
}

/// Function USRs encode the normalized parameter list and constness so
/// overloads get distinct IDs while redeclarations collide.
pub fn function_usr(qualified: &str, param_types: &[String], is_const: bool) -> String {
    let params: Vec<String> = param_types
        .iter()
        .map(|p| normalize_spelling(p))
        .collect();
    format!(
        "c:F:{}({}){}",
        strip_template_args(qualified),
        params.join(","),
        if is_const { "#const" } else { "" }
    )
}

pub fn namespace_id(qualified: &str) -> SymbolId {
    SymbolId::from_usr(&namespace_usr(qualified))
}

pub fn record_id(qualified: &str) -> SymbolId {
    SymbolId::from_usr(&record_usr(qualified))
}

pub fn enum_id(qualified: &str) -> SymbolId {
    SymbolId::from_usr(&enum_usr(qualified))
}

pub fn alias_id(qualified: &str) -> SymbolId {
    SymbolId::from_usr(&alias_usr(qualified))
}

pub fn function_id(qualified: &str, param_types: &[String], is_const: bool) -> SymbolId {
    SymbolId::from_usr(&function_usr(qualified, param_types, is_const))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_args_are_stripped() {
        assert_eq!(strip_template_args("Vec<int>"), "Vec");
        assert_eq!(strip_template_args("Vec<std::pair<int, float>>"), "Vec");
        assert_eq!(strip_template_args("Outer<T>::Inner<U>"), "Outer::Inner");
        assert_eq!(strip_template_args("plain"), "plain");
    }

    #[test]
    fn operator_angle_brackets_survive() {
        assert_eq!(strip_template_args("Foo::operator<"), "Foo::operator<");
        assert_eq!(strip_template_args("Foo::operator<<"), "Foo::operator<<");
        assert_eq!(strip_template_args("Foo::operator<="), "Foo::operator<=");
        assert_eq!(strip_template_args("Foo::operator>"), "Foo::operator>");
    }

    #[test]
    fn specialization_collapses_onto_primary() {
        assert_eq!(record_id("ns::Vec<int>"), record_id("ns::Vec"));
        assert_eq!(record_id("ns::Vec<float>"), record_id("ns::Vec"));
        assert_ne!(record_id("ns::Vec"), record_id("ns::Map"));
    }

    #[test]
    fn spelling_normalization_unifies_whitespace() {
        assert_eq!(
            normalize_spelling("const  std::string &"),
            normalize_spelling("const std::string&")
        );
        assert_eq!(normalize_spelling("int *"), normalize_spelling("int*"));
    }

    #[test]
    fn overloads_get_distinct_ids() {
        let a = function_id("ns::f", &["int".into()], false);
        let b = function_id("ns::f", &["float".into()], false);
        let c = function_id("ns::f", &["int".into()], true);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn redeclarations_collide() {
        let a = function_id("ns::f", &["const int &".into()], false);
        let b = function_id("ns::f", &["const  int&".into()], false);
        assert_eq!(a, b);
    }

    #[test]
    fn kinds_partition_the_id_space() {
        assert_ne!(record_id("Foo"), enum_id("Foo"));
        assert_ne!(record_id("Foo"), namespace_id("Foo"));
        assert_ne!(alias_id("Foo"), enum_id("Foo"));
    }
}
