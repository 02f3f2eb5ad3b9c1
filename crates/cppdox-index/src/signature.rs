//! Prototype rendering.
//!
//! Composes the human-readable signature of a function or record, together
//! with the byte offsets downstream rendering uses to style the template
//! prelude and the name independently. The offsets are contractual:
//! `proto[name_start..name_start + name.len()] == name` always holds, and
//! the template-parameter restoration pass recomputes them after renaming.

use cppdox_core::{
    FunctionSymbol, RecordSymbol, RefQualifier, StorageClass, TemplateParam, TemplateParamKind,
};

/// Render `template <...> ` with a trailing space, or an empty string for
/// non-templates.
pub fn template_prelude(params: &[TemplateParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = params.iter().map(template_param_decl).collect();
    format!("template <{}> ", rendered.join(", "))
}

fn template_param_decl(p: &TemplateParam) -> String {
    let mut out = match p.kind {
        TemplateParamKind::TypeParam => {
            let keyword = if p.is_typename { "typename" } else { "class" };
            let pack = if p.is_parameter_pack { "..." } else { "" };
            if p.name.is_empty() {
                format!("{keyword}{pack}")
            } else {
                format!("{keyword}{pack} {}", p.name)
            }
        }
        TemplateParamKind::NonType => {
            let pack = if p.is_parameter_pack { "..." } else { "" };
            if p.name.is_empty() {
                format!("{}{pack}", p.ty)
            } else {
                format!("{}{pack} {}", p.ty, p.name)
            }
        }
        // Template-template parameters keep their captured source text.
        TemplateParamKind::TemplateTemplate => {
            if p.ty.is_empty() {
                format!("template <...> typename {}", p.name)
            } else {
                p.ty.clone()
            }
        }
    };
    if !p.default_value.is_empty() {
        out.push_str(" = ");
        out.push_str(&p.default_value);
    }
    out
}

/// Compose a function's prototype. Returns `(proto, post_template, name_start)`.
pub fn function_signature(f: &FunctionSymbol) -> (String, usize, usize) {
    let mut proto = template_prelude(&f.template_params);
    let post_template = proto.len();

    if f.is_nodiscard {
        proto.push_str("[[nodiscard]] ");
    }
    if f.is_noreturn {
        proto.push_str("[[noreturn]] ");
    }
    match f.storage_class {
        StorageClass::Static => proto.push_str("static "),
        StorageClass::Extern => proto.push_str("extern "),
        StorageClass::None => {}
    }
    if f.is_virtual {
        proto.push_str("virtual ");
    }
    if f.is_inline {
        proto.push_str("inline ");
    }
    if f.is_consteval {
        proto.push_str("consteval ");
    } else if f.is_constexpr {
        proto.push_str("constexpr ");
    }
    if f.is_explicit {
        proto.push_str("explicit ");
    }

    // Constructors, destructors, and conversion operators render no return.
    if !f.is_ctor_or_dtor && !f.is_conversion_op {
        if f.has_trailing_return {
            proto.push_str("auto ");
        } else if !f.return_type.name.is_empty() {
            proto.push_str(&f.return_type.name);
            proto.push(' ');
        }
    }

    let name_start = proto.len();
    proto.push_str(&f.info.name);
    proto.push('(');
    let mut rendered_params: Vec<String> = f
        .params
        .iter()
        .map(|p| {
            let mut s = p.ty.name.clone();
            if !p.name.is_empty() {
                s.push(' ');
                s.push_str(&p.name);
            }
            if !p.default_value.is_empty() {
                s.push_str(" = ");
                s.push_str(&p.default_value);
            }
            s
        })
        .collect();
    if f.is_variadic {
        rendered_params.push("...".to_string());
    }
    proto.push_str(&rendered_params.join(", "));
    proto.push(')');

    if f.is_const {
        proto.push_str(" const");
    }
    if f.is_volatile {
        proto.push_str(" volatile");
    }
    if f.is_restrict {
        proto.push_str(" restrict");
    }
    match f.ref_qualifier {
        RefQualifier::LValue => proto.push_str(" &"),
        RefQualifier::RValue => proto.push_str(" &&"),
        RefQualifier::None => {}
    }
    if f.is_noexcept {
        proto.push_str(" noexcept");
    }
    if f.has_trailing_return && !f.return_type.name.is_empty() {
        proto.push_str(" -> ");
        proto.push_str(&f.return_type.name);
    }

    (proto, post_template, name_start)
}

/// Compose a record's forward-declaration-shaped prototype, e.g.
/// `template <typename T> class Foo`. The inheritance list is appended
/// later by a post-pass, once every base is certainly resolvable.
pub fn record_proto(r: &RecordSymbol) -> String {
    format!("{}{} {}", template_prelude(&r.template_params), r.kind, r.info.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppdox_core::{FunctionParam, RecordKind, TypeRef};

    fn named(name: &str) -> FunctionSymbol {
        let mut f = FunctionSymbol::default();
        f.info.name = name.to_string();
        f
    }

    fn check_offsets(f: &FunctionSymbol, proto: &str, name_start: usize, post_template: usize) {
        assert!(post_template <= name_start);
        assert!(name_start <= proto.len());
        assert_eq!(&proto[name_start..name_start + f.info.name.len()], f.info.name);
    }

    #[test]
    fn plain_function() {
        let mut f = named("add");
        f.return_type.name = "int".into();
        f.params.push(FunctionParam {
            name: "a".into(),
            ty: TypeRef { name: "int".into(), id: Default::default() },
            default_value: String::new(),
        });
        f.params.push(FunctionParam {
            name: "b".into(),
            ty: TypeRef { name: "int".into(), id: Default::default() },
            default_value: "0".into(),
        });
        let (proto, post_template, name_start) = function_signature(&f);
        assert_eq!(proto, "int add(int a, int b = 0)");
        assert_eq!(post_template, 0);
        check_offsets(&f, &proto, name_start, post_template);
    }

    #[test]
    fn template_prelude_sets_post_template() {
        let mut f = named("get");
        f.return_type.name = "T".into();
        f.template_params.push(TemplateParam {
            kind: TemplateParamKind::TypeParam,
            name: "T".into(),
            is_typename: true,
            ..TemplateParam::default()
        });
        let (proto, post_template, name_start) = function_signature(&f);
        assert_eq!(proto, "template <typename T> T get()");
        assert_eq!(post_template, "template <typename T> ".len());
        check_offsets(&f, &proto, name_start, post_template);
    }

    #[test]
    fn ctor_renders_no_return() {
        let mut f = named("Foo");
        f.is_ctor_or_dtor = true;
        f.is_explicit = true;
        f.return_type.name = "void".into();
        let (proto, post_template, name_start) = function_signature(&f);
        assert_eq!(proto, "explicit Foo()");
        check_offsets(&f, &proto, name_start, post_template);
    }

    #[test]
    fn conversion_operator_renders_no_return() {
        let mut f = named("operator bool");
        f.is_conversion_op = true;
        f.is_const = true;
        let (proto, _, name_start) = function_signature(&f);
        assert_eq!(proto, "operator bool() const");
        check_offsets(&f, &proto, name_start, 0);
    }

    #[test]
    fn trailing_qualifiers_in_order() {
        let mut f = named("at");
        f.return_type.name = "int".into();
        f.is_const = true;
        f.is_noexcept = true;
        f.ref_qualifier = RefQualifier::LValue;
        let (proto, ..) = function_signature(&f);
        assert_eq!(proto, "int at() const & noexcept");
    }

    #[test]
    fn trailing_return_uses_auto() {
        let mut f = named("size");
        f.has_trailing_return = true;
        f.return_type.name = "std::size_t".into();
        let (proto, _, name_start) = function_signature(&f);
        assert_eq!(proto, "auto size() -> std::size_t");
        check_offsets(&f, &proto, name_start, 0);
    }

    #[test]
    fn variadic_and_qualifier_flags() {
        let mut f = named("log");
        f.return_type.name = "void".into();
        f.is_variadic = true;
        f.storage_class = StorageClass::Static;
        f.params.push(FunctionParam {
            name: "fmt".into(),
            ty: TypeRef { name: "const char *".into(), id: Default::default() },
            default_value: String::new(),
        });
        let (proto, ..) = function_signature(&f);
        assert_eq!(proto, "static void log(const char * fmt, ...)");
    }

    #[test]
    fn record_proto_includes_template_prelude() {
        let mut r = RecordSymbol::default();
        r.info.name = "Foo".into();
        r.kind = RecordKind::Class;
        r.template_params.push(TemplateParam {
            kind: TemplateParamKind::TypeParam,
            name: "T".into(),
            is_typename: false,
            ..TemplateParam::default()
        });
        assert_eq!(record_proto(&r), "template <class T> class Foo");
    }

    #[test]
    fn non_type_and_defaulted_template_params() {
        let params = vec![
            TemplateParam {
                kind: TemplateParamKind::TypeParam,
                name: "T".into(),
                is_typename: true,
                default_value: "int".into(),
                ..TemplateParam::default()
            },
            TemplateParam {
                kind: TemplateParamKind::NonType,
                name: "N".into(),
                ty: "int".into(),
                ..TemplateParam::default()
            },
            TemplateParam {
                kind: TemplateParamKind::TypeParam,
                name: "Rest".into(),
                is_typename: true,
                is_parameter_pack: true,
                ..TemplateParam::default()
            },
        ];
        assert_eq!(
            template_prelude(&params),
            "template <typename T = int, int N, typename... Rest> "
        );
    }
}
