//! Symbol types produced by the indexing pipeline.

use crate::ids::SymbolId;
use serde::{Deserialize, Serialize};

/// Access specifier of a C++ declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Public,
    Protected,
    Private,
    /// No access specifier applies (namespace scope) or none was written.
    #[default]
    None,
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Protected => write!(f, "protected"),
            Self::Private => write!(f, "private"),
            Self::None => Ok(()),
        }
    }
}

/// Ref-qualifier on a member function (`&` or `&&` after the parameter list).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefQualifier {
    #[default]
    None,
    LValue,
    RValue,
}

/// Storage class written on a function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageClass {
    #[default]
    None,
    Static,
    Extern,
}

/// The keyword a record was declared with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Class,
    #[default]
    Struct,
    Union,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::Struct => write!(f, "struct"),
            Self::Union => write!(f, "union"),
        }
    }
}

/// The flavor of an enum declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnumKind {
    #[default]
    Plain,
    Class,
    Struct,
}

impl std::fmt::Display for EnumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "enum"),
            Self::Class => write!(f, "enum class"),
            Self::Struct => write!(f, "enum struct"),
        }
    }
}

/// The kind of a template parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateParamKind {
    #[default]
    TypeParam,
    NonType,
    TemplateTemplate,
}

/// A rendered type plus a link to its documented declaration, when one exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Type spelling, e.g. `const std::string &`.
    pub name: String,
    /// ID of the record, enum, or alias this type refers to; null when the
    /// referent is not in the index.
    pub id: SymbolId,
}

/// One function parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Default argument source text, empty when absent.
    pub default_value: String,
}

/// One template parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateParam {
    pub kind: TemplateParamKind,
    pub name: String,
    /// The written type for non-type parameters, or the captured source text
    /// of a template-template parameter list.
    #[serde(rename = "type")]
    pub ty: String,
    pub default_value: String,
    /// Whether a type parameter was declared with `typename` (vs `class`).
    pub is_typename: bool,
    pub is_parameter_pack: bool,
}

/// A member variable of a record, static or not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// In-class initializer source text, empty when absent.
    pub default_value: String,
    pub access: Access,
    pub is_static: bool,
    pub doc_comment: String,
}

/// One enumerator of an enum.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    pub doc_comment: String,
}

/// One direct base of a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseRecord {
    pub id: SymbolId,
    /// Access as written; `None` when the inheritance access was implicit.
    pub access: Access,
    pub name: String,
}

/// Fields shared by every documented symbol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub id: SymbolId,
    pub name: String,
    pub qualified_name: String,
    /// Declaring file, relative to the configured project root.
    pub decl_file: String,
    /// 1-based line of the declaration.
    pub decl_line: usize,
    /// ID of the nearest enclosing namespace, or of the enclosing record for
    /// members; null at translation-unit scope.
    pub parent_namespace_id: SymbolId,
    /// First paragraph of the doc comment.
    pub brief_comment: String,
    /// Remaining paragraphs of the doc comment.
    pub doc_comment: String,
    pub access: Access,
}

/// Accessor trait over the shared base fields, used by the generic passes.
pub trait SymbolLike {
    fn info(&self) -> &SymbolInfo;

    fn id(&self) -> SymbolId {
        self.info().id
    }

    fn parent_namespace_id(&self) -> SymbolId {
        self.info().parent_namespace_id
    }
}

/// A free function, member function, constructor, destructor, or operator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub info: SymbolInfo,
    /// Complete rendered signature.
    pub proto: String,
    /// Byte length of `proto`'s template prelude (0 for non-templates).
    pub post_template: usize,
    /// Byte offset of the function name within `proto`.
    pub name_start: usize,
    pub return_type: TypeRef,
    pub params: Vec<FunctionParam>,
    pub template_params: Vec<TemplateParam>,
    pub is_variadic: bool,
    pub is_virtual: bool,
    pub is_constexpr: bool,
    pub is_consteval: bool,
    pub is_inline: bool,
    pub is_nodiscard: bool,
    /// Only an unconditional written `noexcept` sets this; a computed
    /// `noexcept(expr)` is treated as not-noexcept.
    pub is_noexcept: bool,
    pub is_noreturn: bool,
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_restrict: bool,
    pub is_explicit: bool,
    pub is_ctor_or_dtor: bool,
    pub is_conversion_op: bool,
    pub is_record_member: bool,
    pub ref_qualifier: RefQualifier,
    pub storage_class: StorageClass,
    pub has_trailing_return: bool,
}

impl SymbolLike for FunctionSymbol {
    fn info(&self) -> &SymbolInfo {
        &self.info
    }
}

/// A class, struct, or union.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSymbol {
    pub info: SymbolInfo,
    pub kind: RecordKind,
    /// Forward-declaration-shaped signature, e.g. `template <typename T> class Foo`.
    /// The inheritance list is appended by a post-pass.
    pub proto: String,
    pub template_params: Vec<TemplateParam>,
    pub base_records: Vec<BaseRecord>,
    pub method_ids: Vec<SymbolId>,
    pub alias_ids: Vec<SymbolId>,
    pub vars: Vec<MemberVariable>,
}

impl SymbolLike for RecordSymbol {
    fn info(&self) -> &SymbolInfo {
        &self.info
    }
}

/// An enum, scoped or not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumSymbol {
    pub info: SymbolInfo,
    pub kind: EnumKind,
    pub members: Vec<EnumMember>,
}

impl SymbolLike for EnumSymbol {
    fn info(&self) -> &SymbolInfo {
        &self.info
    }
}

/// A named namespace. Child lists are filled by a post-pass once every
/// translation unit has drained; the authoritative relation is each child's
/// parent pointer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceSymbol {
    pub info: SymbolInfo,
    pub records: Vec<SymbolId>,
    pub enums: Vec<SymbolId>,
    pub namespaces: Vec<SymbolId>,
    pub usings: Vec<SymbolId>,
}

impl SymbolLike for NamespaceSymbol {
    fn info(&self) -> &SymbolInfo {
        &self.info
    }
}

/// A type alias or using-declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AliasSymbol {
    pub info: SymbolInfo,
    pub target: TypeRef,
    pub is_record_member: bool,
}

impl SymbolLike for AliasSymbol {
    fn info(&self) -> &SymbolInfo {
        &self.info
    }
}
