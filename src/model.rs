//! The data model shared by every stage of the translator: parsed GIR
//! documents are lowered into these types once, in `gir::parse`, and every
//! downstream component (symbol table, inheritance index, type resolver,
//! member synthesizer, overload reconciler, namespace emitter) reads them
//! without mutation.

use std::collections::HashMap;

/// Index of a [`Module`] within the run's module arena. Declarations and
/// the symbol table refer to modules by id rather than by owning a copy,
/// per §9's "side table keyed by stable node identity" design note.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ModuleId(pub u32);

/// One parsed GIR document: a namespace plus its direct and transitive
/// dependencies on other modules.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: ModuleId,
    pub namespace: String,
    pub version: String,
    /// Namespaces this module's `<include>` elements name directly, in
    /// document order.
    pub direct_dependencies: Vec<ModuleId>,
    /// Transitive closure of `direct_dependencies`, computed once after all
    /// modules are loaded.
    pub transitive_dependencies: Vec<ModuleId>,
    pub declarations: Vec<Declaration>,
    /// `(namespace, version)` pairs copied verbatim from this module's
    /// `<include>` elements, before `gir::loader` has resolved them to
    /// [`ModuleId`]s. Loader-only bookkeeping; empty once `direct_dependencies`
    /// has been populated for a module built outside the loader (as in tests).
    pub raw_includes: Vec<(String, String)>,
}

impl Module {
    pub fn package_name(&self) -> String {
        format!("{}-{}", self.namespace, self.version)
    }

    pub fn qualify(&self, local_name: &str) -> String {
        format!("{}.{}", self.namespace, local_name)
    }
}

/// Back-reference attached to every declaration at SymbolTable insertion
/// time: its owning module and its fully-qualified name. Stamped once and
/// never mutated afterward (§3 "Declarations are never mutated after
/// population").
#[derive(Debug, Clone)]
pub struct DeclMeta {
    pub owning_module: ModuleId,
    pub qualified_name: String,
    pub introspectable: bool,
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub meta: DeclMeta,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn name(&self) -> &str {
        self.kind.local_name()
    }
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Enumeration(EnumerationDecl),
    Bitfield(EnumerationDecl),
    Constant(ConstantDecl),
    Alias(AliasDecl),
    Callback(CallbackDecl),
    Function(FunctionDecl),
    Record(RecordDecl),
    Union(UnionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
}

impl DeclKind {
    pub fn local_name(&self) -> &str {
        match self {
            DeclKind::Enumeration(d) | DeclKind::Bitfield(d) => &d.name,
            DeclKind::Constant(d) => &d.name,
            DeclKind::Alias(d) => &d.name,
            DeclKind::Callback(d) => &d.name,
            DeclKind::Function(d) => &d.signature.name,
            DeclKind::Record(d) => &d.name,
            DeclKind::Union(d) => &d.name,
            DeclKind::Class(d) => &d.name,
            DeclKind::Interface(d) => &d.name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub value: String,
    pub glib_nick: Option<String>,
    pub c_identifier: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnumerationDecl {
    pub name: String,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone)]
pub struct ConstantDecl {
    pub name: String,
    pub value_type: TypeRef,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct AliasDecl {
    pub name: String,
    pub target: TypeRef,
}

#[derive(Debug, Clone)]
pub struct CallbackDecl {
    pub name: String,
    pub signature: CallableSignature,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub signature: CallableSignature,
}

#[derive(Debug, Clone)]
pub struct RecordDecl {
    pub name: String,
    pub fields: Vec<Field>,
    pub methods: Vec<CallableSignature>,
    /// The qualified name of the class this record holds static methods
    /// for, from `glib:is-gtype-struct-for`.
    pub is_gtype_struct_for: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UnionDecl {
    pub name: String,
    pub fields: Vec<Field>,
    pub methods: Vec<CallableSignature>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub private: bool,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub ty: TypeRef,
    pub writable: bool,
    pub construct_only: bool,
    pub private: bool,
}

#[derive(Debug, Clone)]
pub struct Signal {
    pub name: String,
    pub signature: CallableSignature,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub qualified_name: String,
    pub parent: Option<String>,
    pub implements: Vec<String>,
    pub fields: Vec<Field>,
    pub properties: Vec<Property>,
    pub methods: Vec<CallableSignature>,
    pub virtual_methods: Vec<CallableSignature>,
    pub signals: Vec<Signal>,
    pub constructors: Vec<CallableSignature>,
    pub static_functions: Vec<CallableSignature>,
    pub is_abstract: bool,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub qualified_name: String,
    pub prerequisite: Option<String>,
    pub properties: Vec<Property>,
    pub methods: Vec<CallableSignature>,
    pub virtual_methods: Vec<CallableSignature>,
    pub signals: Vec<Signal>,
}

/// Direction of a parameter, per GIR's `direction` attribute.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Direction {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub direction: Direction,
    pub nullable: bool,
    pub optional: bool,
    pub closure_index: Option<usize>,
    pub destroy_index: Option<usize>,
    pub length_index: Option<usize>,
    pub ty: TypeRef,
}

#[derive(Debug, Clone)]
pub struct CallableSignature {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeRef,
    pub out_array_length_index: Option<usize>,
    pub shadows: Option<String>,
    pub shadowed_by: Option<String>,
    pub is_static: bool,
}

/// A lowered GIR type reference. Array/list wrapping and nullability are
/// represented uniformly: `nullable` lives on the outermost `TypeRef` only,
/// mirroring how §4.2's suffix computation treats nullability as a single
/// trailing annotation rather than something every nested shape needs to
/// track independently.
#[derive(Debug, Clone)]
pub struct TypeRef {
    pub shape: TypeShape,
    pub nullable: bool,
    /// The raw GIR `c:type` string, when present, used by TypeResolver
    /// step 2 (the C-type map lookup).
    pub c_type: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TypeShape {
    Primitive(String),
    /// A named type reference, already or not-yet namespace-qualified.
    Named(String),
    Callback(Box<CallableSignature>),
    Array {
        element: Box<TypeRef>,
        length_param_index: Option<usize>,
    },
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn is_array_like(&self) -> bool {
        matches!(self.shape, TypeShape::Array { .. } | TypeShape::List(_))
    }
}

/// Per-Module set that prevents the same constant symbol from being
/// re-exported twice (§3's ConstantNameSet).
#[derive(Default, Debug)]
pub struct ConstantNameSet(pub HashMap<ModuleId, std::collections::HashSet<String>>);

impl ConstantNameSet {
    pub fn try_claim(&mut self, module: ModuleId, name: &str) -> bool {
        self.0.entry(module).or_default().insert(name.to_string())
    }
}
