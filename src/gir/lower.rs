//! Lowers a parsed [`RawRepository`] into the crate's own [`Module`]/
//! [`Declaration`] shapes (§3). This is the one place that turns GIR's
//! "shape varies by XML tag" schema into the tagged [`DeclKind`] variant
//! §9 calls for.

use crate::error::GirError;
use crate::model::{
    AliasDecl, CallableSignature, ClassDecl, ConstantDecl, DeclKind, DeclMeta, Declaration,
    Direction, EnumMember, EnumerationDecl, Field, InterfaceDecl, Module, ModuleId, Parameter,
    Property, RecordDecl, Signal, TypeRef, TypeShape, UnionDecl,
};

use super::raw::{
    introspectable_default_true, nullable_flag, optional_flag, RawArray, RawCallable, RawClass,
    RawField, RawInterface, RawParameter, RawProperty, RawRecord, RawRepository, RawType,
    RawUnion,
};

const LIST_CONTAINERS: &[&str] = &["GLib.List", "GLib.SList", "GLib.PtrArray"];

const PRIMITIVE_NAMES: &[&str] = &[
    "utf8", "filename", "gboolean", "gint", "guint", "gint8", "guint8", "gint16", "guint16",
    "gint32", "guint32", "gint64", "guint64", "gfloat", "gdouble", "glong", "gulong", "gshort",
    "gushort", "gsize", "gssize", "none", "gpointer", "gconstpointer", "gunichar", "va_list",
];

fn is_primitive_name(name: &str) -> bool {
    PRIMITIVE_NAMES.contains(&name)
}

fn lower_type_node(ty: Option<&RawType>, array: Option<&RawArray>, callback: Option<&RawCallable>, nullable: bool) -> TypeRef {
    if let Some(cb) = callback {
        return TypeRef {
            shape: TypeShape::Callback(Box::new(lower_signature(cb))),
            nullable,
            c_type: None,
        };
    }

    if let Some(arr) = array {
        let length_param_index = arr.length.as_ref().and_then(|s| s.parse().ok());
        let element = if let Some(nested_array) = &arr.element_array {
            lower_type_node(None, Some(nested_array), None, false)
        } else if let Some(nested_ty) = &arr.element_type {
            lower_type_node(Some(nested_ty), None, None, false)
        } else {
            TypeRef { shape: TypeShape::Primitive("gpointer".into()), nullable: false, c_type: None }
        };
        return TypeRef {
            shape: TypeShape::Array { element: Box::new(element), length_param_index },
            nullable,
            c_type: arr.c_type.clone(),
        };
    }

    if let Some(t) = ty {
        let name = t.name.clone().unwrap_or_default();
        if LIST_CONTAINERS.contains(&name.as_str()) {
            if let Some(nested) = &t.nested {
                let element = lower_type_node(Some(nested), None, None, false);
                return TypeRef { shape: TypeShape::List(Box::new(element)), nullable, c_type: t.c_type.clone() };
            }
        }
        let shape = if name.is_empty() {
            TypeShape::Primitive("none".to_string())
        } else if is_primitive_name(&name) {
            TypeShape::Primitive(name)
        } else {
            TypeShape::Named(name)
        };
        return TypeRef { shape, nullable, c_type: t.c_type.clone() };
    }

    TypeRef { shape: TypeShape::Primitive("none".into()), nullable, c_type: Some("none".into()) }
}

fn lower_parameter(idx: usize, raw: &RawParameter) -> Parameter {
    let direction = match raw.direction.as_deref() {
        Some("out") => Direction::Out,
        Some("inout") | Some("in-out") => Direction::InOut,
        _ => Direction::In,
    };
    let nullable = nullable_flag(&raw.nullable, &raw.allow_none);
    let ty = lower_type_node(raw.ty.as_ref(), raw.array.as_ref(), raw.callback.as_deref(), nullable);
    Parameter {
        name: raw.name.clone().unwrap_or_else(|| format!("arg{idx}")),
        direction,
        nullable,
        optional: optional_flag(&raw.optional),
        closure_index: raw.closure.as_ref().and_then(|s| s.parse().ok()),
        destroy_index: raw.destroy.as_ref().and_then(|s| s.parse().ok()),
        length_index: raw.array.as_ref().and_then(|a| a.length.as_ref()).and_then(|s| s.parse().ok()),
        ty,
    }
}

fn lower_signature(raw: &RawCallable) -> CallableSignature {
    let parameters = raw
        .parameters
        .as_ref()
        .map(|p| p.parameters.iter().enumerate().map(|(i, param)| lower_parameter(i, param)).collect())
        .unwrap_or_default();

    let return_type = raw
        .return_value
        .as_ref()
        .map(|rv| {
            let nullable = nullable_flag(&rv.nullable, &rv.allow_none);
            lower_type_node(rv.ty.as_ref(), rv.array.as_ref(), rv.callback.as_deref(), nullable)
        })
        .unwrap_or(TypeRef { shape: TypeShape::Primitive("none".into()), nullable: false, c_type: Some("none".into()) });

    let out_array_length_index = raw
        .return_value
        .as_ref()
        .and_then(|rv| rv.array.as_ref())
        .and_then(|a| a.length.as_ref())
        .and_then(|s| s.parse().ok());

    CallableSignature {
        name: raw.name.clone(),
        parameters,
        return_type,
        out_array_length_index,
        shadows: raw.shadows.clone(),
        shadowed_by: raw.shadowed_by.clone(),
        is_static: false,
    }
}

fn lower_field(raw: &RawField) -> Field {
    Field {
        name: raw.name.clone(),
        ty: lower_type_node(raw.ty.as_ref(), raw.array.as_ref(), None, false),
        private: raw.private.as_deref() == Some("1"),
    }
}

/// §9's judgment call on GIR's own schema default: `writable` and
/// `construct-only` both default to false when absent (a plain `<property>`
/// with no attributes is read-only), matching the real GIR DTD rather than
/// assuming the more permissive "writable unless said otherwise".
fn lower_property(raw: &RawProperty) -> Property {
    Property {
        name: raw.name.clone(),
        ty: lower_type_node(raw.ty.as_ref(), raw.array.as_ref(), None, false),
        writable: raw.writable.as_deref() == Some("1"),
        construct_only: raw.construct_only.as_deref() == Some("1"),
        private: raw.private.as_deref() == Some("1"),
    }
}

fn introspectable(raw: &Option<String>) -> bool {
    introspectable_default_true(raw)
}

struct Lowerer<'a> {
    namespace: &'a str,
    module_id: ModuleId,
    out: Vec<Declaration>,
}

impl<'a> Lowerer<'a> {
    fn meta(&self, local_name: &str, introspectable: bool) -> DeclMeta {
        DeclMeta {
            owning_module: self.module_id,
            qualified_name: format!("{}.{local_name}", self.namespace),
            introspectable,
        }
    }

    fn push(&mut self, local_name: &str, introspectable_flag: bool, kind: DeclKind) {
        self.out.push(Declaration { meta: self.meta(local_name, introspectable_flag), kind });
    }
}

fn lower_class(raw: &RawClass) -> ClassDecl {
    ClassDecl {
        name: raw.name.clone(),
        qualified_name: String::new(), // filled by caller once namespace is known
        parent: raw.parent.clone(),
        implements: raw.implements.iter().map(|i| i.name.clone()).collect(),
        fields: raw.fields.iter().filter(|f| introspectable(&f.introspectable)).map(lower_field).collect(),
        properties: raw.properties.iter().filter(|p| introspectable(&p.introspectable)).map(lower_property).collect(),
        methods: raw.methods.iter().filter(|m| introspectable(&m.introspectable)).map(lower_signature).collect(),
        virtual_methods: raw.virtual_methods.iter().map(lower_signature).collect(),
        signals: raw.signals.iter().map(|s| Signal { name: s.name.clone(), signature: lower_signature(s) }).collect(),
        constructors: raw.constructors.iter().filter(|c| introspectable(&c.introspectable)).map(lower_signature).collect(),
        static_functions: raw.static_functions.iter().filter(|f| introspectable(&f.introspectable)).map(lower_signature).collect(),
        is_abstract: raw.is_abstract.as_deref() == Some("1"),
    }
}

fn lower_interface(raw: &RawInterface) -> InterfaceDecl {
    InterfaceDecl {
        name: raw.name.clone(),
        qualified_name: String::new(),
        prerequisite: raw.prerequisite.first().map(|p| p.name.clone()),
        properties: raw.properties.iter().filter(|p| introspectable(&p.introspectable)).map(lower_property).collect(),
        methods: raw.methods.iter().filter(|m| introspectable(&m.introspectable)).map(lower_signature).collect(),
        virtual_methods: raw.virtual_methods.iter().map(lower_signature).collect(),
        signals: raw.signals.iter().map(|s| Signal { name: s.name.clone(), signature: lower_signature(s) }).collect(),
    }
}

fn lower_record(raw: &RawRecord) -> RecordDecl {
    RecordDecl {
        name: raw.name.clone(),
        fields: raw.fields.iter().filter(|f| introspectable(&f.introspectable)).map(lower_field).collect(),
        methods: raw.methods.iter().filter(|m| introspectable(&m.introspectable)).map(lower_signature).collect(),
        is_gtype_struct_for: raw.is_gtype_struct_for.clone(),
    }
}

fn lower_union(raw: &RawUnion) -> UnionDecl {
    UnionDecl {
        name: raw.name.clone(),
        fields: raw.fields.iter().filter(|f| introspectable(&f.introspectable)).map(lower_field).collect(),
        methods: raw.methods.iter().filter(|m| introspectable(&m.introspectable)).map(lower_signature).collect(),
    }
}

/// Lowers one parsed repository document into a [`Module`], assigning it
/// `id`. Fails with [`GirError::MissingNamespace`] when the document has no
/// `<namespace>` element (§7's one fatal kind).
pub fn lower_repository(raw: RawRepository, id: ModuleId, path: &std::path::Path) -> Result<Module, GirError> {
    let ns = raw.namespace.ok_or_else(|| GirError::MissingNamespace { path: path.to_path_buf() })?;

    let mut lowerer = Lowerer { namespace: &ns.name, module_id: id, out: Vec::new() };

    for e in &ns.enumerations {
        let members = e.members.iter().map(|m| EnumMember {
            name: m.name.clone(),
            value: m.value.clone().unwrap_or_default(),
            glib_nick: m.glib_nick.clone(),
            c_identifier: m.c_identifier.clone(),
        }).collect();
        lowerer.push(&e.name, introspectable(&e.introspectable), DeclKind::Enumeration(EnumerationDecl { name: e.name.clone(), members }));
    }
    for b in &ns.bitfields {
        let members = b.members.iter().map(|m| EnumMember {
            name: m.name.clone(),
            value: m.value.clone().unwrap_or_default(),
            glib_nick: m.glib_nick.clone(),
            c_identifier: m.c_identifier.clone(),
        }).collect();
        lowerer.push(&b.name, introspectable(&b.introspectable), DeclKind::Bitfield(EnumerationDecl { name: b.name.clone(), members }));
    }
    for c in &ns.constants {
        lowerer.push(
            &c.name,
            introspectable(&c.introspectable),
            DeclKind::Constant(ConstantDecl {
                name: c.name.clone(),
                value_type: lower_type_node(c.ty.as_ref(), c.array.as_ref(), None, false),
                value: c.value.clone().unwrap_or_default(),
            }),
        );
    }
    for a in &ns.aliases {
        lowerer.push(
            &a.name,
            introspectable(&a.introspectable),
            DeclKind::Alias(AliasDecl { name: a.name.clone(), target: lower_type_node(a.ty.as_ref(), None, None, false) }),
        );
    }
    for cb in &ns.callbacks {
        lowerer.push(&cb.name, introspectable(&cb.introspectable), DeclKind::Callback(crate::model::CallbackDecl { name: cb.name.clone(), signature: lower_signature(cb) }));
    }
    for f in &ns.functions {
        lowerer.push(&f.name, introspectable(&f.introspectable), DeclKind::Function(crate::model::FunctionDecl { signature: lower_signature(f) }));
    }
    for c in &ns.classes {
        let mut class = lower_class(c);
        class.qualified_name = format!("{}.{}", ns.name, c.name);
        lowerer.push(&c.name, introspectable(&c.introspectable), DeclKind::Class(class));
    }
    for i in &ns.interfaces {
        let mut iface = lower_interface(i);
        iface.qualified_name = format!("{}.{}", ns.name, i.name);
        lowerer.push(&i.name, introspectable(&i.introspectable), DeclKind::Interface(iface));
    }
    for r in &ns.records {
        lowerer.push(&r.name, introspectable(&r.introspectable), DeclKind::Record(lower_record(r)));
    }
    for u in &ns.unions {
        lowerer.push(&u.name, introspectable(&u.introspectable), DeclKind::Union(lower_union(u)));
    }

    Ok(Module {
        id,
        namespace: ns.name.clone(),
        version: ns.version.clone(),
        direct_dependencies: Vec::new(),
        transitive_dependencies: Vec::new(),
        declarations: lowerer.out,
        raw_includes: raw.includes.into_iter().map(|i| (i.name, i.version)).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gir::raw::{RawEnumeration, RawMember, RawNamespace};

    #[test]
    fn missing_namespace_is_fatal() {
        let raw = RawRepository { includes: vec![], namespace: None };
        let err = lower_repository(raw, ModuleId(0), std::path::Path::new("x.gir")).unwrap_err();
        assert!(matches!(err, GirError::MissingNamespace { .. }));
    }

    #[test]
    fn enumeration_members_lower_with_qualified_name() {
        let raw = RawRepository {
            includes: vec![],
            namespace: Some(RawNamespace {
                name: "Gtk".into(),
                version: "4.0".into(),
                enumerations: vec![RawEnumeration {
                    name: "Orientation".into(),
                    introspectable: None,
                    members: vec![RawMember { name: "horizontal".into(), value: Some("0".into()), glib_nick: None, c_identifier: None }],
                }],
                ..Default::default()
            }),
        };
        let module = lower_repository(raw, ModuleId(0), std::path::Path::new("gtk.gir")).unwrap();
        assert_eq!(module.declarations.len(), 1);
        assert_eq!(module.declarations[0].meta.qualified_name, "Gtk.Orientation");
        match &module.declarations[0].kind {
            DeclKind::Enumeration(e) => assert_eq!(e.members[0].name, "horizontal"),
            _ => panic!("expected enumeration"),
        }
    }

    #[test]
    fn introspectable_zero_is_excluded() {
        let raw = RawRepository {
            includes: vec![],
            namespace: Some(RawNamespace {
                name: "Gtk".into(),
                version: "4.0".into(),
                enumerations: vec![RawEnumeration { name: "Hidden".into(), introspectable: Some("0".into()), members: vec![] }],
                ..Default::default()
            }),
        };
        let module = lower_repository(raw, ModuleId(0), std::path::Path::new("gtk.gir")).unwrap();
        assert!(!module.declarations[0].meta.introspectable);
    }
}
