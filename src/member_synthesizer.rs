//! C5: synthesizes one class's member fragments (§4.5). A single pass walks
//! a declaration's children once and buckets the results into the ordered
//! fragment groups a class view needs.

use std::collections::HashSet;

use crate::diagnostics::DiagnosticCollection;
use crate::inheritance_index::InheritanceIndex;
use crate::model::{CallableSignature, ClassDecl, DeclKind, Declaration, Parameter, Property};
use crate::name_transform;
use crate::symbol_table::SymbolTable;
use crate::type_resolver;

/// Qualified name of the namespace root that every GObject-derived class
/// ultimately descends from.
pub const ROOT_OBJECT_CLASS: &str = "GObject.Object";

/// Ordered fragment buckets for one class view (§4.5's sequencing).
#[derive(Debug, Default)]
pub struct ClassView {
    pub construct_props: Vec<String>,
    pub fields: Vec<String>,
    pub properties: Vec<String>,
    pub methods: Vec<String>,
    pub virtual_methods: Vec<String>,
    pub signals: Vec<String>,
    pub signal_helpers: Vec<String>,
    pub constructors: Vec<String>,
    pub statics: Vec<String>,
}

/// Names already claimed while synthesizing one view; owned exclusively by
/// the invocation that created it and discarded at the end (§5).
#[derive(Default)]
pub struct LocalNameSet(HashSet<String>);

impl LocalNameSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, name: &str) -> bool {
        self.0.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

/// Shared by [`crate::overload_reconciler`], which renders the same
/// inherited-declaration fragments this module renders for direct members.
pub(crate) struct Ctx<'a> {
    pub(crate) owning_namespace: &'a str,
    pub(crate) symbols: &'a SymbolTable,
    pub(crate) diagnostics: &'a mut DiagnosticCollection,
    pub(crate) module_package: &'a str,
}

fn resolve_ty(ctx: &mut Ctx, ty: &crate::model::TypeRef, out: bool) -> String {
    type_resolver::resolve(ty, out, ctx.owning_namespace, ctx.symbols, ctx.diagnostics, ctx.module_package)
}

/// Computes each parameter's optionality and renders the parameter list,
/// applying §4.5's out-parameter/return packing rule.
pub(crate) fn render_parameters(ctx: &mut Ctx, params: &[Parameter]) -> Vec<String> {
    let mut rendered = Vec::with_capacity(params.len());
    for (idx, p) in params.iter().enumerate() {
        if p.direction == crate::model::Direction::Out {
            continue;
        }
        let has_later_required = params[idx + 1..]
            .iter()
            .any(|later| later.direction != crate::model::Direction::Out && !later.nullable);
        let optional = p.nullable && !has_later_required;
        let ty = resolve_ty(ctx, &p.ty, false);
        let name = name_transform::parameter_name(&p.name);
        rendered.push(format!("{name}{}: {ty}", if optional { "?" } else { "" }));
    }
    rendered
}

/// Packs the declared return type with any out-parameters per §4.5: a
/// single out with a void return is promoted to the return position;
/// otherwise all outs are packed into a positional tuple led by the return.
fn render_return(ctx: &mut Ctx, sig: &CallableSignature) -> String {
    let is_void = matches!(&sig.return_type.shape, crate::model::TypeShape::Primitive(p) if p == "none");
    let outs: Vec<&Parameter> = sig
        .parameters
        .iter()
        .filter(|p| p.direction == crate::model::Direction::Out)
        .collect();

    if outs.is_empty() {
        return resolve_ty(ctx, &sig.return_type, true);
    }

    if is_void && outs.len() == 1 {
        return resolve_ty(ctx, &outs[0].ty, true);
    }

    let mut parts = Vec::new();
    if !is_void {
        parts.push(resolve_ty(ctx, &sig.return_type, true));
    }
    for out in outs {
        parts.push(resolve_ty(ctx, &out.ty, true));
    }
    format!("[{}]", parts.join(", "))
}

pub(crate) fn render_signature(ctx: &mut Ctx, name: &str, sig: &CallableSignature) -> String {
    let params = render_parameters(ctx, &sig.parameters).join(", ");
    let ret = render_return(ctx, sig);
    format!("{name}({params}): {ret};")
}

/// Resolves the emitted name for a method, applying the `shadows` override
/// (§4.5: "`shadows` overrides the emitted name").
pub(crate) fn emitted_method_name(sig: &CallableSignature) -> String {
    name_transform::function_name(sig.shadows.as_deref().unwrap_or(&sig.name))
}

fn synthesize_construct_props(ctx: &mut Ctx, properties: &[Property]) -> Vec<String> {
    properties
        .iter()
        .filter(|p| p.construct_only)
        .map(|p| {
            let ty = resolve_ty(ctx, &p.ty, false);
            format!("{}: {ty};", name_transform::property_name(&p.name, true))
        })
        .collect()
}

fn synthesize_fields(ctx: &mut Ctx, class: &ClassDecl, names: &mut LocalNameSet) -> Vec<String> {
    let mut out = Vec::new();
    for field in &class.fields {
        let name = name_transform::field_name(&field.name);
        if names.contains(&name) {
            continue;
        }
        names.claim(&name);
        let ty = resolve_ty(ctx, &field.ty, false);
        out.push(format!("{name}: {ty};"));
    }
    out
}

fn synthesize_properties(ctx: &mut Ctx, class: &ClassDecl, names: &mut LocalNameSet) -> Vec<String> {
    let mut out = Vec::new();
    for prop in &class.properties {
        if prop.construct_only {
            continue;
        }
        let name = name_transform::property_name(&prop.name, false);
        names.claim(&name);
        let ty = resolve_ty(ctx, &prop.ty, false);
        let readonly = if prop.writable { "" } else { "readonly " };
        out.push(format!("{readonly}{name}: {ty};"));
    }
    out
}

fn record_inherited_properties(
    owner: &str,
    symbols: &SymbolTable,
    seen: &mut HashSet<String>,
    out: &mut Vec<(String, Property)>,
) {
    let decl = match symbols.lookup(owner) {
        Some(d) => d,
        None => return,
    };
    let props: &[Property] = match &decl.kind {
        DeclKind::Class(c) => &c.properties,
        DeclKind::Interface(i) => &i.properties,
        _ => return,
    };
    for p in props {
        if p.private || p.construct_only {
            continue;
        }
        if seen.insert(p.name.clone()) {
            out.push((owner.to_string(), p.clone()));
        }
    }
}

/// Walks the inheritance closure (ancestors, then implemented interfaces and
/// their prerequisites) collecting every non-private, non-construct-only
/// property reachable, deduped by identifier — the first encounter (closest
/// ancestor, walked before interfaces) wins. Grounds §8's testable
/// invariant: every class view carries exactly one property declaration per
/// distinct ancestor/interface property name.
fn collect_inherited_properties(
    class: &ClassDecl,
    symbols: &SymbolTable,
    inheritance: &InheritanceIndex,
    diagnostics: &mut DiagnosticCollection,
    module_package: &str,
) -> Vec<(String, Property)> {
    let mut seen: HashSet<String> = class.properties.iter().map(|p| p.name.clone()).collect();
    let mut out = Vec::new();

    inheritance.closure_walk(&class.qualified_name, diagnostics, module_package, |ancestor| {
        record_inherited_properties(ancestor, symbols, &mut seen, &mut out);
    });
    inheritance.for_each_interface(&class.qualified_name, symbols, true, |iface| {
        record_inherited_properties(iface, symbols, &mut seen, &mut out);
    });

    out
}

/// Renders the fragments [`collect_inherited_properties`] found, skipping
/// any name a direct field or property already claimed in `names`.
fn synthesize_inherited_properties(ctx: &mut Ctx, inherited: &[(String, Property)], names: &mut LocalNameSet) -> Vec<String> {
    let mut out = Vec::new();
    for (owner, prop) in inherited {
        let name = name_transform::property_name(&prop.name, false);
        if !names.claim(&name) {
            continue;
        }
        let ty = resolve_ty(ctx, &prop.ty, false);
        let readonly = if prop.writable { "" } else { "readonly " };
        out.push(format!("{readonly}{name}: {ty}; // inherited from {owner}"));
    }
    out
}

fn synthesize_methods(ctx: &mut Ctx, class: &ClassDecl, names: &mut LocalNameSet) -> Vec<String> {
    let mut out = Vec::new();
    for method in &class.methods {
        if method.shadowed_by.is_some() {
            continue;
        }
        let name = emitted_method_name(method);
        names.claim(&name);
        out.push(render_signature(ctx, &name, method));
    }
    out
}

fn synthesize_virtual_methods(ctx: &mut Ctx, class: &ClassDecl, names: &mut LocalNameSet) -> Vec<String> {
    class
        .virtual_methods
        .iter()
        .map(|vm| {
            let name = format!("vfunc_{}", name_transform::function_name(&vm.name));
            names.claim(&name);
            render_signature(ctx, &name, vm)
        })
        .collect()
}

fn synthesize_signals(ctx: &mut Ctx, class: &ClassDecl) -> Vec<String> {
    class
        .signals
        .iter()
        .map(|s| {
            let name = name_transform::signal_name(&s.name);
            render_signature(ctx, &name, &s.signature)
        })
        .collect()
}

/// §4.5's root-object helpers: `connect("notify::<prop>", …)` per property,
/// plus the general signal-helper quartet.
fn synthesize_signal_helpers(class: &ClassDecl, is_root_derived: bool) -> Vec<String> {
    if !is_root_derived {
        return Vec::new();
    }
    let mut out = Vec::new();
    for prop in &class.properties {
        let prop_name = name_transform::property_name(&prop.name, false);
        out.push(format!(
            "connect(sigName: \"notify::{prop_name}\", callback: (...args: any[]) => void): number;"
        ));
    }
    out.push("connect(sigName: string, callback: (...args: any[]) => void): number;".to_string());
    out.push("connect_after(sigName: string, callback: (...args: any[]) => void): number;".to_string());
    out.push("emit(sigName: string, ...args: any[]): void;".to_string());
    out.push("disconnect(id: number): void;".to_string());
    out
}

/// Static constructors (§4.5). `new` additionally gets a colon-prefixed
/// arrow-style signature for the static carrier.
fn synthesize_constructors(ctx: &mut Ctx, class: &ClassDecl) -> Vec<String> {
    let mut out = Vec::new();
    for ctor in &class.constructors {
        let params = render_parameters(ctx, &ctor.parameters).join(", ");
        out.push(format!("static {}({params}): {};", name_transform::function_name(&ctor.name), class.name));
        if ctor.name == "new" {
            out.push(format!("new({params}): {};", class.name));
        }
    }
    out
}

/// Class methods promoted from the `glib:is-gtype-struct-for` record, when
/// one exists in the same module (§4.5).
fn synthesize_gtype_struct_statics(ctx: &mut Ctx, class_qualified_name: &str, class_module: crate::model::ModuleId, symbols: &SymbolTable) -> Vec<String> {
    let mut out = Vec::new();
    for (_, decl) in symbols.iter() {
        if decl.meta.owning_module != class_module {
            continue;
        }
        if let DeclKind::Record(record) = &decl.kind {
            if record.is_gtype_struct_for.as_deref() == Some(class_qualified_name) {
                for method in &record.methods {
                    let name = emitted_method_name(method);
                    out.push(format!("static {}", render_signature(ctx, &name, method)));
                }
            }
        }
    }
    out
}

/// Synthesizes the full ordered fragment set for one class declaration.
/// `decl` must be a `DeclKind::Class`; any other kind is a caller error.
pub fn synthesize_class(
    decl: &Declaration,
    symbols: &SymbolTable,
    inheritance: &InheritanceIndex,
    diagnostics: &mut DiagnosticCollection,
    module_package: &str,
) -> ClassView {
    let class = match &decl.kind {
        DeclKind::Class(c) => c,
        _ => return ClassView::default(),
    };

    let owning_namespace = decl
        .meta
        .qualified_name
        .rsplit_once('.')
        .map(|(ns, _)| ns)
        .unwrap_or(&decl.meta.qualified_name)
        .to_string();

    let mut names = LocalNameSet::new();
    let mut is_root_derived = class.qualified_name == ROOT_OBJECT_CLASS;
    if !is_root_derived {
        inheritance.closure_walk(&class.qualified_name, diagnostics, module_package, |ancestor| {
            if ancestor == ROOT_OBJECT_CLASS {
                is_root_derived = true;
            }
        });
    }

    let inherited_properties = collect_inherited_properties(class, symbols, inheritance, diagnostics, module_package);

    let mut ctx = Ctx {
        owning_namespace: &owning_namespace,
        symbols,
        diagnostics,
        module_package,
    };

    let mut properties = synthesize_properties(&mut ctx, class, &mut names);
    properties.extend(synthesize_inherited_properties(&mut ctx, &inherited_properties, &mut names));

    let mut view = ClassView {
        construct_props: synthesize_construct_props(&mut ctx, &class.properties),
        fields: synthesize_fields(&mut ctx, class, &mut names),
        properties,
        methods: synthesize_methods(&mut ctx, class, &mut names),
        virtual_methods: synthesize_virtual_methods(&mut ctx, class, &mut names),
        signals: synthesize_signals(&mut ctx, class),
        signal_helpers: synthesize_signal_helpers(class, is_root_derived),
        constructors: synthesize_constructors(&mut ctx, class),
        statics: Vec::new(),
    };

    view.statics = synthesize_gtype_struct_statics(&mut ctx, &class.qualified_name, decl.meta.owning_module, symbols);

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeclMeta, Direction, ModuleId, TypeRef, TypeShape};

    fn ty(name: &str) -> TypeRef {
        TypeRef { shape: TypeShape::Primitive(name.to_string()), nullable: false, c_type: Some(name.to_string()) }
    }

    fn class_decl(qualified_name: &str, properties: Vec<Property>) -> Declaration {
        Declaration {
            meta: DeclMeta { owning_module: ModuleId(0), qualified_name: qualified_name.to_string(), introspectable: true },
            kind: DeclKind::Class(ClassDecl {
                name: qualified_name.rsplit_once('.').map(|(_, n)| n.to_string()).unwrap_or_default(),
                qualified_name: qualified_name.to_string(),
                parent: None,
                implements: vec![],
                fields: vec![],
                properties,
                methods: vec![],
                virtual_methods: vec![],
                signals: vec![],
                constructors: vec![],
                static_functions: vec![],
                is_abstract: false,
            }),
        }
    }

    #[test]
    fn construct_only_property_goes_to_carrier_not_ordinary_set() {
        let decl = class_decl(
            "Gtk.Widget",
            vec![Property { name: "name".into(), ty: ty("utf8"), writable: true, construct_only: true, private: false }],
        );
        let symbols = SymbolTable::new();
        let inheritance = InheritanceIndex::new();
        let mut diags = DiagnosticCollection::new();
        let view = synthesize_class(&decl, &symbols, &inheritance, &mut diags, "Gtk-4.0");
        assert_eq!(view.construct_props.len(), 1);
        assert!(view.properties.is_empty());
    }

    #[test]
    fn root_object_class_has_no_signal_helpers_unless_derived() {
        let decl = class_decl("Gtk.Widget", vec![]);
        let symbols = SymbolTable::new();
        let inheritance = InheritanceIndex::new();
        let mut diags = DiagnosticCollection::new();
        let view = synthesize_class(&decl, &symbols, &inheritance, &mut diags, "Gtk-4.0");
        assert!(view.signal_helpers.is_empty());
    }

    #[test]
    fn optional_parameter_computed_from_trailing_required() {
        let symbols = SymbolTable::new();
        let mut diags = DiagnosticCollection::new();
        let mut ctx = Ctx {
            owning_namespace: "Gtk",
            symbols: &symbols,
            diagnostics: &mut diags,
            module_package: "Gtk-4.0",
        };
        let params = vec![
            Parameter { name: "a".into(), direction: Direction::In, nullable: true, optional: false, closure_index: None, destroy_index: None, length_index: None, ty: ty("utf8") },
            Parameter { name: "b".into(), direction: Direction::In, nullable: false, optional: false, closure_index: None, destroy_index: None, length_index: None, ty: ty("gint32") },
        ];
        let rendered = render_parameters(&mut ctx, &params);
        assert_eq!(rendered[0], "a: string");
        assert_eq!(rendered[1], "b: number");
    }

    #[test]
    fn trailing_nullable_parameter_is_optional() {
        let symbols = SymbolTable::new();
        let mut diags = DiagnosticCollection::new();
        let mut ctx = Ctx {
            owning_namespace: "Gtk",
            symbols: &symbols,
            diagnostics: &mut diags,
            module_package: "Gtk-4.0",
        };
        let params = vec![
            Parameter { name: "a".into(), direction: Direction::In, nullable: false, optional: false, closure_index: None, destroy_index: None, length_index: None, ty: ty("gint32") },
            Parameter { name: "b".into(), direction: Direction::In, nullable: true, optional: false, closure_index: None, destroy_index: None, length_index: None, ty: ty("utf8") },
        ];
        let rendered = render_parameters(&mut ctx, &params);
        assert_eq!(rendered[1], "b?: string");
    }
}
