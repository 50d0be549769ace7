//! C7: orchestrates C3-C6 over a whole namespace (§4.7). Drives a fixed
//! pass sequence over one module's declarations in the fixed declaration-kind
//! order §4.7 specifies, collecting the result into one file's text.

use std::collections::HashSet;

use crate::config::{BuildType, GeneratorConfig};
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollection};
use crate::inheritance_index::InheritanceIndex;
use crate::member_synthesizer::{self, Ctx, ROOT_OBJECT_CLASS};
use crate::model::{
    CallableSignature, ConstantNameSet, DeclKind, Declaration, Module, ModuleId, TypeRef, TypeShape,
};
use crate::name_transform;
use crate::overload_reconciler;
use crate::symbol_table::SymbolTable;
use crate::template::{self, Bindings};
use crate::type_resolver;

/// Namespace the root object class lives in; every non-self module gets an
/// always-on dependency on it (§4.7).
const ROOT_OBJECT_MODULE: &str = "GObject";

/// Output of emitting one module: the declaration file text and the
/// runtime-stub text (§6's "per module one target-surface declaration
/// file, plus one runtime stub file").
pub struct EmittedModule {
    pub declarations: String,
    pub runtime_stub: String,
}

fn strip_local_prefix(qualified: &str, namespace: &str) -> String {
    let prefix = format!("{namespace}.");
    qualified.strip_prefix(&prefix).unwrap_or(qualified).to_string()
}

fn module_ctx<'a>(
    namespace: &'a str,
    symbols: &'a SymbolTable,
    diagnostics: &'a mut DiagnosticCollection,
    module_package: &'a str,
) -> Ctx<'a> {
    Ctx { owning_namespace: namespace, symbols, diagnostics, module_package }
}

fn emit_enumeration(e: &crate::model::EnumerationDecl, is_bitfield: bool) -> String {
    let mut out = String::new();
    let keyword = if is_bitfield { "bitfield" } else { "enum" };
    out.push_str(&format!("export enum {} {{\n", e.name));
    for member in &e.members {
        match name_transform::enum_value(&member.name) {
            name_transform::EnumValueName::Valid(name) => {
                out.push_str(&format!("    {name}, // {keyword} value {}\n", member.value));
            }
            name_transform::EnumValueName::NumericLeading { original, .. } => {
                out.push_str(&format!("    // '{original}' is invalid, starts with a number\n"));
            }
        }
    }
    out.push_str("}\n");
    out
}

fn emit_constant(
    c: &crate::model::ConstantDecl,
    ctx: &mut Ctx,
    names: &mut ConstantNameSet,
    module_id: ModuleId,
) -> Option<String> {
    if !names.try_claim(module_id, &c.name) {
        ctx.diagnostics.add(Diagnostic::new(
            DiagnosticCode::DuplicateConstantExport,
            ctx.module_package.to_string(),
            format!("constant '{}' already exported for this module, skipping", c.name),
        ));
        return None;
    }
    let ty = type_resolver::resolve(&c.value_type, false, ctx.owning_namespace, ctx.symbols, ctx.diagnostics, ctx.module_package);
    Some(format!("export const {}: {} = {};\n", name_transform::constant_name(&c.name), ty, c.value))
}

fn emit_alias(a: &crate::model::AliasDecl, ctx: &mut Ctx) -> String {
    let ty = type_resolver::resolve(&a.target, true, ctx.owning_namespace, ctx.symbols, ctx.diagnostics, ctx.module_package);
    format!("export type {} = {};\n", name_transform::type_name(&a.name), ty)
}

fn emit_callback(cb: &crate::model::CallbackDecl, ctx: &mut Ctx) -> String {
    let wrapped = TypeRef { shape: TypeShape::Callback(Box::new(cb.signature.clone())), nullable: false, c_type: None };
    let ty = type_resolver::resolve(&wrapped, true, ctx.owning_namespace, ctx.symbols, ctx.diagnostics, ctx.module_package);
    format!("export type {} = {};\n", name_transform::type_name(&cb.name), ty)
}

fn emit_function(sig: &CallableSignature, ctx: &mut Ctx) -> String {
    let name = name_transform::function_name(&sig.name);
    format!("export function {}\n", member_synthesizer::render_signature(ctx, &name, sig))
}

fn emit_fields_and_methods_block(fields: &[crate::model::Field], methods: &[CallableSignature], ctx: &mut Ctx) -> Vec<String> {
    let mut out = Vec::new();
    for f in fields {
        let ty = type_resolver::resolve(&f.ty, false, ctx.owning_namespace, ctx.symbols, ctx.diagnostics, ctx.module_package);
        out.push(format!("    {}: {};", name_transform::field_name(&f.name), ty));
    }
    for m in methods {
        let name = member_synthesizer::emitted_method_name(m);
        out.push(format!("    {}", member_synthesizer::render_signature(ctx, &name, m)));
    }
    out
}

fn emit_record(r: &crate::model::RecordDecl, ctx: &mut Ctx) -> String {
    let mut out = format!("export interface {} {{\n", r.name);
    for line in emit_fields_and_methods_block(&r.fields, &r.methods, ctx) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

fn emit_union(u: &crate::model::UnionDecl, ctx: &mut Ctx) -> String {
    let mut out = format!("export interface {} {{\n", u.name);
    for line in emit_fields_and_methods_block(&u.fields, &u.methods, ctx) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

fn emit_interface(i: &crate::model::InterfaceDecl, ctx: &mut Ctx) -> String {
    let mut out = format!("export interface {} {{\n", i.name);
    for p in &i.properties {
        if p.private {
            continue;
        }
        let ty = type_resolver::resolve(&p.ty, false, ctx.owning_namespace, ctx.symbols, ctx.diagnostics, ctx.module_package);
        let readonly = if p.writable { "" } else { "readonly " };
        out.push_str(&format!("    {readonly}{}: {ty};\n", name_transform::property_name(&p.name, false)));
    }
    for m in &i.methods {
        let name = member_synthesizer::emitted_method_name(m);
        out.push_str(&format!("    {}\n", member_synthesizer::render_signature(ctx, &name, m)));
    }
    for vm in &i.virtual_methods {
        let name = format!("vfunc_{}", name_transform::function_name(&vm.name));
        out.push_str(&format!("    {}\n", member_synthesizer::render_signature(ctx, &name, vm)));
    }
    for s in &i.signals {
        let name = name_transform::signal_name(&s.name);
        out.push_str(&format!("    {}\n", member_synthesizer::render_signature(ctx, &name, &s.signature)));
    }
    out.push_str("}\n");
    out
}

/// Re-derives the `(emitted name, rendered text)` pairs for a class's
/// direct methods — the same filtering `member_synthesizer::synthesize_class`
/// applies internally — since [`overload_reconciler::reconcile`] needs
/// both the name (to compare against `fnMap`/`propertyNames`) and the
/// rendered text (to compute the canonical signature).
fn direct_method_pairs(ctx: &mut Ctx, class: &crate::model::ClassDecl) -> Vec<(String, String)> {
    class
        .methods
        .iter()
        .filter(|m| m.shadowed_by.is_none())
        .map(|m| {
            let name = member_synthesizer::emitted_method_name(m);
            let text = member_synthesizer::render_signature(ctx, &name, m);
            (name, text)
        })
        .collect()
}

fn emit_class(
    decl: &Declaration,
    symbols: &SymbolTable,
    inheritance: &InheritanceIndex,
    diagnostics: &mut DiagnosticCollection,
    module_package: &str,
    config: &GeneratorConfig,
) -> String {
    let class = match &decl.kind {
        DeclKind::Class(c) => c,
        _ => return String::new(),
    };

    let owning_namespace = decl.meta.qualified_name.rsplit_once('.').map(|(ns, _)| ns).unwrap_or(&decl.meta.qualified_name).to_string();

    let view = member_synthesizer::synthesize_class(decl, symbols, inheritance, diagnostics, module_package);

    let fn_map = overload_reconciler::collect_fn_map(class, symbols, inheritance, diagnostics, module_package);
    let property_names = overload_reconciler::collect_property_names(class, symbols, inheritance, diagnostics, module_package);

    let mut ctx = module_ctx(&owning_namespace, symbols, diagnostics, module_package);
    let direct_methods = direct_method_pairs(&mut ctx, class);
    let reconciled = overload_reconciler::reconcile(class, &direct_methods, fn_map, &property_names, ROOT_OBJECT_CLASS, &mut ctx);

    let mut out = String::new();
    if !view.construct_props.is_empty() {
        out.push_str(&format!("export interface {}ConstructorProps {{\n", class.name));
        for line in &view.construct_props {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("}\n");
    }

    let instance_buckets = [&view.fields, &view.properties, &view.methods, &view.virtual_methods, &view.signals, &view.signal_helpers];

    if config.inheritance {
        // §4.7's interface-plus-constructor decomposition: TypeScript classes can
        // only `extends` one parent, but a GIR class can implement several
        // interfaces alongside its single parent. Splitting the instance shape
        // into an `interface Foo extends Parent, Iface...` (which supports
        // multiple bases) and a bare `class Foo implements Foo` carrying only
        // the constructor/static surface sidesteps that restriction.
        let mut bases: Vec<String> = Vec::new();
        if let Some(parent) = &class.parent {
            bases.push(strip_local_prefix(parent, &owning_namespace));
        }
        bases.extend(class.implements.iter().map(|i| strip_local_prefix(i, &owning_namespace)));

        out.push_str(&format!("export interface {}", class.name));
        if !bases.is_empty() {
            out.push_str(&format!(" extends {}", bases.join(", ")));
        }
        out.push_str(" {\n");
        for bucket in instance_buckets {
            for line in bucket {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
        for line in &reconciled {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("}\n");

        out.push_str(&format!("export class {} implements {} {{\n", class.name, class.name));
        for bucket in [&view.constructors, &view.statics] {
            for line in bucket {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str("}\n");
        return out;
    }

    out.push_str(&format!("export class {}", class.name));
    if let Some(parent) = &class.parent {
        out.push_str(&format!(" extends {}", strip_local_prefix(parent, &owning_namespace)));
    }
    if !class.implements.is_empty() {
        let impls: Vec<String> = class.implements.iter().map(|i| strip_local_prefix(i, &owning_namespace)).collect();
        out.push_str(&format!(" implements {}", impls.join(", ")));
    }
    out.push_str(" {\n");

    for bucket in [&view.fields, &view.properties, &view.methods, &view.virtual_methods, &view.signals, &view.signal_helpers, &view.constructors, &view.statics] {
        for line in bucket {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
    for line in &reconciled {
        out.push_str("    ");
        out.push_str(line);
        out.push('\n');
    }

    out.push_str("}\n");
    out
}

/// Emits one module's declaration file and runtime stub (§4.7, §6).
/// `template_override` is the verbatim text of a per-module template-override
/// file, if the caller found one on disk.
pub fn emit_module(
    module: &Module,
    all_modules: &[Module],
    symbols: &SymbolTable,
    inheritance: &InheritanceIndex,
    diagnostics: &mut DiagnosticCollection,
    config: &GeneratorConfig,
    template_override: Option<&str>,
) -> EmittedModule {
    let package = module.package_name();
    let mut decl_file = String::new();

    decl_file.push_str(&template::render(
        "header",
        &Bindings::new()
            .set("namespace", module.namespace.clone())
            .set("version", module.version.clone())
            .set("environment", format!("{:?}", config.environment).to_lowercase()),
    ));

    let mut imported: HashSet<String> = HashSet::new();
    for dep in &module.direct_dependencies {
        if let Some(dep_module) = all_modules.iter().find(|m| &m.id == dep) {
            if imported.insert(dep_module.namespace.clone()) {
                decl_file.push_str(&template::render("import", &Bindings::new().set("module", dep_module.namespace.clone())));
            }
        }
    }
    if module.namespace != ROOT_OBJECT_MODULE && imported.insert(ROOT_OBJECT_MODULE.to_string()) {
        decl_file.push_str(&template::render("import", &Bindings::new().set("module", ROOT_OBJECT_MODULE.to_string())));
    }
    decl_file.push('\n');

    let wrap_namespace = config.build_type == BuildType::Types;
    if wrap_namespace {
        decl_file.push_str(&template::render("ambient_namespace_open", &Bindings::new().set("namespace", module.namespace.clone())));
    }

    let mut constant_names = ConstantNameSet::default();

    // An introspectable="0" construct is dropped here, not just at SymbolTable
    // insertion time: a declaration can be a valid cross-reference target
    // (resolved via the symbol table) without ever earning its own top-level
    // emission (§8's "never appears in the output").
    let introspectable_decls = || module.declarations.iter().filter(|d| d.meta.introspectable);

    for decl in introspectable_decls() {
        if let DeclKind::Enumeration(e) = &decl.kind {
            decl_file.push_str(&emit_enumeration(e, false));
        }
    }
    for decl in introspectable_decls() {
        if let DeclKind::Bitfield(e) = &decl.kind {
            decl_file.push_str(&emit_enumeration(e, true));
        }
    }
    for decl in introspectable_decls() {
        if let DeclKind::Constant(c) = &decl.kind {
            let mut ctx = module_ctx(&module.namespace, symbols, diagnostics, &package);
            if let Some(rendered) = emit_constant(c, &mut ctx, &mut constant_names, module.id) {
                decl_file.push_str(&rendered);
            }
        }
    }
    for decl in introspectable_decls() {
        if let DeclKind::Function(f) = &decl.kind {
            let mut ctx = module_ctx(&module.namespace, symbols, diagnostics, &package);
            decl_file.push_str(&emit_function(&f.signature, &mut ctx));
        }
    }
    for decl in introspectable_decls() {
        if let DeclKind::Callback(cb) = &decl.kind {
            let mut ctx = module_ctx(&module.namespace, symbols, diagnostics, &package);
            decl_file.push_str(&emit_callback(cb, &mut ctx));
        }
    }
    for decl in introspectable_decls() {
        if let DeclKind::Interface(i) = &decl.kind {
            let mut ctx = module_ctx(&module.namespace, symbols, diagnostics, &package);
            decl_file.push_str(&emit_interface(i, &mut ctx));
        }
    }

    if let Some(override_text) = template_override {
        decl_file.push_str(override_text);
        decl_file.push('\n');
    }

    for decl in introspectable_decls() {
        if matches!(decl.kind, DeclKind::Class(_)) {
            decl_file.push_str(&emit_class(decl, symbols, inheritance, diagnostics, &package, config));
        }
    }
    for decl in introspectable_decls() {
        if let DeclKind::Record(r) = &decl.kind {
            if r.is_gtype_struct_for.is_some() {
                // Folded into its class's static carrier (§4.5); not emitted standalone.
                continue;
            }
            let mut ctx = module_ctx(&module.namespace, symbols, diagnostics, &package);
            decl_file.push_str(&emit_record(r, &mut ctx));
        }
    }
    for decl in introspectable_decls() {
        if let DeclKind::Union(u) = &decl.kind {
            let mut ctx = module_ctx(&module.namespace, symbols, diagnostics, &package);
            decl_file.push_str(&emit_union(u, &mut ctx));
        }
    }
    for decl in introspectable_decls() {
        if let DeclKind::Alias(a) = &decl.kind {
            if module.namespace == ROOT_OBJECT_MODULE && a.name == "Type" {
                continue;
            }
            let mut ctx = module_ctx(&module.namespace, symbols, diagnostics, &package);
            decl_file.push_str(&emit_alias(a, &mut ctx));
        }
    }

    if wrap_namespace {
        decl_file.push_str(&template::render("ambient_namespace_close", &Bindings::new()));
    }

    let runtime_stub = template::render(
        "runtime_stub",
        &Bindings::new()
            .set("namespace", module.namespace.clone())
            .set("version", module.version.clone())
            .set("module", module.namespace.clone())
            .set("environment", format!("{:?}", config.environment).to_lowercase()),
    );

    EmittedModule { declarations: crate::pretty_print::format(&decl_file), runtime_stub: crate::pretty_print::format(&runtime_stub) }
}
