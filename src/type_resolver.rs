//! C2: lowers a [`TypeRef`] to a target-surface type expression (§4.2).
//! Structural recursion over a type tree, depth-tracked, fixed around the
//! seven-step resolution order and suffix rules §4.2 specifies.

use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollection};
use crate::model::{CallableSignature, Direction, TypeRef, TypeShape};
use crate::symbol_table::SymbolTable;

/// Direction-sensitive plain-type table entry: some built-ins map
/// differently depending on whether the type sits in a return/out position
/// or an input position (step 5 of §4.2).
fn named_type_mapping(c_type: &str, out: bool) -> Option<&'static str> {
    match (c_type, out) {
        ("GLib.List", _) | ("GLib.SList", _) => None,
        ("utf8", _) | ("filename", _) => Some("string"),
        ("gboolean", _) => Some("boolean"),
        ("GLib.Variant", _) => Some("GLib.Variant"),
        ("GLib.Bytes", false) => Some("Uint8Array | GLib.Bytes"),
        ("GLib.Bytes", true) => Some("GLib.Bytes"),
        _ => None,
    }
}

/// Fixed C-type map consulted first (step 2 of §4.2): `c:type` strings that
/// resolve to a target-surface primitive regardless of namespace.
fn c_type_map(c_type: &str) -> Option<&'static str> {
    match c_type {
        "gint" | "gint8" | "gint16" | "gint32" | "guint" | "guint8" | "guint16" | "guint32"
        | "gfloat" | "gdouble" | "glong" | "gulong" | "gssize" | "gsize" => Some("number"),
        "gint64" | "guint64" => Some("bigint"),
        "gchar*" | "gchar" | "const gchar*" => Some("string"),
        "gpointer" | "gconstpointer" => Some("unknown"),
        "none" | "void" => Some("void"),
        _ => None,
    }
}

/// Plain-type mapping consulted for array elements (steps 3/4): built-ins
/// with a direct target-surface counterpart, independent of direction.
fn plain_type_mapping(name: &str) -> Option<&'static str> {
    match name {
        "gint" | "gint8" | "gint16" | "gint32" | "guint" | "guint8" | "guint16" | "guint32"
        | "gfloat" | "gdouble" | "glong" | "gulong" | "gssize" | "gsize" => Some("number"),
        "utf8" | "filename" => Some("string"),
        "gboolean" => Some("boolean"),
        _ => None,
    }
}

const TOP_TYPE_FALLBACK: &str = "unknown";

fn suffix_for(node: &TypeRef) -> String {
    let mut suffix = String::new();
    if node.is_array_like() {
        suffix.push_str("[]");
    }
    if node.nullable {
        suffix.push_str(" | null");
    }
    suffix
}

/// Resolves one [`TypeRef`] to a target-surface type expression.
///
/// `out` distinguishes a return/out position from an input position, since
/// some polymorphic built-ins (§4.2) map differently by direction.
/// `owning_module_namespace` is the namespace of the module the node being
/// resolved was declared in, used to qualify bare local names in step 6.
pub fn resolve(
    node: &TypeRef,
    out: bool,
    owning_module_namespace: &str,
    symbols: &SymbolTable,
    diagnostics: &mut DiagnosticCollection,
    module_package: &str,
) -> String {
    // Step 1: callback types synthesize a function-type expression.
    if let TypeShape::Callback(sig) = &node.shape {
        let rendered = render_function_type(sig, owning_module_namespace, symbols, diagnostics, module_package);
        let needs_parens = node.is_array_like() || node.nullable;
        let base = if needs_parens { format!("({rendered})") } else { rendered };
        return format!("{base}{}", suffix_for(node));
    }

    // Step 2: fixed C-type map.
    if let Some(c_type) = &node.c_type {
        if let Some(mapped) = c_type_map(c_type) {
            return format!("{mapped}{}", suffix_for(node));
        }
    }

    // Steps 3/4: array/list element has a plain-type or array-specific mapping.
    if node.is_array_like() {
        if let Some(element) = array_or_list_element(node) {
            if let Some(c_type) = &element.c_type {
                if let Some(mapped) = named_type_mapping(c_type, out) {
                    let nullable_suffix = if node.nullable { " | null" } else { "" };
                    return format!("{mapped}{nullable_suffix}");
                }
            }
            if let TypeShape::Primitive(name) = &element.shape {
                if let Some(mapped) = plain_type_mapping(name) {
                    return format!("{mapped}[]{}", if node.nullable { " | null" } else { "" });
                }
            }
        }
    }

    // Step 5: direction-sensitive named-type mapping on the node itself.
    if let Some(c_type) = &node.c_type {
        if let Some(mapped) = named_type_mapping(c_type, out) {
            return format!("{mapped}{}", suffix_for(node));
        }
    }

    // Step 6: fully-qualified named-type lookup via the SymbolTable. For an
    // array/list node the lookup runs against the element's name, and the
    // outer node's array+nullable suffix is appended regardless.
    let named_candidate = match &node.shape {
        TypeShape::Named(name) => Some(name.as_str()),
        _ => array_or_list_element(node).and_then(|el| match &el.shape {
            TypeShape::Named(name) => Some(name.as_str()),
            _ => None,
        }),
    };

    if let Some(name) = named_candidate {
        let qualified = if name.contains('.') {
            name.to_string()
        } else {
            format!("{owning_module_namespace}.{name}")
        };

        if let Some(decl) = symbols.lookup(&qualified) {
            let local = if decl.meta.qualified_name.starts_with(&format!("{owning_module_namespace}.")) {
                decl.meta
                    .qualified_name
                    .strip_prefix(&format!("{owning_module_namespace}."))
                    .unwrap_or(&decl.meta.qualified_name)
                    .to_string()
            } else {
                decl.meta.qualified_name.clone()
            };
            return format!("{local}{}", suffix_for(node));
        }
    } else if let TypeShape::Primitive(name) = &node.shape {
        if let Some(mapped) = plain_type_mapping(name) {
            return format!("{mapped}{}", suffix_for(node));
        }
    }

    // Step 7: unresolved. Diagnose and fall back to the top type, preserving
    // the array suffix only (§4.2: "preserving the array suffix").
    diagnostics.add(Diagnostic::new(
        DiagnosticCode::UnresolvedType,
        module_package,
        format!("could not resolve type '{}'", describe(node)),
    ));
    let array_suffix = if node.is_array_like() { "[]" } else { "" };
    format!("{TOP_TYPE_FALLBACK}{array_suffix}")
}

fn array_or_list_element(node: &TypeRef) -> Option<&TypeRef> {
    match &node.shape {
        TypeShape::Array { element, .. } => Some(element),
        TypeShape::List(inner) => Some(inner),
        _ => None,
    }
}

fn describe(node: &TypeRef) -> String {
    match &node.shape {
        TypeShape::Primitive(p) => p.clone(),
        TypeShape::Named(n) => n.clone(),
        TypeShape::Callback(_) => "<callback>".to_string(),
        TypeShape::Array { .. } => "<array>".to_string(),
        TypeShape::List(_) => "<list>".to_string(),
    }
}

fn render_function_type(
    sig: &CallableSignature,
    owning_module_namespace: &str,
    symbols: &SymbolTable,
    diagnostics: &mut DiagnosticCollection,
    module_package: &str,
) -> String {
    let params: Vec<String> = sig
        .parameters
        .iter()
        .filter(|p| p.direction != Direction::Out)
        .map(|p| {
            let ty = resolve(&p.ty, false, owning_module_namespace, symbols, diagnostics, module_package);
            format!("{}: {ty}", p.name)
        })
        .collect();
    let ret = resolve(&sig.return_type, true, owning_module_namespace, symbols, diagnostics, module_package);
    format!("({}) => {ret}", params.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Declaration, DeclKind, DeclMeta, EnumerationDecl, Module, ModuleId};

    fn primitive(name: &str, c_type: Option<&str>, nullable: bool) -> TypeRef {
        TypeRef {
            shape: TypeShape::Primitive(name.to_string()),
            nullable,
            c_type: c_type.map(str::to_string),
        }
    }

    fn named(name: &str, nullable: bool) -> TypeRef {
        TypeRef {
            shape: TypeShape::Named(name.to_string()),
            nullable,
            c_type: None,
        }
    }

    #[test]
    fn c_type_map_resolves_numeric_primitives() {
        let symbols = SymbolTable::new();
        let mut diags = DiagnosticCollection::new();
        let ty = primitive("gint32", Some("gint32"), false);
        assert_eq!(resolve(&ty, false, "Gtk", &symbols, &mut diags, "Gtk-4.0"), "number");
        assert!(diags.is_empty());
    }

    #[test]
    fn nullable_and_array_suffixes_concatenate_in_order() {
        let symbols = SymbolTable::new();
        let mut diags = DiagnosticCollection::new();
        let element = primitive("utf8", Some("utf8"), false);
        let array = TypeRef {
            shape: TypeShape::Array { element: Box::new(element), length_param_index: None },
            nullable: true,
            c_type: None,
        };
        assert_eq!(resolve(&array, false, "Gtk", &symbols, &mut diags, "Gtk-4.0"), "string[] | null");
    }

    #[test]
    fn named_type_resolves_against_symbol_table_and_strips_local_prefix() {
        let mut symbols = SymbolTable::new();
        let mut diags = DiagnosticCollection::new();
        let module = Module {
            id: ModuleId(0),
            namespace: "Gtk".into(),
            version: "4.0".into(),
            direct_dependencies: vec![],
            transitive_dependencies: vec![],
            declarations: vec![],
            raw_includes: vec![],
        };
        symbols.insert(
            Declaration {
                meta: DeclMeta { owning_module: ModuleId(0), qualified_name: "Gtk.Orientation".into(), introspectable: true },
                kind: DeclKind::Enumeration(EnumerationDecl { name: "Orientation".into(), members: vec![] }),
            },
            &mut diags,
            &module,
        );

        let ty = named("Orientation", false);
        assert_eq!(resolve(&ty, false, "Gtk", &symbols, &mut diags, "Gtk-4.0"), "Orientation");
        assert!(diags.is_empty());
    }

    #[test]
    fn array_of_named_type_resolves_element_and_appends_array_suffix() {
        let mut symbols = SymbolTable::new();
        let mut diags = DiagnosticCollection::new();
        let module = Module {
            id: ModuleId(0),
            namespace: "Gtk".into(),
            version: "4.0".into(),
            direct_dependencies: vec![],
            transitive_dependencies: vec![],
            declarations: vec![],
            raw_includes: vec![],
        };
        symbols.insert(
            Declaration {
                meta: DeclMeta { owning_module: ModuleId(0), qualified_name: "Gtk.Widget".into(), introspectable: true },
                kind: DeclKind::Enumeration(EnumerationDecl { name: "Widget".into(), members: vec![] }),
            },
            &mut diags,
            &module,
        );

        let element = named("Widget", false);
        let array = TypeRef {
            shape: TypeShape::Array { element: Box::new(element), length_param_index: None },
            nullable: false,
            c_type: None,
        };
        assert_eq!(resolve(&array, false, "Gtk", &symbols, &mut diags, "Gtk-4.0"), "Widget[]");
        assert!(diags.is_empty());
    }

    #[test]
    fn unresolved_named_type_falls_back_to_top_type_and_diagnoses() {
        let symbols = SymbolTable::new();
        let mut diags = DiagnosticCollection::new();
        let ty = named("NoSuchType", false);
        assert_eq!(resolve(&ty, false, "Gtk", &symbols, &mut diags, "Gtk-4.0"), "unknown");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.diagnostics[0].code, DiagnosticCode::UnresolvedType);
    }

    #[test]
    fn unresolved_array_element_preserves_array_suffix_on_fallback() {
        let symbols = SymbolTable::new();
        let mut diags = DiagnosticCollection::new();
        let element = named("NoSuchType", false);
        let array = TypeRef {
            shape: TypeShape::Array { element: Box::new(element), length_param_index: None },
            nullable: false,
            c_type: None,
        };
        assert_eq!(resolve(&array, false, "Gtk", &symbols, &mut diags, "Gtk-4.0"), "unknown[]");
    }
}
