//! C6: decides which inherited members a class view surfaces and how to
//! reconcile name collisions against direct members (§4.6). Name collisions
//! are dedup'd by key, first write wins, but only after a canonical-signature
//! comparison rules out a false overload rather than a simple name-keyed
//! overwrite.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::DiagnosticCollection;
use crate::inheritance_index::InheritanceIndex;
use crate::member_synthesizer::{self, Ctx};
use crate::model::{CallableSignature, ClassDecl, DeclKind};
use crate::symbol_table::SymbolTable;

/// One inherited declaration reachable through the inheritance closure,
/// keyed by method name in [`FnMap`].
#[derive(Debug, Clone)]
pub struct InheritedMethod {
    pub owning_class: String,
    pub is_virtual: bool,
    pub signature: CallableSignature,
}

/// `method name -> (owning class qualified name -> raw fragment)`, per
/// §4.6's `fnMap` input.
pub type FnMap = HashMap<String, HashMap<String, InheritedMethod>>;

const SIGNAL_HELPERS: &[&str] = &["connect", "connect_after", "emit", "disconnect"];

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\*[\s\S]*?\*/").unwrap());
static PARAM_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*(\??):").unwrap());

/// Strips block comments, then strips parameter names from the rendered
/// signature text, leaving only types and punctuation — the canonical form
/// two declarations are compared in (§4.6).
pub fn canonical_signature(text: &str) -> String {
    let without_comments = BLOCK_COMMENT.replace_all(text, "");
    PARAM_NAME.replace_all(&without_comments, "$1:").into_owned()
}

/// Walks the inheritance closure (parents, then implemented interfaces) of
/// `class`, collecting every method and virtual method reachable, keyed by
/// name then owning class. Declarations already present for a given
/// (name, owning class) pair are not overwritten — first walk order wins,
/// matching the closure walkers' own no-revisit guarantee.
pub fn collect_fn_map(
    class: &ClassDecl,
    symbols: &SymbolTable,
    inheritance: &InheritanceIndex,
    diagnostics: &mut DiagnosticCollection,
    module_package: &str,
) -> FnMap {
    let mut fn_map: FnMap = FnMap::new();

    let mut record_class_methods = |owner_qname: &str, fn_map: &mut FnMap| {
        let decl = match symbols.lookup(owner_qname) {
            Some(d) => d,
            None => return,
        };
        match &decl.kind {
            DeclKind::Class(c) => {
                for m in &c.methods {
                    fn_map.entry(m.name.clone()).or_default().entry(owner_qname.to_string()).or_insert_with(|| {
                        InheritedMethod { owning_class: owner_qname.to_string(), is_virtual: false, signature: m.clone() }
                    });
                }
                for vm in &c.virtual_methods {
                    fn_map.entry(vm.name.clone()).or_default().entry(owner_qname.to_string()).or_insert_with(|| {
                        InheritedMethod { owning_class: owner_qname.to_string(), is_virtual: true, signature: vm.clone() }
                    });
                }
            }
            DeclKind::Interface(i) => {
                for m in &i.methods {
                    fn_map.entry(m.name.clone()).or_default().entry(owner_qname.to_string()).or_insert_with(|| {
                        InheritedMethod { owning_class: owner_qname.to_string(), is_virtual: false, signature: m.clone() }
                    });
                }
                for vm in &i.virtual_methods {
                    fn_map.entry(vm.name.clone()).or_default().entry(owner_qname.to_string()).or_insert_with(|| {
                        InheritedMethod { owning_class: owner_qname.to_string(), is_virtual: true, signature: vm.clone() }
                    });
                }
            }
            _ => {}
        }
    };

    inheritance.closure_walk(&class.qualified_name, diagnostics, module_package, |ancestor| {
        record_class_methods(ancestor, &mut fn_map);
    });
    inheritance.for_each_interface(&class.qualified_name, symbols, true, |iface| {
        record_class_methods(iface, &mut fn_map);
    });

    fn_map
}

/// Property names visible on the inheritance closure, per §4.6's
/// `propertyNames` input (methods cannot share a name with an inherited
/// property).
pub fn collect_property_names(
    class: &ClassDecl,
    symbols: &SymbolTable,
    inheritance: &InheritanceIndex,
    diagnostics: &mut DiagnosticCollection,
    module_package: &str,
) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut record_props = |owner_qname: &str, names: &mut HashSet<String>| {
        if let Some(decl) = symbols.lookup(owner_qname) {
            match &decl.kind {
                DeclKind::Class(c) => names.extend(c.properties.iter().map(|p| p.name.clone())),
                DeclKind::Interface(i) => names.extend(i.properties.iter().map(|p| p.name.clone())),
                _ => {}
            }
        }
    };
    inheritance.closure_walk(&class.qualified_name, diagnostics, module_package, |ancestor| {
        record_props(ancestor, &mut names);
    });
    inheritance.for_each_interface(&class.qualified_name, symbols, true, |iface| {
        record_props(iface, &mut names);
    });
    names
}

/// Runs the §4.6 algorithm for class `class`, given its already-synthesized
/// direct-method fragments (name, rendered text pairs, in declaration
/// order) plus the inherited `fn_map`/`property_names` collected above.
/// Returns the ordered fragment list to append after the direct methods in
/// the class view.
pub fn reconcile(
    class: &ClassDecl,
    direct_methods: &[(String, String)],
    mut fn_map: FnMap,
    property_names: &HashSet<String>,
    root_object_class: &str,
    ctx: &mut Ctx,
) -> Vec<String> {
    let mut fragments = Vec::new();

    for (name, rendered) in direct_methods {
        if property_names.contains(name) {
            fragments.push(format!("// skipped: '{name}' collides with an inherited property"));
            continue;
        }

        if let Some(owners) = fn_map.remove(name) {
            let direct_canonical = canonical_signature(rendered);
            let mut owners: Vec<_> = owners.into_values().collect();
            owners.sort_by(|a, b| a.owning_class.cmp(&b.owning_class));
            for inherited in owners {
                let inherited_text = member_synthesizer::render_signature(ctx, name, &inherited.signature);
                if canonical_signature(&inherited_text) != direct_canonical {
                    fragments.push(format!("// false overload against {}", inherited.owning_class));
                    fragments.push(inherited_text);
                }
            }
        }
    }

    let mut remaining: Vec<_> = fn_map.into_iter().collect();
    remaining.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (name, owners) in remaining {
        if property_names.contains(&name) {
            fragments.push(format!("// skipped: '{name}' collides with an inherited property"));
            continue;
        }

        let forced_clash = SIGNAL_HELPERS.contains(&name.as_str()) && class.qualified_name != root_object_class;

        let mut owners: Vec<_> = owners.into_values().collect();
        owners.sort_by(|a, b| a.owning_class.cmp(&b.owning_class));

        let mut seen_canonical = HashSet::new();
        let mut retained = Vec::new();
        for inherited in owners {
            let text = member_synthesizer::render_signature(ctx, &name, &inherited.signature);
            let canon = canonical_signature(&text);
            if seen_canonical.insert(canon) {
                retained.push((inherited, text));
            }
        }

        if !forced_clash && retained.len() < 2 {
            continue;
        }

        for (inherited, text) in retained {
            let note = if inherited.is_virtual {
                format!("// inherited from {}; do not override", inherited.owning_class)
            } else {
                format!(
                    "// inherited from {}; use {}.prototype.{}.call()",
                    inherited.owning_class, inherited.owning_class, name
                )
            };
            fragments.push(note);
            fragments.push(text);
        }
    }

    fragments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_signature_strips_parameter_names_and_comments() {
        let text = "/* note */foo(name: string, other?: number): void;";
        assert_eq!(canonical_signature(text), "foo(: string, ?: number): void;");
    }

    #[test]
    fn matching_signatures_canonicalize_identically_despite_different_names() {
        let a = canonical_signature("foo(a: string): void;");
        let b = canonical_signature("foo(b: string): void;");
        assert_eq!(a, b);
    }
}
