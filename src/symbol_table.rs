//! C3: cross-module mapping from fully-qualified name to declaration
//! (§3, §4.3). An insert/lookup-by-name map that refuses duplicate keys
//! (keep-first, per §9's Open Question) rather than allowing them.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollection};
use crate::model::{Declaration, Module};

/// Populated in a single read-and-build phase across every loaded
/// [`Module`], then treated as read-only for the rest of the run (§5).
#[derive(Default)]
pub struct SymbolTable {
    by_qualified_name: HashMap<String, Declaration>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses a second insertion under the same key: the first entry
    /// wins and a `duplicate-symbol` diagnostic is raised against the
    /// *new* declaration's module (§9's Open Question resolves
    /// cross-module duplicates the same way as same-module ones).
    pub fn insert(&mut self, decl: Declaration, diagnostics: &mut DiagnosticCollection, owning_module: &Module) {
        let qname = decl.meta.qualified_name.clone();
        if self.by_qualified_name.contains_key(&qname) {
            diagnostics.add(Diagnostic::new(
                DiagnosticCode::DuplicateSymbol,
                owning_module.package_name(),
                format!("duplicate symbol '{qname}', keeping first definition"),
            ));
            return;
        }
        self.by_qualified_name.insert(qname, decl);
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<&Declaration> {
        self.by_qualified_name.get(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.by_qualified_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_qualified_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Declaration)> {
        self.by_qualified_name.iter()
    }
}

/// Populates a [`SymbolTable`] by walking one module's declarations,
/// inserting only introspectable constructs (§4.3: absent `introspectable`
/// defaults to true).
pub fn populate_from_module(
    table: &mut SymbolTable,
    module: &Module,
    diagnostics: &mut DiagnosticCollection,
) {
    for decl in &module.declarations {
        if !decl.meta.introspectable {
            continue;
        }
        table.insert(decl.clone(), diagnostics, module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstantDecl, DeclKind, DeclMeta, ModuleId, TypeRef, TypeShape};

    fn const_decl(module: ModuleId, qname: &str, name: &str) -> Declaration {
        Declaration {
            meta: DeclMeta {
                owning_module: module,
                qualified_name: qname.to_string(),
                introspectable: true,
            },
            kind: DeclKind::Constant(ConstantDecl {
                name: name.to_string(),
                value_type: TypeRef {
                    shape: TypeShape::Primitive("utf8".into()),
                    nullable: false,
                    c_type: None,
                },
                value: "1".to_string(),
            }),
        }
    }

    fn dummy_module(id: ModuleId, namespace: &str) -> Module {
        Module {
            id,
            namespace: namespace.to_string(),
            version: "1.0".to_string(),
            direct_dependencies: vec![],
            transitive_dependencies: vec![],
            declarations: vec![],
            raw_includes: vec![],
        }
    }

    #[test]
    fn duplicate_insertion_keeps_first_and_warns() {
        let mut table = SymbolTable::new();
        let mut diags = DiagnosticCollection::new();
        let module = dummy_module(ModuleId(0), "Gtk");

        table.insert(const_decl(ModuleId(0), "Gtk.FOO", "FOO"), &mut diags, &module);
        table.insert(const_decl(ModuleId(0), "Gtk.FOO", "FOO_AGAIN"), &mut diags, &module);

        assert_eq!(table.len(), 1);
        assert_eq!(diags.len(), 1);
        let kept = table.lookup("Gtk.FOO").unwrap();
        match &kept.kind {
            DeclKind::Constant(c) => assert_eq!(c.name, "FOO"),
            _ => panic!("expected constant"),
        }
    }

    #[test]
    fn lookup_misses_return_none() {
        let table = SymbolTable::new();
        assert!(table.lookup("Gtk.Missing").is_none());
    }
}
