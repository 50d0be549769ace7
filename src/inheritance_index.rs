//! C4: parent-and-interface adjacency, plus closure walkers (§4.4).
//! Populated once, after the SymbolTable, and read-only thereafter. Cycle
//! detection follows a DFS-with-visited-set shape, reworked per §9's design
//! note into an explicit work stack rather than recursive closures, bounded
//! by `MAX_RECURSION`.

use std::collections::{HashMap, HashSet};

use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollection};
use crate::model::{DeclKind, Declaration};
use crate::symbol_table::SymbolTable;

/// Recursion bound for both closure walkers (§4.4, §5).
pub const MAX_RECURSION: usize = 100;

/// `class qualified name -> ordered [parent, implements...]` / `interface
/// qualified name -> [prerequisite]`.
#[derive(Default)]
pub struct InheritanceIndex {
    adjacency: HashMap<String, Vec<String>>,
}

impl InheritanceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parents_of(&self, qualified_name: &str) -> &[String] {
        self.adjacency
            .get(qualified_name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Depth-first walk up the parent chain only (first entry of the
    /// adjacency list), calling `visit` for every ancestor reached.
    /// Stops at `MAX_RECURSION` or when a cycle is detected: the next
    /// parent equal to `start`'s own qualified name.
    pub fn closure_walk(
        &self,
        start: &str,
        diagnostics: &mut DiagnosticCollection,
        module_package: &str,
        mut visit: impl FnMut(&str),
    ) {
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = start.to_string();
        let mut depth = 0usize;

        loop {
            let parent = match self.adjacency.get(&current).and_then(|v| v.first()) {
                Some(p) => p.clone(),
                None => break,
            };

            if parent == start {
                diagnostics.add(Diagnostic::new(
                    DiagnosticCode::CircularInheritance,
                    module_package,
                    format!("circular dependency found while walking ancestors of '{start}'"),
                ));
                break;
            }

            if !visited.insert(parent.clone()) {
                break;
            }

            depth += 1;
            if depth > MAX_RECURSION {
                diagnostics.add(Diagnostic::new(
                    DiagnosticCode::RecursionDepthExceeded,
                    module_package,
                    format!("inheritance walk from '{start}' exceeded depth {MAX_RECURSION}"),
                ));
                break;
            }

            visit(&parent);
            current = parent;
        }
    }

    /// Visits implemented interfaces of `start`, then recurses through
    /// each interface's own prerequisite chain. Object-class prerequisites
    /// (a prerequisite that resolves to a Class rather than an Interface)
    /// are only followed when `recurse_objects` is true.
    pub fn for_each_interface(
        &self,
        start: &str,
        symbols: &SymbolTable,
        recurse_objects: bool,
        mut visit: impl FnMut(&str),
    ) {
        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<String> = self
            .adjacency
            .get(start)
            .map(|v| v.iter().skip(1).cloned().collect())
            .unwrap_or_default();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            visit(&name);

            let is_interface = matches!(
                symbols.lookup(&name).map(|d: &Declaration| &d.kind),
                Some(DeclKind::Interface(_))
            );
            if is_interface {
                if let Some(prereq) = self.adjacency.get(&name).and_then(|v| v.first()) {
                    stack.push(prereq.clone());
                }
            } else if recurse_objects {
                if let Some(parents) = self.adjacency.get(&name) {
                    stack.extend(parents.iter().cloned());
                }
            }
        }
    }
}

/// Populates the index from every class/interface declaration reachable
/// through the symbol table. Must run after the symbol table is fully
/// populated (§3 lifecycle).
pub fn populate(index: &mut InheritanceIndex, symbols: &SymbolTable) {
    for (qname, decl) in symbols.iter() {
        match &decl.kind {
            DeclKind::Class(c) => {
                let mut entries = Vec::new();
                if let Some(parent) = &c.parent {
                    entries.push(parent.clone());
                }
                entries.extend(c.implements.iter().cloned());
                index.adjacency.insert(qname.clone(), entries);
            }
            DeclKind::Interface(i) => {
                let entries = i.prerequisite.iter().cloned().collect();
                index.adjacency.insert(qname.clone(), entries);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(pairs: &[(&str, &[&str])]) -> InheritanceIndex {
        let mut idx = InheritanceIndex::new();
        for (name, parents) in pairs {
            idx.adjacency
                .insert(name.to_string(), parents.iter().map(|s| s.to_string()).collect());
        }
        idx
    }

    #[test]
    fn closure_walk_visits_ancestors_in_order() {
        let idx = index_with(&[("Gtk.C", &["Gtk.B"]), ("Gtk.B", &["Gtk.A"]), ("Gtk.A", &[])]);
        let mut diags = DiagnosticCollection::new();
        let mut seen = Vec::new();
        idx.closure_walk("Gtk.C", &mut diags, "Gtk-4.0", |p| seen.push(p.to_string()));
        assert_eq!(seen, vec!["Gtk.B".to_string(), "Gtk.A".to_string()]);
        assert!(diags.is_empty());
    }

    #[test]
    fn closure_walk_detects_direct_cycle() {
        let idx = index_with(&[("Gtk.A", &["Gtk.B"]), ("Gtk.B", &["Gtk.A"])]);
        let mut diags = DiagnosticCollection::new();
        let mut seen = Vec::new();
        idx.closure_walk("Gtk.A", &mut diags, "Gtk-4.0", |p| seen.push(p.to_string()));
        assert_eq!(seen, vec!["Gtk.B".to_string()]);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.diagnostics[0].code, DiagnosticCode::CircularInheritance);
    }

    #[test]
    fn for_each_interface_follows_prerequisites() {
        let mut idx = index_with(&[
            ("Gtk.Widget", &["Gtk.Object", "Gtk.Buildable"]),
            ("Gtk.Buildable", &["Gtk.Initable"]),
            ("Gtk.Initable", &[]),
        ]);
        idx.adjacency.insert("Gtk.Object".into(), vec![]);

        // Build a symbol table that knows Buildable/Initable are interfaces.
        let mut symbols = SymbolTable::new();
        let mut diags = DiagnosticCollection::new();
        let module = crate::model::Module {
            id: crate::model::ModuleId(0),
            namespace: "Gtk".into(),
            version: "4.0".into(),
            direct_dependencies: vec![],
            transitive_dependencies: vec![],
            declarations: vec![],
            raw_includes: vec![],
        };
        for name in ["Gtk.Buildable", "Gtk.Initable"] {
            symbols.insert(
                Declaration {
                    meta: crate::model::DeclMeta {
                        owning_module: crate::model::ModuleId(0),
                        qualified_name: name.to_string(),
                        introspectable: true,
                    },
                    kind: DeclKind::Interface(crate::model::InterfaceDecl {
                        name: name.rsplit('.').next().unwrap().to_string(),
                        qualified_name: name.to_string(),
                        prerequisite: None,
                        properties: vec![],
                        methods: vec![],
                        virtual_methods: vec![],
                        signals: vec![],
                    }),
                },
                &mut diags,
                &module,
            );
        }

        let mut seen = Vec::new();
        idx.for_each_interface("Gtk.Widget", &symbols, false, |n| seen.push(n.to_string()));
        assert!(seen.contains(&"Gtk.Buildable".to_string()));
        assert!(seen.contains(&"Gtk.Initable".to_string()));
        assert!(!seen.contains(&"Gtk.Object".to_string()));
    }
}
