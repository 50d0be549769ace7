//! Filesystem traversal to locate dependency GIR documents (§1's "out of
//! scope" list). Walks a search root with `globwalk`, canonicalizing hits
//! for stable dedup, looking for a `<Namespace>-<version>.gir` file on each
//! configured `girDirectories` entry.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use globwalk::GlobWalkerBuilder;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticCollection};
use crate::model::{Module, ModuleId};

use super::{lower, parse};

/// Every [`Module`] built for one run, in load order, plus the entry
/// points the caller explicitly requested (as opposed to modules pulled in
/// only to satisfy `<include>` resolution).
pub struct LoadedRun {
    pub modules: Vec<Module>,
    pub entry_ids: Vec<ModuleId>,
}

fn find_gir_file(search_dirs: &[PathBuf], namespace: &str, version: &str) -> Option<PathBuf> {
    let wanted = format!("{namespace}-{version}.gir");
    for dir in search_dirs {
        let candidate = dir.join(&wanted);
        if candidate.is_file() {
            return Some(candidate);
        }
        let walker = GlobWalkerBuilder::from_patterns(dir, &[format!("**/{wanted}")]).case_insensitive(true).build();
        if let Ok(w) = walker {
            for entry in w.filter_map(|r| r.ok()) {
                if entry.file_type().is_file() {
                    return Some(entry.path().to_path_buf());
                }
            }
        }
    }
    None
}

/// Loads `entry_paths` and, transitively, every module they `<include>`,
/// searching `search_dirs` for files named `<Namespace>-<version>.gir`
/// (§6's `girDirectories`). A dependency that cannot be found anywhere on
/// the search path is recorded as a `dependency-not-found` diagnostic and
/// otherwise skipped — the module that named it still loads, just without
/// that entry in its dependency set (§7).
pub fn load_run(entry_paths: &[PathBuf], search_dirs: &[PathBuf], diagnostics: &mut DiagnosticCollection) -> LoadedRun {
    let mut modules: Vec<Module> = Vec::new();
    let mut id_by_key: HashMap<(String, String), ModuleId> = HashMap::new();
    let mut loaded_paths: HashSet<PathBuf> = HashSet::new();
    let mut queue: VecDeque<(PathBuf, bool)> = entry_paths.iter().cloned().map(|p| (p, true)).collect();
    let mut entry_ids = Vec::new();

    while let Some((path, is_entry)) = queue.pop_front() {
        let canon = path.canonicalize().unwrap_or_else(|_| path.clone());
        if !loaded_paths.insert(canon.clone()) {
            continue;
        }

        let id = ModuleId(modules.len() as u32);
        let raw = match parse::parse_file(&path) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("{e}");
                continue;
            }
        };
        let module = match lower::lower_repository(raw, id, &path) {
            Ok(m) => m,
            Err(e) => {
                log::error!("{e}");
                continue;
            }
        };

        let key = (module.namespace.clone(), module.version.clone());
        if let Some(existing) = id_by_key.get(&key) {
            if is_entry {
                entry_ids.push(*existing);
            }
            continue;
        }

        for (ns, version) in &module.raw_includes {
            match find_gir_file(search_dirs, ns, version) {
                Some(found) => queue.push_back((found, false)),
                None => diagnostics.add(Diagnostic::new(
                    DiagnosticCode::DependencyNotFound,
                    module.package_name(),
                    format!("dependency '{ns}-{version}' was not found on any gir-directories search path"),
                )),
            }
        }

        id_by_key.insert(key, id);
        if is_entry {
            entry_ids.push(id);
        }
        modules.push(module);
    }

    resolve_dependencies(&mut modules, &id_by_key);
    compute_transitive_closure(&mut modules);

    LoadedRun { modules, entry_ids }
}

fn resolve_dependencies(modules: &mut [Module], id_by_key: &HashMap<(String, String), ModuleId>) {
    let raw_includes: Vec<Vec<(String, String)>> = modules.iter().map(|m| m.raw_includes.clone()).collect();
    for (module, includes) in modules.iter_mut().zip(raw_includes) {
        module.direct_dependencies =
            includes.iter().filter_map(|(ns, version)| id_by_key.get(&(ns.clone(), version.clone())).copied()).collect();
    }
}

/// Builds the `<include>` edges into a [`petgraph::Graph`], one node per
/// loaded module, then walks a DFS from each module to its own transitive
/// dependency set.
fn compute_transitive_closure(modules: &mut [Module]) {
    let mut graph: DiGraph<ModuleId, ()> = DiGraph::with_capacity(modules.len(), 0);
    let mut node_of: HashMap<ModuleId, NodeIndex> = HashMap::with_capacity(modules.len());
    for module in modules.iter() {
        node_of.insert(module.id, graph.add_node(module.id));
    }
    for module in modules.iter() {
        let from = node_of[&module.id];
        for dep in &module.direct_dependencies {
            if let Some(&to) = node_of.get(dep) {
                graph.add_edge(from, to, ());
            }
        }
    }

    for module in modules.iter_mut() {
        let start = node_of[&module.id];
        let mut dfs = Dfs::new(&graph, start);
        dfs.next(&graph); // skip the start node itself
        let mut reached: Vec<ModuleId> = Vec::new();
        while let Some(node) = dfs.next(&graph) {
            reached.push(graph[node]);
        }
        reached.sort();
        reached.dedup();
        module.transitive_dependencies = reached;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_gir(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_entry_and_its_include() {
        let tmp = tempdir("loads-entry");
        write_gir(
            &tmp,
            "GObject-2.0.gir",
            r#"<repository version="1.2"><namespace name="GObject" version="2.0"></namespace></repository>"#,
        );
        let entry = write_gir(
            &tmp,
            "Gtk-4.0.gir",
            r#"<repository version="1.2"><include name="GObject" version="2.0"/><namespace name="Gtk" version="4.0"></namespace></repository>"#,
        );

        let mut diags = DiagnosticCollection::new();
        let run = load_run(&[entry], &[tmp.clone()], &mut diags);
        assert_eq!(run.modules.len(), 2);
        assert!(diags.is_empty());

        let gtk = run.modules.iter().find(|m| m.namespace == "Gtk").unwrap();
        assert_eq!(gtk.direct_dependencies.len(), 1);
    }

    #[test]
    fn transitive_closure_follows_multi_hop_includes() {
        let tmp = tempdir("transitive-closure");
        write_gir(
            &tmp,
            "Base-1.0.gir",
            r#"<repository version="1.2"><namespace name="Base" version="1.0"></namespace></repository>"#,
        );
        write_gir(
            &tmp,
            "Mid-1.0.gir",
            r#"<repository version="1.2"><include name="Base" version="1.0"/><namespace name="Mid" version="1.0"></namespace></repository>"#,
        );
        let entry = write_gir(
            &tmp,
            "Top-1.0.gir",
            r#"<repository version="1.2"><include name="Mid" version="1.0"/><namespace name="Top" version="1.0"></namespace></repository>"#,
        );

        let mut diags = DiagnosticCollection::new();
        let run = load_run(&[entry], &[tmp.clone()], &mut diags);
        assert!(diags.is_empty());

        let top = run.modules.iter().find(|m| m.namespace == "Top").unwrap();
        let base_id = run.modules.iter().find(|m| m.namespace == "Base").unwrap().id;
        let mid_id = run.modules.iter().find(|m| m.namespace == "Mid").unwrap().id;
        assert!(top.transitive_dependencies.contains(&mid_id));
        assert!(top.transitive_dependencies.contains(&base_id));

        let base = run.modules.iter().find(|m| m.namespace == "Base").unwrap();
        assert!(base.transitive_dependencies.is_empty());
    }

    #[test]
    fn missing_dependency_is_diagnosed_not_fatal() {
        let tmp = tempdir("missing-dependency");
        let entry = write_gir(
            &tmp,
            "Gtk-4.0.gir",
            r#"<repository version="1.2"><include name="NoSuchNs" version="1.0"/><namespace name="Gtk" version="4.0"></namespace></repository>"#,
        );

        let mut diags = DiagnosticCollection::new();
        let run = load_run(&[entry], &[tmp.clone()], &mut diags);
        assert_eq!(run.modules.len(), 1);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.diagnostics[0].code, DiagnosticCode::DependencyNotFound);
    }

    fn tempdir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gir2ts-test-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
