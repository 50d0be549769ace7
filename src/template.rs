//! The string-template engine collaborator (§1, §9: "exposes
//! `render(template-name, bindings) -> string` and `write(path, rendered)`.
//! The core concatenates strings; it does not inspect template contents.").
//! `NamespaceEmitter` calls `render` by name for the pieces it doesn't
//! synthesize itself (the header comment, import directives, the runtime
//! stub) and never reaches past this module's public functions.

use std::collections::HashMap;
use std::path::Path;

/// Named values a template is rendered with. Plain `HashMap<String, String>`
/// wrapped so call sites read as `Bindings::new().set(...)` chains instead
/// of bare map literals.
#[derive(Default)]
pub struct Bindings(HashMap<String, String>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Renders one of the fixed template names this crate knows about. An
/// unrecognized name renders as a comment rather than panicking, since a
/// per-module template-override file (§4.7) may reference names this
/// engine doesn't define.
pub fn render(template_name: &str, bindings: &Bindings) -> String {
    match template_name {
        "header" => render_header(bindings),
        "import" => render_import(bindings),
        "ambient_namespace_open" => format!("declare namespace {} {{\n", bindings.get("namespace")),
        "ambient_namespace_close" => "}\n".to_string(),
        "runtime_stub" => render_runtime_stub(bindings),
        other => format!("// unrecognized template '{other}'\n"),
    }
}

fn render_header(b: &Bindings) -> String {
    format!(
        "// GENERATED by gir2ts -- do not edit\n// Namespace: {}-{}\n// Environment: {}\n\n",
        b.get("namespace"),
        b.get("version"),
        b.get("environment"),
    )
}

fn render_import(b: &Bindings) -> String {
    format!("import * as {0} from './{0}';\n", b.get("module"))
}

fn render_runtime_stub(b: &Bindings) -> String {
    let env = b.get("environment");
    let body = match env {
        "node" => format!("module.exports = require('./{}-runtime.node');\n", b.get("module")),
        _ => format!("imports.gi.versions['{}'] = '{}';\nvar {} = imports.gi.{};\n", b.get("namespace"), b.get("version"), b.get("namespace"), b.get("namespace")),
    };
    format!("// runtime glue for {}-{}\n{}", b.get("namespace"), b.get("version"), body)
}

/// Writes `rendered` to `path`, creating parent directories as needed.
/// The core calls this once per emitted file; it never opens the file
/// handle itself.
pub fn write(path: &Path, rendered: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_includes_namespace_and_version() {
        let b = Bindings::new().set("namespace", "Gtk").set("version", "4.0").set("environment", "gjs");
        let out = render("header", &b);
        assert!(out.contains("Gtk-4.0"));
    }

    #[test]
    fn unknown_template_renders_as_comment() {
        let out = render("no-such-template", &Bindings::new());
        assert!(out.starts_with("//"));
    }
}
