//! The XML parser collaborator (§1's "out of scope" list, §2.1's "in this
//! implementation … realized as concrete modules"). Reads one GIR document
//! from disk and deserializes it into [`RawRepository`] via `quick-xml`'s
//! serde support — the core never touches a `quick_xml::Reader` directly.

use std::path::Path;

use crate::error::GirError;

use super::raw::RawRepository;

pub fn parse_file(path: &Path) -> Result<RawRepository, GirError> {
    let text = std::fs::read_to_string(path).map_err(|source| GirError::Io { path: path.to_path_buf(), source })?;
    parse_str(&text, path)
}

pub fn parse_str(text: &str, path: &Path) -> Result<RawRepository, GirError> {
    quick_xml::de::from_str(text).map_err(|source| GirError::Deserialize { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        <repository version="1.2">
          <include name="GObject" version="2.0"/>
          <namespace name="Gtk" version="4.0">
            <enumeration name="Orientation">
              <member name="horizontal" value="0" glib:nick="horizontal"/>
              <member name="vertical" value="1" glib:nick="vertical"/>
            </enumeration>
          </namespace>
        </repository>
    "#;

    #[test]
    fn parses_minimal_document() {
        let raw = parse_str(MINIMAL, Path::new("gtk.gir")).unwrap();
        assert_eq!(raw.includes.len(), 1);
        assert_eq!(raw.includes[0].name, "GObject");
        let ns = raw.namespace.unwrap();
        assert_eq!(ns.name, "Gtk");
        assert_eq!(ns.enumerations.len(), 1);
        assert_eq!(ns.enumerations[0].members.len(), 2);
    }

    #[test]
    fn document_with_no_namespace_parses_but_lowering_fails() {
        let raw = parse_str(r#"<repository version="1.2"></repository>"#, Path::new("bad.gir")).unwrap();
        assert!(raw.namespace.is_none());
    }
}
