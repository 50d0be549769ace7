//! Serde-deserializable mirror of the subset of the GIR XML schema this
//! translator cares about (§6's element list). Namespace prefixes
//! (`glib:`, `c:`) are kept as literal attribute-name text, read through a
//! plain [`quick_xml::Reader`] rather than a namespace-aware one, so a
//! prefixed attribute is just another string key.
//!
//! These structs are intentionally "wider" than any one document needs:
//! optional fields default to `None`/`vec![]` via `#[serde(default)]`, so a
//! GIR file missing an element this schema names simply deserializes it
//! empty rather than erroring.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename = "repository")]
pub struct RawRepository {
    #[serde(rename = "include", default)]
    pub includes: Vec<RawInclude>,
    pub namespace: Option<RawNamespace>,
}

#[derive(Debug, Deserialize)]
pub struct RawInclude {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@version", default)]
    pub version: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawNamespace {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@version")]
    pub version: String,
    #[serde(rename = "enumeration", default)]
    pub enumerations: Vec<RawEnumeration>,
    #[serde(rename = "bitfield", default)]
    pub bitfields: Vec<RawEnumeration>,
    #[serde(rename = "constant", default)]
    pub constants: Vec<RawConstant>,
    #[serde(rename = "alias", default)]
    pub aliases: Vec<RawAlias>,
    #[serde(rename = "callback", default)]
    pub callbacks: Vec<RawCallable>,
    #[serde(rename = "function", default)]
    pub functions: Vec<RawCallable>,
    #[serde(rename = "class", default)]
    pub classes: Vec<RawClass>,
    #[serde(rename = "interface", default)]
    pub interfaces: Vec<RawInterface>,
    #[serde(rename = "record", default)]
    pub records: Vec<RawRecord>,
    #[serde(rename = "union", default)]
    pub unions: Vec<RawUnion>,
}

fn is_false(raw: &Option<String>) -> bool {
    raw.as_deref() == Some("0")
}

fn is_true(raw: &Option<String>) -> bool {
    matches!(raw.as_deref(), Some("1") | Some("true"))
}

/// §4.3/§6: a bare absent `introspectable` defaults to true.
pub fn introspectable_default_true(raw: &Option<String>) -> bool {
    !is_false(raw)
}

/// §4.2/§4.5: `nullable`/`allow-none` both signal optionality; either being
/// present and truthy is enough.
pub fn nullable_flag(nullable: &Option<String>, allow_none: &Option<String>) -> bool {
    is_true(nullable) || is_true(allow_none)
}

pub fn optional_flag(raw: &Option<String>) -> bool {
    is_true(raw)
}

#[derive(Debug, Deserialize)]
pub struct RawType {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,
    #[serde(rename = "@c:type", default)]
    pub c_type: Option<String>,
    /// Present only on `GLib.List`/`GLib.SList`/`GLib.PtrArray` container
    /// types, naming the element type (§3's `TypeShape::List`).
    #[serde(rename = "type", default)]
    pub nested: Option<Box<RawType>>,
}

#[derive(Debug, Deserialize)]
pub struct RawArray {
    #[serde(rename = "@length", default)]
    pub length: Option<String>,
    #[serde(rename = "@c:type", default)]
    pub c_type: Option<String>,
    #[serde(rename = "type", default)]
    pub element_type: Option<Box<RawType>>,
    #[serde(rename = "array", default)]
    pub element_array: Option<Box<RawArray>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawEnumeration {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@introspectable", default)]
    pub introspectable: Option<String>,
    #[serde(rename = "member", default)]
    pub members: Vec<RawMember>,
}

#[derive(Debug, Deserialize)]
pub struct RawMember {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@value", default)]
    pub value: Option<String>,
    #[serde(rename = "@glib:nick", default)]
    pub glib_nick: Option<String>,
    #[serde(rename = "@c:identifier", default)]
    pub c_identifier: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawConstant {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@value", default)]
    pub value: Option<String>,
    #[serde(rename = "@introspectable", default)]
    pub introspectable: Option<String>,
    #[serde(rename = "type", default)]
    pub ty: Option<RawType>,
    #[serde(rename = "array", default)]
    pub array: Option<RawArray>,
}

#[derive(Debug, Deserialize)]
pub struct RawAlias {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@introspectable", default)]
    pub introspectable: Option<String>,
    #[serde(rename = "type", default)]
    pub ty: Option<RawType>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawParameter {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,
    #[serde(rename = "@direction", default)]
    pub direction: Option<String>,
    #[serde(rename = "@nullable", default)]
    pub nullable: Option<String>,
    #[serde(rename = "@allow-none", default)]
    pub allow_none: Option<String>,
    #[serde(rename = "@optional", default)]
    pub optional: Option<String>,
    #[serde(rename = "@closure", default)]
    pub closure: Option<String>,
    #[serde(rename = "@destroy", default)]
    pub destroy: Option<String>,
    #[serde(rename = "type", default)]
    pub ty: Option<RawType>,
    #[serde(rename = "array", default)]
    pub array: Option<RawArray>,
    #[serde(rename = "callback", default)]
    pub callback: Option<Box<RawCallable>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawParameters {
    #[serde(rename = "instance-parameter", default)]
    pub instance_parameter: Option<RawParameter>,
    #[serde(rename = "parameter", default)]
    pub parameters: Vec<RawParameter>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawReturnValue {
    #[serde(rename = "@nullable", default)]
    pub nullable: Option<String>,
    #[serde(rename = "@allow-none", default)]
    pub allow_none: Option<String>,
    #[serde(rename = "type", default)]
    pub ty: Option<RawType>,
    #[serde(rename = "array", default)]
    pub array: Option<RawArray>,
    #[serde(rename = "callback", default)]
    pub callback: Option<Box<RawCallable>>,
}

/// Shared shape for `<function>`, `<method>`, `<constructor>`,
/// `<virtual-method>`, `<callback>` and `<glib:signal>` (§6): a name, an
/// optional parameter list, an optional return value, and the
/// shadows/shadowed-by annotations.
#[derive(Debug, Deserialize, Default)]
pub struct RawCallable {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@introspectable", default)]
    pub introspectable: Option<String>,
    #[serde(rename = "@shadowed-by", default)]
    pub shadowed_by: Option<String>,
    #[serde(rename = "@shadows", default)]
    pub shadows: Option<String>,
    #[serde(rename = "parameters", default)]
    pub parameters: Option<RawParameters>,
    #[serde(rename = "return-value", default)]
    pub return_value: Option<RawReturnValue>,
}

#[derive(Debug, Deserialize)]
pub struct RawField {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@private", default)]
    pub private: Option<String>,
    #[serde(rename = "@introspectable", default)]
    pub introspectable: Option<String>,
    #[serde(rename = "type", default)]
    pub ty: Option<RawType>,
    #[serde(rename = "array", default)]
    pub array: Option<RawArray>,
}

#[derive(Debug, Deserialize)]
pub struct RawProperty {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@writable", default)]
    pub writable: Option<String>,
    #[serde(rename = "@construct-only", default)]
    pub construct_only: Option<String>,
    #[serde(rename = "@private", default)]
    pub private: Option<String>,
    #[serde(rename = "@introspectable", default)]
    pub introspectable: Option<String>,
    #[serde(rename = "type", default)]
    pub ty: Option<RawType>,
    #[serde(rename = "array", default)]
    pub array: Option<RawArray>,
}

#[derive(Debug, Deserialize)]
pub struct RawImplements {
    #[serde(rename = "@name")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawPrerequisite {
    #[serde(rename = "@name")]
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawClass {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@parent", default)]
    pub parent: Option<String>,
    #[serde(rename = "@abstract", default)]
    pub is_abstract: Option<String>,
    #[serde(rename = "@introspectable", default)]
    pub introspectable: Option<String>,
    #[serde(rename = "implements", default)]
    pub implements: Vec<RawImplements>,
    #[serde(rename = "field", default)]
    pub fields: Vec<RawField>,
    #[serde(rename = "property", default)]
    pub properties: Vec<RawProperty>,
    #[serde(rename = "method", default)]
    pub methods: Vec<RawCallable>,
    #[serde(rename = "virtual-method", default)]
    pub virtual_methods: Vec<RawCallable>,
    #[serde(rename = "constructor", default)]
    pub constructors: Vec<RawCallable>,
    #[serde(rename = "function", default)]
    pub static_functions: Vec<RawCallable>,
    #[serde(rename = "glib:signal", default)]
    pub signals: Vec<RawCallable>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawInterface {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@introspectable", default)]
    pub introspectable: Option<String>,
    #[serde(rename = "prerequisite", default)]
    pub prerequisite: Vec<RawPrerequisite>,
    #[serde(rename = "property", default)]
    pub properties: Vec<RawProperty>,
    #[serde(rename = "method", default)]
    pub methods: Vec<RawCallable>,
    #[serde(rename = "virtual-method", default)]
    pub virtual_methods: Vec<RawCallable>,
    #[serde(rename = "glib:signal", default)]
    pub signals: Vec<RawCallable>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawRecord {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@introspectable", default)]
    pub introspectable: Option<String>,
    #[serde(rename = "@glib:is-gtype-struct-for", default)]
    pub is_gtype_struct_for: Option<String>,
    #[serde(rename = "field", default)]
    pub fields: Vec<RawField>,
    #[serde(rename = "method", default)]
    pub methods: Vec<RawCallable>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawUnion {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@introspectable", default)]
    pub introspectable: Option<String>,
    #[serde(rename = "field", default)]
    pub fields: Vec<RawField>,
    #[serde(rename = "method", default)]
    pub methods: Vec<RawCallable>,
}
