//! External collaborators for one GIR document: the XML parser (`parse`),
//! the lowering step that turns its output into this crate's own model
//! (`lower`), and filesystem traversal to locate `<include>` dependencies
//! (`loader`). §1 calls these "out of scope" for the core; they are still
//! real modules here so the crate runs end to end, but `symbol_table`,
//! `inheritance_index`, `type_resolver`, `member_synthesizer`,
//! `overload_reconciler` and `namespace_emitter` only ever see their output
//! (`crate::model::Module`), never their internals.

pub mod lower;
pub mod loader;
pub mod parse;
pub mod raw;
