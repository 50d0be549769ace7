//! Fatal error type for the one unrecoverable condition in §7: a GIR
//! document with no `<namespace>` element. Everything else is a
//! [`crate::diagnostics::Diagnostic`] and is recovered locally.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GirError {
    #[error("{path}: no <namespace> element found")]
    MissingNamespace { path: PathBuf },

    #[error("{path}: failed to read file")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: malformed XML")]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("{path}: failed to deserialize GIR document")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: quick_xml::de::DeError,
    },

    #[error("dependency '{namespace}-{version}' was not found on any gir-directories search path")]
    DependencyNotFound { namespace: String, version: String },
}
