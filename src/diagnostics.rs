//! Diagnostic collection: a severity/category-tagged code plus a free-text
//! message, accumulated in an order-preserving collection and logged
//! through the `log` crate, one line per event, tagged with the owning
//! module's package name (§6).

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// One diagnostic code per §7 error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    DuplicateSymbol,
    UnresolvedType,
    CircularInheritance,
    RecursionDepthExceeded,
    DependencyNotFound,
    DuplicateConstantExport,
    BadFunctionDefinition,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::DuplicateSymbol => "duplicate-symbol",
            DiagnosticCode::UnresolvedType => "unresolved-type",
            DiagnosticCode::CircularInheritance => "circular-inheritance",
            DiagnosticCode::RecursionDepthExceeded => "recursion-depth-exceeded",
            DiagnosticCode::DependencyNotFound => "dependency-not-found",
            DiagnosticCode::DuplicateConstantExport => "duplicate-constant-export",
            DiagnosticCode::BadFunctionDefinition => "bad-function-definition",
        }
    }

    /// Every kind in §7 is a warning; the only fatal kind (missing
    /// namespace) is not a `Diagnostic` at all — it is a [`crate::error::GirError`].
    pub fn severity(&self) -> DiagnosticSeverity {
        DiagnosticSeverity::Warning
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: DiagnosticSeverity,
    pub message: String,
    /// Package name (`<namespace>-<version>`) of the module the
    /// diagnostic was raised for, per §6's tagging requirement.
    pub module: String,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, module: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            module: module.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.module, self.code.as_str(), self.message)
    }
}

/// Order-preserving collection of diagnostics raised over the course of a
/// run. Non-fatal kinds accumulate here; the CLI reports a summary count
/// and, with `--verbose`, the full list via `log`.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic without logging it — the CLI decides whether
    /// to print per-diagnostic lines (`--verbose`) or just the end-of-run
    /// summary count (§6).
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_accumulates_in_order() {
        let mut diags = DiagnosticCollection::new();
        diags.add(Diagnostic::new(DiagnosticCode::DuplicateSymbol, "Gtk-4.0", "Gtk.Widget"));
        diags.add(Diagnostic::new(DiagnosticCode::UnresolvedType, "Gtk-4.0", "Gtk.Frobnicator"));
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.diagnostics[0].code.as_str(), "duplicate-symbol");
        assert!(!diags.has_errors());
    }
}
