use cinder_type::span::Span;

use crate::diagnostic_report::{Diagnostic, Severity};

/// Catalog of diagnostics the middle end can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticMessage {
  // #region Ownership
  /// A bit-wise copy reads a symbol that is not currently owned.
  UninitializedCopy {
    name: String,
    at: Span,
  },
  // #endregion Ownership
}

impl DiagnosticMessage {
  pub fn code(&self) -> String {
    match self {
      DiagnosticMessage::UninitializedCopy { .. } => "AMM0001".to_string(),
    }
  }

  pub fn level(&self) -> Severity {
    match self {
      DiagnosticMessage::UninitializedCopy { .. } => Severity::Warning,
    }
  }

  pub fn primary_span(&self) -> Span {
    match self {
      DiagnosticMessage::UninitializedCopy { at, .. } => at.clone(),
    }
  }

  pub fn report(&self) -> Diagnostic {
    Diagnostic::new(self.level(), self.to_string(), self.code(), self.primary_span())
  }

  pub fn report_with_severity(
    &self,
    severity: Severity,
  ) -> Diagnostic {
    Diagnostic::new(severity, self.to_string(), self.code(), self.primary_span())
  }
}

impl std::fmt::Display for DiagnosticMessage {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    match self {
      DiagnosticMessage::UninitializedCopy { name, .. } => {
        write!(f, "Uninitialized symbol '{}' is copied here", name)
      },
    }
  }
}
