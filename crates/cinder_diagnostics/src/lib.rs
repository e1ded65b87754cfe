pub mod diagnostic_report;
pub mod message;

use std::fmt::Write;

use cinder_type::file::SourceMap;
use colored::*;

use diagnostic_report::{Diagnostic, Severity};

/// Console sink for diagnostics.
///
/// Renders `severity[code]: message`, the location arrow and a source
/// snippet resolved through the [`SourceMap`], then emits the result on
/// stderr. Rendering is separate from emission so it can be tested.
pub struct DiagnosticPrinter<'a> {
  source_map: &'a SourceMap,
}

impl<'a> DiagnosticPrinter<'a> {
  pub fn new(source_map: &'a SourceMap) -> Self {
    Self { source_map }
  }

  pub fn report(
    &self,
    diagnostics: &[Diagnostic],
  ) {
    for diagnostic in diagnostics {
      self.print(diagnostic);
    }
  }

  pub fn print(
    &self,
    diagnostic: &Diagnostic,
  ) {
    eprintln!("{}", self.render(diagnostic));
  }

  /// The full text emitted for one diagnostic.
  pub fn render(
    &self,
    diagnostic: &Diagnostic,
  ) -> String {
    let mut out = String::new();
    self.write_header(&mut out, diagnostic);
    self.write_body(&mut out, diagnostic);

    for note in &diagnostic.notes {
      writeln!(out, "{}: {}", "note".bold(), note).unwrap();
    }

    out
  }

  fn write_header(
    &self,
    out: &mut String,
    diagnostic: &Diagnostic,
  ) {
    let message = diagnostic.message.bold();
    let code = diagnostic.error_code.bold();

    let label = match diagnostic.severity {
      Severity::Info => format!("{}[{}]", "Info".blue().bold(), code.blue()),
      Severity::Warning => format!("{}[{}]", "Warning".yellow().bold(), code.yellow()),
      Severity::Error => format!("{}[{}]", "Error".red().bold(), code.red().bold()),
      Severity::Hint => format!("{}[{}]", "Hint".cyan().bold(), code.cyan()),
    };
    writeln!(out, "{}: {}", label, message).unwrap();
  }

  fn write_body(
    &self,
    out: &mut String,
    diagnostic: &Diagnostic,
  ) {
    let span = &diagnostic.primary_span;
    let file = self.source_map.get(&span.file);
    let (line, column) = self.source_map.line_col(&span.file, span.start);

    writeln!(
      out,
      "{:2}{} {}:{}:{}",
      "",
      "-->".blue().bold(),
      file.path.display().to_string().bold(),
      line.to_string().bold(),
      column.to_string().bold(),
    )
    .unwrap();
    writeln!(out, "{}", self.source_map.snippet(span)).unwrap();

    for label in &diagnostic.labels {
      writeln!(out, "{}", self.source_map.snippet(&label.span)).unwrap();
      writeln!(out, "     = {}", label.message).unwrap();
    }
  }
}
