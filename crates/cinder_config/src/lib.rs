use serde::{Deserialize, Serialize};

/// Per-stage debug trace categories, enabled individually via
/// `CinderConfig::debug_trace`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebugTrace {
  Cfg,
  Flow,
  Amm,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputLevel {
  Quiet,
  #[default]
  Detailed,
  Verbose,
}

/// Process-wide compiler configuration.
///
/// Stages never read ambient globals; the driver constructs one of these and
/// passes it by reference into every pass entry point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CinderConfig {
  pub quiet: bool,
  pub verbose: u8,
  pub debug: bool,
  #[serde(default)]
  pub debug_trace: Vec<DebugTrace>,
  #[serde(default)]
  pub output_level: OutputLevel,
  /// Warn when a bit-wise copy reads a symbol that is not currently owned.
  /// Off by default.
  #[serde(default)]
  pub warn_ownership: bool,
}

impl CinderConfig {
  pub fn new_basic(
    quiet: bool,
    verbose: u8,
  ) -> Self {
    Self {
      quiet,
      verbose,
      ..Self::default()
    }
  }

  pub fn with_warn_ownership(mut self) -> Self {
    self.warn_ownership = true;
    self
  }
}
