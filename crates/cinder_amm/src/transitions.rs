use cinder_config::CinderConfig;
use cinder_dataflow::BitVec;
use cinder_diagnostics::diagnostic_report::Diagnostic;
use cinder_diagnostics::message::DiagnosticMessage;
use cinder_ir::{BasicBlock, Call, Callee, Expr, ExprId, Function, Primitive};
use cinder_type::types::TypeStore;

use crate::CalleeTable;
use crate::alias::AliasClasses;
use crate::extract::TrackedSymbols;

/// Scans the blocks of one function and computes each block's GEN and KILL
/// sets, merging alias classes as bit-wise copies are discovered.
///
/// The sets record the *net* effect of the block: a destruction cancels an
/// earlier in-block construction and a re-construction revives an earlier
/// in-block destruction, so `(IN - KILL) | GEN` is the ownership state on
/// block exit for any entry state IN.
pub struct TransitionComputer<'a> {
  func: &'a Function,
  types: &'a TypeStore,
  callees: &'a CalleeTable,
  tracked: &'a TrackedSymbols,
  aliases: &'a mut AliasClasses,
  config: &'a CinderConfig,
  diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> TransitionComputer<'a> {
  pub fn new(
    func: &'a Function,
    types: &'a TypeStore,
    callees: &'a CalleeTable,
    tracked: &'a TrackedSymbols,
    aliases: &'a mut AliasClasses,
    config: &'a CinderConfig,
    diagnostics: &'a mut Vec<Diagnostic>,
  ) -> Self {
    Self {
      func,
      types,
      callees,
      tracked,
      aliases,
      config,
      diagnostics,
    }
  }

  pub fn run(
    &mut self,
    blocks: &[BasicBlock],
    gens: &mut [BitVec],
    kills: &mut [BitVec],
  ) {
    for (i, block) in blocks.iter().enumerate() {
      for stmt in &block.stmts {
        self.scan_stmt(stmt, &mut gens[i], &mut kills[i]);
      }
    }
  }

  fn scan_stmt(
    &mut self,
    stmt: &ExprId,
    gen_set: &mut BitVec,
    kill_set: &mut BitVec,
  ) {
    // Labels, gotos and branches carry no ownership transitions.
    if let Expr::Call(call) = self.func.exprs.get(stmt) {
      self.scan_call(call, gen_set, kill_set);
    }
  }

  fn scan_call(
    &mut self,
    call: &Call,
    gen_set: &mut BitVec,
    kill_set: &mut BitVec,
  ) {
    match call.callee {
      Callee::Primitive(Primitive::Move) | Callee::Primitive(Primitive::Assign) => {
        self.scan_store(call, gen_set, kill_set);
      },
      Callee::Primitive(Primitive::Return) => {
        // Returning a symbol consumes it: the caller receives ownership.
        if let Some(arg) = call.args.first()
          && let Some(index) = self.tracked_sym(arg)
        {
          self.kill_class(index, gen_set, kill_set);
        }
      },
      Callee::Primitive(Primitive::Init) => {
        self.scan_operands(&call.args, gen_set, kill_set);
      },
      Callee::Resolved(callee) => {
        if self.callees.is_destructor(&callee) {
          assert_eq!(
            call.args.len(),
            1,
            "destructor call with {} operands in '{}'",
            call.args.len(),
            self.func.name
          );
          if let Some(index) = self.tracked_sym(&call.args[0]) {
            self.kill_class(index, gen_set, kill_set);
          }
        } else {
          // Ownership is never transferred into a callee; arguments that
          // must survive the call were copied upstream. Nested calls are
          // still visible to the scan.
          self.scan_operands(&call.args, gen_set, kill_set);
        }
      },
    }
  }

  fn scan_operands(
    &mut self,
    args: &[ExprId],
    gen_set: &mut BitVec,
    kill_set: &mut BitVec,
  ) {
    let func = self.func;
    for arg in args {
      if let Expr::Call(nested) = func.exprs.get(arg) {
        self.scan_call(nested, gen_set, kill_set);
      }
    }
  }

  /// A `move`/`assign` primitive. Two shapes matter: a constructor call
  /// into a tracked symbol, and a bit-wise copy between tracked symbols.
  fn scan_store(
    &mut self,
    call: &Call,
    gen_set: &mut BitVec,
    kill_set: &mut BitVec,
  ) {
    let func = self.func;
    assert_eq!(
      call.args.len(),
      2,
      "store primitive with {} operands in '{}'",
      call.args.len(),
      func.name
    );
    let lhs = &call.args[0];
    let rhs = &call.args[1];

    if let Some(lhs_index) = self.tracked_sym(lhs) {
      match func.exprs.get(rhs) {
        Expr::Call(rhs_call) => {
          if self.is_constructor(rhs_call) {
            assert!(
              !gen_set.get(lhs_index),
              "symbol '{}' constructed twice without an intervening destruction in '{}'",
              self.symbol_name(lhs_index),
              func.name
            );
            gen_set.set(lhs_index);
            // Re-construction after an in-block destruction revives the slot.
            kill_set.clear(lhs_index);
          }
          self.scan_call(rhs_call, gen_set, kill_set);
        },
        Expr::SymRef(rhs_local) => {
          if let Some(rhs_index) = self.tracked.index_of(rhs_local) {
            self.bitwise_copy(lhs_index, rhs_index, gen_set, kill_set);
          }
        },
        _ => {},
      }
    } else if let Expr::Call(rhs_call) = func.exprs.get(rhs) {
      // Untracked destination; nested calls are still visible to the scan.
      self.scan_call(rhs_call, gen_set, kill_set);
    }
  }

  /// `move lhs, rhs` between two tracked symbols. The copy shares ownership
  /// rather than creating an independent value: the upstream copy-insertion
  /// pass already materialized every copy that needed its own identity.
  fn bitwise_copy(
    &mut self,
    lhs: usize,
    rhs: usize,
    gen_set: &mut BitVec,
    kill_set: &mut BitVec,
  ) {
    assert!(
      !gen_set.get(lhs),
      "bit-wise copy onto owned symbol '{}' in '{}'",
      self.symbol_name(lhs),
      self.func.name
    );

    if gen_set.get(rhs) {
      gen_set.set(lhs);
      kill_set.clear(lhs);
    } else if self.config.warn_ownership {
      let symbol = self.tracked.symbol_at(rhs);
      let data = self.func.locals.get(&symbol);
      self
        .diagnostics
        .push(
          DiagnosticMessage::UninitializedCopy {
            name: self.func.local_name(&symbol).to_string(),
            at: data.span.clone(),
          }
          .report(),
        );
    }

    // Aliasing is structural: merge whether or not the source is live.
    self.aliases.merge(rhs, lhs);
  }

  /// A destruction of `symbol` releases the heap resource shared by its
  /// whole alias class.
  fn kill_class(
    &mut self,
    symbol: usize,
    gen_set: &mut BitVec,
    kill_set: &mut BitVec,
  ) {
    for &member in self.aliases.class_of(symbol) {
      assert!(
        !kill_set.get(member),
        "symbol '{}' destroyed twice within one block in '{}'",
        self.func.local_name(&self.tracked.symbol_at(member)),
        self.func.name
      );
      kill_set.set(member);
      // Destruction cancels an earlier in-block construction.
      gen_set.clear(member);
    }
  }

  fn tracked_sym(
    &self,
    expr: &ExprId,
  ) -> Option<usize> {
    match self.func.exprs.get(expr) {
      Expr::SymRef(local) => self.tracked.index_of(local),
      _ => None,
    }
  }

  /// Any call producing a non-class value is treated as constructing its
  /// destination. Approximate; a dedicated constructor flag is the
  /// eventual replacement.
  fn is_constructor(
    &self,
    call: &Call,
  ) -> bool {
    match call.callee {
      Callee::Resolved(callee) => !self.types.is_class(&self.callees.return_type(&callee)),
      Callee::Primitive(_) => !self.types.is_class(&call.ty),
    }
  }

  fn symbol_name(
    &self,
    index: usize,
  ) -> &str {
    self.func.local_name(&self.tracked.symbol_at(index))
  }
}
