//! Automatic memory management: destructor insertion.
//!
//! Record objects are inline aggregates that may own heap data through
//! their class-typed fields. Constructing a record makes it the owner of
//! that data; calling the record's destructor releases it. A bit-wise copy
//! of a record copies the class fields verbatim, so both variables point at
//! the same heap data and ownership is shared: exactly one member of such
//! an alias set must be destroyed before the last of them goes out of
//! scope, and the others must not be.
//!
//! The input IR already carries every copy-constructor call the language
//! semantics demand, so the remaining work is placing the minimum number of
//! destructor calls that drives the ownership of every local record to
//! false on every path out of the function. Per block we compute GEN (the
//! symbols whose ownership becomes true) and KILL (the symbols whose
//! ownership becomes false, spread across alias classes), run forward
//! dataflow to learn which symbols are reliably owned on entry to each
//! block, and then compare each block's exit state against what its
//! successors can actually rely on. Whatever is owned but not relied upon
//! is destroyed at the end of that block: if ownership escapes on one path
//! (a consuming `return`, an explicit destruction), the other paths get the
//! destructor calls pushed back up the flow graph.
//!
//! Copy insertion is the planned second half of this pass; today the entry
//! point assumes copies are already present and only inserts destructors.

pub mod alias;
pub mod extract;
pub mod insert;
pub mod transitions;

use std::collections::HashMap;

use cinder_config::{CinderConfig, DebugTrace};
use cinder_dataflow::{BitVec, forward_flow};
use cinder_diagnostics::diagnostic_report::Diagnostic;
use cinder_ir::{
  BasicBlock, DestructorRegistry, Function, FunctionId, IrProgram, build_basic_blocks,
};
use cinder_log::{log_dbg, log_trc, trace_dbg};
use cinder_type::{Store, types::{TypeId, TypeStore}};

use alias::AliasClasses;
use extract::TrackedSymbols;
use insert::insert_auto_destroy;
use transitions::TransitionComputer;

/// Callee signatures snapshotted before any function is mutated, so the
/// transition computer can classify calls while the subject function is
/// being rewritten.
pub struct CalleeTable {
  signatures: HashMap<FunctionId, CalleeSignature>,
}

struct CalleeSignature {
  return_type: TypeId,
  is_destructor: bool,
}

impl CalleeTable {
  pub fn build(functions: &Store<Function>) -> Self {
    let signatures = functions
      .iter()
      .map(|(id, func)| {
        (
          id,
          CalleeSignature {
            return_type: func.return_type,
            is_destructor: func.is_destructor,
          },
        )
      })
      .collect();
    Self { signatures }
  }

  pub fn is_destructor(
    &self,
    id: &FunctionId,
  ) -> bool {
    self.signatures[id].is_destructor
  }

  pub fn return_type(
    &self,
    id: &FunctionId,
  ) -> TypeId {
    self.signatures[id].return_type
  }
}

/// Insert automatic copies and destructions across the whole program.
///
/// Copy insertion is a future enhancement; today this inserts the
/// destructor calls that drive every record's ownership to false on every
/// path out of each function. Functions are transformed in place;
/// prototypes are skipped. Returns the diagnostics the analysis produced.
pub fn insert_auto_copy_auto_destroy(
  program: &mut IrProgram,
  types: &TypeStore,
  config: &CinderConfig,
) -> Vec<Diagnostic> {
  let mut diagnostics = Vec::new();
  let callees = CalleeTable::build(&program.functions);
  let ids: Vec<FunctionId> = program.functions.ids().collect();

  let IrProgram {
    functions,
    destructors,
  } = program;

  let mut processed = 0usize;
  for id in ids {
    let func = functions.get_mut(&id);
    if func.is_prototype() {
      continue;
    }
    process_function(func, destructors, types, config, &callees, &mut diagnostics);
    processed += 1;
  }

  log_dbg!(
    config,
    "auto-destroy: {} functions processed, {} diagnostics",
    processed,
    diagnostics.len(),
  );

  diagnostics
}

/// Run the analysis and insertion for one function. All temporaries are
/// scoped to this call.
fn process_function(
  func: &mut Function,
  destructors: &DestructorRegistry,
  types: &TypeStore,
  config: &CinderConfig,
  callees: &CalleeTable,
  diagnostics: &mut Vec<Diagnostic>,
) {
  let blocks = build_basic_blocks(func);
  let tracked = TrackedSymbols::extract(func, types);

  trace_dbg!(
    config,
    DebugTrace::Amm,
    "{}: {} blocks, {} tracked record symbols",
    func.name,
    blocks.len(),
    tracked.len(),
  );

  if tracked.is_empty() {
    return;
  }

  let width = tracked.len();
  let mut aliases = AliasClasses::new(width);
  let mut gens = vec![BitVec::new(width); blocks.len()];
  let mut kills = vec![BitVec::new(width); blocks.len()];

  TransitionComputer::new(func, types, callees, &tracked, &mut aliases, config, diagnostics)
    .run(&blocks, &mut gens, &mut kills);

  let preds: Vec<Vec<usize>> = blocks.iter().map(|block| block.preds.clone()).collect();
  let flow = forward_flow(&preds, &gens, &kills, width);
  let required = exit_constraints(&blocks, &flow.ins, width);

  let inserted = insert_auto_destroy(
    func,
    types,
    destructors,
    &blocks,
    &tracked,
    &aliases,
    &flow.outs,
    &required,
  );
  log_trc!(config, "{}: {} destructor calls inserted", func.name, inserted);
}

/// The ownership each block's successors can rely on: the intersection of
/// their IN sets, computed in a single backward sweep. Exit blocks get the
/// empty set - nothing may remain owned when the function returns - which
/// is what forces destructors for anything still live there.
fn exit_constraints(
  blocks: &[BasicBlock],
  ins: &[BitVec],
  width: usize,
) -> Vec<BitVec> {
  blocks
    .iter()
    .map(|block| {
      if block.succs.is_empty() {
        BitVec::new(width)
      } else {
        let mut required = BitVec::ones(width);
        for &succ in &block.succs {
          required.intersect_with(&ins[succ]);
        }
        required
      }
    })
    .collect()
}
