use std::collections::HashSet;

use cinder_dataflow::BitVec;
use cinder_ir::{BasicBlock, Call, Callee, DestructorRegistry, Expr, Function};
use cinder_type::types::TypeStore;

use crate::alias::AliasClasses;
use crate::extract::TrackedSymbols;

/// Splice destructor calls into the function body.
///
/// A block must release exactly the symbols that are owned on its exit
/// (`owned_at_exit`, the forward-flow OUT) but that downstream blocks cannot
/// rely on (`required_at_exit`, the intersection of successor INs). One call
/// is synthesized per residual alias class - destroying any member releases
/// the shared resource for all of them - on the lowest-indexed member, in
/// ascending symbol order. The calls go immediately before the block's
/// final statement when it is a jump, immediately after it otherwise.
/// Returns the number of calls spliced in.
pub fn insert_auto_destroy(
  func: &mut Function,
  types: &TypeStore,
  destructors: &DestructorRegistry,
  blocks: &[BasicBlock],
  tracked: &TrackedSymbols,
  aliases: &AliasClasses,
  owned_at_exit: &[BitVec],
  required_at_exit: &[BitVec],
) -> usize {
  let mut inserted = 0;
  let void_ty = types.void();
  let Function {
    name,
    locals,
    exprs,
    body,
    ..
  } = func;
  let Some(body) = body else {
    return inserted;
  };

  for (i, block) in blocks.iter().enumerate() {
    let mut residual = owned_at_exit[i].clone();
    residual.subtract(&required_at_exit[i]);
    if !residual.any() {
      continue;
    }

    // Degenerate blocks have nothing to anchor an insertion to.
    let Some(&anchor) = block.stmts.last() else {
      continue;
    };

    let is_jump = exprs.get(&anchor).is_jump();
    let anchor_pos = body
      .iter()
      .position(|&stmt| stmt == anchor)
      .unwrap_or_else(|| panic!("block statement missing from the body of '{}'", name));
    let mut insert_at = if is_jump { anchor_pos } else { anchor_pos + 1 };

    let mut destroyed_classes: HashSet<usize> = HashSet::new();
    for index in residual.iter_ones() {
      if aliases
        .class_of(index)
        .iter()
        .any(|&member| required_at_exit[i].get(member))
      {
        // An alias of this symbol is still relied upon downstream; its
        // eventual destruction releases the shared resource.
        continue;
      }
      if !destroyed_classes.insert(aliases.class_id(index)) {
        // A lower-indexed member of the same class already releases the
        // shared resource.
        continue;
      }

      let symbol = tracked.symbol_at(index);
      let ty = locals.get(&symbol).ty;
      let destructor = destructors.lookup(&ty).unwrap_or_else(|| {
        panic!(
          "no destructor registered for record type '{}' in '{}'",
          types.format_type_name(&ty),
          name
        )
      });

      let arg = exprs.alloc(Expr::SymRef(symbol));
      let call = exprs.alloc(Expr::Call(Call {
        callee: Callee::Resolved(destructor),
        args: vec![arg],
        ty: void_ty,
      }));
      body.insert(insert_at, call);
      insert_at += 1;
      inserted += 1;
    }
  }

  inserted
}
