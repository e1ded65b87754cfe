use std::collections::HashMap;

use cinder_ir::{Function, LocalId};
use cinder_type::types::TypeStore;

/// The record-valued symbols of one function, in source order, with a dense
/// index per symbol. Bits in the flow sets correspond to entries here.
///
/// A symbol is tracked iff it is a local variable or formal parameter whose
/// type is a by-value record and not externally declared. Everything else
/// (class references, scalars, extern records) is invisible to the
/// analysis; the filter is silent.
pub struct TrackedSymbols {
  symbols: Vec<LocalId>,
  index: HashMap<LocalId, usize>,
}

impl TrackedSymbols {
  pub fn extract(
    func: &Function,
    types: &TypeStore,
  ) -> Self {
    let mut symbols = Vec::new();
    let mut index = HashMap::new();

    for (id, local) in func.locals.iter() {
      // Locals and parameters both qualify; the declaration store holds
      // nothing else.
      if !types.is_record(&local.ty) {
        continue;
      }
      if types.is_extern(&local.ty) {
        // Extern record types have no constructors or destructors.
        continue;
      }

      index.insert(id, symbols.len());
      symbols.push(id);
    }

    let tracked = Self { symbols, index };
    debug_assert!(
      tracked
        .symbols
        .iter()
        .enumerate()
        .all(|(k, id)| tracked.index[id] == k),
      "symbol index map must invert the symbol vector"
    );
    tracked
  }

  pub fn len(&self) -> usize {
    self.symbols.len()
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty()
  }

  /// Dense index of a tracked symbol; `None` for untracked symbols.
  pub fn index_of(
    &self,
    local: &LocalId,
  ) -> Option<usize> {
    self.index.get(local).copied()
  }

  pub fn symbol_at(
    &self,
    index: usize,
  ) -> LocalId {
    self.symbols[index]
  }
}

#[cfg(test)]
mod tests {
  use cinder_ir::FunctionBuilder;
  use cinder_type::types::TypeStore;

  use super::*;

  #[test]
  fn tracks_records_and_skips_everything_else() {
    let mut types = TypeStore::new();
    let class = types.class("Payload", vec![], false);
    let record = types.record("R", vec![class], false);
    let ext = types.record("E", vec![], true);

    let mut b = FunctionBuilder::new("f", types.void(), &types);
    let p = b.param("p", record);
    b.local("n", types.primitive(&cinder_type::types::Type::I32));
    let x = b.local("x", record);
    b.local("c", class);
    b.local("e", ext);
    let func = b.finish();

    let tracked = TrackedSymbols::extract(&func, &types);
    assert_eq!(tracked.len(), 2);
    assert_eq!(tracked.index_of(&p), Some(0));
    assert_eq!(tracked.index_of(&x), Some(1));
    assert_eq!(tracked.symbol_at(0), p);
    assert_eq!(tracked.symbol_at(1), x);
  }

  #[test]
  fn untracked_symbols_have_no_index() {
    let mut types = TypeStore::new();
    let class = types.class("C", vec![], false);

    let mut b = FunctionBuilder::new("f", types.void(), &types);
    let c = b.local("c", class);
    let func = b.finish();

    let tracked = TrackedSymbols::extract(&func, &types);
    assert!(tracked.is_empty());
    assert_eq!(tracked.index_of(&c), None);
  }
}
