use std::collections::HashMap;

use cinder_type::types::TypeId;

use crate::FunctionId;

/// Mapping from a record type to its destructor function.
///
/// Populated during resolution; read-only while the middle-end passes run.
#[derive(Debug, Clone, Default)]
pub struct DestructorRegistry {
  map: HashMap<TypeId, FunctionId>,
}

impl DestructorRegistry {
  pub fn new() -> Self {
    Self { map: HashMap::new() }
  }

  pub fn register(
    &mut self,
    ty: TypeId,
    destructor: FunctionId,
  ) {
    let previous = self.map.insert(ty, destructor);
    debug_assert!(previous.is_none(), "type already has a registered destructor");
  }

  pub fn lookup(
    &self,
    ty: &TypeId,
  ) -> Option<FunctionId> {
    self.map.get(ty).copied()
  }

  pub fn len(&self) -> usize {
    self.map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }
}
