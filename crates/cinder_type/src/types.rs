use std::collections::HashMap;

use crate::{Id, Store};

pub type TypeId = Id<Type>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
  I8,
  I16,
  I32,
  I64,
  U8,
  U16,
  U32,
  U64,
  F32,
  F64,
  Boolean,
  Char,
  Void,
  Never,
  Unknown,

  /// By-value aggregate. May own heap data through class-typed fields, so
  /// values of this type carry ownership the AMM passes must track.
  Record(AggregateData),

  /// Reference aggregate. Values are pointers; copies alias by construction
  /// and are invisible to ownership tracking.
  Class(AggregateData),

  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateData {
  pub name: String,
  pub fields: Vec<TypeId>,
  /// Externally-declared aggregates have no constructors or destructors.
  pub is_extern: bool,
}

/// Interning store for types. Primitives are allocated once up front;
/// aggregates get a fresh id per declaration.
#[derive(Debug, Clone)]
pub struct TypeStore {
  types: Store<Type>,
  primitives: HashMap<Type, TypeId>,
}

impl TypeStore {
  pub fn new() -> Self {
    let mut store = Self {
      types: Store::new(),
      primitives: HashMap::new(),
    };
    store.init_primitives();
    store
  }

  fn init_primitives(&mut self) {
    let primitives = [
      Type::I8,
      Type::I16,
      Type::I32,
      Type::I64,
      Type::U8,
      Type::U16,
      Type::U32,
      Type::U64,
      Type::F32,
      Type::F64,
      Type::Boolean,
      Type::Char,
      Type::Void,
      Type::Never,
      Type::Unknown,
      Type::Error,
    ];

    for ty in primitives {
      let id = self.types.alloc(ty.clone());
      self.primitives.insert(ty, id);
    }
  }

  pub fn get(
    &self,
    id: &TypeId,
  ) -> &Type {
    self.types.get(id)
  }

  /// Id of an interned primitive type.
  ///
  /// # Panics
  /// Panics if `ty` is not a primitive.
  pub fn primitive(
    &self,
    ty: &Type,
  ) -> TypeId {
    *self
      .primitives
      .get(ty)
      .unwrap_or_else(|| panic!("{ty:?} is not an interned primitive"))
  }

  pub fn void(&self) -> TypeId {
    self.primitive(&Type::Void)
  }

  pub fn boolean(&self) -> TypeId {
    self.primitive(&Type::Boolean)
  }

  pub fn record(
    &mut self,
    name: &str,
    fields: Vec<TypeId>,
    is_extern: bool,
  ) -> TypeId {
    self.types.alloc(Type::Record(AggregateData {
      name: name.to_string(),
      fields,
      is_extern,
    }))
  }

  pub fn class(
    &mut self,
    name: &str,
    fields: Vec<TypeId>,
    is_extern: bool,
  ) -> TypeId {
    self.types.alloc(Type::Class(AggregateData {
      name: name.to_string(),
      fields,
      is_extern,
    }))
  }

  pub fn is_record(
    &self,
    id: &TypeId,
  ) -> bool {
    matches!(self.get(id), Type::Record(_))
  }

  pub fn is_class(
    &self,
    id: &TypeId,
  ) -> bool {
    matches!(self.get(id), Type::Class(_))
  }

  pub fn is_aggregate(
    &self,
    id: &TypeId,
  ) -> bool {
    matches!(self.get(id), Type::Record(_) | Type::Class(_))
  }

  pub fn is_extern(
    &self,
    id: &TypeId,
  ) -> bool {
    match self.get(id) {
      Type::Record(data) | Type::Class(data) => data.is_extern,
      _ => false,
    }
  }

  pub fn format_type_name(
    &self,
    id: &TypeId,
  ) -> String {
    match self.get(id) {
      Type::Record(data) | Type::Class(data) => data.name.clone(),
      other => format!("{other:?}"),
    }
  }
}

impl Default for TypeStore {
  fn default() -> Self {
    Self::new()
  }
}
