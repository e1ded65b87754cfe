pub mod builder;
pub mod cfg;
pub mod display;
pub mod expr;
pub mod program;
pub mod registry;

use cinder_type::Id;

pub use builder::FunctionBuilder;
pub use cfg::{BasicBlock, build_basic_blocks};
pub use expr::{Call, Callee, Expr, Primitive};
pub use program::{Function, IrProgram, LabelData, LocalData, LocalKind};
pub use registry::DestructorRegistry;

/// Unique identifier for an expression within a function.
pub type ExprId = Id<Expr>;

/// Unique identifier for a named symbol within a function.
pub type LocalId = Id<LocalData>;

/// Unique identifier for a jump target within a function.
pub type LabelId = Id<LabelData>;

/// Unique identifier for a function within a program.
pub type FunctionId = Id<Function>;
