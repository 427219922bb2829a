//! lambdoc Host - The evaluator surface plugins are written against
//!
//! This crate models the parts of the embeddable evaluator that a native
//! plugin touches:
//! - `Value`: Runtime values (null, strings, sets, lambdas, thunks, ...)
//! - `Pos` / `PosTable`: Source positions, inline or interned
//! - `EvalState`: Forcing, error conventions, position values, builtins
//! - `RegisterPrimOp`: Primop descriptors in both historical shapes
//! - `EvalError`: Evaluation errors with position traces
//!
//! The evaluator changed its in-memory layout across releases. Each layout
//! is a `Layout` type, and every host type is generic over it.

mod error;
mod eval;
mod layout;
pub mod legacy;
mod pos;
mod primop;
mod value;

pub use error::{hintfmt, ErrorKind, EvalError, Trace};
pub use eval::{ErrorBuilder, EvalState, Ptr};
pub use layout::{Classic, Indexed, Layout, PosSource, Tagged};
pub use pos::{Origin, Pos, PosIdx, PosTable, SourcePath, NO_POS};
pub use primop::{ExperimentalFeature, PrimOp, PrimOpDoc, PrimOpFn, RegisterPrimOp};
pub use value::{ExprLambda, HostStr, Thunk, Value};

/// Version this host reports when none is set at build time.
pub const DEFAULT_VERSION: &str = "2.17.0";

/// Version string the running host reports about itself.
pub fn version() -> &'static str {
    option_env!("LAMBDOC_HOST_VERSION").unwrap_or(DEFAULT_VERSION)
}

/// Resolved position type for a layout
pub type PosOf<L> = Pos<<L as Layout>::Source>;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ErrorKind, EvalError, EvalState, ExprLambda, Layout, Pos, PosIdx, PosOf, PosSource,
        RegisterPrimOp, Value,
    };
}
