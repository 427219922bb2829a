//! Host capability contract
//!
//! One `Capability` implementation exists per host revision whose plugin API
//! differs from the previous one. The primops are written against this trait
//! only.

use lambdoc_host::{EvalError, EvalState, ExprLambda, Layout, PosOf, PrimOpFn, RegisterPrimOp, Value};

/// Normalized plugin API of one host revision
pub trait Capability: 'static {
    /// Memory layout of the targeted host
    type Layout: Layout;

    /// Host version string this implementation is written for
    const HOST_VERSION: &'static str;

    /// Set `v` to null
    fn make_null(v: &mut Value<Self::Layout>);

    /// Set `v` to a string equal to `text`
    fn make_string(v: &mut Value<Self::Layout>, text: &str);

    /// Fail with a type error unless `v` is a lambda
    fn validate_is_function(
        state: &mut EvalState<Self::Layout>,
        v: &Value<Self::Layout>,
        pos: &<Self::Layout as Layout>::PosRef,
    ) -> Result<(), EvalError>;

    /// Position where `lambda` itself is defined
    fn resolve_function_position(
        state: &EvalState<Self::Layout>,
        lambda: &ExprLambda<Self::Layout>,
    ) -> PosOf<Self::Layout>;

    /// Set `out` to the host's value describing `pos`
    fn build_position_value(
        state: &mut EvalState<Self::Layout>,
        out: &mut Value<Self::Layout>,
        pos: &<Self::Layout as Layout>::PosRef,
    );

    /// File name of `pos`, empty when it does not come from a file
    fn extract_file_path(pos: &PosOf<Self::Layout>) -> String;

    /// Descriptor for a primop in the shape this host expects
    fn register_primitive(
        name: &str,
        args: &[&str],
        docs: &str,
        fun: PrimOpFn<Self::Layout>,
    ) -> RegisterPrimOp<Self::Layout>;
}
