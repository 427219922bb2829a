//! Release with interned positions and a plain file field

use super::NOT_A_LAMBDA_AT;
use crate::capability::Capability;
use lambdoc_host::{EvalError, EvalState, ExprLambda, Indexed, Pos, PosIdx, PrimOpFn, RegisterPrimOp, Value};

/// 2.9: positions become `PosIdx`, type errors go through the state
pub struct Rev2_9;

impl Capability for Rev2_9 {
    type Layout = Indexed;

    const HOST_VERSION: &'static str = "2.9.0";

    fn make_null(v: &mut Value<Indexed>) {
        v.mk_null();
    }

    fn make_string(v: &mut Value<Indexed>, text: &str) {
        v.mk_string(text);
    }

    fn validate_is_function(
        state: &mut EvalState<Indexed>,
        v: &Value<Indexed>,
        pos: &PosIdx,
    ) -> Result<(), EvalError> {
        if v.is_lambda() {
            Ok(())
        } else {
            Err(state.throw_type_error(*pos, NOT_A_LAMBDA_AT, v))
        }
    }

    fn resolve_function_position(state: &EvalState<Indexed>, lambda: &ExprLambda<Indexed>) -> Pos<String> {
        state.positions[lambda.pos].clone()
    }

    fn build_position_value(state: &mut EvalState<Indexed>, out: &mut Value<Indexed>, pos: &PosIdx) {
        state.mk_pos(out, *pos);
    }

    fn extract_file_path(pos: &Pos<String>) -> String {
        pos.origin.clone()
    }

    fn register_primitive(
        name: &str,
        args: &[&str],
        _docs: &str,
        fun: PrimOpFn<Indexed>,
    ) -> RegisterPrimOp<Indexed> {
        RegisterPrimOp::positional(name, args.len(), fun)
    }
}
