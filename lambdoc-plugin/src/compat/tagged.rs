//! Releases whose positions carry an `Origin`

use super::{NOT_A_LAMBDA, NOT_A_LAMBDA_AT};
use crate::capability::Capability;
use lambdoc_host::{
    hintfmt, ErrorKind, EvalError, EvalState, ExprLambda, Origin, Pos, PosIdx, PrimOp, PrimOpFn,
    RegisterPrimOp, Tagged, Value,
};

/// File name of a tagged position. Only real files have one; every other
/// origin comes back as an empty string.
fn file_of(origin: &Origin) -> String {
    match origin {
        Origin::Path(path) => path.to_string(),
        Origin::Stdin { .. } => String::new(),
        Origin::String { .. } => String::new(),
        Origin::None => String::new(),
    }
}

fn definition_pos(state: &EvalState<Tagged>, lambda: &ExprLambda<Tagged>) -> Pos<Origin> {
    state.positions[lambda.pos].clone()
}

/// Type error through the error builder, position attached as a trace
fn build_type_error(state: &mut EvalState<Tagged>, v: &Value<Tagged>, pos: &PosIdx) -> EvalError {
    let message = hintfmt(NOT_A_LAMBDA, &[&v.show_type()]);
    state.error(message).with_trace(pos, "").debug_throw(ErrorKind::Type)
}

/// 2.13.0: origins become a tagged union, type errors use the error builder
pub struct Rev2_13;

impl Capability for Rev2_13 {
    type Layout = Tagged;

    const HOST_VERSION: &'static str = "2.13.0";

    fn make_null(v: &mut Value<Tagged>) {
        v.mk_null();
    }

    fn make_string(v: &mut Value<Tagged>, text: &str) {
        v.mk_string(text);
    }

    fn validate_is_function(
        state: &mut EvalState<Tagged>,
        v: &Value<Tagged>,
        pos: &PosIdx,
    ) -> Result<(), EvalError> {
        if v.is_lambda() {
            Ok(())
        } else {
            Err(build_type_error(state, v, pos))
        }
    }

    fn resolve_function_position(state: &EvalState<Tagged>, lambda: &ExprLambda<Tagged>) -> Pos<Origin> {
        definition_pos(state, lambda)
    }

    fn build_position_value(state: &mut EvalState<Tagged>, out: &mut Value<Tagged>, pos: &PosIdx) {
        state.mk_pos(out, *pos);
    }

    fn extract_file_path(pos: &Pos<Origin>) -> String {
        file_of(&pos.origin)
    }

    fn register_primitive(
        name: &str,
        args: &[&str],
        _docs: &str,
        fun: PrimOpFn<Tagged>,
    ) -> RegisterPrimOp<Tagged> {
        RegisterPrimOp::positional(name, args.len(), fun)
    }
}

/// 2.13.1: the error builder was reverted to the state helper
pub struct Rev2_13_1;

impl Capability for Rev2_13_1 {
    type Layout = Tagged;

    const HOST_VERSION: &'static str = "2.13.1";

    fn make_null(v: &mut Value<Tagged>) {
        v.mk_null();
    }

    fn make_string(v: &mut Value<Tagged>, text: &str) {
        v.mk_string(text);
    }

    fn validate_is_function(
        state: &mut EvalState<Tagged>,
        v: &Value<Tagged>,
        pos: &PosIdx,
    ) -> Result<(), EvalError> {
        if v.is_lambda() {
            Ok(())
        } else {
            Err(state.throw_type_error(*pos, NOT_A_LAMBDA_AT, v))
        }
    }

    fn resolve_function_position(state: &EvalState<Tagged>, lambda: &ExprLambda<Tagged>) -> Pos<Origin> {
        definition_pos(state, lambda)
    }

    fn build_position_value(state: &mut EvalState<Tagged>, out: &mut Value<Tagged>, pos: &PosIdx) {
        state.mk_pos(out, *pos);
    }

    fn extract_file_path(pos: &Pos<Origin>) -> String {
        file_of(&pos.origin)
    }

    fn register_primitive(
        name: &str,
        args: &[&str],
        _docs: &str,
        fun: PrimOpFn<Tagged>,
    ) -> RegisterPrimOp<Tagged> {
        RegisterPrimOp::positional(name, args.len(), fun)
    }
}

/// 2.14: the error builder is back
pub struct Rev2_14;

impl Capability for Rev2_14 {
    type Layout = Tagged;

    const HOST_VERSION: &'static str = "2.14.0";

    fn make_null(v: &mut Value<Tagged>) {
        v.mk_null();
    }

    fn make_string(v: &mut Value<Tagged>, text: &str) {
        v.mk_string(text);
    }

    fn validate_is_function(
        state: &mut EvalState<Tagged>,
        v: &Value<Tagged>,
        pos: &PosIdx,
    ) -> Result<(), EvalError> {
        if v.is_lambda() {
            Ok(())
        } else {
            Err(build_type_error(state, v, pos))
        }
    }

    fn resolve_function_position(state: &EvalState<Tagged>, lambda: &ExprLambda<Tagged>) -> Pos<Origin> {
        definition_pos(state, lambda)
    }

    fn build_position_value(state: &mut EvalState<Tagged>, out: &mut Value<Tagged>, pos: &PosIdx) {
        state.mk_pos(out, *pos);
    }

    fn extract_file_path(pos: &Pos<Origin>) -> String {
        file_of(&pos.origin)
    }

    fn register_primitive(
        name: &str,
        args: &[&str],
        _docs: &str,
        fun: PrimOpFn<Tagged>,
    ) -> RegisterPrimOp<Tagged> {
        RegisterPrimOp::positional(name, args.len(), fun)
    }
}

/// 2.17: primops are registered with a structured `PrimOp` record
pub struct Rev2_17;

impl Capability for Rev2_17 {
    type Layout = Tagged;

    const HOST_VERSION: &'static str = "2.17.0";

    fn make_null(v: &mut Value<Tagged>) {
        v.mk_null();
    }

    fn make_string(v: &mut Value<Tagged>, text: &str) {
        v.mk_string(text);
    }

    fn validate_is_function(
        state: &mut EvalState<Tagged>,
        v: &Value<Tagged>,
        pos: &PosIdx,
    ) -> Result<(), EvalError> {
        if v.is_lambda() {
            Ok(())
        } else {
            Err(build_type_error(state, v, pos))
        }
    }

    fn resolve_function_position(state: &EvalState<Tagged>, lambda: &ExprLambda<Tagged>) -> Pos<Origin> {
        definition_pos(state, lambda)
    }

    fn build_position_value(state: &mut EvalState<Tagged>, out: &mut Value<Tagged>, pos: &PosIdx) {
        state.mk_pos(out, *pos);
    }

    fn extract_file_path(pos: &Pos<Origin>) -> String {
        file_of(&pos.origin)
    }

    fn register_primitive(
        name: &str,
        args: &[&str],
        docs: &str,
        fun: PrimOpFn<Tagged>,
    ) -> RegisterPrimOp<Tagged> {
        RegisterPrimOp::new(PrimOp {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            arity: args.len(),
            doc: Some(docs.to_string()),
            fun,
            experimental_feature: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdoc_host::SourcePath;

    fn at(origin: Origin) -> Pos<Origin> {
        Pos::new(origin, 1, 1)
    }

    #[test]
    fn test_only_files_have_a_path() {
        let file = at(Origin::Path(SourcePath::new("/tmp/x.nix")));
        assert_eq!(Rev2_13::extract_file_path(&file), "/tmp/x.nix");
        assert_eq!(Rev2_17::extract_file_path(&file), "/tmp/x.nix");
    }

    #[test]
    fn test_non_file_origins_collapse_to_empty() {
        // stdin, string and none all lose their identity here
        for origin in [
            Origin::Stdin { source: "x: x".into() },
            Origin::String { source: "x: x".into() },
            Origin::None,
        ] {
            assert_eq!(Rev2_14::extract_file_path(&at(origin)), "");
        }
    }

    #[test]
    fn test_builder_revisions_attach_trace_to_plain_message() {
        let mut state = EvalState::new().with_debugger();
        let call = state.file_pos("/call.nix", 2, 7);
        for err in [
            Rev2_13::validate_is_function(&mut state, &Value::Bool(true), &call).unwrap_err(),
            Rev2_14::validate_is_function(&mut state, &Value::Bool(true), &call).unwrap_err(),
            Rev2_17::validate_is_function(&mut state, &Value::Bool(true), &call).unwrap_err(),
        ] {
            assert_eq!(err.kind, ErrorKind::Type);
            assert_eq!(err.message, "value is a Boolean while a lambda was expected");
            assert_eq!(err.traces[0].pos, "/call.nix:2:7");
        }
        assert_eq!(state.debug_traces().len(), 3);
    }

    #[test]
    fn test_reverted_revision_uses_state_helper() {
        let mut state = EvalState::new().with_debugger();
        let call = state.file_pos("/call.nix", 2, 7);
        let err = Rev2_13_1::validate_is_function(&mut state, &Value::Null, &call).unwrap_err();
        assert_eq!(err.message, "/call.nix:2:7: value is null while a lambda was expected");
        assert!(state.debug_traces().is_empty());
    }
}
