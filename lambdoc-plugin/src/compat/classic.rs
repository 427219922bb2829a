//! Releases with inline positions and a plain file field

use super::NOT_A_LAMBDA_AT;
use crate::capability::Capability;
use lambdoc_host::{
    legacy, Classic, EvalError, EvalState, ExprLambda, Pos, PrimOpFn, Ptr, RegisterPrimOp, Value,
};

/// Copy `text` into storage that lives until the process exits.
///
/// These hosts keep the borrowed pointer for good, so the copy is never freed.
fn retain(text: &str) -> &'static str {
    Box::leak(text.to_owned().into_boxed_str())
}

fn positional(name: &str, args: &[&str], fun: PrimOpFn<Classic>) -> RegisterPrimOp<Classic> {
    RegisterPrimOp::positional(name, args.len(), fun)
}

/// 2.3: free functions everywhere, `mk_pos` takes a raw pointer
pub struct Rev2_3;

impl Capability for Rev2_3 {
    type Layout = Classic;

    const HOST_VERSION: &'static str = "2.3.0";

    fn make_null(v: &mut Value<Classic>) {
        legacy::mk_null(v);
    }

    fn make_string(v: &mut Value<Classic>, text: &str) {
        legacy::mk_string(v, retain(text));
    }

    fn validate_is_function(
        _state: &mut EvalState<Classic>,
        v: &Value<Classic>,
        pos: &Pos<String>,
    ) -> Result<(), EvalError> {
        if v.is_lambda() {
            Ok(())
        } else {
            Err(legacy::throw_type_error(NOT_A_LAMBDA_AT, v, pos))
        }
    }

    fn resolve_function_position(
        _state: &EvalState<Classic>,
        lambda: &ExprLambda<Classic>,
    ) -> Pos<String> {
        lambda.pos.clone()
    }

    fn build_position_value(state: &mut EvalState<Classic>, out: &mut Value<Classic>, pos: &Pos<String>) {
        // SAFETY: `pos` is a live reference for the duration of the call.
        unsafe { state.mk_pos_raw(out, pos) }
    }

    fn extract_file_path(pos: &Pos<String>) -> String {
        pos.origin.clone()
    }

    fn register_primitive(
        name: &str,
        args: &[&str],
        _docs: &str,
        fun: PrimOpFn<Classic>,
    ) -> RegisterPrimOp<Classic> {
        positional(name, args, fun)
    }
}

/// 2.4: position-first type errors, `mk_pos` takes a `Ptr`
pub struct Rev2_4;

impl Capability for Rev2_4 {
    type Layout = Classic;

    const HOST_VERSION: &'static str = "2.4.0";

    fn make_null(v: &mut Value<Classic>) {
        legacy::mk_null(v);
    }

    fn make_string(v: &mut Value<Classic>, text: &str) {
        legacy::mk_string(v, retain(text));
    }

    fn validate_is_function(
        _state: &mut EvalState<Classic>,
        v: &Value<Classic>,
        pos: &Pos<String>,
    ) -> Result<(), EvalError> {
        if v.is_lambda() {
            Ok(())
        } else {
            Err(legacy::throw_type_error_at(pos, NOT_A_LAMBDA_AT, v))
        }
    }

    fn resolve_function_position(
        _state: &EvalState<Classic>,
        lambda: &ExprLambda<Classic>,
    ) -> Pos<String> {
        lambda.pos.clone()
    }

    fn build_position_value(state: &mut EvalState<Classic>, out: &mut Value<Classic>, pos: &Pos<String>) {
        state.mk_pos_ptr(out, Ptr::new(pos));
    }

    fn extract_file_path(pos: &Pos<String>) -> String {
        pos.origin.clone()
    }

    fn register_primitive(
        name: &str,
        args: &[&str],
        _docs: &str,
        fun: PrimOpFn<Classic>,
    ) -> RegisterPrimOp<Classic> {
        positional(name, args, fun)
    }
}

/// 2.6: value methods, strings are copied by the host
pub struct Rev2_6;

impl Capability for Rev2_6 {
    type Layout = Classic;

    const HOST_VERSION: &'static str = "2.6.0";

    fn make_null(v: &mut Value<Classic>) {
        v.mk_null();
    }

    fn make_string(v: &mut Value<Classic>, text: &str) {
        v.mk_string(text);
    }

    fn validate_is_function(
        _state: &mut EvalState<Classic>,
        v: &Value<Classic>,
        pos: &Pos<String>,
    ) -> Result<(), EvalError> {
        if v.is_lambda() {
            Ok(())
        } else {
            Err(legacy::throw_type_error_at(pos, NOT_A_LAMBDA_AT, v))
        }
    }

    fn resolve_function_position(
        _state: &EvalState<Classic>,
        lambda: &ExprLambda<Classic>,
    ) -> Pos<String> {
        lambda.pos.clone()
    }

    fn build_position_value(state: &mut EvalState<Classic>, out: &mut Value<Classic>, pos: &Pos<String>) {
        state.mk_pos_ptr(out, Ptr::new(pos));
    }

    fn extract_file_path(pos: &Pos<String>) -> String {
        pos.origin.clone()
    }

    fn register_primitive(
        name: &str,
        args: &[&str],
        _docs: &str,
        fun: PrimOpFn<Classic>,
    ) -> RegisterPrimOp<Classic> {
        positional(name, args, fun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdoc_host::{ErrorKind, HostStr};

    #[test]
    fn test_retained_strings_outlive_the_source() {
        let mut v = Value::Null;
        {
            let text = String::from("Computes the thing.");
            Rev2_3::make_string(&mut v, &text);
        }
        assert!(v.as_host_str().is_some_and(HostStr::is_retained));
        assert_eq!(v.as_str(), Some("Computes the thing."));
    }

    #[test]
    fn test_2_6_copies_strings() {
        let mut v = Value::Null;
        Rev2_6::make_string(&mut v, "doc");
        assert!(!v.as_host_str().is_some_and(HostStr::is_retained));
    }

    #[test]
    fn test_type_error_renders_position_into_message() {
        let mut state = EvalState::new();
        let pos = Pos::new("/call.nix".to_string(), 4, 9);
        for err in [
            Rev2_3::validate_is_function(&mut state, &Value::Int(1), &pos).unwrap_err(),
            Rev2_4::validate_is_function(&mut state, &Value::Int(1), &pos).unwrap_err(),
            Rev2_6::validate_is_function(&mut state, &Value::Int(1), &pos).unwrap_err(),
        ] {
            assert_eq!(err.kind, ErrorKind::Type);
            assert_eq!(err.message, "/call.nix:4:9: value is an integer while a lambda was expected");
        }
    }

    #[test]
    fn test_plain_file_field_is_returned_as_is() {
        let pos = Pos::new("/tmp/x.nix".to_string(), 10, 3);
        assert_eq!(Rev2_3::extract_file_path(&pos), "/tmp/x.nix");
        assert_eq!(Rev2_6::extract_file_path(&Pos::default()), "");
    }
}
