//! The three primops
//!
//! Each one forces its single argument, checks that it is a lambda, and
//! works from the position where that lambda is defined. The call-site
//! position is only used for error reporting.

use crate::capability::Capability;
use crate::engine::{lookup_docs, DocEngine, EngineDocs};
use crate::registry::PRIMOPS;
use lambdoc_host::{EvalError, EvalState, ExprLambda, Layout, Value};
use std::io::{self, Write};
use std::rc::Rc;

type PosRef<C> = <<C as Capability>::Layout as Layout>::PosRef;

/// Force `args[0]` and return the lambda it holds
fn force_lambda<C: Capability>(
    name: &str,
    state: &mut EvalState<C::Layout>,
    pos: &PosRef<C>,
    args: &mut [Value<C::Layout>],
) -> Result<Rc<ExprLambda<C::Layout>>, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity(name, 1, args.len()));
    }
    let arg = &mut args[0];
    state.force_value(arg, pos)?;
    C::validate_is_function(state, arg, pos)?;
    arg.as_lambda()
        .cloned()
        .ok_or_else(|| EvalError::type_error("value is not a lambda"))
}

/// Ask the engine about the definition site of `lambda`
fn docs_for_lambda<C: Capability, E: DocEngine>(
    state: &EvalState<C::Layout>,
    lambda: &ExprLambda<C::Layout>,
) -> Option<EngineDocs<E>> {
    let pos = C::resolve_function_position(state, lambda);
    let file = C::extract_file_path(&pos);
    lookup_docs::<E>(&file, pos.line, pos.column)
}

/// Write the docs of `lambda`, if any, to `out`
pub fn print_lambda_docs<C: Capability, E: DocEngine, W: Write>(
    state: &EvalState<C::Layout>,
    lambda: &ExprLambda<C::Layout>,
    out: &mut W,
) -> io::Result<()> {
    match docs_for_lambda::<C, E>(state, lambda) {
        Some(docs) => docs.write_line(out),
        None => Ok(()),
    }
}

/// `__getDoc f`: the docs of `f` as a string, or null
pub fn prim_get_doc<C: Capability, E: DocEngine>(
    state: &mut EvalState<C::Layout>,
    pos: &PosRef<C>,
    args: &mut [Value<C::Layout>],
    v: &mut Value<C::Layout>,
) -> Result<(), EvalError> {
    let lambda = force_lambda::<C>(PRIMOPS[0], state, pos, args)?;
    match docs_for_lambda::<C, E>(state, &lambda) {
        Some(docs) => C::make_string(v, &docs.text()),
        None => C::make_null(v),
    }
    Ok(())
}

/// `__doc f`: print the docs of `f` to stdout, return null
pub fn prim_print_doc<C: Capability, E: DocEngine>(
    state: &mut EvalState<C::Layout>,
    pos: &PosRef<C>,
    args: &mut [Value<C::Layout>],
    v: &mut Value<C::Layout>,
) -> Result<(), EvalError> {
    let lambda = force_lambda::<C>(PRIMOPS[1], state, pos, args)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_lambda_docs::<C, E, _>(state, &lambda, &mut out)?;
    out.flush()?;
    C::make_null(v);
    Ok(())
}

/// `__unsafeGetLambdaPos f`: `{ file, line, column }` of where `f` is defined
pub fn prim_unsafe_get_lambda_pos<C: Capability>(
    state: &mut EvalState<C::Layout>,
    pos: &PosRef<C>,
    args: &mut [Value<C::Layout>],
    v: &mut Value<C::Layout>,
) -> Result<(), EvalError> {
    let lambda = force_lambda::<C>(PRIMOPS[2], state, pos, args)?;
    C::build_position_value(state, v, &lambda.pos);
    Ok(())
}
