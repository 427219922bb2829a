//! Evaluator state
//!
//! `EvalState` owns the position table and the builtins table. Some entry
//! points only exist for particular layouts, matching the host release that
//! introduced them.

use crate::error::{hintfmt, ErrorKind, EvalError, Trace};
use crate::layout::{Classic, Layout, PosSource};
use crate::pos::{Pos, PosIdx, PosTable};
use crate::primop::{ExperimentalFeature, PrimOpDoc, RegisterPrimOp};
use crate::value::{ExprLambda, Value};
use std::collections::{BTreeMap, HashSet};
use std::ops::Deref;
use std::rc::Rc;
use tracing::debug;

/// Non-null pointer wrapper used by the mid-era position API
#[derive(Debug, Clone, Copy)]
pub struct Ptr<'a, T>(&'a T);

impl<'a, T> Ptr<'a, T> {
    pub fn new(target: &'a T) -> Self {
        Self(target)
    }
}

impl<T> Deref for Ptr<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.0
    }
}

/// Evaluator state
pub struct EvalState<L: Layout> {
    pub positions: PosTable<L::Source>,
    builtins: BTreeMap<String, Value<L>>,
    experimental_features: HashSet<ExperimentalFeature>,
    debugger: bool,
    debug_traces: Vec<EvalError>,
}

impl<L: Layout> EvalState<L> {
    pub fn new() -> Self {
        Self {
            positions: PosTable::new(),
            builtins: BTreeMap::new(),
            experimental_features: HashSet::new(),
            debugger: false,
            debug_traces: Vec::new(),
        }
    }

    pub fn with_experimental_feature(mut self, feature: ExperimentalFeature) -> Self {
        self.experimental_features.insert(feature);
        self
    }

    /// Keep a copy of every error thrown through `ErrorBuilder::debug_throw`
    pub fn with_debugger(mut self) -> Self {
        self.debugger = true;
        self
    }

    pub fn debug_traces(&self) -> &[EvalError] {
        &self.debug_traces
    }

    // ========== Positions ==========

    pub fn add_pos(&mut self, pos: Pos<L::Source>) -> L::PosRef {
        L::intern(&mut self.positions, pos)
    }

    /// Position in a file on disk
    pub fn file_pos(&mut self, file: &str, line: u32, column: u32) -> L::PosRef {
        self.add_pos(Pos::new(L::Source::from_file(file), line, column))
    }

    pub fn resolve_pos(&self, pos: &L::PosRef) -> Pos<L::Source> {
        L::resolve(&self.positions, pos)
    }

    /// A lambda value defined at `pos`
    pub fn mk_lambda(&mut self, name: Option<&str>, pos: Pos<L::Source>) -> Value<L> {
        let pos = self.add_pos(pos);
        Value::Lambda(Rc::new(ExprLambda {
            name: name.map(str::to_string),
            pos,
        }))
    }

    // ========== Evaluation ==========

    /// Replace a thunk by its value
    pub fn force_value(&mut self, v: &mut Value<L>, pos: &L::PosRef) -> Result<(), EvalError> {
        if let Value::Thunk(thunk) = v {
            let thunk = thunk.clone();
            let forced = thunk.force(self).map_err(|e| {
                let at = self.resolve_pos(pos);
                e.with_trace(at, "while evaluating a deferred value")
            })?;
            *v = forced;
        }
        Ok(())
    }

    /// Start building an error
    pub fn error(&mut self, message: impl Into<String>) -> ErrorBuilder<'_, L> {
        ErrorBuilder {
            state: self,
            message: message.into(),
            traces: Vec::new(),
        }
    }

    /// Attribute set describing a position, or null without a file
    fn pos_value(&self, pos: &Pos<L::Source>) -> Value<L> {
        let mut v = Value::Null;
        if let Some(file) = pos.origin.file() {
            let mut attrs = BTreeMap::new();
            let mut file_v = Value::Null;
            file_v.mk_string(&file);
            attrs.insert("file".to_string(), file_v);
            attrs.insert("line".to_string(), Value::Int(i64::from(pos.line)));
            attrs.insert("column".to_string(), Value::Int(i64::from(pos.column)));
            v.mk_attrs(attrs);
        }
        v
    }

    // ========== Builtins ==========

    /// Install a primop into the builtins table.
    ///
    /// Returns `false` when the primop needs an experimental feature that is
    /// not enabled.
    pub fn add_primop(&mut self, op: &RegisterPrimOp<L>) -> bool {
        let info = op.info();
        if let Some(feature) = info.experimental_feature {
            if !self.experimental_features.contains(&feature) {
                debug!(primop = %info.name, %feature, "skipping primop behind experimental feature");
                return false;
            }
        }
        let value = Value::PrimOp(Rc::new(info.clone()));
        if let Some(short) = info.name.strip_prefix("__") {
            self.builtins.insert(short.to_string(), value.clone());
        }
        self.builtins.insert(info.name.clone(), value);
        true
    }

    pub fn add_primops<'a>(&mut self, ops: impl IntoIterator<Item = &'a RegisterPrimOp<L>>) -> usize {
        ops.into_iter().filter(|op| self.add_primop(op)).count()
    }

    pub fn lookup_builtin(&self, name: &str) -> Option<&Value<L>> {
        self.builtins.get(name)
    }

    /// Call a builtin primop by name
    pub fn call_primop(
        &mut self,
        name: &str,
        mut args: Vec<Value<L>>,
        pos: &L::PosRef,
    ) -> Result<Value<L>, EvalError> {
        let op = match self.builtins.get(name) {
            Some(Value::PrimOp(op)) => Rc::clone(op),
            _ => {
                let at = self.resolve_pos(pos);
                return Err(EvalError::undefined_var(name).with_trace(at, ""));
            }
        };
        if args.len() != op.arity {
            return Err(EvalError::arity(&op.name, op.arity, args.len()));
        }
        let mut out = Value::Null;
        (op.fun)(self, pos, &mut args, &mut out)?;
        Ok(out)
    }

    /// Documentation of every installed primop, sorted by name
    pub fn primop_docs(&self) -> Vec<PrimOpDoc> {
        self.builtins
            .iter()
            .filter_map(|(name, v)| match v {
                Value::PrimOp(op) if *name == op.name => Some(PrimOpDoc::from(op.as_ref())),
                _ => None,
            })
            .collect()
    }

    /// JSON dump of `primop_docs`
    pub fn dump_builtins(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.primop_docs())
    }
}

impl<L: Layout> Default for EvalState<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry points of layouts that intern positions
impl<L: Layout<PosRef = PosIdx>> EvalState<L> {
    /// Type error for `v`, with `pos` attached as a trace
    pub fn throw_type_error(&self, pos: PosIdx, template: &str, v: &Value<L>) -> EvalError {
        let at = self.resolve_pos(&pos);
        EvalError::type_error(hintfmt(template, &[&v.show_type(), &at])).with_trace(at, "")
    }

    /// Set `v` to the attribute set describing `pos`
    pub fn mk_pos(&mut self, v: &mut Value<L>, pos: PosIdx) {
        *v = self.pos_value(&self.positions[pos]);
    }
}

/// Entry points of the inline-position layout
impl EvalState<Classic> {
    /// Set `v` to the attribute set describing `*pos`, null for a null pointer.
    ///
    /// # Safety
    ///
    /// `pos` must be null or point to a live `Pos`.
    pub unsafe fn mk_pos_raw(&mut self, v: &mut Value<Classic>, pos: *const Pos<String>) {
        // SAFETY: guaranteed by the caller.
        *v = match unsafe { pos.as_ref() } {
            Some(pos) => self.pos_value(pos),
            None => Value::Null,
        };
    }

    pub fn mk_pos_ptr(&mut self, v: &mut Value<Classic>, pos: Ptr<'_, Pos<String>>) {
        *v = self.pos_value(&pos);
    }
}

/// Builder for an error that is thrown with traces attached
pub struct ErrorBuilder<'a, L: Layout> {
    state: &'a mut EvalState<L>,
    message: String,
    traces: Vec<Trace>,
}

impl<L: Layout> ErrorBuilder<'_, L> {
    pub fn with_trace(mut self, pos: &L::PosRef, hint: impl Into<String>) -> Self {
        let at = self.state.resolve_pos(pos);
        self.traces.push(Trace {
            pos: at.to_string(),
            hint: hint.into(),
        });
        self
    }

    /// Finish the error, handing a copy to the debugger when one is attached
    pub fn debug_throw(self, kind: ErrorKind) -> EvalError {
        let err = EvalError {
            kind,
            message: self.message,
            traces: self.traces,
        };
        if self.state.debugger {
            self.state.debug_traces.push(err.clone());
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Indexed, Tagged};
    use crate::pos::{Origin, NO_POS};
    use crate::primop::PrimOp;

    fn identity<L: Layout>(
        _state: &mut EvalState<L>,
        _pos: &L::PosRef,
        args: &mut [Value<L>],
        out: &mut Value<L>,
    ) -> Result<(), EvalError> {
        *out = args[0].clone();
        Ok(())
    }

    #[test]
    fn test_force_value_replaces_thunk() {
        let mut state: EvalState<Tagged> = EvalState::new();
        let mut v = Value::thunk(|_| Ok(Value::Int(3)));
        state.force_value(&mut v, &NO_POS).unwrap();
        assert_eq!(v.as_int(), Some(3));
    }

    #[test]
    fn test_force_value_traces_failure() {
        let mut state: EvalState<Tagged> = EvalState::new();
        let call = state.file_pos("/call.nix", 2, 1);
        let mut v: Value<Tagged> = Value::thunk(|_| Err(EvalError::type_error("bad")));
        let err = state.force_value(&mut v, &call).unwrap_err();
        assert_eq!(err.traces[0].pos, "/call.nix:2:1");
    }

    #[test]
    fn test_throw_type_error_formats_and_traces() {
        let mut state: EvalState<Indexed> = EvalState::new();
        let pos = state.file_pos("/a.nix", 5, 6);
        let err = state.throw_type_error(pos, "%2%: value is %1% while a lambda was expected", &Value::Null);
        assert_eq!(err.kind, ErrorKind::Type);
        assert_eq!(err.message, "/a.nix:5:6: value is null while a lambda was expected");
        assert_eq!(err.traces.len(), 1);
    }

    #[test]
    fn test_error_builder_reaches_debugger() {
        let mut state: EvalState<Tagged> = EvalState::new().with_debugger();
        let pos = state.file_pos("/a.nix", 1, 1);
        let err = state
            .error("value is null while a lambda was expected")
            .with_trace(&pos, "")
            .debug_throw(ErrorKind::Type);
        assert_eq!(err.traces[0].pos, "/a.nix:1:1");
        assert_eq!(state.debug_traces().len(), 1);
    }

    #[test]
    fn test_mk_pos_for_file_and_none() {
        let mut state: EvalState<Tagged> = EvalState::new();
        let pos = state.file_pos("/tmp/x.nix", 10, 3);
        let mut v = Value::Null;
        state.mk_pos(&mut v, pos);
        assert_eq!(v.attr("file").and_then(Value::as_str), Some("/tmp/x.nix"));
        assert_eq!(v.attr("line").and_then(Value::as_int), Some(10));
        assert_eq!(v.attr("column").and_then(Value::as_int), Some(3));

        let stdin = state.add_pos(Pos::new(Origin::Stdin { source: "x: x".into() }, 1, 1));
        state.mk_pos(&mut v, stdin);
        assert!(v.is_null());
    }

    #[test]
    fn test_mk_pos_classic_conventions() {
        let mut state: EvalState<Classic> = EvalState::new();
        let pos = Pos::new("/tmp/x.nix".to_string(), 10, 3);
        let mut v = Value::Null;
        unsafe { state.mk_pos_raw(&mut v, &pos) };
        assert_eq!(v.attr("line").and_then(Value::as_int), Some(10));
        state.mk_pos_ptr(&mut v, Ptr::new(&pos));
        assert_eq!(v.attr("file").and_then(Value::as_str), Some("/tmp/x.nix"));
        unsafe { state.mk_pos_raw(&mut v, std::ptr::null()) };
        assert!(v.is_null());
    }

    #[test]
    fn test_primop_install_and_call() {
        let mut state: EvalState<Tagged> = EvalState::new();
        let op = RegisterPrimOp::positional("__id", 1, identity::<Tagged>);
        assert_eq!(state.add_primops([&op]), 1);
        assert!(state.lookup_builtin("id").is_some());
        let out = state.call_primop("__id", vec![Value::Int(4)], &NO_POS).unwrap();
        assert_eq!(out.as_int(), Some(4));

        let err = state.call_primop("__id", vec![], &NO_POS).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Arity);
        let err = state.call_primop("__missing", vec![Value::Null], &NO_POS).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedVar);
    }

    #[test]
    fn test_experimental_primop_needs_feature() {
        let op = RegisterPrimOp::new(PrimOp {
            name: "__id".to_string(),
            args: vec!["x".to_string()],
            arity: 1,
            doc: Some("Identity".to_string()),
            fun: identity::<Tagged>,
            experimental_feature: Some(ExperimentalFeature::Flakes),
        });
        let mut state: EvalState<Tagged> = EvalState::new();
        assert!(!state.add_primop(&op));
        assert!(state.lookup_builtin("__id").is_none());

        let mut state: EvalState<Tagged> =
            EvalState::new().with_experimental_feature(ExperimentalFeature::Flakes);
        assert!(state.add_primop(&op));
    }

    #[test]
    fn test_dump_builtins_lists_each_primop_once() {
        let mut state: EvalState<Tagged> = EvalState::new();
        let op = RegisterPrimOp::new(PrimOp {
            name: "__id".to_string(),
            args: vec!["x".to_string()],
            arity: 1,
            doc: Some("Identity".to_string()),
            fun: identity::<Tagged>,
            experimental_feature: None,
        });
        state.add_primop(&op);
        let docs = state.primop_docs();
        assert_eq!(docs.len(), 1);
        let json: serde_json::Value = serde_json::from_str(&state.dump_builtins().unwrap()).unwrap();
        assert_eq!(json[0]["name"], "__id");
        assert_eq!(json[0]["doc"], "Identity");
        assert_eq!(json[0]["args"][0], "x");
    }
}
