//! Runtime values
//!
//! Values are what primops receive and produce. Heap-backed variants are
//! reference counted, so cloning a value is cheap.

use crate::error::EvalError;
use crate::eval::EvalState;
use crate::layout::Layout;
use crate::primop::PrimOp;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::rc::Rc;

/// String contents of a value.
///
/// `Retained` is a borrow the host keeps for the rest of the process;
/// the caller is responsible for keeping it alive.
#[derive(Debug, Clone)]
pub enum HostStr {
    Owned(Rc<str>),
    Retained(&'static str),
}

impl HostStr {
    pub fn as_str(&self) -> &str {
        match self {
            HostStr::Owned(s) => s,
            HostStr::Retained(s) => s,
        }
    }

    pub fn is_retained(&self) -> bool {
        matches!(self, HostStr::Retained(_))
    }
}

impl fmt::Display for HostStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lambda expression: the definition site of a function value
#[derive(Debug, Clone)]
pub struct ExprLambda<L: Layout> {
    pub name: Option<String>,
    /// Where the lambda itself is written
    pub pos: L::PosRef,
}

type Deferred<L> = Box<dyn FnOnce(&mut EvalState<L>) -> Result<Value<L>, EvalError>>;

enum ThunkState<L: Layout> {
    Pending(Deferred<L>),
    /// Being forced right now
    Blackhole,
    Done(Value<L>),
    Failed(EvalError),
}

/// Deferred value, computed at most once
pub struct Thunk<L: Layout>(Rc<RefCell<ThunkState<L>>>);

impl<L: Layout> Thunk<L> {
    pub fn new(f: impl FnOnce(&mut EvalState<L>) -> Result<Value<L>, EvalError> + 'static) -> Self {
        Self(Rc::new(RefCell::new(ThunkState::Pending(Box::new(f)))))
    }

    pub fn is_forced(&self) -> bool {
        matches!(&*self.0.borrow(), ThunkState::Done(_))
    }

    /// Compute the value, or return the cached result.
    pub(crate) fn force(&self, state: &mut EvalState<L>) -> Result<Value<L>, EvalError> {
        let current = mem::replace(&mut *self.0.borrow_mut(), ThunkState::Blackhole);
        let result = match current {
            ThunkState::Pending(f) => f(state),
            ThunkState::Blackhole => Err(EvalError::infinite_recursion()),
            ThunkState::Done(v) => Ok(v),
            ThunkState::Failed(e) => Err(e),
        };
        *self.0.borrow_mut() = match &result {
            Ok(v) => ThunkState::Done(v.clone()),
            Err(e) => ThunkState::Failed(e.clone()),
        };
        result
    }
}

impl<L: Layout> Clone for Thunk<L> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<L: Layout> fmt::Debug for Thunk<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.0.borrow() {
            ThunkState::Pending(_) => "pending",
            ThunkState::Blackhole => "blackhole",
            ThunkState::Done(_) => "done",
            ThunkState::Failed(_) => "failed",
        };
        write!(f, "Thunk({})", state)
    }
}

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value<L: Layout> {
    Null,
    Bool(bool),
    Int(i64),
    String(HostStr),
    List(Rc<Vec<Value<L>>>),
    Attrs(Rc<BTreeMap<String, Value<L>>>),
    Lambda(Rc<ExprLambda<L>>),
    PrimOp(Rc<PrimOp<L>>),
    Thunk(Thunk<L>),
}

impl<L: Layout> Default for Value<L> {
    fn default() -> Self {
        Value::Null
    }
}

impl<L: Layout> Value<L> {
    // ========== Constructors (in place) ==========

    pub fn mk_null(&mut self) {
        *self = Value::Null;
    }

    /// Set to a string, copying `s`
    pub fn mk_string(&mut self, s: &str) {
        *self = Value::String(HostStr::Owned(Rc::from(s)));
    }

    pub fn mk_attrs(&mut self, attrs: BTreeMap<String, Value<L>>) {
        *self = Value::Attrs(Rc::new(attrs));
    }

    pub fn thunk(f: impl FnOnce(&mut EvalState<L>) -> Result<Value<L>, EvalError> + 'static) -> Self {
        Value::Thunk(Thunk::new(f))
    }

    // ========== Safe Accessors (never panic) ==========

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self, Value::Lambda(_))
    }

    pub fn as_lambda(&self) -> Option<&Rc<ExprLambda<L>>> {
        match self {
            Value::Lambda(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_host_str(&self) -> Option<&HostStr> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_attrs(&self) -> Option<&BTreeMap<String, Value<L>>> {
        match self {
            Value::Attrs(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Attribute of a set, if both exist
    pub fn attr(&self, name: &str) -> Option<&Value<L>> {
        self.as_attrs().and_then(|attrs| attrs.get(name))
    }

    /// Type description used in error messages
    pub fn show_type(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "a Boolean".to_string(),
            Value::Int(_) => "an integer".to_string(),
            Value::String(_) => "a string".to_string(),
            Value::List(_) => "a list".to_string(),
            Value::Attrs(_) => "a set".to_string(),
            Value::Lambda(_) => "a function".to_string(),
            Value::PrimOp(op) => format!("the built-in function '{}'", op.name),
            Value::Thunk(_) => "a thunk".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Tagged;
    use crate::pos::NO_POS;

    #[test]
    fn test_mk_string_copies() {
        let text = String::from("Computes the thing.");
        let mut v: Value<Tagged> = Value::Null;
        v.mk_string(&text);
        drop(text);
        assert_eq!(v.as_str(), Some("Computes the thing."));
        assert!(!v.as_host_str().map_or(true, HostStr::is_retained));
    }

    #[test]
    fn test_show_type() {
        let lambda: Value<Tagged> = Value::Lambda(Rc::new(ExprLambda { name: None, pos: NO_POS }));
        assert_eq!(lambda.show_type(), "a function");
        assert_eq!(Value::<Tagged>::Int(1).show_type(), "an integer");
        assert_eq!(Value::<Tagged>::Null.show_type(), "null");
        assert_eq!(Value::<Tagged>::Attrs(Rc::default()).show_type(), "a set");
    }

    #[test]
    fn test_thunk_is_forced_once() {
        let mut state: EvalState<Tagged> = EvalState::new();
        let thunk = Thunk::new(|_| Ok(Value::Int(7)));
        assert!(!thunk.is_forced());
        assert_eq!(thunk.force(&mut state).ok().and_then(|v| v.as_int()), Some(7));
        assert!(thunk.is_forced());
        assert_eq!(thunk.clone().force(&mut state).ok().and_then(|v| v.as_int()), Some(7));
    }

    #[test]
    fn test_thunk_failure_is_replayed() {
        let mut state: EvalState<Tagged> = EvalState::new();
        let thunk: Thunk<Tagged> = Thunk::new(|_| Err(EvalError::type_error("boom")));
        assert!(thunk.force(&mut state).is_err());
        let again = thunk.force(&mut state).unwrap_err();
        assert_eq!(again.message, "boom");
    }

    #[test]
    fn test_thunk_reentry_is_infinite_recursion() {
        let mut state: EvalState<Tagged> = EvalState::new();
        let slot: Rc<RefCell<Option<Thunk<Tagged>>>> = Rc::new(RefCell::new(None));
        let inner = Rc::clone(&slot);
        let thunk = Thunk::new(move |state| {
            let me = inner.borrow().clone().ok_or_else(|| EvalError::type_error("unset"))?;
            me.force(state)
        });
        *slot.borrow_mut() = Some(thunk.clone());
        let err = thunk.force(&mut state).unwrap_err();
        assert_eq!(err.message, "infinite recursion encountered");
    }
}
