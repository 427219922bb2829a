//! Free-function API of the inline-position releases
//!
//! These predate the value methods and the state-mediated error helpers.
//! `mk_string` stores a borrowed `'static` string instead of copying it.

use crate::error::{hintfmt, EvalError};
use crate::layout::Layout;
use crate::pos::Pos;
use crate::value::{HostStr, Value};

pub fn mk_null<L: Layout>(v: &mut Value<L>) {
    *v = Value::Null;
}

/// Point `v` at `s` without copying it
pub fn mk_string<L: Layout>(v: &mut Value<L>, s: &'static str) {
    *v = Value::String(HostStr::Retained(s));
}

/// Type error, oldest argument order: `%1%` is the type of `v`, `%2%` the position
pub fn throw_type_error<L: Layout>(template: &str, v: &Value<L>, pos: &Pos<String>) -> EvalError {
    EvalError::type_error(hintfmt(template, &[&v.show_type(), pos]))
}

/// Type error, position-first argument order
pub fn throw_type_error_at<L: Layout>(pos: &Pos<String>, template: &str, v: &Value<L>) -> EvalError {
    EvalError::type_error(hintfmt(template, &[&v.show_type(), pos]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Classic;

    #[test]
    fn test_mk_string_retains_borrow() {
        static DOCS: &str = "Computes the thing.";
        let mut v: Value<Classic> = Value::Int(1);
        mk_string(&mut v, DOCS);
        assert!(v.as_host_str().is_some_and(HostStr::is_retained));
        assert_eq!(v.as_str(), Some(DOCS));
        mk_null(&mut v);
        assert!(v.is_null());
    }

    #[test]
    fn test_type_error_argument_orders_agree() {
        let pos = Pos::new("/a.nix".to_string(), 1, 2);
        let v: Value<Classic> = Value::Int(3);
        let template = "%2%: value is %1% while a lambda was expected";
        let a = throw_type_error(template, &v, &pos);
        let b = throw_type_error_at(&pos, template, &v);
        assert_eq!(a.message, "/a.nix:1:2: value is an integer while a lambda was expected");
        assert_eq!(a.message, b.message);
        assert!(a.traces.is_empty());
    }
}
