//! Primop descriptors
//!
//! Plugins hand the host a `RegisterPrimOp` per primitive. Older hosts took
//! only name, arity and function; newer ones take a `PrimOp` record that
//! also carries argument names, documentation and an experimental-feature
//! gate.

use crate::error::EvalError;
use crate::eval::EvalState;
use crate::layout::Layout;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Native primop entry point: `(state, call position, args, result)`
pub type PrimOpFn<L> = fn(
    &mut EvalState<L>,
    &<L as Layout>::PosRef,
    &mut [Value<L>],
    &mut Value<L>,
) -> Result<(), EvalError>;

/// Feature flag a primop can be gated behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperimentalFeature {
    Flakes,
}

impl fmt::Display for ExperimentalFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExperimentalFeature::Flakes => "flakes",
        })
    }
}

/// Primop record
#[derive(Clone)]
pub struct PrimOp<L: Layout> {
    pub name: String,
    pub args: Vec<String>,
    pub arity: usize,
    pub doc: Option<String>,
    pub fun: PrimOpFn<L>,
    pub experimental_feature: Option<ExperimentalFeature>,
}

impl<L: Layout> fmt::Debug for PrimOp<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimOp")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("arity", &self.arity)
            .field("doc", &self.doc)
            .field("experimental_feature", &self.experimental_feature)
            .finish_non_exhaustive()
    }
}

/// Registration request for one primop
#[derive(Debug, Clone)]
pub struct RegisterPrimOp<L: Layout> {
    info: PrimOp<L>,
}

impl<L: Layout> RegisterPrimOp<L> {
    /// Structured descriptor
    pub fn new(info: PrimOp<L>) -> Self {
        Self { info }
    }

    /// Positional descriptor: no argument names, no docs
    pub fn positional(name: impl Into<String>, arity: usize, fun: PrimOpFn<L>) -> Self {
        Self {
            info: PrimOp {
                name: name.into(),
                args: Vec::new(),
                arity,
                doc: None,
                fun,
                experimental_feature: None,
            },
        }
    }

    pub fn info(&self) -> &PrimOp<L> {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }
}

/// Serializable documentation of an installed primop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimOpDoc {
    pub name: String,
    pub arity: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental_feature: Option<ExperimentalFeature>,
}

impl<L: Layout> From<&PrimOp<L>> for PrimOpDoc {
    fn from(op: &PrimOp<L>) -> Self {
        Self {
            name: op.name.clone(),
            arity: op.arity,
            args: op.args.clone(),
            doc: op.doc.clone(),
            experimental_feature: op.experimental_feature,
        }
    }
}
