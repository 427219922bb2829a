//! Source positions
//!
//! A `Pos` is a (origin, line, column) triple. Older layouts record the
//! origin as a plain file name; newer ones use `Origin`, which also covers
//! code read from stdin or from an in-memory string.

use std::fmt;
use std::ops::Index;
use std::path::PathBuf;

/// Source position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pos<S> {
    pub origin: S,
    pub line: u32,
    pub column: u32,
}

impl<S> Pos<S> {
    pub fn new(origin: S, line: u32, column: u32) -> Self {
        Self { origin, line, column }
    }
}

/// Path of a source file known to the evaluator
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourcePath(PathBuf);

impl SourcePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Where the code at a position came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Origin {
    /// No meaningful location (builtins, synthesized code)
    #[default]
    None,
    /// Read from standard input
    Stdin { source: String },
    /// Evaluated from an in-memory string
    String { source: String },
    /// A file on disk
    Path(SourcePath),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::None => write!(f, "«none»"),
            Origin::Stdin { .. } => write!(f, "«stdin»"),
            Origin::String { .. } => write!(f, "«string»"),
            Origin::Path(path) => write!(f, "{}", path),
        }
    }
}

/// Index into a `PosTable`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PosIdx(u32);

/// The "no position" index
pub const NO_POS: PosIdx = PosIdx(0);

impl PosIdx {
    pub fn is_none(self) -> bool {
        self == NO_POS
    }
}

/// Interned positions owned by the evaluator state.
///
/// Slot 0 always holds the empty position that `NO_POS` and unknown
/// indices resolve to.
#[derive(Debug, Clone)]
pub struct PosTable<S> {
    entries: Vec<Pos<S>>,
}

impl<S: Default> PosTable<S> {
    pub fn new() -> Self {
        Self { entries: vec![Pos::default()] }
    }
}

impl<S> PosTable<S> {
    pub fn add(&mut self, pos: Pos<S>) -> PosIdx {
        let idx = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
        if idx == u32::MAX {
            return NO_POS;
        }
        self.entries.push(pos);
        PosIdx(idx)
    }

    /// Number of interned positions, not counting the empty slot
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Default> Default for PosTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Index<PosIdx> for PosTable<S> {
    type Output = Pos<S>;

    fn index(&self, idx: PosIdx) -> &Pos<S> {
        self.entries
            .get(idx.0 as usize)
            .unwrap_or(&self.entries[0])
    }
}
