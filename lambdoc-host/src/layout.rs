//! Host memory layouts
//!
//! A layout fixes two things that changed between host releases:
//! how expressions and primop calls refer to a position (`PosRef`), and
//! what a resolved position records about its origin (`Source`).

use crate::pos::{Origin, Pos, PosIdx, PosTable, SourcePath};
use std::fmt;

/// Origin information stored in a resolved position
pub trait PosSource: Clone + Default + fmt::Debug + 'static {
    /// Origin for a file on disk
    fn from_file(path: &str) -> Self;

    /// File on disk, if the position has one
    fn file(&self) -> Option<String>;

    /// Text used when the position shows up in an error
    fn render(&self) -> String;
}

impl PosSource for String {
    fn from_file(path: &str) -> Self {
        path.to_string()
    }

    fn file(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.clone())
    }

    fn render(&self) -> String {
        if self.is_empty() {
            "«none»".to_string()
        } else {
            self.clone()
        }
    }
}

impl PosSource for Origin {
    fn from_file(path: &str) -> Self {
        Origin::Path(SourcePath::new(path))
    }

    fn file(&self) -> Option<String> {
        match self {
            Origin::Path(path) => Some(path.to_string()),
            _ => None,
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

/// Host memory layout
pub trait Layout: Clone + fmt::Debug + Sized + 'static {
    /// Origin representation of resolved positions
    type Source: PosSource;

    /// How lambdas and primop calls refer to a position
    type PosRef: Clone + fmt::Debug;

    const NAME: &'static str;

    /// Store a position the way this layout refers to positions
    fn intern(table: &mut PosTable<Self::Source>, pos: Pos<Self::Source>) -> Self::PosRef;

    /// Resolve a position reference to a full position
    fn resolve(table: &PosTable<Self::Source>, pos: &Self::PosRef) -> Pos<Self::Source>;
}

/// Positions stored inline, origin is a plain file name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classic;

/// Positions interned in the state's table, origin is a plain file name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indexed;

/// Positions interned in the state's table, origin is an `Origin`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tagged;

impl Layout for Classic {
    type Source = String;
    type PosRef = Pos<String>;

    const NAME: &'static str = "classic";

    fn intern(_table: &mut PosTable<String>, pos: Pos<String>) -> Pos<String> {
        pos
    }

    fn resolve(_table: &PosTable<String>, pos: &Pos<String>) -> Pos<String> {
        pos.clone()
    }
}

impl Layout for Indexed {
    type Source = String;
    type PosRef = PosIdx;

    const NAME: &'static str = "indexed";

    fn intern(table: &mut PosTable<String>, pos: Pos<String>) -> PosIdx {
        table.add(pos)
    }

    fn resolve(table: &PosTable<String>, pos: &PosIdx) -> Pos<String> {
        table[*pos].clone()
    }
}

impl Layout for Tagged {
    type Source = Origin;
    type PosRef = PosIdx;

    const NAME: &'static str = "tagged";

    fn intern(table: &mut PosTable<Origin>, pos: Pos<Origin>) -> PosIdx {
        table.add(pos)
    }

    fn resolve(table: &PosTable<Origin>, pos: &PosIdx) -> Pos<Origin> {
        table[*pos].clone()
    }
}

impl<S: PosSource> fmt::Display for Pos<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.origin.render(), self.line, self.column)
    }
}
