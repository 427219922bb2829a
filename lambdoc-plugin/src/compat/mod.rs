//! Capability implementations, one per host revision
//!
//! | Revision   | Layout  | Strings  | Type errors            | Position value | Descriptor |
//! |------------|---------|----------|------------------------|----------------|------------|
//! | 2.3        | classic | retained | free fn, value first   | raw pointer    | positional |
//! | 2.4        | classic | retained | free fn, pos first     | `Ptr`          | positional |
//! | 2.6        | classic | copied   | free fn, pos first     | `Ptr`          | positional |
//! | 2.9        | indexed | copied   | state helper           | `PosIdx`       | positional |
//! | 2.13.0     | tagged  | copied   | error builder          | `PosIdx`       | positional |
//! | 2.13.1     | tagged  | copied   | state helper           | `PosIdx`       | positional |
//! | 2.14       | tagged  | copied   | error builder          | `PosIdx`       | positional |
//! | 2.17       | tagged  | copied   | error builder          | `PosIdx`       | structured |
//!
//! The error builder shipped in 2.13.0, was reverted in 2.13.1 and came back
//! in 2.14, so each revision states its convention explicitly.
//!
//! `Active` is the implementation the plugin is built for. It is the
//! revision named by the one enabled `host-*` feature, or 2.17 when none is
//! enabled. Enabling two `host-*` features is a build error.

mod classic;
mod indexed;
mod tagged;

pub use classic::{Rev2_3, Rev2_4, Rev2_6};
pub use indexed::Rev2_9;
pub use tagged::{Rev2_13, Rev2_13_1, Rev2_14, Rev2_17};

/// Type error template with the position rendered into the message
const NOT_A_LAMBDA_AT: &str = "%2%: value is %1% while a lambda was expected";

/// Type error template for conventions that attach the position as a trace
const NOT_A_LAMBDA: &str = "value is %1% while a lambda was expected";

/// Number of `host-*` features enabled in this build
const DECLARED_HOSTS: usize = cfg!(feature = "host-2-3") as usize
    + cfg!(feature = "host-2-4") as usize
    + cfg!(feature = "host-2-6") as usize
    + cfg!(feature = "host-2-9") as usize
    + cfg!(feature = "host-2-13") as usize
    + cfg!(feature = "host-2-13-1") as usize
    + cfg!(feature = "host-2-14") as usize
    + cfg!(feature = "host-2-17") as usize;

const _: () = assert!(
    DECLARED_HOSTS <= 1,
    "lambdoc-plugin targets one host revision: enable at most one `host-*` feature"
);

#[cfg(feature = "host-2-3")]
pub type Active = Rev2_3;

#[cfg(feature = "host-2-4")]
pub type Active = Rev2_4;

#[cfg(feature = "host-2-6")]
pub type Active = Rev2_6;

#[cfg(feature = "host-2-9")]
pub type Active = Rev2_9;

#[cfg(feature = "host-2-13")]
pub type Active = Rev2_13;

#[cfg(feature = "host-2-13-1")]
pub type Active = Rev2_13_1;

#[cfg(feature = "host-2-14")]
pub type Active = Rev2_14;

#[cfg(any(
    feature = "host-2-17",
    not(any(
        feature = "host-2-3",
        feature = "host-2-4",
        feature = "host-2-6",
        feature = "host-2-9",
        feature = "host-2-13",
        feature = "host-2-13-1",
        feature = "host-2-14"
    ))
))]
pub type Active = Rev2_17;
