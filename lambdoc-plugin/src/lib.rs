//! Lambdoc host plugin
//!
//! Adds three primops to the host evaluator:
//! - `__getDoc f`: documentation of `f` as a string, or null
//! - `__doc f`: print that documentation to stdout
//! - `__unsafeGetLambdaPos f`: `{ file, line, column }` of where `f` is defined
//!
//! Documentation comes from an external engine behind a C boundary. The
//! plugin is built for one host revision (`host-*` features) and registers
//! nothing when loaded into a host reporting a different version.

pub mod capability;
pub mod compat;
pub mod engine;
pub mod logging;
pub mod primops;
pub mod registry;

#[cfg(test)]
mod testing;

pub use capability::Capability;
pub use compat::Active;
pub use engine::{lookup_docs, DocEngine, EngineDocs};
pub use registry::{built_against, host_version_matches, register_primops, PRIMOPS};

#[cfg(feature = "linked-engine")]
pub use engine::LinkedEngine;

/// Layout of the host the plugin is built for
pub type ActiveLayout = <Active as Capability>::Layout;

/// Plugin entry point: the primops for the running host.
///
/// Registration happens once per process; later calls return the same
/// descriptors. The slice is empty when the host version does not match.
#[cfg(feature = "linked-engine")]
pub fn load() -> &'static [lambdoc_host::RegisterPrimOp<ActiveLayout>] {
    use std::sync::OnceLock;

    static REGISTERED: OnceLock<Vec<lambdoc_host::RegisterPrimOp<ActiveLayout>>> = OnceLock::new();
    REGISTERED.get_or_init(|| {
        logging::init();
        register_primops::<Active, LinkedEngine>(lambdoc_host::version())
    })
}

pub mod prelude {
    pub use crate::{Active, ActiveLayout, Capability, DocEngine, EngineDocs, PRIMOPS};
    pub use lambdoc_host::prelude::*;
}
